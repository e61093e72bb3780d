//! Per-primitive evaluation of reference-line segments.
//!
//! One function per [`GeometryKind`] variant, selected by a single match in
//! [`evaluate_segment`]. All positions are in the inertial frame.

use super::fresnel::fresnel;
use super::integrate::adaptive_simpson;
use super::{ArcLength, GeometryConfig, Pose};
use crate::error::KernelError;
use crate::model::{GeometryKind, GeometrySegment, ParamPolyRange};
use std::f64::consts::PI;

/// Below this curvature (or curvature rate) arcs and spirals degenerate to lines.
const CURVATURE_EPS: f64 = 1e-12;
const POLY3_NEWTON_ITERATIONS: usize = 32;

/// Evaluate `segment` at arc length `ds` past its start.
pub fn evaluate_segment(
    segment: &GeometrySegment,
    ds: f64,
    config: &GeometryConfig,
) -> Result<Pose, KernelError> {
    if ds < -config.epsilon {
        return Err(KernelError::NegativeArcLength {
            kind: segment.kind.name(),
            ds,
        });
    }
    let ds = ds.max(0.0);

    let local = match &segment.kind {
        GeometryKind::Line => line(ds),
        GeometryKind::Arc { curvature } => arc(*curvature, ds),
        GeometryKind::Spiral {
            curv_start,
            curv_end,
        } => spiral(*curv_start, *curv_end, segment.length, ds),
        GeometryKind::Poly3 { a, b, c, d } => poly3([*a, *b, *c, *d], ds, config),
        GeometryKind::ParamPoly3 { .. } => {
            let p = param_at(segment, ds, config.epsilon)?;
            param_poly3(&segment.kind, p)
        }
    };
    Ok(local.placed(segment.x, segment.y, segment.hdg))
}

/// Map arc length `ds` to the paramPoly3 parameter `p`.
///
/// Fails when `p` falls outside the declared domain (`[0, length]` or
/// `[0, 1]`) by more than `epsilon`. Non-parametric segments return `ds`.
pub fn param_at(segment: &GeometrySegment, ds: f64, epsilon: f64) -> Result<f64, KernelError> {
    let GeometryKind::ParamPoly3 { p_range, .. } = &segment.kind else {
        return Ok(ds);
    };
    let (p, max) = match p_range {
        ParamPolyRange::ArcLength => (ds, segment.length),
        ParamPolyRange::Normalized if segment.length > 0.0 => (ds / segment.length, 1.0),
        ParamPolyRange::Normalized => (0.0, 1.0),
    };
    let slack = match p_range {
        ParamPolyRange::ArcLength => epsilon,
        ParamPolyRange::Normalized => epsilon / segment.length.max(1.0),
    };
    if p < -slack || p > max + slack {
        return Err(KernelError::ParameterOutOfDomain {
            p,
            max,
            range: *p_range,
        });
    }
    Ok(p.clamp(0.0, max))
}

/// Upper bound of the segment's curve parameter.
pub fn param_domain(segment: &GeometrySegment) -> f64 {
    match &segment.kind {
        GeometryKind::ParamPoly3 {
            p_range: ParamPolyRange::Normalized,
            ..
        } => 1.0,
        _ => segment.length,
    }
}

/// Euclidean speed `|dP/dp|` of the segment's curve at parameter `p`.
///
/// Lines, arcs, spirals and poly3 segments are parameterized by arc length
/// (poly3 through `u(s)`), so their speed is identically one and only
/// paramPoly3 lengths can disagree with the declared length.
pub fn speed(segment: &GeometrySegment, p: f64) -> f64 {
    match &segment.kind {
        GeometryKind::Line
        | GeometryKind::Arc { .. }
        | GeometryKind::Spiral { .. }
        | GeometryKind::Poly3 { .. } => 1.0,
        GeometryKind::ParamPoly3 {
            b_u,
            c_u,
            d_u,
            b_v,
            c_v,
            d_v,
            ..
        } => {
            let du = b_u + p * (2.0 * c_u + 3.0 * d_u * p);
            let dv = b_v + p * (2.0 * c_v + 3.0 * d_v * p);
            du.hypot(dv)
        }
    }
}

/// Integrate the curve speed over the segment's declared parameter range.
pub fn arc_length(segment: &GeometrySegment, config: &GeometryConfig) -> ArcLength {
    let upper = param_domain(segment);
    let q = adaptive_simpson(
        |p| speed(segment, p),
        0.0,
        upper.max(0.0),
        config.integration_tolerance,
        config.max_subdivision_depth,
    );
    if !q.converged {
        tracing::warn!(
            kind = segment.kind.name(),
            s = segment.s,
            evaluations = q.evaluations,
            "arc-length integration hit subdivision cap"
        );
    }
    ArcLength {
        length: q.value,
        error_estimate: q.error_estimate,
        converged: q.converged,
    }
}

/// Pose in the segment's local frame (start at origin, heading zero).
#[derive(Debug, Clone, Copy)]
struct LocalPose {
    u: f64,
    v: f64,
    heading: f64,
    curvature: f64,
}

impl LocalPose {
    fn placed(self, x: f64, y: f64, hdg: f64) -> Pose {
        let (sin, cos) = hdg.sin_cos();
        Pose {
            x: x + self.u * cos - self.v * sin,
            y: y + self.u * sin + self.v * cos,
            heading: hdg + self.heading,
            curvature: self.curvature,
        }
    }
}

fn line(ds: f64) -> LocalPose {
    LocalPose {
        u: ds,
        v: 0.0,
        heading: 0.0,
        curvature: 0.0,
    }
}

fn arc(curvature: f64, ds: f64) -> LocalPose {
    if curvature.abs() < CURVATURE_EPS {
        return line(ds);
    }
    let theta = curvature * ds;
    LocalPose {
        u: theta.sin() / curvature,
        v: (1.0 - theta.cos()) / curvature,
        heading: theta,
        curvature,
    }
}

/// Point on the canonical clothoid `κ(t) = rate·t` through the origin.
fn clothoid(t: f64, rate: f64) -> (f64, f64, f64) {
    let scale = (PI / rate.abs()).sqrt();
    let (c, s) = fresnel(t / scale);
    let sign = rate.signum();
    (scale * c, sign * scale * s, 0.5 * rate * t * t)
}

fn spiral(curv_start: f64, curv_end: f64, length: f64, ds: f64) -> LocalPose {
    let rate = if length > 0.0 {
        (curv_end - curv_start) / length
    } else {
        0.0
    };
    if rate.abs() < CURVATURE_EPS {
        return arc(curv_start, ds);
    }

    // Shift onto the canonical clothoid where curvature equals curv_start.
    let t0 = curv_start / rate;
    let (x0, y0, theta0) = clothoid(t0, rate);
    let (x1, y1, theta1) = clothoid(t0 + ds, rate);
    let (sin, cos) = theta0.sin_cos();
    let (dx, dy) = (x1 - x0, y1 - y0);
    LocalPose {
        u: dx * cos + dy * sin,
        v: -dx * sin + dy * cos,
        heading: theta1 - theta0,
        curvature: curv_start + rate * ds,
    }
}

fn poly3(coeffs: [f64; 4], ds: f64, config: &GeometryConfig) -> LocalPose {
    let [a, b, c, d] = coeffs;
    let dv = |u: f64| b + u * (2.0 * c + 3.0 * d * u);
    let ddv = |u: f64| 2.0 * c + 6.0 * d * u;
    let length_to = |u: f64| {
        adaptive_simpson(
            |x| dv(x).hypot(1.0),
            0.0,
            u,
            config.integration_tolerance.min(1e-9),
            config.max_subdivision_depth,
        )
        .value
    };

    // s(u) ≥ u, so the root lies in [0, ds].
    let mut u = ds;
    for _ in 0..POLY3_NEWTON_ITERATIONS {
        let residual = length_to(u) - ds;
        if residual.abs() <= config.epsilon {
            break;
        }
        u = (u - residual / dv(u).hypot(1.0)).clamp(0.0, ds);
    }

    let slope = dv(u);
    LocalPose {
        u,
        v: a + u * (b + u * (c + u * d)),
        heading: slope.atan(),
        curvature: ddv(u) / (1.0 + slope * slope).powf(1.5),
    }
}

fn param_poly3(kind: &GeometryKind, p: f64) -> LocalPose {
    let GeometryKind::ParamPoly3 {
        a_u,
        b_u,
        c_u,
        d_u,
        a_v,
        b_v,
        c_v,
        d_v,
        ..
    } = *kind
    else {
        return line(p);
    };
    let u = a_u + p * (b_u + p * (c_u + p * d_u));
    let v = a_v + p * (b_v + p * (c_v + p * d_v));
    let du = b_u + p * (2.0 * c_u + 3.0 * d_u * p);
    let dv = b_v + p * (2.0 * c_v + 3.0 * d_v * p);
    let ddu = 2.0 * c_u + 6.0 * d_u * p;
    let ddv = 2.0 * c_v + 6.0 * d_v * p;
    let speed_sq = du * du + dv * dv;
    let curvature = if speed_sq > 0.0 {
        (du * ddv - dv * ddu) / speed_sq.powf(1.5)
    } else {
        0.0
    };
    LocalPose {
        u,
        v,
        heading: dv.atan2(du),
        curvature,
    }
}
