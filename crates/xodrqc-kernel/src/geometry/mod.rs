//! Geometry Evaluator: reference-line poses at arbitrary arc length.
//!
//! ```text
//! Road.plan_view ── segment_at(s) ──► GeometrySegment
//!                                          │ evaluate_segment(ds)
//!                                          ▼
//!                              Pose { x, y, heading, curvature }
//! ```
//!
//! Everything here is a pure function of the model. Numerical integration is
//! bounded by [`GeometryConfig::max_subdivision_depth`].

mod fresnel;
pub mod integrate;
mod segment;

pub use fresnel::fresnel;
pub use segment::{arc_length, evaluate_segment, param_at, param_domain, speed};

use crate::error::KernelError;
use crate::model::{ContactPoint, GeometrySegment, Road};
use serde::{Deserialize, Serialize};

/// Tolerances for geometry evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Slack allowed when an arc length is just outside `[0, length]`.
    pub epsilon: f64,
    /// Relative tolerance of adaptive arc-length integration.
    pub integration_tolerance: f64,
    pub max_subdivision_depth: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            integration_tolerance: 1e-3,
            max_subdivision_depth: 24,
        }
    }
}

/// 2D inertial position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Reference-line state at one arc length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub curvature: f64,
}

impl Pose {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Integrated length of one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcLength {
    pub length: f64,
    pub error_estimate: f64,
    pub converged: bool,
}

/// Index of the segment covering road arc length `s`.
pub fn segment_index(plan_view: &[GeometrySegment], s: f64) -> Option<usize> {
    if plan_view.is_empty() {
        return None;
    }
    let idx = plan_view
        .iter()
        .rposition(|segment| segment.s <= s)
        .unwrap_or(0);
    Some(idx)
}

/// Evaluate the road's reference line at arc length `s`.
///
/// Fails with [`KernelError::OutOfRange`] when `s` lies outside
/// `[0, road.length]` by more than `config.epsilon`, and with
/// [`KernelError::NotCovered`] when it lies past the end of the segment that
/// starts before it (a plan view shorter than the road, or a gap between
/// segments).
pub fn evaluate(road: &Road, s: f64, config: &GeometryConfig) -> Result<Pose, KernelError> {
    if !s.is_finite() || s < -config.epsilon || s > road.length + config.epsilon {
        return Err(KernelError::OutOfRange {
            road_id: road.id.clone(),
            s,
            length: road.length,
        });
    }
    let s = s.clamp(0.0, road.length.max(0.0));
    let idx = segment_index(&road.plan_view, s)
        .ok_or_else(|| KernelError::EmptyPlanView(road.id.clone()))?;
    let segment = &road.plan_view[idx];
    let covered = segment.s + segment.length.max(0.0);
    if s > covered + config.epsilon {
        return Err(KernelError::NotCovered {
            road_id: road.id.clone(),
            s,
            covered,
        });
    }
    let ds = (s - segment.s).clamp(0.0, segment.length.max(0.0));
    evaluate_segment(segment, ds, config)
}

pub fn start_pose(road: &Road, config: &GeometryConfig) -> Result<Pose, KernelError> {
    evaluate(road, 0.0, config)
}

pub fn end_pose(road: &Road, config: &GeometryConfig) -> Result<Pose, KernelError> {
    evaluate(road, road.length, config)
}

/// Pose at the road end named by `contact`.
pub fn pose_at_contact(
    road: &Road,
    contact: ContactPoint,
    config: &GeometryConfig,
) -> Result<Pose, KernelError> {
    match contact {
        ContactPoint::Start => start_pose(road, config),
        ContactPoint::End => end_pose(road, config),
    }
}

/// Elevation of the reference line at `s`, zero without an elevation profile.
pub fn elevation_at(road: &Road, s: f64) -> f64 {
    road.elevation_at(s)
}
