//! ParamPoly3 segments are only evaluated inside their declared parameter
//! domain.
//!
//! A segment covers the road from its own `s` to the next segment's `s` (or
//! the road end). When that span implies a parameter past the domain, the
//! reference line cannot be evaluated there.

use crate::context::CheckContext;
use xodrqc_kernel::geometry::param_at;
use xodrqc_kernel::{Finding, GeometryKind};

pub const RULE_ID: &str = "geometry_param_poly3_domain";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let epsilon = ctx.geometry().epsilon;
    let mut findings = Vec::new();
    for road in ctx.map.roads() {
        for (idx, segment) in road.plan_view.iter().enumerate() {
            if !matches!(segment.kind, GeometryKind::ParamPoly3 { .. }) {
                continue;
            }
            let span_end = road
                .plan_view
                .get(idx + 1)
                .map(|next| next.s)
                .unwrap_or(road.length);
            let span = span_end - segment.s;
            if let Err(err) = param_at(segment, span, epsilon) {
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "paramPoly3 geometry of road {} covers {span} m: {err}",
                            road.id
                        ),
                    )
                    .with_road(road.id.as_str())
                    .with_s_offset(segment.s),
                );
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::toy::RoadBuilder;
    use xodrqc_kernel::{OpenDriveMap, ParamPolyRange};

    fn straight_param_poly(range: ParamPolyRange, b_u: f64) -> GeometryKind {
        GeometryKind::ParamPoly3 {
            a_u: 0.0,
            b_u,
            c_u: 0.0,
            d_u: 0.0,
            a_v: 0.0,
            b_v: 0.0,
            c_v: 0.0,
            d_v: 0.0,
            p_range: range,
        }
    }

    #[test]
    fn span_beyond_declared_length_is_out_of_domain() {
        let road = RoadBuilder::new("1")
            .geometry(straight_param_poly(ParamPolyRange::ArcLength, 1.0), 10.0)
            .length(12.0)
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        let findings = check(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].s_offset, Some(0.0));
    }

    #[test]
    fn normalized_segment_followed_by_line_is_in_domain() {
        let road = RoadBuilder::new("1")
            .geometry(straight_param_poly(ParamPolyRange::Normalized, 10.0), 10.0)
            .straight(5.0)
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        assert!(check(&ctx).is_empty());
    }
}
