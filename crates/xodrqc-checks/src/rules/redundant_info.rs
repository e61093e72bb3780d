//! Records that only repeat their predecessor.
//!
//! - elevation, superelevation, lane offset, lane width and lane border
//!   records describing the same polynomial as the record before them
//! - a line continuing a collinear line
//! - an arc continuing an arc of the same curvature

use crate::context::CheckContext;
use std::f64::consts::PI;
use xodrqc_kernel::geometry::evaluate_segment;
use xodrqc_kernel::lanes::road_lanes;
use xodrqc_kernel::{Cubic, Finding, GeometryKind, GeometrySegment};

pub const RULE_ID: &str = "redundant_info";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let eps = ctx.thresholds().redundant_epsilon;
    let mut findings = Vec::new();

    for road in ctx.map.roads() {
        let profiles = [
            ("elevation", &road.elevation_profile),
            ("superelevation", &road.superelevation),
            ("lane offset", &road.lane_offsets),
        ];
        for (what, records) in profiles {
            for s in repeated_records(records, eps) {
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "{what} record at s={s} of road {} repeats the previous record",
                            road.id
                        ),
                    )
                    .with_road(road.id.as_str())
                    .with_s_offset(s),
                );
            }
        }

        for (idx, pair) in road.plan_view.windows(2).enumerate() {
            if continues(ctx, &pair[0], &pair[1], eps) {
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "{} geometry {} of road {} continues the previous one unchanged",
                            pair[1].kind.name(),
                            idx + 1,
                            road.id
                        ),
                    )
                    .with_road(road.id.as_str())
                    .with_s_offset(pair[1].s),
                );
            }
        }

        for (lane_ref, lane) in road_lanes(road) {
            let s_start = ctx
                .topology
                .span(lane_ref.road_id, lane_ref.section)
                .map(|span| span.s_start)
                .unwrap_or(0.0);
            for (what, records) in [("width", &lane.widths), ("border", &lane.borders)] {
                for s in repeated_records(records, eps) {
                    findings.push(
                        ctx.finding(
                            RULE_ID,
                            format!(
                                "{what} record at sOffset={s} of lane {} on road {} section {} repeats the previous record",
                                lane.id, road.id, lane_ref.section
                            ),
                        )
                        .with_road(road.id.as_str())
                        .with_lane(lane.id)
                        .with_s_offset(s_start + s),
                    );
                }
            }
        }
    }
    findings
}

/// Start offsets of records equal to their predecessor carried forward.
fn repeated_records(records: &[Cubic], eps: f64) -> Vec<f64> {
    records
        .windows(2)
        .filter(|pair| pair[1].same_equation(&pair[0].rebased(pair[1].s), eps))
        .map(|pair| pair[1].s)
        .collect()
}

fn continues(
    ctx: &CheckContext<'_>,
    prev: &GeometrySegment,
    next: &GeometrySegment,
    eps: f64,
) -> bool {
    let same_shape = match (&prev.kind, &next.kind) {
        (GeometryKind::Line, GeometryKind::Line) => true,
        (GeometryKind::Arc { curvature: a }, GeometryKind::Arc { curvature: b }) => {
            (a - b).abs() <= eps
        }
        _ => false,
    };
    if !same_shape {
        return false;
    }
    let tolerance = ctx.geometry().epsilon;
    let Ok(end) = evaluate_segment(prev, prev.length, ctx.geometry()) else {
        return false;
    };
    let heading_gap = (end.heading - next.hdg + PI).rem_euclid(2.0 * PI) - PI;
    (end.x - next.x).hypot(end.y - next.y) <= tolerance && heading_gap.abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::OpenDriveMap;
    use xodrqc_kernel::toy::{LaneBuilder, RoadBuilder};

    fn findings_for(map: &OpenDriveMap) -> Vec<Finding> {
        let config = CheckConfig::default();
        let ctx = CheckContext::build(map, &config);
        check(&ctx)
    }

    #[test]
    fn split_line_and_repeated_width_are_flagged() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 10.0)
            .straight(10.0)
            .arc(0.01, 10.0)
            .section(
                0.0,
                vec![
                    LaneBuilder::new(-1)
                        .width_record(Cubic::new(0.0, 3.0, 0.1, 0.0, 0.0))
                        .width_record(Cubic::new(5.0, 3.5, 0.1, 0.0, 0.0))
                        .build(),
                ],
            )
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let findings = findings_for(&map);
        let offsets: Vec<Option<f64>> = findings.iter().map(|f| f.s_offset).collect();
        assert_eq!(offsets, vec![Some(10.0), Some(5.0)]);
        assert_eq!(findings[1].lane_id, Some(-1));
    }

    #[test]
    fn changed_records_pass() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 10.0)
            .arc(0.01, 10.0)
            .arc(0.02, 10.0)
            .elevation(Cubic::new(0.0, 1.0, 0.1, 0.0, 0.0))
            .elevation(Cubic::new(10.0, 2.0, 0.0, 0.0, 0.0))
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        assert!(findings_for(&map).is_empty());
    }

    #[test]
    fn repeated_elevation_is_flagged() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 20.0)
            .elevation(Cubic::constant(0.0, 4.0))
            .elevation(Cubic::constant(10.0, 4.0))
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let findings = findings_for(&map);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].s_offset, Some(10.0));
    }

    #[test]
    fn repeated_lateral_and_border_records_are_flagged() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 30.0)
            .superelevation(Cubic::constant(0.0, 0.02))
            .superelevation(Cubic::constant(10.0, 0.03))
            .superelevation(Cubic::constant(20.0, 0.03))
            .lane_offset(Cubic::new(0.0, 0.0, 0.1, 0.0, 0.0))
            .lane_offset(Cubic::new(10.0, 1.0, 0.1, 0.0, 0.0))
            .section(
                0.0,
                vec![
                    LaneBuilder::new(-1).width(3.0).build(),
                    LaneBuilder::new(-2)
                        .border_record(Cubic::constant(0.0, 6.0))
                        .border_record(Cubic::constant(4.0, 6.0))
                        .build(),
                ],
            )
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let findings = findings_for(&map);
        let got: Vec<(Option<i32>, Option<f64>, bool)> = findings
            .iter()
            .map(|f| (f.lane_id, f.s_offset, f.message.starts_with("border")))
            .collect();
        assert_eq!(
            got,
            vec![
                (None, Some(20.0), false),
                (None, Some(10.0), false),
                (Some(-2), Some(4.0), true),
            ]
        );
        assert!(findings[0].message.starts_with("superelevation"));
        assert!(findings[1].message.starts_with("lane offset"));
    }
}
