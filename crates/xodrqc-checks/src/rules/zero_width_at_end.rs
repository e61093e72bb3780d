//! A lane that ends with zero width has no successor.

use crate::context::CheckContext;
use xodrqc_kernel::lanes::road_lanes;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "zero_width_at_end";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let epsilon = ctx.geometry().epsilon;
    let mut findings = Vec::new();
    for road in ctx.map.roads() {
        for (lane_ref, lane) in road_lanes(road) {
            if lane.successors.is_empty() {
                continue;
            }
            let Some(width) = ctx.topology.width_at_end(lane_ref) else {
                continue;
            };
            if width > epsilon {
                continue;
            }
            let s = ctx
                .topology
                .span(lane_ref.road_id, lane_ref.section)
                .map(|span| span.s_end)
                .unwrap_or(road.length);
            findings.push(
                ctx.finding(
                    RULE_ID,
                    format!(
                        "lane {} of road {} section {} ends with zero width but has successors {:?}",
                        lane.id, road.id, lane_ref.section, lane.successors
                    ),
                )
                .with_road(road.id.as_str())
                .with_lane(lane.id)
                .with_s_offset(s),
            );
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::toy::{LaneBuilder, RoadBuilder};
    use xodrqc_kernel::OpenDriveMap;

    #[test]
    fn tapering_lane_with_successor_is_flagged_once() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 20.0)
            .section(
                0.0,
                vec![
                    LaneBuilder::new(1).width(3.0).successor(1).build(),
                    LaneBuilder::new(2)
                        .width_poly(3.0, -0.3, 0.0, 0.0)
                        .successor(2)
                        .build(),
                ],
            )
            .section(
                10.0,
                vec![
                    LaneBuilder::new(1).width(3.0).predecessor(1).build(),
                    LaneBuilder::new(2).width(3.0).predecessor(2).build(),
                ],
            )
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        let findings = check(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].lane_id, Some(2));
        assert_eq!(findings[0].s_offset, Some(10.0));
    }
}
