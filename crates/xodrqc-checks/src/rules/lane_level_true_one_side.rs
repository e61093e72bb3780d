//! Walking outward from the center, once a lane is level every lane beyond
//! it is level too.

use crate::context::CheckContext;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "lane_level_true_one_side";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for road in ctx.map.roads() {
        for (section_idx, section) in road.lane_sections.iter().enumerate() {
            for left in [true, false] {
                let mut level_lane: Option<i32> = None;
                for lane in section.side_outward(left) {
                    match (level_lane, lane.level) {
                        (_, true) => level_lane = level_lane.or(Some(lane.id)),
                        (Some(inner), false) => findings.push(
                            ctx.finding(
                                RULE_ID,
                                format!(
                                    "lane {} of road {} section {section_idx} is not level but lies outside level lane {inner}",
                                    lane.id, road.id
                                ),
                            )
                            .with_road(road.id.as_str())
                            .with_lane(lane.id)
                            .with_s_offset(section.s),
                        ),
                        (None, false) => {}
                    }
                }
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::OpenDriveMap;
    use xodrqc_kernel::toy::{LaneBuilder, RoadBuilder};

    #[test]
    fn unlevel_lane_outside_level_lane_is_flagged() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 10.0)
            .section(
                0.0,
                vec![
                    LaneBuilder::new(1).width(3.0).build(),
                    LaneBuilder::new(2).width(3.0).level(true).build(),
                    LaneBuilder::new(-1).width(3.0).level(true).build(),
                    LaneBuilder::new(-2).width(3.0).build(),
                    LaneBuilder::new(-3).width(3.0).build(),
                ],
            )
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        let lanes: Vec<Option<i32>> = check(&ctx).iter().map(|f| f.lane_id).collect();
        assert_eq!(lanes, vec![Some(-2), Some(-3)]);
    }
}
