//! A lane that starts with zero width has no predecessor.

use crate::context::CheckContext;
use xodrqc_kernel::lanes::road_lanes;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "zero_width_at_start";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let epsilon = ctx.geometry().epsilon;
    let mut findings = Vec::new();
    for road in ctx.map.roads() {
        for (lane_ref, lane) in road_lanes(road) {
            if lane.predecessors.is_empty() {
                continue;
            }
            let Some(width) = ctx.topology.width_at_start(lane_ref) else {
                continue;
            };
            if width > epsilon {
                continue;
            }
            let s = ctx
                .topology
                .span(lane_ref.road_id, lane_ref.section)
                .map(|span| span.s_start)
                .unwrap_or(0.0);
            findings.push(
                ctx.finding(
                    RULE_ID,
                    format!(
                        "lane {} of road {} section {} starts with zero width but has predecessors {:?}",
                        lane.id, road.id, lane_ref.section, lane.predecessors
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
