//! Access records of a lane that start at the same offset share one rule.

use crate::context::CheckContext;
use xodrqc_kernel::lanes::road_lanes;
use xodrqc_kernel::{AccessRule, Finding, LaneAccess};

pub const RULE_ID: &str = "lane_access_no_mix_of_deny_or_allow";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for road in ctx.map.roads() {
        for (lane_ref, lane) in road_lanes(road) {
            if lane.access.len() < 2 {
                continue;
            }
            let mut records: Vec<&LaneAccess> = lane.access.iter().collect();
            records.sort_by(|a, b| a.s_offset.total_cmp(&b.s_offset));
            for group in records.chunk_by(|a, b| a.s_offset == b.s_offset) {
                let allows = group.iter().any(|r| r.rule == AccessRule::Allow);
                let denies = group.iter().any(|r| r.rule == AccessRule::Deny);
                if !(allows && denies) {
                    continue;
                }
                let s_start = ctx
                    .topology
                    .span(lane_ref.road_id, lane_ref.section)
                    .map(|span| span.s_start)
                    .unwrap_or(0.0);
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "lane {} of road {} section {} mixes allow and deny access at sOffset {}",
                            lane.id, road.id, lane_ref.section, group[0].s_offset
                        ),
                    )
                    .with_road(road.id.as_str())
                    .with_lane(lane.id)
                    .with_s_offset(s_start + group[0].s_offset),
                );
            }
        }
    }
    findings
}
