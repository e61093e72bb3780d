//! Lane successor/predecessor links are mutual.
//!
//! A link to a lane that does not exist is a finding. A target lane with an
//! empty reciprocal list is tolerated; one that lists other lanes but not
//! the source is a finding naming the source lane.

use crate::context::CheckContext;
use xodrqc_kernel::lanes::road_lanes;
use xodrqc_kernel::{Finding, LinkageTag};

pub const RULE_ID: &str = "lane_link_symmetry";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for road in ctx.map.roads() {
        for (source, _) in road_lanes(road) {
            let s_start = ctx
                .topology
                .span(source.road_id, source.section)
                .map(|span| span.s_start)
                .unwrap_or(0.0);
            for tag in [LinkageTag::Predecessor, LinkageTag::Successor] {
                for linked in ctx.topology.linked_lanes(source, tag, &ctx.graph) {
                    let target = linked.target;
                    let message = match linked.lane {
                        None => format!(
                            "lane {} of road {} section {} names {} lane {} which does not exist in road {} section {}",
                            source.lane_id,
                            source.road_id,
                            source.section,
                            tag.as_str(),
                            target.lane_id,
                            target.road_id,
                            target.section
                        ),
                        Some(lane) => {
                            let reciprocal = lane.links(linked.reciprocal);
                            if reciprocal.is_empty() || reciprocal.contains(&source.lane_id) {
                                continue;
                            }
                            format!(
                                "lane {} of road {} section {} names {} lane {} of road {} section {}, whose {} links {:?} do not name it back",
                                source.lane_id,
                                source.road_id,
                                source.section,
                                tag.as_str(),
                                target.lane_id,
                                target.road_id,
                                target.section,
                                linked.reciprocal.as_str(),
                                reciprocal
                            )
                        }
                    };
                    findings.push(
                        ctx.finding(RULE_ID, message)
                            .with_road(source.road_id)
                            .with_lane(source.lane_id)
                            .with_s_offset(s_start),
                    );
                }
            }
        }
    }
    findings
}
