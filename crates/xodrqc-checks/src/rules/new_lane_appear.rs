//! When a lane appears beside a continuing lane, only the continuing lane
//! links back to the lane they both grow out of.
//!
//! Lanes of one section that name the same predecessor lane are claimants.
//! With more than one claimant the appearing lane is, in order of evidence:
//! the claimant starting with zero width, the claimant the predecessor does
//! not name back, or the claimant farther from the center.

use crate::context::CheckContext;
use std::collections::BTreeMap;
use xodrqc_kernel::lanes::road_lanes;
use xodrqc_kernel::{Finding, LaneRef, LinkageTag};

pub const RULE_ID: &str = "new_lane_appear";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let epsilon = ctx.geometry().epsilon;
    let mut findings = Vec::new();

    for road in ctx.map.roads() {
        // (claimant section, predecessor lane, its list naming us) -> claimants
        let mut claims: BTreeMap<(usize, LaneRef<'_>, LinkageTag), Vec<LaneRef<'_>>> =
            BTreeMap::new();
        for (lane_ref, lane) in road_lanes(road) {
            if lane.predecessors.is_empty() {
                continue;
            }
            for linked in ctx
                .topology
                .linked_lanes(lane_ref, LinkageTag::Predecessor, &ctx.graph)
            {
                if linked.lane.is_some() {
                    claims
                        .entry((lane_ref.section, linked.target, linked.reciprocal))
                        .or_default()
                        .push(lane_ref);
                }
            }
        }

        for ((_, target, reciprocal_tag), claimants) in claims {
            if claimants.len() < 2 {
                continue;
            }
            let zero_start: Vec<LaneRef<'_>> = claimants
                .iter()
                .copied()
                .filter(|claimant| {
                    ctx.topology
                        .width_at_start(*claimant)
                        .is_some_and(|width| width <= epsilon)
                })
                .collect();
            let appearing = if !zero_start.is_empty() {
                zero_start
            } else {
                let reciprocal = ctx
                    .topology
                    .lane(target)
                    .map(|lane| lane.links(reciprocal_tag))
                    .unwrap_or(&[]);
                let unnamed: Vec<LaneRef<'_>> = claimants
                    .iter()
                    .copied()
                    .filter(|claimant| !reciprocal.contains(&claimant.lane_id))
                    .collect();
                if !unnamed.is_empty() && unnamed.len() < claimants.len() {
                    unnamed
                } else {
                    let innermost = claimants
                        .iter()
                        .map(|claimant| claimant.lane_id.abs())
                        .min()
                        .unwrap_or(0);
                    claimants
                        .iter()
                        .copied()
                        .filter(|claimant| claimant.lane_id.abs() != innermost)
                        .collect()
                }
            };

            for lane_ref in appearing {
                let s = ctx
                    .topology
                    .span(lane_ref.road_id, lane_ref.section)
                    .map(|span| span.s_start)
                    .unwrap_or(0.0);
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "lane {} of road {} section {} appears beside a continuing lane but names lane {} of road {} as its predecessor",
                            lane_ref.lane_id,
                            lane_ref.road_id,
                            lane_ref.section,
                            target.lane_id,
                            target.road_id
                        ),
                    )
                    .with_road(lane_ref.road_id)
                    .with_lane(lane_ref.lane_id)
                    .with_s_offset(s),
                );
            }
        }
    }
    findings
}
