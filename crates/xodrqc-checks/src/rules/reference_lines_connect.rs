//! Directly linked roads have reference lines that meet at the linked ends.
//!
//! Links through junctions and links touching connecting roads are exempt.

use crate::context::CheckContext;
use std::collections::BTreeSet;
use xodrqc_kernel::geometry::pose_at_contact;
use xodrqc_kernel::{ContactPoint, Endpoint, Finding, RoadEnd};

pub const RULE_ID: &str = "reference_lines_connect";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let threshold = ctx.thresholds().reference_line_gap;
    let mut seen: BTreeSet<(RoadEnd, RoadEnd)> = BTreeSet::new();
    let mut findings = Vec::new();

    for road in ctx.map.roads() {
        if road.is_connecting_road() {
            continue;
        }
        for end in [ContactPoint::Start, ContactPoint::End] {
            let Some(Endpoint::Road { id, contact }) = ctx.graph.resolve(&road.id, end) else {
                continue;
            };
            let Some(other) = ctx.map.road(id) else {
                continue;
            };
            if other.is_connecting_road() {
                continue;
            }

            let here = RoadEnd::new(road.id.as_str(), end);
            let there = RoadEnd::new(other.id.as_str(), *contact);
            let pair = if here <= there {
                (here, there)
            } else {
                (there, here)
            };
            if !seen.insert(pair) {
                continue;
            }

            let a = match pose_at_contact(road, end, ctx.geometry()) {
                Ok(pose) => pose,
                Err(err) => {
                    findings.push(ctx.evaluation_failure(RULE_ID, &road.id, &err));
                    continue;
                }
            };
            let b = match pose_at_contact(other, *contact, ctx.geometry()) {
                Ok(pose) => pose,
                Err(err) => {
                    findings.push(ctx.evaluation_failure(RULE_ID, &other.id, &err));
                    continue;
                }
            };
            let gap = a.position().distance(&b.position());
            if gap > threshold {
                let s = match end {
                    ContactPoint::Start => 0.0,
                    ContactPoint::End => road.length,
                };
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "reference line of road {} ({}) is {gap:.6} m from road {} ({}), limit {threshold}",
                            road.id,
                            end.as_str(),
                            other.id,
                            contact.as_str()
                        ),
                    )
                    .with_road(road.id.as_str())
                    .with_s_offset(s),
                );
            }
        }
    }
    findings
}
