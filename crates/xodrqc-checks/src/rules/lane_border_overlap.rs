//! Outer lane borders never cross inside the borders of inner lanes.
//!
//! Each section is sampled at `border_samples` evenly spaced offsets. A lane
//! is reported once per section, at the first offset where its outer border
//! lies inside the farthest border reached by the lanes between it and the
//! center.

use crate::context::CheckContext;
use std::collections::BTreeSet;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "lane_border_overlap";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let samples = ctx.thresholds().border_samples.max(2);
    let epsilon = ctx.geometry().epsilon;
    let mut findings = Vec::new();

    for road in ctx.map.roads() {
        for section in 0..road.lane_sections.len() {
            let Some(span) = ctx.topology.span(&road.id, section) else {
                continue;
            };
            let length = span.length();
            let offsets: Vec<f64> = if length > 0.0 {
                (0..samples)
                    .map(|i| length * i as f64 / (samples - 1) as f64)
                    .collect()
            } else {
                vec![0.0]
            };

            let mut reported: BTreeSet<i32> = BTreeSet::new();
            for ds in offsets {
                let mut reach = [0.0_f64, 0.0_f64];
                for boundary in ctx.topology.boundaries(&road.id, section, ds) {
                    let (side, sign) = if boundary.lane_id > 0 {
                        (0, 1.0)
                    } else {
                        (1, -1.0)
                    };
                    let outer = sign * boundary.outer;
                    if outer < reach[side] - epsilon && reported.insert(boundary.lane_id) {
                        findings.push(
                            ctx.finding(
                                RULE_ID,
                                format!(
                                    "outer border of lane {} on road {} section {section} crosses an inner border by {:.6} m",
                                    boundary.lane_id,
                                    road.id,
                                    reach[side] - outer
                                ),
                            )
                            .with_road(road.id.as_str())
                            .with_lane(boundary.lane_id)
                            .with_s_offset(span.s_start + ds),
                        );
                    }
                    reach[side] = reach[side].max(outer);
                }
            }
        }
    }
    findings
}
