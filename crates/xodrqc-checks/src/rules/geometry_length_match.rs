//! Declared geometry lengths agree with each other and with the integrated
//! curve lengths.

use crate::context::CheckContext;
use xodrqc_kernel::Finding;
use xodrqc_kernel::geometry::arc_length;

pub const RULE_ID: &str = "geometry_length_match";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let thresholds = ctx.thresholds();
    let tolerance = |length: f64| {
        thresholds.length_absolute_tolerance + thresholds.length_relative_tolerance * length.abs()
    };
    let mut findings = Vec::new();

    for road in ctx.map.roads() {
        if road.plan_view.is_empty() {
            tracing::debug!(road = %road.id, "no plan view, length match skipped");
            continue;
        }

        for pair in road.plan_view.windows(2) {
            let expected = pair[0].s + pair[0].length;
            if (pair[1].s - expected).abs() > tolerance(pair[1].s) {
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "geometry of road {} starts at s={} but the previous one ends at s={expected}",
                            road.id, pair[1].s
                        ),
                    )
                    .with_road(road.id.as_str())
                    .with_s_offset(pair[1].s),
                );
            }
        }

        let total: f64 = road.plan_view.iter().map(|segment| segment.length).sum();
        if (total - road.length).abs() > tolerance(road.length) {
            findings.push(
                ctx.finding(
                    RULE_ID,
                    format!(
                        "geometry lengths of road {} sum to {total}, road length is {}",
                        road.id, road.length
                    ),
                )
                .with_road(road.id.as_str()),
            );
        }

        for segment in &road.plan_view {
            let measured = arc_length(segment, ctx.geometry());
            if (measured.length - segment.length).abs() <= tolerance(segment.length) {
                continue;
            }
            let finding = ctx
                .finding(
                    RULE_ID,
                    format!(
                        "{} geometry of road {} declares length {} but integrates to {:.6}",
                        segment.kind.name(),
                        road.id,
                        segment.length,
                        measured.length
                    ),
                )
                .with_road(road.id.as_str())
                .with_s_offset(segment.s);
            findings.push(if measured.converged {
                finding
            } else {
                finding.low_confidence()
            });
        }
    }
    findings
}
