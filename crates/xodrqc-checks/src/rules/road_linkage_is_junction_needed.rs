//! A road end reached by direct links from several roads must be modelled
//! as a junction.

use crate::context::CheckContext;
use std::collections::BTreeSet;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "road_linkage_is_junction_needed";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (target, sources) in ctx.graph.incoming_links() {
        let linking: BTreeSet<&str> = sources
            .iter()
            .map(|source| source.road_id.as_str())
            .filter(|road_id| *road_id != target.road_id)
            .filter(|road_id| !ctx.graph.is_connecting_road(road_id))
            .collect();
        if linking.len() < 2 {
            continue;
        }
        let names: Vec<&str> = linking.into_iter().collect();
        findings.push(
            ctx.finding(
                RULE_ID,
                format!(
                    "{} of road {} is linked directly from roads {}; use a junction",
                    target.end.as_str(),
                    target.road_id,
                    names.join(", ")
                ),
            )
            .with_road(target.road_id.as_str()),
        );
    }
    findings
}
