//! A junction joins at least two distinct incoming roads.

use crate::context::CheckContext;
use std::collections::BTreeSet;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "junctions_incoming_roads_number";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    ctx.map
        .junctions()
        .iter()
        .filter_map(|junction| {
            let incoming: BTreeSet<&str> = junction
                .connections
                .iter()
                .map(|connection| connection.incoming_road.as_str())
                .collect();
            (incoming.len() < 2).then(|| {
                ctx.finding(
                    RULE_ID,
                    format!(
                        "junction {} has {} distinct incoming road(s)",
                        junction.id,
                        incoming.len()
                    ),
                )
                .with_junction(junction.id.as_str())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::toy;
    use xodrqc_kernel::{ContactPoint, OpenDriveMap, Severity};

    #[test]
    fn single_incoming_road_is_informational() {
        let map = OpenDriveMap::new(
            Vec::new(),
            vec![
                toy::junction(
                    "1",
                    vec![
                        toy::connection("0", "5", "6", ContactPoint::Start, &[]),
                        toy::connection("1", "5", "7", ContactPoint::Start, &[]),
                    ],
                ),
                toy::junction("2", Vec::new()),
            ],
        );
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        let findings = check(&ctx);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::Info));
        assert_eq!(findings[1].junction_id.as_deref(), Some("2"));
    }

    #[test]
    fn t_junction_has_two_incoming_roads() {
        let map = toy::t_junction();
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        assert!(check(&ctx).is_empty());
    }
}
