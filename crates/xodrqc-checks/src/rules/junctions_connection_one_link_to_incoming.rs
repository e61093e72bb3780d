//! An incoming/connecting road pair is described by one connection.

use crate::context::CheckContext;
use std::collections::BTreeMap;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "junctions_connection_one_link_to_incoming";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for junction in ctx.map.junctions() {
        let mut seen: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for (index, connection) in junction.connections.iter().enumerate() {
            let pair = (
                connection.incoming_road.as_str(),
                connection.connecting_road.as_str(),
            );
            if let Some(&first) = seen.get(&pair) {
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "connection {index} of junction {} repeats incoming road {} to connecting road {} already declared by connection {first}",
                            junction.id, pair.0, pair.1
                        ),
                    )
                    .with_junction(junction.id.as_str())
                    .with_connection(index)
                    .with_road(pair.0),
                );
            } else {
                seen.insert(pair, index);
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::toy;
    use xodrqc_kernel::{ContactPoint, OpenDriveMap};

    #[test]
    fn duplicate_pair_is_flagged() {
        let base = toy::t_junction();
        let mut junctions = base.junctions().to_vec();
        junctions[0].connections.push(toy::connection(
            "9",
            "1",
            "100",
            ContactPoint::Start,
            &[(-1, -1)],
        ));
        let map = OpenDriveMap::new(base.roads().to_vec(), junctions);
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        let findings = check(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].connection_index, Some(2));
        assert_eq!(findings[0].road_id.as_deref(), Some("1"));
    }
}
