//! Within one junction a connecting road serves a single incoming road.

use crate::context::CheckContext;
use std::collections::BTreeMap;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "junctions_connection_one_connection_element";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for junction in ctx.map.junctions() {
        // connecting road -> (first connection index, its incoming road)
        let mut first_use: BTreeMap<&str, (usize, &str)> = BTreeMap::new();
        for (index, connection) in junction.connections.iter().enumerate() {
            let connecting = connection.connecting_road.as_str();
            let incoming = connection.incoming_road.as_str();
            match first_use.get(connecting) {
                None => {
                    first_use.insert(connecting, (index, incoming));
                }
                Some(&(first, first_incoming)) if first_incoming != incoming => {
                    findings.push(
                        ctx.finding(
                            RULE_ID,
                            format!(
                                "connecting road {connecting} of junction {} is used from incoming road {incoming} in connection {index} and from incoming road {first_incoming} in connection {first}",
                                junction.id
                            ),
                        )
                        .with_junction(junction.id.as_str())
                        .with_connection(index)
                        .with_road(connecting),
                    );
                }
                Some(_) => {}
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
    fn shared_connecting_road_is_flagged_once_per_extra_connection() {
        let base = toy::t_junction();
        let mut junctions = base.junctions().to_vec();
        junctions[0].connections[1].connecting_road = "100".to_string();
        junctions[0].connections.push(toy::connection(
            "2",
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
        assert_eq!(findings[0].connection_index, Some(1));
    }

    #[test]
    fn clean_junction_passes() {
        let map = toy::t_junction();
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        assert!(check(&ctx).is_empty());
    }
}
