//! Every road id referenced by a road link or a junction connection exists.

use crate::context::CheckContext;
use xodrqc_kernel::{ElementType, Finding};

pub const RULE_ID: &str = "road_id_exists";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    for link in ctx.graph.unresolved() {
        if link.element_type != ElementType::Road {
            continue;
        }
        findings.push(
            ctx.finding(
                RULE_ID,
                format!(
                    "{} road {} of road {} does not exist",
                    link.tag.as_str(),
                    link.element_id,
                    link.road_id
                ),
            )
            .with_road(link.road_id),
        );
    }

    for junction in ctx.map.junctions() {
        for (index, connection) in junction.connections.iter().enumerate() {
            for (role, road_id) in [
                ("incoming", &connection.incoming_road),
                ("connecting", &connection.connecting_road),
            ] {
                if ctx.map.has_road(road_id) {
                    continue;
                }
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!(
                            "{role} road {road_id} of junction {} connection {index} does not exist",
                            junction.id
                        ),
                    )
                    .with_junction(junction.id.as_str())
                    .with_connection(index),
                );
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::model::{ContactPoint, OpenDriveMap, RoadLink};
    use xodrqc_kernel::toy::{self, RoadBuilder};

    #[test]
    fn dangling_successor_yields_one_finding() {
        let map = OpenDriveMap::new(
            vec![
                RoadBuilder::new("1")
                    .line(0.0, 0.0, 0.0, 10.0)
                    .successor(RoadLink::road("42", ContactPoint::Start))
                    .build(),
            ],
            Vec::new(),
        );
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        let findings = check(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].road_id.as_deref(), Some("1"));
        assert!(findings[0].message.contains("42"));
    }

    #[test]
    fn dangling_connection_roads_are_reported_per_role() {
        let mut map = toy::t_junction();
        let mut junctions = map.junctions().to_vec();
        junctions[0].connections[1].incoming_road = "77".to_string();
        junctions[0].connections[1].connecting_road = "78".to_string();
        map = OpenDriveMap::new(map.roads().to_vec(), junctions);
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        let findings = check(&ctx);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.connection_index == Some(1)));
        assert!(findings.iter().all(|f| f.junction_id.as_deref() == Some("10")));
    }

    #[test]
    fn junction_links_are_not_road_references() {
        let map = OpenDriveMap::new(
            vec![
                RoadBuilder::new("1")
                    .line(0.0, 0.0, 0.0, 10.0)
                    .successor(RoadLink::junction("404"))
                    .build(),
            ],
            Vec::new(),
        );
        let config = CheckConfig::default();
        let ctx = CheckContext::build(&map, &config);
        assert!(check(&ctx).is_empty());
    }
}
