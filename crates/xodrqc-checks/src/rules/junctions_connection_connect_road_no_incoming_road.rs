//! Connecting roads never act as the incoming road of a connection.

use crate::context::CheckContext;
use xodrqc_kernel::Finding;

pub const RULE_ID: &str = "junctions_connection_connect_road_no_incoming_road";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for junction in ctx.map.junctions() {
        for (index, connection) in junction.connections.iter().enumerate() {
            if !ctx.graph.is_connecting_road(&connection.incoming_road) {
                continue;
            }
            findings.push(
                ctx.finding(
                    RULE_ID,
                    format!(
                        "incoming road {} of junction {} connection {index} is itself a connecting road",
                        connection.incoming_road, junction.id
                    ),
                )
                .with_junction(junction.id.as_str())
                .with_connection(index)
                .with_road(connection.incoming_road.as_str()),
            );
        }
    }
    findings
}
