//! Every junction id referenced by a road exists.

use crate::context::CheckContext;
use xodrqc_kernel::{ElementType, Finding};

pub const RULE_ID: &str = "junction_id_exists";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    for road in ctx.map.roads() {
        if let Some(junction_id) = road.junction.as_deref() {
            if !ctx.map.has_junction(junction_id) {
                findings.push(
                    ctx.finding(
                        RULE_ID,
                        format!("road {} belongs to missing junction {junction_id}", road.id),
                    )
                    .with_road(road.id.as_str()),
                );
            }
        }
    }

    for link in ctx.graph.unresolved() {
        if link.element_type != ElementType::Junction {
            continue;
        }
        findings.push(
            ctx.finding(
                RULE_ID,
                format!(
                    "{} junction {} of road {} does not exist",
                    link.tag.as_str(),
                    link.element_id,
                    link.road_id
                ),
            )
            .with_road(link.road_id),
        );
    }

    findings
}
