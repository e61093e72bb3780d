//! Shared walk of junction connections for the two contact-point linkage rules.

use crate::context::CheckContext;
use xodrqc_kernel::{ContactPoint, ElementType, Finding, LinkageTag};

/// Flag connections with the given contact point whose connecting road links
/// somewhere other than the incoming road through `tag`. Connecting roads
/// without a `tag` link are skipped.
pub(super) fn check_contact_linkage(
    ctx: &CheckContext<'_>,
    rule_id: &str,
    contact: ContactPoint,
    tag: LinkageTag,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for junction in ctx.map.junctions() {
        for (index, connection) in junction.connections.iter().enumerate() {
            if connection.contact_point != Some(contact) {
                continue;
            }
            let Some(connecting) = ctx.map.road(&connection.connecting_road) else {
                continue;
            };
            // A connecting road without that link says nothing either way.
            let Some(link) = connecting.link(tag) else {
                continue;
            };
            if link.element_type == ElementType::Road && link.element_id == connection.incoming_road
            {
                continue;
            }
            findings.push(
                ctx.finding(
                    rule_id,
                    format!(
                        "connection {index} of junction {} has contact point {}, but the {} of connecting road {} is {} {}, not incoming road {}",
                        junction.id,
                        contact.as_str(),
                        tag.as_str(),
                        connecting.id,
                        link.element_type.as_str(),
                        link.element_id,
                        connection.incoming_road
                    ),
                )
                .with_junction(junction.id.as_str())
                .with_connection(index)
                .with_road(connecting.id.as_str()),
            );
        }
    }
    findings
}
