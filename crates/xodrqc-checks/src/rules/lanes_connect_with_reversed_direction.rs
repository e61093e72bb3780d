//! Connected lanes keep their travel direction.
//!
//! Lanes on opposite sides of their reference lines travel in opposite
//! directions, so a lane link may switch sides only where the reference
//! lines themselves flip orientation. Orientation comes from the contact
//! point; when the contact point is missing, the end of the target road
//! closest to the linked end decides.
//!
//! Each lane is followed in its direction of travel only: right lanes
//! through the successor link, left lanes through the predecessor link.

use crate::context::CheckContext;
use xodrqc_kernel::geometry::{end_pose, pose_at_contact, start_pose};
use xodrqc_kernel::lanes::section_at_contact;
use xodrqc_kernel::{ContactPoint, Endpoint, Finding, KernelError, Lane, LinkageTag, Road};

pub const RULE_ID: &str = "lanes_connect_with_reversed_direction";

/// Where the lanes leaving one road end arrive.
struct Arrival<'m> {
    road: &'m Road,
    contact: ContactPoint,
    junction: Option<(&'m str, usize)>,
}

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for road in ctx.map.roads() {
        let Some(last) = road.lane_sections.len().checked_sub(1) else {
            continue;
        };
        for tag in [LinkageTag::Successor, LinkageTag::Predecessor] {
            let Some(link) = road.link(tag) else {
                continue;
            };
            let lanes = match tag {
                LinkageTag::Successor => road.lane_sections[last].side_outward(false),
                LinkageTag::Predecessor => road.lane_sections[0].side_outward(true),
            };
            if lanes.is_empty() {
                continue;
            }

            match ctx.graph.resolve_tag(&road.id, tag) {
                Some(Endpoint::Road { id, contact }) => {
                    let Some(other) = ctx.map.road(id) else {
                        continue;
                    };
                    let contact = match link.contact_point {
                        Some(_) => *contact,
                        None => match closest_end(ctx, road, tag.road_end(), other) {
                            Ok(contact) => contact,
                            Err(err) => {
                                findings.push(ctx.evaluation_failure(RULE_ID, &road.id, &err));
                                continue;
                            }
                        },
                    };
                    let arrival = Arrival {
                        road: other,
                        contact,
                        junction: None,
                    };
                    for lane in &lanes {
                        for &to in lane.links(tag) {
                            check_pair(ctx, road, tag, lane, to, &arrival, &mut findings);
                        }
                    }
                }
                Some(Endpoint::Junction { id }) => {
                    let connections = ctx.graph.junction_connections(id);
                    for (index, connection) in connections.iter().enumerate() {
                        if connection.incoming_road != road.id {
                            continue;
                        }
                        let Some(connecting) = ctx.map.road(&connection.connecting_road) else {
                            continue;
                        };
                        let contact = match connection.contact_point {
                            Some(contact) => contact,
                            None => match closest_end(ctx, road, tag.road_end(), connecting) {
                                Ok(contact) => contact,
                                Err(err) => {
                                    findings
                                        .push(ctx.evaluation_failure(RULE_ID, &road.id, &err));
                                    continue;
                                }
                            },
                        };
                        let arrival = Arrival {
                            road: connecting,
                            contact,
                            junction: Some((id.as_str(), index)),
                        };
                        for lane in &lanes {
                            let targets = connection
                                .lane_links
                                .iter()
                                .filter(|lane_link| lane_link.from == lane.id);
                            for lane_link in targets {
                                check_pair(
                                    ctx,
                                    road,
                                    tag,
                                    lane,
                                    lane_link.to,
                                    &arrival,
                                    &mut findings,
                                );
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    findings
}

fn check_pair(
    ctx: &CheckContext<'_>,
    road: &Road,
    tag: LinkageTag,
    lane: &Lane,
    to: i32,
    arrival: &Arrival<'_>,
    findings: &mut Vec<Finding>,
) {
    let target_exists = section_at_contact(arrival.road, arrival.contact)
        .and_then(|section| arrival.road.lane_sections[section].lane(to))
        .is_some();
    if !target_exists {
        return;
    }
    let reversed = tag.road_end() == arrival.contact;
    let switches_side = (lane.id > 0) != (to > 0);
    if switches_side == reversed {
        return;
    }

    let s = match tag.road_end() {
        ContactPoint::Start => 0.0,
        ContactPoint::End => road.length,
    };
    let orientation = if reversed {
        "opposite reference lines"
    } else {
        "aligned reference lines"
    };
    let mut finding = ctx
        .finding(
            RULE_ID,
            format!(
                "lane {} of road {} continues as lane {to} of road {} ({}) across {orientation} and reverses travel direction",
                lane.id,
                road.id,
                arrival.road.id,
                arrival.contact.as_str()
            ),
        )
        .with_road(road.id.as_str())
        .with_lane(lane.id)
        .with_s_offset(s);
    if let Some((junction_id, index)) = arrival.junction {
        finding = finding.with_junction(junction_id).with_connection(index);
    }
    findings.push(finding);
}

/// End of `other` nearest to the `end` of `road`.
fn closest_end(
    ctx: &CheckContext<'_>,
    road: &Road,
    end: ContactPoint,
    other: &Road,
) -> Result<ContactPoint, KernelError> {
    let config = ctx.geometry();
    let here = pose_at_contact(road, end, config)?.position();
    let to_start = here.distance(&start_pose(other, config)?.position());
    let to_end = here.distance(&end_pose(other, config)?.position());
    Ok(if to_start <= to_end {
        ContactPoint::Start
    } else {
        ContactPoint::End
    })
}
