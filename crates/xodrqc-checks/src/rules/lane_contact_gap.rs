//! Lanes linked across a contact point leave no horizontal gap.
//!
//! Both boundary points of a lane at its road end (inner and outer, with the
//! road's lane offset applied) must coincide with those of every lane it is
//! linked to on the neighboring road. Pairs come from lane links across road
//! links and from junction connection lane links; each pair is judged once.

use crate::context::CheckContext;
use std::collections::BTreeSet;
use xodrqc_kernel::geometry::{Point2, evaluate};
use xodrqc_kernel::lanes::{LaneRef, section_at_contact};
use xodrqc_kernel::{ContactPoint, Endpoint, Finding, KernelError, LinkageTag, Road};

pub const RULE_ID: &str = "lane_contact_gap";

/// A lane at one end of its road.
#[derive(Debug, Clone, Copy)]
struct LaneEnd<'m> {
    road: &'m Road,
    section: usize,
    lane_id: i32,
    end: ContactPoint,
}

type LaneKey<'m> = (&'m str, usize, i32, ContactPoint);

impl<'m> LaneEnd<'m> {
    fn key(&self) -> LaneKey<'m> {
        (self.road.id.as_str(), self.section, self.lane_id, self.end)
    }
}

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen = BTreeSet::new();

    for junction in ctx.map.junctions() {
        for (index, connection) in junction.connections.iter().enumerate() {
            let (Some(incoming), Some(connecting)) = (
                ctx.map.road(&connection.incoming_road),
                ctx.map.road(&connection.connecting_road),
            ) else {
                continue;
            };
            let Some(contact) = connection.contact_point else {
                continue;
            };
            let Some(incoming_end) = end_into_junction(ctx, incoming, &junction.id) else {
                continue;
            };
            let (Some(from_section), Some(to_section)) = (
                section_at_contact(incoming, incoming_end),
                section_at_contact(connecting, contact),
            ) else {
                continue;
            };
            for lane_link in &connection.lane_links {
                let from = LaneEnd {
                    road: incoming,
                    section: from_section,
                    lane_id: lane_link.from,
                    end: incoming_end,
                };
                let to = LaneEnd {
                    road: connecting,
                    section: to_section,
                    lane_id: lane_link.to,
                    end: contact,
                };
                if let Some(finding) = judge(ctx, from, to, &mut seen) {
                    findings.push(
                        finding
                            .with_junction(junction.id.as_str())
                            .with_connection(index),
                    );
                }
            }
        }
    }

    for road in ctx.map.roads() {
        for tag in [LinkageTag::Predecessor, LinkageTag::Successor] {
            let end = tag.road_end();
            let Some(section) = section_at_contact(road, end) else {
                continue;
            };
            for lane in road.lane_sections[section].lanes() {
                let lane_ref = LaneRef {
                    road_id: road.id.as_str(),
                    section,
                    lane_id: lane.id,
                };
                for linked in ctx.topology.linked_lanes(lane_ref, tag, &ctx.graph) {
                    if linked.lane.is_none() || linked.target.road_id == road.id {
                        continue;
                    }
                    let Some(target) = ctx.map.road(linked.target.road_id) else {
                        continue;
                    };
                    let from = LaneEnd {
                        road,
                        section,
                        lane_id: lane.id,
                        end,
                    };
                    let to = LaneEnd {
                        road: target,
                        section: linked.target.section,
                        lane_id: linked.target.lane_id,
                        end: linked.reciprocal.road_end(),
                    };
                    if let Some(finding) = judge(ctx, from, to, &mut seen) {
                        findings.push(finding);
                    }
                }
            }
        }
    }
    findings
}

/// End of `road` whose link resolves into `junction_id`.
fn end_into_junction(
    ctx: &CheckContext<'_>,
    road: &Road,
    junction_id: &str,
) -> Option<ContactPoint> {
    [ContactPoint::Start, ContactPoint::End]
        .into_iter()
        .find(|&end| {
            matches!(
                ctx.graph.resolve(&road.id, end),
                Some(Endpoint::Junction { id }) if id == junction_id
            )
        })
}

fn judge<'m>(
    ctx: &CheckContext<'_>,
    from: LaneEnd<'m>,
    to: LaneEnd<'m>,
    seen: &mut BTreeSet<(LaneKey<'m>, LaneKey<'m>)>,
) -> Option<Finding> {
    let pair = if from.key() <= to.key() {
        (from.key(), to.key())
    } else {
        (to.key(), from.key())
    };
    if !seen.insert(pair) {
        return None;
    }

    let here = match boundary_points(ctx, from) {
        Ok(points) => points?,
        Err(err) => return Some(ctx.evaluation_failure(RULE_ID, &from.road.id, &err)),
    };
    let there = match boundary_points(ctx, to) {
        Ok(points) => points?,
        Err(err) => return Some(ctx.evaluation_failure(RULE_ID, &to.road.id, &err)),
    };
    let gap = here.0.distance(&there.0).max(here.1.distance(&there.1));
    if gap <= ctx.thresholds().lane_contact_gap {
        return None;
    }

    let s = here.2;
    Some(
        ctx.finding(
            RULE_ID,
            format!(
                "lane {} of road {} ({}) and lane {} of road {} ({}) are {gap:.3} m apart at their contact point",
                from.lane_id,
                from.road.id,
                from.end.as_str(),
                to.lane_id,
                to.road.id,
                to.end.as_str()
            ),
        )
        .with_road(from.road.id.as_str())
        .with_lane(from.lane_id)
        .with_s_offset(s),
    )
}

/// Inner and outer boundary points of a lane at its road end, plus the arc
/// length they sit at. `None` when the lane is not in the section.
fn boundary_points(
    ctx: &CheckContext<'_>,
    lane: LaneEnd<'_>,
) -> Result<Option<(Point2, Point2, f64)>, KernelError> {
    let road_id = lane.road.id.as_str();
    let Some(span) = ctx.topology.span(road_id, lane.section) else {
        return Ok(None);
    };
    let s = match lane.end {
        ContactPoint::Start => span.s_start,
        ContactPoint::End => span.s_end,
    };
    let ds = s - span.s_start;
    let Some(boundary) = ctx
        .topology
        .boundaries(road_id, lane.section, ds)
        .into_iter()
        .find(|boundary| boundary.lane_id == lane.lane_id)
    else {
        return Ok(None);
    };

    let pose = evaluate(lane.road, s, ctx.geometry())?;
    let offset = lane.road.lane_offset_at(s);
    let (sin, cos) = pose.heading.sin_cos();
    let lateral = |t: f64| Point2::new(pose.x - t * sin, pose.y + t * cos);
    Ok(Some((
        lateral(offset + boundary.inner),
        lateral(offset + boundary.outer),
        s,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::toy;
    use xodrqc_kernel::{Cubic, OpenDriveMap};

    fn run(map: &OpenDriveMap) -> Vec<Finding> {
        let config = CheckConfig::default();
        let ctx = CheckContext::build(map, &config);
        check(&ctx)
    }

    #[test]
    fn aligned_lanes_pass() {
        assert!(run(&toy::straight_pair(0.0)).is_empty());
        assert!(run(&toy::t_junction()).is_empty());
    }

    #[test]
    fn gap_between_linked_roads_is_reported_once() {
        let findings = run(&toy::straight_pair(0.5));
        assert_eq!(findings.len(), 1, "{findings:?}");
        assert_eq!(findings[0].road_id.as_deref(), Some("1"));
        assert_eq!(findings[0].lane_id, Some(-1));
        assert_eq!(findings[0].s_offset, Some(10.0));
        assert!(!findings[0].low_confidence);
    }

    #[test]
    fn lane_offset_shifts_the_boundaries() {
        let base = toy::straight_pair(0.0);
        let mut roads = base.roads().to_vec();
        roads[1].lane_offsets.push(Cubic {
            s: 0.0,
            a: 0.5,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        });
        let findings = run(&OpenDriveMap::new(roads, Vec::new()));
        assert_eq!(findings.len(), 1, "{findings:?}");
        assert_eq!(findings[0].road_id.as_deref(), Some("1"));
        assert!(findings[0].message.contains("0.500 m apart"));
    }

    #[test]
    fn junction_lane_link_to_the_wrong_side_is_reported() {
        let base = toy::t_junction();
        let mut junctions = base.junctions().to_vec();
        junctions[0].connections[0].lane_links[0].from = 1;
        let map = OpenDriveMap::new(base.roads().to_vec(), junctions);
        let findings = run(&map);
        assert_eq!(findings.len(), 1, "{findings:?}");
        assert_eq!(findings[0].road_id.as_deref(), Some("1"));
        assert_eq!(findings[0].lane_id, Some(1));
        assert_eq!(findings[0].s_offset, Some(50.0));
        assert_eq!(findings[0].junction_id.as_deref(), Some("10"));
        assert_eq!(findings[0].connection_index, Some(0));
    }

    #[test]
    fn gaps_within_tolerance_pass() {
        let config = CheckConfig::from_toml_str("[thresholds]\nlane_contact_gap = 1.0\n")
            .expect("config parses");
        let map = toy::straight_pair(0.5);
        let ctx = CheckContext::build(&map, &config);
        assert!(check(&ctx).is_empty());
    }
}
