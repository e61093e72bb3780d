//! Lane Topology Model: section spans, lane widths and lane-to-lane links.
//!
//! ```text
//! road ── sections[i] ── [s_start, s_end)
//!                           └─ lane ── width(ds) = piecewise cubic
//!                                  └─ successors / predecessors
//!                                        │ i+1 / i-1 on the same road
//!                                        └ or across the road link (contact point)
//! ```

use crate::graph::RoadGraph;
use crate::model::{ContactPoint, Lane, LaneSection, LinkageTag, OpenDriveMap, Road, piecewise_value};
use std::collections::BTreeMap;

/// Longitudinal extent of one lane section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionSpan {
    pub s_start: f64,
    pub s_end: f64,
}

impl SectionSpan {
    pub fn length(&self) -> f64 {
        (self.s_end - self.s_start).max(0.0)
    }
}

/// Address of a lane: road, section index, lane id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LaneRef<'m> {
    pub road_id: &'m str,
    pub section: usize,
    pub lane_id: i32,
}

/// Lateral extent of a lane at one offset, measured from the reference line
/// (positive to the left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneBoundary {
    pub lane_id: i32,
    pub inner: f64,
    pub outer: f64,
}

/// One lane named by a successor/predecessor link, located in the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkedLane<'m> {
    pub target: LaneRef<'m>,
    /// Link list on the target lane that should name the source lane back.
    /// Its road end is the end of the target section the link arrives at.
    pub reciprocal: LinkageTag,
    /// `None` when the target section has no lane with that id.
    pub lane: Option<&'m Lane>,
}

#[derive(Debug, Clone)]
pub struct LaneTopology<'m> {
    map: &'m OpenDriveMap,
    spans: BTreeMap<&'m str, Vec<SectionSpan>>,
}

impl<'m> LaneTopology<'m> {
    pub fn build(map: &'m OpenDriveMap) -> Self {
        let mut spans = BTreeMap::new();
        for road in map.roads() {
            spans
                .entry(road.id.as_str())
                .or_insert_with(|| section_spans(road));
        }
        Self { map, spans }
    }

    pub fn sections(&self, road_id: &str) -> &'m [LaneSection] {
        self.map
            .road(road_id)
            .map(|road| road.lane_sections.as_slice())
            .unwrap_or(&[])
    }

    pub fn span(&self, road_id: &str, section: usize) -> Option<SectionSpan> {
        self.spans.get(road_id)?.get(section).copied()
    }

    pub fn lane(&self, lane_ref: LaneRef<'_>) -> Option<&'m Lane> {
        self.sections(lane_ref.road_id)
            .get(lane_ref.section)?
            .lane(lane_ref.lane_id)
    }

    /// Width of a lane at `ds` past its section start, clamped at zero.
    ///
    /// Lanes described by borders take the distance between their outer
    /// border and the outer boundary of the next lane inward.
    pub fn width_at(&self, lane_ref: LaneRef<'_>, ds: f64) -> Option<f64> {
        let lane = self.lane(lane_ref)?;
        if !uses_borders(lane) {
            return Some(lane_width(lane, ds).max(0.0));
        }
        self.boundaries(lane_ref.road_id, lane_ref.section, ds)
            .into_iter()
            .find(|boundary| boundary.lane_id == lane_ref.lane_id)
            .map(|boundary| (boundary.outer - boundary.inner).abs().max(0.0))
    }

    pub fn width_at_start(&self, lane_ref: LaneRef<'_>) -> Option<f64> {
        self.width_at(lane_ref, 0.0)
    }

    pub fn width_at_end(&self, lane_ref: LaneRef<'_>) -> Option<f64> {
        let span = self.span(lane_ref.road_id, lane_ref.section)?;
        self.width_at(lane_ref, span.length())
    }

    /// Signed boundaries of every lane at `ds`, center outward per side,
    /// relative to the center lane (lane offset not applied).
    ///
    /// Width lanes accumulate raw widths, so a negative width shows up as an
    /// outer boundary that crosses its inner one. Border lanes place their
    /// outer boundary at the border value, measured outward from the center.
    pub fn boundaries(&self, road_id: &str, section: usize, ds: f64) -> Vec<LaneBoundary> {
        let Some(lanes) = self.sections(road_id).get(section) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (left, sign) in [(true, 1.0), (false, -1.0)] {
            let mut offset = 0.0;
            for lane in lanes.side_outward(left) {
                let outer = if uses_borders(lane) {
                    sign * piecewise_value(&lane.borders, ds).unwrap_or(0.0)
                } else {
                    offset + sign * lane_width(lane, ds)
                };
                out.push(LaneBoundary {
                    lane_id: lane.id,
                    inner: offset,
                    outer,
                });
                offset = outer;
            }
        }
        out
    }

    /// Lanes named by `lane_ref`'s `tag` links, located in the adjacent
    /// section or across the road link at that end.
    ///
    /// Links through a junction are carried by junction connections, not lane
    /// links, and yield nothing here. So do unresolved road links.
    pub fn linked_lanes(
        &self,
        lane_ref: LaneRef<'m>,
        tag: LinkageTag,
        graph: &RoadGraph<'m>,
    ) -> Vec<LinkedLane<'m>> {
        let Some(lane) = self.lane(lane_ref) else {
            return Vec::new();
        };
        let ids = lane.links(tag);
        if ids.is_empty() {
            return Vec::new();
        }

        let section_count = self.sections(lane_ref.road_id).len();
        let adjacent = match tag {
            LinkageTag::Successor if lane_ref.section + 1 < section_count => {
                Some(lane_ref.section + 1)
            }
            LinkageTag::Predecessor if lane_ref.section > 0 => Some(lane_ref.section - 1),
            _ => None,
        };

        let (road_id, section, reciprocal) = match adjacent {
            Some(section) => (lane_ref.road_id, section, opposite(tag)),
            None => {
                let Some((road, contact)) = graph.linked_road(lane_ref.road_id, tag.road_end())
                else {
                    return Vec::new();
                };
                let Some(section) = section_at_contact(road, contact) else {
                    return Vec::new();
                };
                (
                    road.id.as_str(),
                    section,
                    LinkageTag::from_road_end(contact),
                )
            }
        };

        ids.iter()
            .map(|&lane_id| {
                let target = LaneRef {
                    road_id,
                    section,
                    lane_id,
                };
                LinkedLane {
                    target,
                    reciprocal,
                    lane: self.lane(target),
                }
            })
            .collect()
    }
}

/// All lanes of a road in section order, left lanes before right lanes.
pub fn road_lanes(road: &Road) -> impl Iterator<Item = (LaneRef<'_>, &Lane)> {
    road.lane_sections
        .iter()
        .enumerate()
        .flat_map(move |(section, lanes)| {
            lanes.lanes().map(move |lane| {
                (
                    LaneRef {
                        road_id: road.id.as_str(),
                        section,
                        lane_id: lane.id,
                    },
                    lane,
                )
            })
        })
}

/// Raw (possibly negative) width polynomial value; lanes without width
/// records have zero width.
pub fn lane_width(lane: &Lane, ds: f64) -> f64 {
    piecewise_value(&lane.widths, ds).unwrap_or(0.0)
}

/// `<border>` records only count for lanes without `<width>` records.
fn uses_borders(lane: &Lane) -> bool {
    lane.widths.is_empty() && !lane.borders.is_empty()
}

/// Index of the lane section touching the given road end.
pub fn section_at_contact(road: &Road, contact: ContactPoint) -> Option<usize> {
    match contact {
        _ if road.lane_sections.is_empty() => None,
        ContactPoint::Start => Some(0),
        ContactPoint::End => Some(road.lane_sections.len() - 1),
    }
}

fn opposite(tag: LinkageTag) -> LinkageTag {
    match tag {
        LinkageTag::Predecessor => LinkageTag::Successor,
        LinkageTag::Successor => LinkageTag::Predecessor,
    }
}

fn section_spans(road: &Road) -> Vec<SectionSpan> {
    let sections = &road.lane_sections;
    sections
        .iter()
        .enumerate()
        .map(|(idx, section)| SectionSpan {
            s_start: section.s,
            s_end: sections
                .get(idx + 1)
                .map(|next| next.s)
                .unwrap_or(road.length),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoadLink;
    use crate::toy::{LaneBuilder, RoadBuilder};

    fn lane_ref(road_id: &str, section: usize, lane_id: i32) -> LaneRef<'_> {
        LaneRef {
            road_id,
            section,
            lane_id,
        }
    }

    #[test]
    fn spans_end_at_next_section_or_road_length() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 30.0)
            .section(0.0, vec![LaneBuilder::new(-1).width(3.0).build()])
            .section(12.0, vec![LaneBuilder::new(-1).width(3.0).build()])
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let topology = LaneTopology::build(&map);
        assert_eq!(
            topology.span("1", 0),
            Some(SectionSpan {
                s_start: 0.0,
                s_end: 12.0
            })
        );
        assert_eq!(topology.span("1", 1).map(|s| s.length()), Some(18.0));
        assert_eq!(topology.span("1", 2), None);
    }

    #[test]
    fn width_at_end_uses_section_length() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 10.0)
            .section(
                0.0,
                vec![LaneBuilder::new(-1).width_poly(3.0, -0.3, 0.0, 0.0).build()],
            )
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let topology = LaneTopology::build(&map);
        let lane = lane_ref("1", 0, -1);
        assert_eq!(topology.width_at_start(lane), Some(3.0));
        assert!(topology.width_at_end(lane).is_some_and(|w| w.abs() < 1e-12));
        assert_eq!(topology.width_at(lane_ref("1", 0, -7), 0.0), None);
    }

    #[test]
    fn boundaries_accumulate_outward_with_sign() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 10.0)
            .section(
                0.0,
                vec![
                    LaneBuilder::new(1).width(3.0).build(),
                    LaneBuilder::new(-2).width(2.0).build(),
                    LaneBuilder::new(-1).width(3.5).build(),
                ],
            )
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let topology = LaneTopology::build(&map);
        let bounds = topology.boundaries("1", 0, 5.0);
        assert_eq!(
            bounds,
            vec![
                LaneBoundary {
                    lane_id: 1,
                    inner: 0.0,
                    outer: 3.0
                },
                LaneBoundary {
                    lane_id: -1,
                    inner: 0.0,
                    outer: -3.5
                },
                LaneBoundary {
                    lane_id: -2,
                    inner: -3.5,
                    outer: -5.5
                },
            ]
        );
    }

    #[test]
    fn border_lanes_place_their_outer_boundary_directly() {
        use crate::model::Cubic;
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 10.0)
            .section(
                0.0,
                vec![
                    LaneBuilder::new(-1).width(3.0).build(),
                    LaneBuilder::new(-2)
                        .border_record(Cubic::new(0.0, 6.0, 0.1, 0.0, 0.0))
                        .build(),
                ],
            )
            .build();
        let map = OpenDriveMap::new(vec![road], Vec::new());
        let topology = LaneTopology::build(&map);
        let outer = topology
            .boundaries("1", 0, 5.0)
            .into_iter()
            .find(|b| b.lane_id == -2)
            .map(|b| (b.inner, b.outer));
        assert_eq!(outer, Some((-3.0, -6.5)));
        assert_eq!(topology.width_at(lane_ref("1", 0, -2), 5.0), Some(3.5));
        assert_eq!(topology.width_at(lane_ref("1", 0, -1), 5.0), Some(3.0));
    }

    #[test]
    fn linked_lanes_follow_sections_then_road_links() {
        let first = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 20.0)
            .successor(RoadLink::road("2", ContactPoint::End))
            .section(0.0, vec![LaneBuilder::new(-1).width(3.0).successor(-1).build()])
            .section(
                10.0,
                vec![
                    LaneBuilder::new(-1)
                        .width(3.0)
                        .predecessor(-1)
                        .successor(1)
                        .build(),
                ],
            )
            .build();
        let second = RoadBuilder::new("2")
            .line(40.0, 0.0, std::f64::consts::PI, 20.0)
            .successor(RoadLink::road("1", ContactPoint::End))
            .section(0.0, vec![LaneBuilder::new(1).width(3.0).successor(-1).build()])
            .build();
        let map = OpenDriveMap::new(vec![first, second], Vec::new());
        let graph = RoadGraph::build(&map);
        let topology = LaneTopology::build(&map);

        let within = topology.linked_lanes(lane_ref("1", 0, -1), LinkageTag::Successor, &graph);
        assert_eq!(within.len(), 1);
        assert_eq!(within[0].target, lane_ref("1", 1, -1));
        assert_eq!(within[0].reciprocal, LinkageTag::Predecessor);
        assert!(within[0].lane.is_some());

        let across = topology.linked_lanes(lane_ref("1", 1, -1), LinkageTag::Successor, &graph);
        assert_eq!(across.len(), 1);
        assert_eq!(across[0].target, lane_ref("2", 0, 1));
        assert_eq!(across[0].reciprocal, LinkageTag::Successor);

        let none = topology.linked_lanes(lane_ref("1", 0, -1), LinkageTag::Predecessor, &graph);
        assert!(none.is_empty());
    }
}
