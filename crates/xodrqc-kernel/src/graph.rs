//! Road Graph: resolved predecessor/successor links between road ends.
//!
//! Built by one pass over the map. A link whose target id does not exist is
//! kept as [`Endpoint::Unresolved`] so existence rules can report it while
//! every other rule simply pattern-matches past it.

use crate::model::{Connection, ContactPoint, ElementType, LinkageTag, OpenDriveMap, Road};
use std::collections::{BTreeMap, BTreeSet};

/// Resolution of one road end's link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Road { id: String, contact: ContactPoint },
    Junction { id: String },
    Unresolved { element_type: ElementType, element_id: String },
}

impl Endpoint {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Endpoint::Unresolved { .. })
    }
}

/// One end of one road.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoadEnd {
    pub road_id: String,
    pub end: ContactPoint,
}

impl RoadEnd {
    pub fn new(road_id: impl Into<String>, end: ContactPoint) -> Self {
        Self {
            road_id: road_id.into(),
            end,
        }
    }
}

/// A road link whose target is missing from the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLink<'m> {
    pub road_id: &'m str,
    pub tag: LinkageTag,
    pub element_type: ElementType,
    pub element_id: &'m str,
}

/// Contact point assumed when a road-to-road link omits it.
pub fn default_contact(tag: LinkageTag) -> ContactPoint {
    match tag {
        LinkageTag::Successor => ContactPoint::Start,
        LinkageTag::Predecessor => ContactPoint::End,
    }
}

#[derive(Debug, Clone)]
pub struct RoadGraph<'m> {
    map: &'m OpenDriveMap,
    links: BTreeMap<RoadEnd, Endpoint>,
    incoming: BTreeMap<RoadEnd, Vec<RoadEnd>>,
    /// Roads touching each junction: its connecting roads plus incoming roads.
    junction_roads: BTreeMap<&'m str, BTreeSet<&'m str>>,
}

impl<'m> RoadGraph<'m> {
    pub fn build(map: &'m OpenDriveMap) -> Self {
        let mut links = BTreeMap::new();
        let mut incoming: BTreeMap<RoadEnd, Vec<RoadEnd>> = BTreeMap::new();
        let mut junction_roads: BTreeMap<&'m str, BTreeSet<&'m str>> = BTreeMap::new();

        for road in map.roads() {
            for tag in [LinkageTag::Predecessor, LinkageTag::Successor] {
                let Some(link) = road.link(tag) else {
                    continue;
                };
                let source = RoadEnd::new(road.id.clone(), tag.road_end());
                let endpoint = match link.element_type {
                    ElementType::Road if map.has_road(&link.element_id) => Endpoint::Road {
                        id: link.element_id.clone(),
                        contact: link.contact_point.unwrap_or_else(|| default_contact(tag)),
                    },
                    ElementType::Junction if map.has_junction(&link.element_id) => {
                        Endpoint::Junction {
                            id: link.element_id.clone(),
                        }
                    }
                    element_type => Endpoint::Unresolved {
                        element_type,
                        element_id: link.element_id.clone(),
                    },
                };
                if let Endpoint::Road { id, contact } = &endpoint {
                    incoming
                        .entry(RoadEnd::new(id.clone(), *contact))
                        .or_default()
                        .push(source.clone());
                }
                if let (Endpoint::Junction { .. }, Some(junction)) =
                    (&endpoint, map.junction(&link.element_id))
                {
                    junction_roads
                        .entry(junction.id.as_str())
                        .or_default()
                        .insert(road.id.as_str());
                }
                // A duplicated road id keeps the links of its first declaration.
                links.entry(source).or_insert(endpoint);
            }

            if let Some(junction) = road.junction.as_deref().and_then(|id| map.junction(id)) {
                junction_roads
                    .entry(junction.id.as_str())
                    .or_default()
                    .insert(road.id.as_str());
            }
        }

        for junction in map.junctions() {
            let members = junction_roads.entry(junction.id.as_str()).or_default();
            for connection in &junction.connections {
                for id in [&connection.incoming_road, &connection.connecting_road] {
                    if map.has_road(id) {
                        members.insert(id.as_str());
                    }
                }
            }
        }

        Self {
            map,
            links,
            incoming,
            junction_roads,
        }
    }

    pub fn map(&self) -> &'m OpenDriveMap {
        self.map
    }

    /// Where the given road end leads. `None` when the road declares no link there.
    pub fn resolve(&self, road_id: &str, end: ContactPoint) -> Option<&Endpoint> {
        self.links.get(&RoadEnd::new(road_id, end))
    }

    pub fn resolve_tag(&self, road_id: &str, tag: LinkageTag) -> Option<&Endpoint> {
        self.resolve(road_id, tag.road_end())
    }

    /// The road directly linked at `end`, with the contact point on that road.
    pub fn linked_road(&self, road_id: &str, end: ContactPoint) -> Option<(&'m Road, ContactPoint)> {
        match self.resolve(road_id, end)? {
            Endpoint::Road { id, contact } => self.map.road(id).map(|road| (road, *contact)),
            _ => None,
        }
    }

    /// Every unresolved link in road declaration order.
    pub fn unresolved(&self) -> impl Iterator<Item = UnresolvedLink<'m>> + '_ {
        let map = self.map;
        map.roads().iter().flat_map(move |road| {
            [LinkageTag::Predecessor, LinkageTag::Successor]
                .into_iter()
                .filter_map(move |tag| {
                    let link = road.link(tag)?;
                    let known = match link.element_type {
                        ElementType::Road => map.has_road(&link.element_id),
                        ElementType::Junction => map.has_junction(&link.element_id),
                    };
                    (!known).then_some(UnresolvedLink {
                        road_id: road.id.as_str(),
                        tag,
                        element_type: link.element_type,
                        element_id: link.element_id.as_str(),
                    })
                })
        })
    }

    /// Road ends whose direct road link targets this road end.
    pub fn incoming(&self, road_id: &str, end: ContactPoint) -> &[RoadEnd] {
        self.incoming
            .get(&RoadEnd::new(road_id, end))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All targeted road ends with the road ends linking into them.
    pub fn incoming_links(&self) -> impl Iterator<Item = (&RoadEnd, &[RoadEnd])> {
        self.incoming
            .iter()
            .map(|(target, sources)| (target, sources.as_slice()))
    }

    pub fn junction_connections(&self, junction_id: &str) -> &'m [Connection] {
        self.map
            .junction(junction_id)
            .map(|junction| junction.connections.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the road is a connecting road of some junction.
    pub fn is_connecting_road(&self, road_id: &str) -> bool {
        self.map
            .road(road_id)
            .is_some_and(Road::is_connecting_road)
    }

    /// Direct road links in either direction plus roads sharing a junction.
    pub fn neighbors(&self, road_id: &str) -> BTreeSet<&'m str> {
        let mut out = BTreeSet::new();
        if !self.map.has_road(road_id) {
            return out;
        }

        for end in [ContactPoint::Start, ContactPoint::End] {
            if let Some((other, _)) = self.linked_road(road_id, end) {
                out.insert(other.id.as_str());
            }
            for source in self.incoming(road_id, end) {
                if let Some(other) = self.map.road(&source.road_id) {
                    out.insert(other.id.as_str());
                }
            }
        }
        for members in self.junction_roads.values() {
            if members.contains(road_id) {
                out.extend(members.iter().copied());
            }
        }

        out.remove(road_id);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoadLink;
    use crate::toy::{self, RoadBuilder};

    #[test]
    fn resolves_road_junction_and_dangling_links() {
        let map = OpenDriveMap::new(
            vec![
                RoadBuilder::new("1")
                    .line(0.0, 0.0, 0.0, 10.0)
                    .successor(RoadLink::road("2", ContactPoint::Start))
                    .predecessor(RoadLink::road("99", ContactPoint::End))
                    .build(),
                RoadBuilder::new("2")
                    .line(10.0, 0.0, 0.0, 10.0)
                    .predecessor(RoadLink::road("1", ContactPoint::End))
                    .successor(RoadLink::junction("7"))
                    .build(),
            ],
            vec![toy::junction("7", Vec::new())],
        );
        let graph = RoadGraph::build(&map);

        assert_eq!(
            graph.resolve("1", ContactPoint::End),
            Some(&Endpoint::Road {
                id: "2".to_string(),
                contact: ContactPoint::Start
            })
        );
        assert_eq!(
            graph.resolve("2", ContactPoint::End),
            Some(&Endpoint::Junction { id: "7".to_string() })
        );
        assert!(
            graph
                .resolve("1", ContactPoint::Start)
                .is_some_and(Endpoint::is_unresolved)
        );
        assert_eq!(graph.resolve("2", ContactPoint::Start).map(|e| e.is_unresolved()), Some(false));
        assert_eq!(graph.resolve("3", ContactPoint::Start), None);

        let unresolved: Vec<_> = graph.unresolved().collect();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].road_id, "1");
        assert_eq!(unresolved[0].element_id, "99");
    }

    #[test]
    fn missing_contact_point_defaults_by_tag() {
        let mut successor = RoadLink::road("2", ContactPoint::Start);
        successor.contact_point = None;
        let mut predecessor = RoadLink::road("3", ContactPoint::Start);
        predecessor.contact_point = None;
        let map = OpenDriveMap::new(
            vec![
                RoadBuilder::new("1")
                    .line(0.0, 0.0, 0.0, 1.0)
                    .successor(successor)
                    .predecessor(predecessor)
                    .build(),
                RoadBuilder::new("2").line(1.0, 0.0, 0.0, 1.0).build(),
                RoadBuilder::new("3").line(-1.0, 0.0, 0.0, 1.0).build(),
            ],
            Vec::new(),
        );
        let graph = RoadGraph::build(&map);
        assert_eq!(
            graph.linked_road("1", ContactPoint::End).map(|(r, c)| (r.id.as_str(), c)),
            Some(("2", ContactPoint::Start))
        );
        assert_eq!(
            graph.linked_road("1", ContactPoint::Start).map(|(r, c)| (r.id.as_str(), c)),
            Some(("3", ContactPoint::End))
        );
    }

    #[test]
    fn incoming_collects_every_source() {
        let map = OpenDriveMap::new(
            vec![
                RoadBuilder::new("1")
                    .line(0.0, 0.0, 0.0, 1.0)
                    .successor(RoadLink::road("3", ContactPoint::Start))
                    .build(),
                RoadBuilder::new("2")
                    .line(0.0, 1.0, 0.0, 1.0)
                    .successor(RoadLink::road("3", ContactPoint::Start))
                    .build(),
                RoadBuilder::new("3").line(1.0, 0.0, 0.0, 1.0).build(),
            ],
            Vec::new(),
        );
        let graph = RoadGraph::build(&map);
        let sources = graph.incoming("3", ContactPoint::Start);
        assert_eq!(
            sources,
            &[
                RoadEnd::new("1", ContactPoint::End),
                RoadEnd::new("2", ContactPoint::End)
            ]
        );
        assert!(graph.incoming("3", ContactPoint::End).is_empty());
    }

    #[test]
    fn neighbors_include_junction_members() {
        let map = toy::t_junction();
        let graph = RoadGraph::build(&map);
        let neighbors = graph.neighbors("1");
        assert!(neighbors.contains("2"));
        assert!(neighbors.contains("100"));
        assert!(!neighbors.contains("1"));
        assert!(graph.is_connecting_road("100"));
        assert!(!graph.is_connecting_road("1"));
        assert_eq!(graph.junction_connections("10").len(), 2);
        assert!(graph.junction_connections("nope").is_empty());
    }
}
