//! Small hand-built road networks for tests.
//!
//! [`RoadBuilder`] chains plan-view segments: every segment after the first
//! starts at the end pose of the previous one, so builders produce
//! geometrically continuous reference lines unless told otherwise.
//!
//! ## Worlds
//!
//! - **straight_pair(gap)**: two collinear roads `1 → 2` linked end-to-start,
//!   with road 2 shifted along x by `gap`.
//! - **t_junction()**: incoming roads `1` and `2` joined through junction `10`
//!   by connecting roads `100` (1 → 2) and `101` (2 → 1). Clean by every rule.

use crate::geometry::{GeometryConfig, evaluate_segment};
use crate::model::{
    AccessRule, Connection, ContactPoint, Cubic, GeometryKind, GeometrySegment, Junction, Lane,
    LaneAccess, LaneLink, LaneSection, OpenDriveMap, Road, RoadLink,
};
use std::f64::consts::PI;

pub const LANE_WIDTH: f64 = 3.5;

#[derive(Debug, Clone)]
pub struct RoadBuilder {
    road: Road,
    length_override: Option<f64>,
}

impl RoadBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            road: Road {
                id: id.to_string(),
                name: None,
                length: 0.0,
                junction: None,
                predecessor: None,
                successor: None,
                plan_view: Vec::new(),
                elevation_profile: Vec::new(),
                superelevation: Vec::new(),
                lane_offsets: Vec::new(),
                lane_sections: Vec::new(),
            },
            length_override: None,
        }
    }

    fn next_s(&self) -> f64 {
        self.road
            .plan_view
            .last()
            .map(|seg| seg.s + seg.length)
            .unwrap_or(0.0)
    }

    fn push(mut self, x: f64, y: f64, hdg: f64, length: f64, kind: GeometryKind) -> Self {
        let s = self.next_s();
        self.road.plan_view.push(GeometrySegment {
            s,
            x,
            y,
            hdg,
            length,
            kind,
        });
        self
    }

    /// Append a segment starting where the previous one ends.
    pub fn geometry(self, kind: GeometryKind, length: f64) -> Self {
        let (x, y, hdg) = self
            .road
            .plan_view
            .last()
            .and_then(|seg| evaluate_segment(seg, seg.length, &GeometryConfig::default()).ok())
            .map(|pose| (pose.x, pose.y, pose.heading))
            .unwrap_or((0.0, 0.0, 0.0));
        self.push(x, y, hdg, length, kind)
    }

    /// A line starting at an explicit pose.
    pub fn line(self, x: f64, y: f64, hdg: f64, length: f64) -> Self {
        self.push(x, y, hdg, length, GeometryKind::Line)
    }

    pub fn straight(self, length: f64) -> Self {
        self.geometry(GeometryKind::Line, length)
    }

    pub fn arc(self, curvature: f64, length: f64) -> Self {
        self.geometry(GeometryKind::Arc { curvature }, length)
    }

    pub fn spiral(self, curv_start: f64, curv_end: f64, length: f64) -> Self {
        self.geometry(
            GeometryKind::Spiral {
                curv_start,
                curv_end,
            },
            length,
        )
    }

    /// Declared road length; defaults to the sum of segment lengths.
    pub fn length(mut self, length: f64) -> Self {
        self.length_override = Some(length);
        self
    }

    pub fn predecessor(mut self, link: RoadLink) -> Self {
        self.road.predecessor = Some(link);
        self
    }

    pub fn successor(mut self, link: RoadLink) -> Self {
        self.road.successor = Some(link);
        self
    }

    /// Mark the road as a connecting road of `junction_id`.
    pub fn in_junction(mut self, junction_id: &str) -> Self {
        self.road.junction = Some(junction_id.to_string());
        self
    }

    pub fn elevation(mut self, record: Cubic) -> Self {
        self.road.elevation_profile.push(record);
        self
    }

    pub fn superelevation(mut self, record: Cubic) -> Self {
        self.road.superelevation.push(record);
        self
    }

    pub fn lane_offset(mut self, record: Cubic) -> Self {
        self.road.lane_offsets.push(record);
        self
    }

    /// Append a lane section; lanes are split by id sign.
    pub fn section(mut self, s: f64, lanes: Vec<Lane>) -> Self {
        let (left, right): (Vec<Lane>, Vec<Lane>) = lanes.into_iter().partition(Lane::is_left);
        self.road.lane_sections.push(LaneSection { s, left, right });
        self
    }

    pub fn build(self) -> Road {
        let mut road = self.road;
        road.length = self.length_override.unwrap_or_else(|| {
            road.plan_view
                .last()
                .map(|seg| seg.s + seg.length)
                .unwrap_or(0.0)
        });
        road
    }
}

#[derive(Debug, Clone)]
pub struct LaneBuilder {
    lane: Lane,
}

impl LaneBuilder {
    pub fn new(id: i32) -> Self {
        Self {
            lane: Lane {
                id,
                lane_type: "driving".to_string(),
                level: false,
                widths: Vec::new(),
                borders: Vec::new(),
                predecessors: Vec::new(),
                successors: Vec::new(),
                access: Vec::new(),
            },
        }
    }

    /// Constant width over the whole section.
    pub fn width(self, width: f64) -> Self {
        self.width_record(Cubic::constant(0.0, width))
    }

    pub fn width_poly(self, a: f64, b: f64, c: f64, d: f64) -> Self {
        self.width_record(Cubic::new(0.0, a, b, c, d))
    }

    pub fn width_record(mut self, record: Cubic) -> Self {
        self.lane.widths.push(record);
        self
    }

    pub fn border_record(mut self, record: Cubic) -> Self {
        self.lane.borders.push(record);
        self
    }

    pub fn predecessor(mut self, id: i32) -> Self {
        self.lane.predecessors.push(id);
        self
    }

    pub fn successor(mut self, id: i32) -> Self {
        self.lane.successors.push(id);
        self
    }

    pub fn level(mut self, level: bool) -> Self {
        self.lane.level = level;
        self
    }

    pub fn lane_type(mut self, lane_type: &str) -> Self {
        self.lane.lane_type = lane_type.to_string();
        self
    }

    pub fn access(mut self, s_offset: f64, rule: AccessRule, restrictions: &[&str]) -> Self {
        self.lane.access.push(LaneAccess {
            s_offset,
            rule,
            restrictions: restrictions.iter().map(|r| r.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> Lane {
        self.lane
    }
}

pub fn junction(id: &str, connections: Vec<Connection>) -> Junction {
    Junction {
        id: id.to_string(),
        connections,
    }
}

pub fn connection(
    id: &str,
    incoming_road: &str,
    connecting_road: &str,
    contact_point: ContactPoint,
    lane_links: &[(i32, i32)],
) -> Connection {
    Connection {
        id: id.to_string(),
        incoming_road: incoming_road.to_string(),
        connecting_road: connecting_road.to_string(),
        contact_point: Some(contact_point),
        lane_links: lane_links
            .iter()
            .map(|&(from, to)| LaneLink { from, to })
            .collect(),
    }
}

/// Two collinear 10 m roads `1 → 2`; road 2 starts `gap` metres past road 1's end.
pub fn straight_pair(gap: f64) -> OpenDriveMap {
    let first = RoadBuilder::new("1")
        .line(0.0, 0.0, 0.0, 10.0)
        .successor(RoadLink::road("2", ContactPoint::Start))
        .section(
            0.0,
            vec![LaneBuilder::new(-1).width(LANE_WIDTH).successor(-1).build()],
        )
        .build();
    let second = RoadBuilder::new("2")
        .line(10.0 + gap, 0.0, 0.0, 10.0)
        .predecessor(RoadLink::road("1", ContactPoint::End))
        .section(
            0.0,
            vec![LaneBuilder::new(-1).width(LANE_WIDTH).predecessor(-1).build()],
        )
        .build();
    OpenDriveMap::new(vec![first, second], Vec::new())
}

/// Two roads meeting in junction `10` with one connecting road per direction.
pub fn t_junction() -> OpenDriveMap {
    let two_lanes = || {
        vec![
            LaneBuilder::new(1).width(LANE_WIDTH).build(),
            LaneBuilder::new(-1).width(LANE_WIDTH).build(),
        ]
    };
    let incoming_west = RoadBuilder::new("1")
        .line(0.0, 0.0, 0.0, 50.0)
        .successor(RoadLink::junction("10"))
        .section(0.0, two_lanes())
        .build();
    let incoming_east = RoadBuilder::new("2")
        .line(60.0, 0.0, 0.0, 50.0)
        .predecessor(RoadLink::junction("10"))
        .section(0.0, two_lanes())
        .build();
    let eastbound = RoadBuilder::new("100")
        .line(50.0, 0.0, 0.0, 10.0)
        .in_junction("10")
        .predecessor(RoadLink::road("1", ContactPoint::End))
        .successor(RoadLink::road("2", ContactPoint::Start))
        .section(
            0.0,
            vec![
                LaneBuilder::new(-1)
                    .width(LANE_WIDTH)
                    .predecessor(-1)
                    .successor(-1)
                    .build(),
            ],
        )
        .build();
    let westbound = RoadBuilder::new("101")
        .line(60.0, 0.0, PI, 10.0)
        .in_junction("10")
        .predecessor(RoadLink::road("2", ContactPoint::Start))
        .successor(RoadLink::road("1", ContactPoint::End))
        .section(
            0.0,
            vec![
                LaneBuilder::new(-1)
                    .width(LANE_WIDTH)
                    .predecessor(1)
                    .successor(1)
                    .build(),
            ],
        )
        .build();
    let junction = junction(
        "10",
        vec![
            connection("0", "1", "100", ContactPoint::Start, &[(-1, -1)]),
            connection("1", "2", "101", ContactPoint::Start, &[(1, -1)]),
        ],
    );
    OpenDriveMap::new(
        vec![incoming_west, incoming_east, eastbound, westbound],
        vec![junction],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{end_pose, start_pose};

    #[test]
    fn chained_segments_are_continuous() {
        let road = RoadBuilder::new("1")
            .line(0.0, 0.0, 0.0, 10.0)
            .arc(0.05, 10.0)
            .spiral(0.05, 0.0, 10.0)
            .build();
        assert_eq!(road.length, 30.0);
        assert_eq!(road.plan_view[2].s, 20.0);
        assert!(road.plan_view[1].x == 10.0 && road.plan_view[1].y == 0.0);
    }

    #[test]
    fn t_junction_connecting_roads_touch_their_incoming_roads() {
        let map = t_junction();
        let cfg = GeometryConfig::default();
        let road = |id: &str| map.road(id).expect("road exists");
        let west_end = end_pose(road("1"), &cfg).expect("pose").position();
        let east_start = start_pose(road("2"), &cfg).expect("pose").position();
        assert!(west_end.distance(&start_pose(road("100"), &cfg).expect("pose").position()) < 1e-9);
        assert!(east_start.distance(&end_pose(road("100"), &cfg).expect("pose").position()) < 1e-9);
        assert!(west_end.distance(&end_pose(road("101"), &cfg).expect("pose").position()) < 1e-9);
    }
}
