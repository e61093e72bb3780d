//! Typed road-network model.
//!
//! This is the input boundary of the kernel: an already-parsed OpenDRIVE map.
//! XML parsing and schema validation happen upstream; the kernel receives
//! these types (directly or as their JSON projection) and never mutates them.

use crate::error::KernelError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Which end of a road takes part in a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPoint {
    Start,
    End,
}

impl ContactPoint {
    pub fn opposite(self) -> Self {
        match self {
            ContactPoint::Start => ContactPoint::End,
            ContactPoint::End => ContactPoint::Start,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContactPoint::Start => "start",
            ContactPoint::End => "end",
        }
    }
}

/// Kind of element a road link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Road,
    Junction,
}

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Road => "road",
            ElementType::Junction => "junction",
        }
    }
}

/// Link direction on a road (`<predecessor>` / `<successor>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkageTag {
    Predecessor,
    Successor,
}

impl LinkageTag {
    /// The road end a link of this kind leaves from.
    pub fn road_end(self) -> ContactPoint {
        match self {
            LinkageTag::Predecessor => ContactPoint::Start,
            LinkageTag::Successor => ContactPoint::End,
        }
    }

    pub fn from_road_end(end: ContactPoint) -> Self {
        match end {
            ContactPoint::Start => LinkageTag::Predecessor,
            ContactPoint::End => LinkageTag::Successor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinkageTag::Predecessor => "predecessor",
            LinkageTag::Successor => "successor",
        }
    }
}

/// A road's predecessor or successor reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadLink {
    pub element_type: ElementType,
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_point: Option<ContactPoint>,
}

impl RoadLink {
    pub fn road(id: impl Into<String>, contact_point: ContactPoint) -> Self {
        Self {
            element_type: ElementType::Road,
            element_id: id.into(),
            contact_point: Some(contact_point),
        }
    }

    pub fn junction(id: impl Into<String>) -> Self {
        Self {
            element_type: ElementType::Junction,
            element_id: id.into(),
            contact_point: None,
        }
    }
}

/// Cubic polynomial record `a + b·ds + c·ds² + d·ds³`, valid from `s` onward.
///
/// Used for elevation profiles (keyed by road `s`) and lane widths (keyed by
/// `sOffset` relative to the lane section start).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cubic {
    pub s: f64,
    pub a: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub c: f64,
    #[serde(default)]
    pub d: f64,
}

impl Cubic {
    pub const fn new(s: f64, a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { s, a, b, c, d }
    }

    pub const fn constant(s: f64, a: f64) -> Self {
        Self::new(s, a, 0.0, 0.0, 0.0)
    }

    /// Value at `ds` past this record's start.
    pub fn value(&self, ds: f64) -> f64 {
        self.a + ds * (self.b + ds * (self.c + ds * self.d))
    }

    pub fn derivative(&self, ds: f64) -> f64 {
        self.b + ds * (2.0 * self.c + ds * 3.0 * self.d)
    }

    pub fn second_derivative(&self, ds: f64) -> f64 {
        2.0 * self.c + 6.0 * self.d * ds
    }

    /// The same polynomial re-expressed with its origin moved to `s`.
    pub fn rebased(&self, s: f64) -> Self {
        let ds = s - self.s;
        Self {
            s,
            a: self.value(ds),
            b: self.derivative(ds),
            c: self.c + 3.0 * self.d * ds,
            d: self.d,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.a == 0.0 && self.b == 0.0 && self.c == 0.0 && self.d == 0.0
    }

    /// Coefficient-wise comparison within `eps`, ignoring the start offset.
    pub fn same_equation(&self, other: &Cubic, eps: f64) -> bool {
        (self.a - other.a).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.c - other.c).abs() <= eps
            && (self.d - other.d).abs() <= eps
    }
}

/// Evaluate a piecewise cubic (records sorted by `s`) at `s`.
///
/// Returns `None` when there are no records. Queries before the first record
/// use the first record.
pub fn piecewise_value(records: &[Cubic], s: f64) -> Option<f64> {
    let record = piecewise_record(records, s)?;
    Some(record.value(s - record.s))
}

pub(crate) fn piecewise_record(records: &[Cubic], s: f64) -> Option<&Cubic> {
    let first = records.first()?;
    Some(
        records
            .iter()
            .take_while(|record| record.s <= s)
            .last()
            .unwrap_or(first),
    )
}

/// Parameter domain of a parametric cubic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamPolyRange {
    /// `p ∈ [0, length]`
    ArcLength,
    /// `p ∈ [0, 1]`
    Normalized,
}

/// Reference-line primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryKind {
    Line,
    Arc {
        curvature: f64,
    },
    Spiral {
        curv_start: f64,
        curv_end: f64,
    },
    Poly3 {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    },
    ParamPoly3 {
        a_u: f64,
        b_u: f64,
        c_u: f64,
        d_u: f64,
        a_v: f64,
        b_v: f64,
        c_v: f64,
        d_v: f64,
        p_range: ParamPolyRange,
    },
}

impl GeometryKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Line => "line",
            GeometryKind::Arc { .. } => "arc",
            GeometryKind::Spiral { .. } => "spiral",
            GeometryKind::Poly3 { .. } => "poly3",
            GeometryKind::ParamPoly3 { .. } => "param_poly3",
        }
    }
}

/// One `<geometry>` record of a road's plan view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySegment {
    /// Start arc length along the road.
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub length: f64,
    pub kind: GeometryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    Allow,
    Deny,
}

/// A `<access>` record of a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneAccess {
    pub s_offset: f64,
    pub rule: AccessRule,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

/// A lane of a lane section. Lane 0 (the center lane) is never represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: i32,
    #[serde(default = "default_lane_type")]
    pub lane_type: String,
    #[serde(default)]
    pub level: bool,
    /// Width records keyed by `sOffset` relative to the section start.
    #[serde(default)]
    pub widths: Vec<Cubic>,
    /// Outer border records keyed by `sOffset`; used when a lane has no widths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub borders: Vec<Cubic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predecessors: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub successors: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access: Vec<LaneAccess>,
}

fn default_lane_type() -> String {
    "driving".to_string()
}

impl Lane {
    pub fn links(&self, tag: LinkageTag) -> &[i32] {
        match tag {
            LinkageTag::Predecessor => &self.predecessors,
            LinkageTag::Successor => &self.successors,
        }
    }

    pub fn is_left(&self) -> bool {
        self.id > 0
    }
}

/// A `<laneSection>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSection {
    pub s: f64,
    /// Left lanes (positive ids).
    #[serde(default)]
    pub left: Vec<Lane>,
    /// Right lanes (negative ids).
    #[serde(default)]
    pub right: Vec<Lane>,
}

impl LaneSection {
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.left.iter().chain(self.right.iter())
    }

    pub fn lane(&self, id: i32) -> Option<&Lane> {
        self.lanes().find(|lane| lane.id == id)
    }

    /// Lanes of one side ordered from the center outward.
    pub fn side_outward(&self, left: bool) -> Vec<&Lane> {
        let mut lanes: Vec<&Lane> = if left {
            self.left.iter().collect()
        } else {
            self.right.iter().collect()
        };
        lanes.sort_by_key(|lane| lane.id.abs());
        lanes
    }
}

/// A `<road>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub length: f64,
    /// Junction this road belongs to as a connecting road. The OpenDRIVE
    /// "-1" marker and an empty id both deserialize to `None`.
    #[serde(
        default,
        deserialize_with = "junction_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub junction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<RoadLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successor: Option<RoadLink>,
    #[serde(default)]
    pub plan_view: Vec<GeometrySegment>,
    #[serde(default)]
    pub elevation_profile: Vec<Cubic>,
    /// Superelevation records of the lateral profile, keyed by road `s`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub superelevation: Vec<Cubic>,
    /// Lateral shift of the center lane from the reference line, keyed by road `s`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lane_offsets: Vec<Cubic>,
    #[serde(default)]
    pub lane_sections: Vec<LaneSection>,
}

fn junction_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|id| !id.is_empty() && id != "-1"))
}

impl Road {
    pub fn link(&self, tag: LinkageTag) -> Option<&RoadLink> {
        match tag {
            LinkageTag::Predecessor => self.predecessor.as_ref(),
            LinkageTag::Successor => self.successor.as_ref(),
        }
    }

    pub fn is_connecting_road(&self) -> bool {
        self.junction.is_some()
    }

    /// Elevation at `s`, zero when the road has no elevation profile.
    pub fn elevation_at(&self, s: f64) -> f64 {
        piecewise_value(&self.elevation_profile, s).unwrap_or(0.0)
    }

    /// Lane offset at `s`, zero without `<laneOffset>` records.
    pub fn lane_offset_at(&self, s: f64) -> f64 {
        piecewise_value(&self.lane_offsets, s).unwrap_or(0.0)
    }

    pub fn has_null_elevation(&self) -> bool {
        self.elevation_profile.iter().all(Cubic::is_zero)
    }
}

/// A `<laneLink>` of a junction connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneLink {
    pub from: i32,
    pub to: i32,
}

/// A `<connection>` of a junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub id: String,
    pub incoming_road: String,
    pub connecting_road: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_point: Option<ContactPoint>,
    #[serde(default)]
    pub lane_links: Vec<LaneLink>,
}

/// A `<junction>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub id: String,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Serialized shape of a map: roads and junctions in declaration order.
#[derive(Debug, Clone, Default, Deserialize)]
struct MapDocument {
    /// OpenDRIVE version of the source file, `"1.<revMinor>.0"`.
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    roads: Vec<Road>,
    #[serde(default)]
    junctions: Vec<Junction>,
}

/// The complete, immutable road network handed to a validation run.
#[derive(Debug, Clone, Default)]
pub struct OpenDriveMap {
    version: Option<String>,
    roads: Vec<Road>,
    junctions: Vec<Junction>,
    road_index: BTreeMap<String, usize>,
    junction_index: BTreeMap<String, usize>,
}

impl OpenDriveMap {
    /// Build a map from fully-materialized roads and junctions.
    ///
    /// Declaration order is preserved. When an id is declared twice the first
    /// declaration is the one found by id lookups.
    pub fn new(roads: Vec<Road>, junctions: Vec<Junction>) -> Self {
        let mut road_index = BTreeMap::new();
        for (idx, road) in roads.iter().enumerate() {
            road_index.entry(road.id.clone()).or_insert(idx);
        }
        let mut junction_index = BTreeMap::new();
        for (idx, junction) in junctions.iter().enumerate() {
            junction_index.entry(junction.id.clone()).or_insert(idx);
        }
        Self {
            version: None,
            roads,
            junctions,
            road_index,
            junction_index,
        }
    }

    /// Parse the JSON projection of a map (`{"roads": [...], "junctions": [...]}`).
    pub fn from_json_str(text: &str) -> Result<Self, KernelError> {
        let doc: MapDocument = serde_json::from_str(text).map_err(|source| KernelError::Model {
            path: "<string>".to_string(),
            source,
        })?;
        Ok(Self::from_document(doc))
    }

    /// Load the JSON projection of a map from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, KernelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| KernelError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let doc: MapDocument = serde_json::from_str(&text).map_err(|source| KernelError::Model {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_document(doc))
    }

    /// Tag the map with the OpenDRIVE version it was read from.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    fn from_document(doc: MapDocument) -> Self {
        let map = Self::new(doc.roads, doc.junctions);
        match doc.version {
            Some(version) => map.with_version(version),
            None => map,
        }
    }

    /// OpenDRIVE version of the source file, when known.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Roads in declaration order.
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// Junctions in declaration order.
    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn road(&self, id: &str) -> Option<&Road> {
        self.road_index.get(id).map(|&idx| &self.roads[idx])
    }

    pub fn junction(&self, id: &str) -> Option<&Junction> {
        self.junction_index.get(id).map(|&idx| &self.junctions[idx])
    }

    pub fn has_road(&self, id: &str) -> bool {
        self.road_index.contains_key(id)
    }

    pub fn has_junction(&self, id: &str) -> bool {
        self.junction_index.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_rebase_preserves_values() {
        let poly = Cubic::new(2.0, 1.0, 0.5, -0.25, 0.125);
        let moved = poly.rebased(5.0);
        for s in [5.0, 6.5, 9.0] {
            let lhs = poly.value(s - poly.s);
            let rhs = moved.value(s - moved.s);
            assert!((lhs - rhs).abs() < 1e-12, "{lhs} vs {rhs} at {s}");
        }
    }

    #[test]
    fn piecewise_picks_last_record_not_after_s() {
        let records = [Cubic::constant(0.0, 1.0), Cubic::new(10.0, 2.0, 1.0, 0.0, 0.0)];
        assert_eq!(piecewise_value(&records, 5.0), Some(1.0));
        assert_eq!(piecewise_value(&records, 12.0), Some(4.0));
        assert_eq!(piecewise_value(&records, -1.0), Some(1.0));
        assert_eq!(piecewise_value(&[], 1.0), None);
    }

    #[test]
    fn duplicate_road_ids_keep_first_declaration() {
        let road = |name: &str| Road {
            id: "1".to_string(),
            name: Some(name.to_string()),
            length: 1.0,
            junction: None,
            predecessor: None,
            successor: None,
            plan_view: Vec::new(),
            elevation_profile: Vec::new(),
            superelevation: Vec::new(),
            lane_offsets: Vec::new(),
            lane_sections: Vec::new(),
        };
        let map = OpenDriveMap::new(vec![road("first"), road("second")], Vec::new());
        assert_eq!(map.roads().len(), 2);
        assert_eq!(map.road("1").and_then(|r| r.name.as_deref()), Some("first"));
    }

    #[test]
    fn json_projection_parses_tagged_geometry() {
        let text = r#"{
            "roads": [{
                "id": "7",
                "length": 10.0,
                "junction": "3",
                "successor": {"element_type": "road", "element_id": "8", "contact_point": "start"},
                "plan_view": [
                    {"s": 0.0, "x": 0.0, "y": 0.0, "hdg": 0.0, "length": 10.0,
                     "kind": {"type": "arc", "curvature": 0.1}}
                ]
            }],
            "junctions": [{"id": "3", "connections": []}]
        }"#;
        let map = OpenDriveMap::from_json_str(text).expect("map should parse");
        let road = map.road("7").expect("road 7");
        assert!(road.is_connecting_road());
        assert_eq!(road.plan_view[0].kind, GeometryKind::Arc { curvature: 0.1 });
        assert_eq!(
            road.successor.as_ref().and_then(|l| l.contact_point),
            Some(ContactPoint::Start)
        );
        assert!(map.has_junction("3"));
        assert_eq!(map.version(), None);

        let versioned = OpenDriveMap::from_json_str(r#"{"version": "1.6.0", "roads": []}"#)
            .expect("map should parse");
        assert_eq!(versioned.version(), Some("1.6.0"));
    }

    #[test]
    fn no_junction_markers_deserialize_to_none() {
        let text = r#"{
            "roads": [
                {"id": "1", "length": 1.0, "junction": "-1"},
                {"id": "2", "length": 1.0, "junction": ""},
                {"id": "3", "length": 1.0, "junction": null},
                {"id": "4", "length": 1.0},
                {"id": "5", "length": 1.0, "junction": "12"}
            ]
        }"#;
        let map = OpenDriveMap::from_json_str(text).expect("map should parse");
        let junction = |id: &str| map.road(id).and_then(|road| road.junction.clone());
        for id in ["1", "2", "3", "4"] {
            assert_eq!(junction(id), None, "road {id}");
        }
        assert_eq!(junction("5").as_deref(), Some("12"));
    }

    #[test]
    fn side_outward_orders_by_distance_from_center() {
        let lane = |id: i32| Lane {
            id,
            lane_type: "driving".to_string(),
            level: false,
            widths: Vec::new(),
            borders: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            access: Vec::new(),
        };
        let section = LaneSection {
            s: 0.0,
            left: vec![lane(2), lane(1)],
            right: vec![lane(-1), lane(-3), lane(-2)],
        };
        let ids: Vec<i32> = section.side_outward(false).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![-1, -2, -3]);
        let ids: Vec<i32> = section.side_outward(true).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
