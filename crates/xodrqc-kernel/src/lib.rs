//! # xodrqc kernel
//!
//! Read-only analysis primitives for OpenDRIVE road networks: the typed map
//! model and the three structures every validation rule consumes.
//!
//! ## Architecture
//!
//! ```text
//! OpenDriveMap          ← Roads, lane sections, junctions (immutable)
//!     │
//!     ├── RoadGraph     ← (road, end) → Endpoint { Road | Junction | Unresolved }
//!     │
//!     ├── LaneTopology  ← Section spans, lane widths, lane-to-lane links
//!     │
//!     └── geometry      ← Reference-line pose at arc length, arc-length quadrature
//!             │
//! Finding               ← Rule id + severity + location, deterministic id
//! ```
//!
//! Graph and topology are built once and only read afterwards, so they can be
//! shared freely across threads.

pub mod error;
pub mod finding;
pub mod geometry;
pub mod graph;
pub mod lanes;
pub mod model;
pub mod toy;

pub use error::KernelError;
pub use finding::{Finding, Severity};
pub use geometry::{ArcLength, GeometryConfig, Point2, Pose};
pub use graph::{Endpoint, RoadEnd, RoadGraph, UnresolvedLink};
pub use lanes::{LaneBoundary, LaneRef, LaneTopology, LinkedLane, SectionSpan};
pub use model::{
    AccessRule, Connection, ContactPoint, Cubic, ElementType, GeometryKind, GeometrySegment,
    Junction, Lane, LaneAccess, LaneLink, LaneSection, LinkageTag, OpenDriveMap, ParamPolyRange,
    Road, RoadLink,
};
