//! Error types for kernel operations.
//!
//! These are local contract failures. Rules turn them into findings; none of
//! them aborts a validation run.

use crate::model::ParamPolyRange;

#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// Arc length outside `[0, road.length]` beyond the configured epsilon.
    #[error("arc length {s} out of range [0, {length}] on road {road_id}")]
    OutOfRange { road_id: String, s: f64, length: f64 },

    /// Negative arc length handed to a segment-level evaluation.
    #[error("negative arc length {ds} on {kind} segment")]
    NegativeArcLength { kind: &'static str, ds: f64 },

    /// Arc length inside the road length but past the end of the segment
    /// covering it.
    #[error("arc length {s} on road {road_id} lies past its geometry, which ends at {covered}")]
    NotCovered { road_id: String, s: f64, covered: f64 },

    /// A road has no plan-view geometry to evaluate.
    #[error("road {0} has no reference-line geometry")]
    EmptyPlanView(String),

    /// Parametric coordinate outside the segment's declared domain.
    #[error("parameter p={p} outside {range:?} domain [0, {max}]")]
    ParameterOutOfDomain {
        p: f64,
        max: f64,
        range: ParamPolyRange,
    },

    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid map json at {path}: {source}")]
    Model {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
