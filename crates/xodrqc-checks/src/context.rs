//! Shared, read-only inputs of every rule.

use crate::config::{CheckConfig, Thresholds};
use crate::registry;
use xodrqc_kernel::{
    Finding, GeometryConfig, KernelError, LaneTopology, OpenDriveMap, RoadGraph, Severity,
};

/// Map, configuration and the structures derived from the map.
///
/// Built once per run; rules only ever borrow it, so one context can be
/// shared across worker threads.
#[derive(Debug)]
pub struct CheckContext<'m> {
    pub map: &'m OpenDriveMap,
    pub config: &'m CheckConfig,
    pub graph: RoadGraph<'m>,
    pub topology: LaneTopology<'m>,
}

impl<'m> CheckContext<'m> {
    pub fn build(map: &'m OpenDriveMap, config: &'m CheckConfig) -> Self {
        let graph = RoadGraph::build(map);
        let topology = LaneTopology::build(map);
        tracing::debug!(
            roads = map.roads().len(),
            junctions = map.junctions().len(),
            "check context built"
        );
        Self {
            map,
            config,
            graph,
            topology,
        }
    }

    pub fn geometry(&self) -> &GeometryConfig {
        &self.config.geometry
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.config.thresholds
    }

    /// A finding for `rule_id` with the registry severity and configured URI.
    pub fn finding(&self, rule_id: &str, message: impl Into<String>) -> Finding {
        let severity = registry::rule(rule_id)
            .map(|spec| spec.severity)
            .unwrap_or(Severity::Error);
        Finding::new(rule_id, self.config.rule_uri(rule_id), severity, message)
    }

    /// A low-confidence finding recording that `rule_id` could not evaluate
    /// some geometry.
    pub fn evaluation_failure(&self, rule_id: &str, road_id: &str, err: &KernelError) -> Finding {
        tracing::debug!(rule = rule_id, road = road_id, error = %err, "geometry evaluation failed");
        self.finding(rule_id, format!("cannot evaluate road {road_id}: {err}"))
            .with_road(road_id)
            .low_confidence()
    }
}
