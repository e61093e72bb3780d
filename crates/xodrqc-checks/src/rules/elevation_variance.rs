//! Road mid-elevations that stand out from the rest of the network.
//!
//! Two parts:
//! - null elevation: some roads carry an all-zero profile while others don't
//! - the configured statistic over the mid-elevations of the remaining roads
//!   (see [`ElevationStatistic`])

use crate::config::ElevationStatistic;
use crate::context::CheckContext;
use std::collections::BTreeMap;
use xodrqc_kernel::{Finding, Road};

pub const RULE_ID: &str = "elevation_variance";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let roads = ctx.map.roads();
    if roads.len() < 2 {
        tracing::debug!(roads = roads.len(), "too few roads for elevation statistics");
        return Vec::new();
    }

    let (null, profiled): (Vec<&Road>, Vec<&Road>) =
        roads.iter().partition(|road| road.has_null_elevation());
    let mut findings = Vec::new();
    if !null.is_empty() && !profiled.is_empty() {
        for road in &null {
            findings.push(
                ctx.finding(
                    RULE_ID,
                    format!(
                        "road {} has no elevation while {} other road(s) do",
                        road.id,
                        profiled.len()
                    ),
                )
                .with_road(road.id.as_str()),
            );
        }
    }

    let mids: BTreeMap<&str, (f64, f64)> = profiled
        .iter()
        .map(|road| {
            let s = road.length / 2.0;
            (road.id.as_str(), (s, road.elevation_at(s)))
        })
        .collect();

    match ctx.thresholds().elevation_statistic {
        ElevationStatistic::NeighborhoodSigma => {
            neighborhood_sigma(ctx, &profiled, &mids, &mut findings)
        }
        ElevationStatistic::SortedGap => sorted_gap(ctx, &profiled, &mids, &mut findings),
    }
    findings
}

fn neighborhood_sigma(
    ctx: &CheckContext<'_>,
    roads: &[&Road],
    mids: &BTreeMap<&str, (f64, f64)>,
    findings: &mut Vec<Finding>,
) {
    let thresholds = ctx.thresholds();
    for road in roads {
        let Some(&(s, mid)) = mids.get(road.id.as_str()) else {
            continue;
        };
        let values: Vec<f64> = ctx
            .graph
            .neighbors(&road.id)
            .into_iter()
            .filter_map(|id| mids.get(id).map(|&(_, z)| z))
            .collect();
        if values.len() < 2 {
            continue;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let sigma = (values.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n).sqrt();
        let limit = thresholds.elevation_sigma_k * sigma.max(thresholds.elevation_min_sigma);
        let deviation = (mid - mean).abs();
        if deviation > limit {
            findings.push(
                ctx.finding(
                    RULE_ID,
                    format!(
                        "mid elevation {mid:.3} of road {} deviates {deviation:.3} m from its {} neighbors (mean {mean:.3}, limit {limit:.3})",
                        road.id,
                        values.len()
                    ),
                )
                .with_road(road.id.as_str())
                .with_s_offset(s),
            );
        }
    }
}

fn sorted_gap(
    ctx: &CheckContext<'_>,
    roads: &[&Road],
    mids: &BTreeMap<&str, (f64, f64)>,
    findings: &mut Vec<Finding>,
) {
    let max_gap = ctx.thresholds().max_vertical_road_gap;
    let mut sorted: Vec<(f64, f64, &str)> = roads
        .iter()
        .filter_map(|road| {
            mids.get(road.id.as_str())
                .map(|&(s, z)| (z, s, road.id.as_str()))
        })
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.2.cmp(b.2)));

    for pair in sorted.windows(2) {
        let (low, s, low_id) = pair[0];
        let (high, _, high_id) = pair[1];
        let gap = high - low;
        if gap > max_gap {
            findings.push(
                ctx.finding(
                    RULE_ID,
                    format!(
                        "no road mid-elevation between road {low_id} ({low:.3}) and road {high_id} ({high:.3}): gap {gap:.3} m exceeds {max_gap}"
                    ),
                )
                .with_road(low_id)
                .with_s_offset(s),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use xodrqc_kernel::toy::RoadBuilder;
    use xodrqc_kernel::{ContactPoint, Cubic, OpenDriveMap, RoadLink};

    /// Roads 1 → 2 → … chained end to start, each at a constant elevation.
    fn chain(elevations: &[f64]) -> OpenDriveMap {
        let roads = elevations
            .iter()
            .enumerate()
            .map(|(idx, &z)| {
                let id = (idx + 1).to_string();
                let mut builder = RoadBuilder::new(&id)
                    .line(10.0 * idx as f64, 0.0, 0.0, 10.0)
                    .elevation(Cubic::constant(0.0, z));
                if idx + 1 < elevations.len() {
                    builder = builder
                        .successor(RoadLink::road((idx + 2).to_string(), ContactPoint::Start));
                }
                builder.build()
            })
            .collect();
        OpenDriveMap::new(roads, Vec::new())
    }

    fn run(map: &OpenDriveMap, config: &CheckConfig) -> Vec<Finding> {
        let ctx = CheckContext::build(map, config);
        check(&ctx)
    }

    #[test]
    fn spike_is_flagged_against_its_neighbors() {
        let map = chain(&[10.0, 10.0, 60.0, 10.0, 10.0]);
        let findings = run(&map, &CheckConfig::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].road_id.as_deref(), Some("3"));
        assert_eq!(findings[0].s_offset, Some(5.0));
    }

    #[test]
    fn gentle_profile_passes() {
        let map = chain(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert!(run(&map, &CheckConfig::default()).is_empty());
    }

    #[test]
    fn null_profiles_are_reported_when_others_have_elevation() {
        let mut map = chain(&[10.0, 10.0, 10.0]);
        let mut roads = map.roads().to_vec();
        roads[1].elevation_profile.clear();
        map = OpenDriveMap::new(roads, Vec::new());
        let findings = run(&map, &CheckConfig::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].road_id.as_deref(), Some("2"));
    }

    #[test]
    fn sorted_gap_reports_the_lower_road() {
        let map = chain(&[10.0, 20.0, 400.0]);
        let mut config = CheckConfig::default();
        config.thresholds.elevation_statistic = ElevationStatistic::SortedGap;
        let findings = run(&map, &config);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].road_id.as_deref(), Some("2"));
        assert!(findings[0].message.contains("road 3"));
    }

    #[test]
    fn single_road_is_skipped() {
        let map = chain(&[1000.0]);
        assert!(run(&map, &CheckConfig::default()).is_empty());
    }
}
