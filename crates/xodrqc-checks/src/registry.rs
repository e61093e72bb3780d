//! Canonical rule registry: id, reporting URI, severity and check function.
//!
//! Registry order is the order in which the runner executes rules and
//! reports findings. Preconditions are declarations for an external
//! orchestrator; nothing in this crate enforces them.

use crate::context::CheckContext;
use crate::rules;
use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::OnceLock;
use xodrqc_kernel::{Finding, Severity};

pub type CheckFn = fn(&CheckContext<'_>) -> Vec<Finding>;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleSpec {
    pub id: &'static str,
    pub uri: &'static str,
    pub severity: Severity,
    /// OpenDRIVE versions the rule applies to, e.g. `">=1.7.0"`.
    pub applicable_versions: &'static str,
    pub description: &'static str,
    pub preconditions: &'static [&'static str],
    #[serde(skip)]
    pub check: CheckFn,
}

const EXISTENCE: &[&str] = &["road_id_exists", "junction_id_exists"];

pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: rules::road_id_exists::RULE_ID,
        uri: "me.net:xodr:1.4.0:roads.id.exists",
        severity: Severity::Warning,
        applicable_versions: ">=1.4.0",
        description: "Referenced road ids exist in the map",
        preconditions: &[],
        check: rules::road_id_exists::check,
    },
    RuleSpec {
        id: rules::junction_id_exists::RULE_ID,
        uri: "mobileye.com:xodr:1.4.0:junctions.id.exists",
        severity: Severity::Warning,
        applicable_versions: ">=1.4.0",
        description: "Referenced junction ids exist in the map",
        preconditions: &[],
        check: rules::junction_id_exists::check,
    },
    RuleSpec {
        id: rules::junctions_incoming_roads_number::RULE_ID,
        uri: "me.net:xodr:1.4.0:junctions.incoming_roads_number",
        severity: Severity::Info,
        applicable_versions: ">=1.4.0",
        description: "Junctions join at least two distinct incoming roads",
        preconditions: EXISTENCE,
        check: rules::junctions_incoming_roads_number::check,
    },
    RuleSpec {
        id: rules::junctions_connection_start_along_linkage::RULE_ID,
        uri: "asam.net:xodr:1.7.0:junctions.connection.start_along_linkage",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "Contact point start means the connecting road's predecessor is the incoming road",
        preconditions: EXISTENCE,
        check: rules::junctions_connection_start_along_linkage::check,
    },
    RuleSpec {
        id: rules::junctions_connection_end_opposite_linkage::RULE_ID,
        uri: "asam.net:xodr:1.7.0:junctions.connection.end_opposite_linkage",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "Contact point end means the connecting road's successor is the incoming road",
        preconditions: EXISTENCE,
        check: rules::junctions_connection_end_opposite_linkage::check,
    },
    RuleSpec {
        id: rules::junctions_connection_one_connection_element::RULE_ID,
        uri: "asam.net:xodr:1.7.0:junctions.connection.one_connection_element",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "A connecting road is used by one connection per junction",
        preconditions: EXISTENCE,
        check: rules::junctions_connection_one_connection_element::check,
    },
    RuleSpec {
        id: rules::junctions_connection_one_link_to_incoming::RULE_ID,
        uri: "asam.net:xodr:1.7.0:junctions.connection.one_link_to_incoming",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "An incoming/connecting road pair appears in one connection only",
        preconditions: EXISTENCE,
        check: rules::junctions_connection_one_link_to_incoming::check,
    },
    RuleSpec {
        id: rules::junctions_connection_connect_road_no_incoming_road::RULE_ID,
        uri: "asam.net:xodr:1.7.0:junctions.connection.connect_road_no_incoming_road",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "Connecting roads are never incoming roads of a connection",
        preconditions: EXISTENCE,
        check: rules::junctions_connection_connect_road_no_incoming_road::check,
    },
    RuleSpec {
        id: rules::road_linkage_is_junction_needed::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.linkage.is_junction_needed",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "A road end linked from several roads must be modelled as a junction",
        preconditions: EXISTENCE,
        check: rules::road_linkage_is_junction_needed::check,
    },
    RuleSpec {
        id: rules::reference_lines_connect::RULE_ID,
        uri: "asam.net:xodr:1.4.0:road.geometry.referece_lines_connect_along_paired_roads",
        severity: Severity::Error,
        applicable_versions: ">=1.4.0",
        description: "Reference lines of directly linked roads meet at their linked ends",
        preconditions: EXISTENCE,
        check: rules::reference_lines_connect::check,
    },
    RuleSpec {
        id: rules::geometry_length_match::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.geometry.length_match",
        severity: Severity::Warning,
        applicable_versions: ">=1.7.0",
        description: "Declared geometry lengths match the integrated curve lengths",
        preconditions: &[],
        check: rules::geometry_length_match::check,
    },
    RuleSpec {
        id: rules::geometry_param_poly3_domain::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.geometry.parampoly3.valid_p_range",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "ParamPoly3 segments are only evaluated inside their parameter domain",
        preconditions: &[],
        check: rules::geometry_param_poly3_domain::check,
    },
    RuleSpec {
        id: rules::lane_link_symmetry::RULE_ID,
        uri: "asam.net:xodr:1.4.0:road.lane.link.lanes_across_lane_sections",
        severity: Severity::Error,
        applicable_versions: ">=1.4.0",
        description: "Lane successor/predecessor links are mutual",
        preconditions: EXISTENCE,
        check: rules::lane_link_symmetry::check,
    },
    RuleSpec {
        id: rules::zero_width_at_start::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.lane.link.zero_width_at_start",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "Lanes starting with zero width have no predecessor",
        preconditions: &[],
        check: rules::zero_width_at_start::check,
    },
    RuleSpec {
        id: rules::zero_width_at_end::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.lane.link.zero_width_at_end",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "Lanes ending with zero width have no successor",
        preconditions: &[],
        check: rules::zero_width_at_end::check,
    },
    RuleSpec {
        id: rules::new_lane_appear::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.lane.link.new_lane_appear",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "A newly appearing lane does not link back to the lane it appears beside",
        preconditions: EXISTENCE,
        check: rules::new_lane_appear::check,
    },
    RuleSpec {
        id: rules::lane_level_true_one_side::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.lane.level_true_one_side",
        severity: Severity::Warning,
        applicable_versions: ">=1.7.0",
        description: "Lanes outside a level lane are level too",
        preconditions: &[],
        check: rules::lane_level_true_one_side::check,
    },
    RuleSpec {
        id: rules::lane_access_no_mix_of_deny_or_allow::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.lane.access.no_mix_of_deny_or_allow",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "Access records at one offset are all allow or all deny",
        preconditions: &[],
        check: rules::lane_access_no_mix_of_deny_or_allow::check,
    },
    RuleSpec {
        id: rules::lane_border_overlap::RULE_ID,
        uri: "asam.net:xodr:1.7.0:road.lane.border.overlap_with_inner_lanes",
        severity: Severity::Warning,
        applicable_versions: ">=1.7.0",
        description: "Outer lane borders never cross inner lane borders",
        preconditions: &[],
        check: rules::lane_border_overlap::check,
    },
    RuleSpec {
        id: rules::lane_contact_gap::RULE_ID,
        uri: "asam.net:xodr:1.7.0:lane_smoothness.contact_point_no_horizontal_gaps",
        severity: Severity::Error,
        applicable_versions: ">=1.7.0",
        description: "Lanes linked across a contact point share both boundary points",
        preconditions: EXISTENCE,
        check: rules::lane_contact_gap::check,
    },
    RuleSpec {
        id: rules::redundant_info::RULE_ID,
        uri: "asam.net:xodr:1.7.0:performance.avoid_redundant_info",
        severity: Severity::Info,
        applicable_versions: ">=1.7.0",
        description: "Records that repeat their predecessor are avoided",
        preconditions: &[],
        check: rules::redundant_info::check,
    },
    RuleSpec {
        id: rules::elevation_variance::RULE_ID,
        uri: "mobileye.com:xodr:1.4.0:road_smoothness_vertical_variance",
        severity: Severity::Warning,
        applicable_versions: ">=1.4.0",
        description: "Road mid-elevations do not vary suspiciously",
        preconditions: EXISTENCE,
        check: rules::elevation_variance::check,
    },
    RuleSpec {
        id: rules::lanes_connect_with_reversed_direction::RULE_ID,
        uri: "me.net:xodr:1.4.0:connected_lanes.direction.reversed",
        severity: Severity::Warning,
        applicable_versions: ">=1.4.0",
        description: "Connected lanes keep their traffic direction",
        preconditions: &["road_id_exists", "junction_id_exists", "reference_lines_connect"],
        check: rules::lanes_connect_with_reversed_direction::check,
    },
];

pub fn rule(id: &str) -> Option<&'static RuleSpec> {
    RULES.iter().find(|spec| spec.id == id)
}

pub fn rule_ids() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|spec| spec.id)
}

fn rule_uri_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.-]*:xodr:\d+\.\d+\.\d+:[A-Za-z0-9_][A-Za-z0-9_.]*$")
            .expect("rule uri regex must compile")
    })
}

/// `<emitter>:xodr:<major.minor.patch>:<dotted rule name>`
pub fn is_valid_rule_uri(uri: &str) -> bool {
    rule_uri_re().is_match(uri)
}

pub fn rule_registry_json() -> Value {
    json!({
        "schema": 1,
        "registryKind": "xodrqc.rule_registry.v1",
        "rules": RULES,
    })
}
