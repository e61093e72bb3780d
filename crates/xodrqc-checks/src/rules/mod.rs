//! The rule catalog. One module per rule, each exposing `RULE_ID` and
//! `check(&CheckContext) -> Vec<Finding>`.
//!
//! Rules are total: model defects and evaluation failures become findings,
//! never errors or panics.

pub mod elevation_variance;
pub mod geometry_length_match;
pub mod geometry_param_poly3_domain;
pub mod junction_id_exists;
pub mod junctions_connection_connect_road_no_incoming_road;
pub mod junctions_connection_end_opposite_linkage;
pub mod junctions_connection_one_connection_element;
pub mod junctions_connection_one_link_to_incoming;
pub mod junctions_connection_start_along_linkage;
pub mod junctions_incoming_roads_number;
pub mod lane_access_no_mix_of_deny_or_allow;
pub mod lane_border_overlap;
pub mod lane_contact_gap;
pub mod lane_level_true_one_side;
pub mod lane_link_symmetry;
pub mod lanes_connect_with_reversed_direction;
pub mod new_lane_appear;
pub mod redundant_info;
pub mod reference_lines_connect;
pub mod road_id_exists;
pub mod road_linkage_is_junction_needed;
pub mod zero_width_at_end;
pub mod zero_width_at_start;

mod junction_linkage;
