//! A connection entering its connecting road at the start means the
//! connecting road's predecessor is the incoming road.

use super::junction_linkage::check_contact_linkage;
use crate::context::CheckContext;
use xodrqc_kernel::{ContactPoint, Finding, LinkageTag};

pub const RULE_ID: &str = "junctions_connection_start_along_linkage";

pub fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    check_contact_linkage(ctx, RULE_ID, ContactPoint::Start, LinkageTag::Predecessor)
}
