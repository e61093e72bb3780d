//! Findings: the only output of a validation rule.
//!
//! Every finding carries a deterministic identifier:
//!
//! 1. Build the canonical key (schema, ruleId, location fields, message)
//! 2. Serialize with sorted keys and no whitespace
//! 3. `findingId = "f1_" || base32hex_lower(SHA256(keyBytes))`
//!
//! The rule URI is reporting metadata and does not contribute to the id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single rule violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub finding_id: String,
    pub rule_id: String,
    pub rule_uri: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_index: Option<usize>,
    pub message: String,
    /// Set when the finding rests on a numerical result that did not converge.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub low_confidence: bool,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        rule_uri: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        let mut finding = Self {
            finding_id: String::new(),
            rule_id: rule_id.into(),
            rule_uri: rule_uri.into(),
            severity,
            road_id: None,
            junction_id: None,
            s_offset: None,
            lane_id: None,
            connection_index: None,
            message: message.into(),
            low_confidence: false,
        };
        finding.refresh_id();
        finding
    }

    pub fn with_road(mut self, road_id: impl Into<String>) -> Self {
        self.road_id = Some(road_id.into());
        self.refresh_id();
        self
    }

    pub fn with_s_offset(mut self, s: f64) -> Self {
        self.s_offset = Some(s);
        self.refresh_id();
        self
    }

    pub fn with_lane(mut self, lane_id: i32) -> Self {
        self.lane_id = Some(lane_id);
        self.refresh_id();
        self
    }

    pub fn with_junction(mut self, junction_id: impl Into<String>) -> Self {
        self.junction_id = Some(junction_id.into());
        self.refresh_id();
        self
    }

    pub fn with_connection(mut self, index: usize) -> Self {
        self.connection_index = Some(index);
        self.refresh_id();
        self
    }

    pub fn low_confidence(mut self) -> Self {
        self.low_confidence = true;
        self
    }

    fn refresh_id(&mut self) {
        let hash = Sha256::digest(canonical_bytes(&self.canonical_key()));
        self.finding_id = format!("f1_{}", base32hex_lower_no_pad(&hash));
    }

    /// Location and message; rule URI, severity and confidence stay out of
    /// the id.
    fn canonical_key(&self) -> Value {
        let opt_str = |v: &Option<String>| v.clone().map(Value::String).unwrap_or(Value::Null);
        let mut map = serde_json::Map::new();
        map.insert("schema".to_string(), Value::Number(1.into()));
        map.insert("ruleId".to_string(), Value::String(self.rule_id.clone()));
        map.insert("roadId".to_string(), opt_str(&self.road_id));
        map.insert("junctionId".to_string(), opt_str(&self.junction_id));
        map.insert(
            "laneId".to_string(),
            self.lane_id.map(|id| Value::Number(id.into())).unwrap_or(Value::Null),
        );
        map.insert(
            "connectionIndex".to_string(),
            self.connection_index
                .map(|idx| Value::Number((idx as u64).into()))
                .unwrap_or(Value::Null),
        );
        // Fixed precision keeps the key stable across float formatting paths.
        map.insert(
            "sOffset".to_string(),
            self.s_offset
                .map(|s| Value::String(format!("{s:.6}")))
                .unwrap_or(Value::Null),
        );
        map.insert("message".to_string(), Value::String(self.message.clone()));
        Value::Object(map)
    }
}

/// Sorted keys, no insignificant whitespace.
fn canonical_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut buf = vec![b'{'];
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                buf.extend_from_slice(&canonical_bytes(&Value::String((*key).clone())));
                buf.push(b':');
                buf.extend_from_slice(&canonical_bytes(&map[*key]));
            }
            buf.push(b'}');
            buf
        }
        Value::Array(items) => {
            let mut buf = vec![b'['];
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                buf.extend_from_slice(&canonical_bytes(item));
            }
            buf.push(b']');
            buf
        }
        scalar => serde_json::to_vec(scalar).unwrap_or_default(),
    }
}

/// RFC 4648 base32hex, lowercase, without padding.
fn base32hex_lower_no_pad(data: &[u8]) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuv";

    let mut out = String::with_capacity(data.len() * 8 / 5 + 1);
    let mut bits: u64 = 0;
    let mut num_bits: u32 = 0;
    for &byte in data {
        bits = (bits << 8) | u64::from(byte);
        num_bits += 8;
        while num_bits >= 5 {
            num_bits -= 5;
            out.push(ALPHABET[((bits >> num_bits) & 0x1f) as usize] as char);
        }
    }
    if num_bits > 0 {
        out.push(ALPHABET[((bits << (5 - num_bits)) & 0x1f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_id_is_deterministic() {
        let a = Finding::new("road_id_exists", "uri", Severity::Warning, "missing road 9")
            .with_road("1");
        let b = Finding::new("road_id_exists", "other-uri", Severity::Warning, "missing road 9")
            .with_road("1");
        assert_eq!(a.finding_id, b.finding_id);
        assert!(a.finding_id.starts_with("f1_"));
    }

    #[test]
    fn finding_id_tracks_location() {
        let base = Finding::new("zero_width_at_start", "uri", Severity::Error, "m").with_road("1");
        let lane = base.clone().with_lane(-1);
        let other_lane = base.clone().with_lane(-2);
        assert_ne!(base.finding_id, lane.finding_id);
        assert_ne!(lane.finding_id, other_lane.finding_id);
    }

    #[test]
    fn base32hex_encoding_of_sha256_digest() {
        let encoded = base32hex_lower_no_pad(&Sha256::digest(b""));
        assert_eq!(encoded.len(), 52);
        assert!(encoded.chars().all(|c| c.is_ascii_digit() || ('a'..='v').contains(&c)));
        assert_eq!(base32hex_lower_no_pad(b"f"), "co");
        assert_eq!(base32hex_lower_no_pad(b"foobar"), "cpnmuoj1e8");
    }

    #[test]
    fn serializes_snake_case_without_empty_fields() {
        let finding =
            Finding::new("junctions_incoming_roads_number", "uri", Severity::Info, "one road")
                .with_junction("5");
        let json = serde_json::to_value(&finding).expect("serialize");
        assert_eq!(json["severity"], "info");
        assert_eq!(json["junction_id"], "5");
        assert!(json.get("road_id").is_none());
        assert!(json.get("low_confidence").is_none());
    }

    #[test]
    fn serialized_surface_is_stable() {
        let finding = Finding::new(
            "road_id_exists",
            "me.net:xodr:1.4.0:roads.id.exists",
            Severity::Warning,
            "successor road 99 of road 1 does not exist",
        )
        .with_road("1");
        insta::assert_json_snapshot!(finding, @r###"
        {
          "finding_id": "f1_joiq869i8o65n5r74ur3hmmt6gpsd5iis263p6cabe2b96dc53eg",
          "rule_id": "road_id_exists",
          "rule_uri": "me.net:xodr:1.4.0:roads.id.exists",
          "severity": "warning",
          "road_id": "1",
          "message": "successor road 99 of road 1 does not exist"
        }
        "###);
    }
}
