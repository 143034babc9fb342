//! Harvested-case value model: the record one conformance vector occupies in
//! the catalog, plus the strictness-level, syntax, and assertion-tag domains
//! it draws from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Syntax recorded on every failure-path case. The driver plumbs no syntax
/// into its failure reports, so harvesting pins this single identifier
/// regardless of the syntax the request was generated under. Known
/// limitation, kept rather than guessed around.
pub const FAILURE_PATH_SYNTAX: WireSyntax = WireSyntax::Proto3;

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

/// Strictness tier the suite attaches to a generated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConformanceLevel {
    Required,
    Recommended,
}

impl ConformanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Recommended => "recommended",
        }
    }

    /// Parses the canonical lowercase label. Legacy capitalized labels are
    /// handled by the archive migration, not here.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "required" => Some(Self::Required),
            "recommended" => Some(Self::Recommended),
            _ => None,
        }
    }

    /// Integer value the upstream level enumeration assigns.
    pub fn wire_value(&self) -> i32 {
        match self {
            Self::Required => 0,
            Self::Recommended => 1,
        }
    }

    pub fn from_wire_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Required),
            1 => Some(Self::Recommended),
            _ => None,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    pub fn is_recommended(&self) -> bool {
        matches!(self, Self::Recommended)
    }
}

impl fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol grammar version a test was generated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireSyntax {
    Proto2,
    Proto3,
}

impl WireSyntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proto2 => "proto2",
            Self::Proto3 => "proto3",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "proto2" => Some(Self::Proto2),
            "proto3" => Some(Self::Proto3),
            _ => None,
        }
    }
}

impl fmt::Display for WireSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of ways a downstream replay harness checks a harvested case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssertTag {
    /// Decode the payload and the equivalent encoding to the same value.
    #[serde(rename = "equivalence")]
    Equivalence,
    /// The payload must be rejected by the parser.
    #[serde(rename = "f_parse")]
    ParseFailure,
    /// The decoded payload must be rejected on re-serialization.
    #[serde(rename = "f_serialize")]
    SerializeFailure,
    /// The payload feeds a JSON validator run.
    #[serde(rename = "json_validator")]
    JsonValidator,
}

impl AssertTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equivalence => "equivalence",
            Self::ParseFailure => "f_parse",
            Self::SerializeFailure => "f_serialize",
            Self::JsonValidator => "json_validator",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "equivalence" => Some(Self::Equivalence),
            "f_parse" => Some(Self::ParseFailure),
            "f_serialize" => Some(Self::SerializeFailure),
            "json_validator" => Some(Self::JsonValidator),
            _ => None,
        }
    }

    /// True for the three tags the failure-reporting path can produce.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Equivalence)
    }
}

impl fmt::Display for AssertTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Case record
// ---------------------------------------------------------------------------

/// One harvested test vector. Created exactly once, at the instant a hook
/// fires, and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedCase {
    /// Non-empty identifier, unique within a harvesting run.
    pub name: String,
    /// Serialized form of the driver request, never of any response.
    pub payload: Vec<u8>,
    pub level: ConformanceLevel,
    pub syntax: WireSyntax,
    /// Alternate wire encoding that must decode to the same logical value;
    /// empty when not applicable.
    pub equivalent: Vec<u8>,
    /// Whether `equivalent` must match byte for byte rather than merely
    /// semantically.
    pub require_same_wire_format: bool,
    pub assert_by: AssertTag,
}

impl HarvestedCase {
    /// Case from the valid-input path: checked by equivalence downstream.
    pub fn equivalence(
        name: impl Into<String>,
        payload: Vec<u8>,
        level: ConformanceLevel,
        syntax: WireSyntax,
        equivalent: Vec<u8>,
        require_same_wire_format: bool,
    ) -> Self {
        Self {
            name: name.into(),
            payload,
            level,
            syntax,
            equivalent,
            require_same_wire_format,
            assert_by: AssertTag::Equivalence,
        }
    }

    /// Case from the failure-reporting path. `tag` comes from
    /// [`crate::classify::classify_diagnostic`] and is one of the three
    /// failure tags; the syntax is pinned to [`FAILURE_PATH_SYNTAX`] and no
    /// equivalent encoding applies.
    pub fn failure(
        name: impl Into<String>,
        payload: Vec<u8>,
        level: ConformanceLevel,
        tag: AssertTag,
    ) -> Self {
        Self {
            name: name.into(),
            payload,
            level,
            syntax: FAILURE_PATH_SYNTAX,
            equivalent: Vec::new(),
            require_same_wire_format: false,
            assert_by: tag,
        }
    }

    /// Typed view joining the tag with its operands.
    pub fn assertion(&self) -> Assertion {
        match self.assert_by {
            AssertTag::Equivalence => Assertion::Equivalence {
                equivalent: self.equivalent.clone(),
                require_same_wire_format: self.require_same_wire_format,
            },
            AssertTag::ParseFailure => Assertion::ParseFailure,
            AssertTag::SerializeFailure => Assertion::SerializeFailure,
            AssertTag::JsonValidator => Assertion::JsonValidator,
        }
    }
}

impl fmt::Display for HarvestedCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview_len = self.payload.len().min(12);
        let mut preview = to_hex(&self.payload[..preview_len]);
        if self.payload.len() > preview_len {
            preview.push_str("..");
        }
        write!(
            f,
            "{} [{} {} {}] payload {} bytes: {}",
            self.name,
            self.assert_by,
            self.level,
            self.syntax,
            self.payload.len(),
            preview
        )
    }
}

/// How a replay harness is meant to check one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    Equivalence {
        equivalent: Vec<u8>,
        require_same_wire_format: bool,
    },
    ParseFailure,
    SerializeFailure,
    JsonValidator,
}

// ---------------------------------------------------------------------------
// Hex helpers
// ---------------------------------------------------------------------------

/// Encode bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string to bytes. Accepts either letter case.
pub fn from_hex(hex: &str) -> Result<Vec<u8>, String> {
    if !hex.len().is_multiple_of(2) {
        return Err(format!("odd number of digits ({})", hex.len()));
    }
    let digit = |b: u8| {
        (b as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| format!("`{}` is not a hex digit", b as char))
    };
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for pair in hex.as_bytes().chunks_exact(2) {
        bytes.push((digit(pair[0])? << 4) | digit(pair[1])?);
    }
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── level domain ───────────────────────────────────────────────────

    #[test]
    fn level_labels_round_trip() {
        for level in [ConformanceLevel::Required, ConformanceLevel::Recommended] {
            assert_eq!(ConformanceLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(ConformanceLevel::parse("Required"), None);
        assert_eq!(ConformanceLevel::parse("optional"), None);
    }

    #[test]
    fn level_wire_values_match_upstream_enumeration() {
        assert_eq!(ConformanceLevel::Required.wire_value(), 0);
        assert_eq!(ConformanceLevel::Recommended.wire_value(), 1);
        assert_eq!(
            ConformanceLevel::from_wire_value(0),
            Some(ConformanceLevel::Required)
        );
        assert_eq!(
            ConformanceLevel::from_wire_value(1),
            Some(ConformanceLevel::Recommended)
        );
        assert_eq!(ConformanceLevel::from_wire_value(2), None);
    }

    #[test]
    fn level_predicates_have_correct_polarity() {
        assert!(ConformanceLevel::Required.is_required());
        assert!(!ConformanceLevel::Required.is_recommended());
        assert!(ConformanceLevel::Recommended.is_recommended());
        assert!(!ConformanceLevel::Recommended.is_required());
    }

    // ── syntax domain ──────────────────────────────────────────────────

    #[test]
    fn syntax_labels_round_trip() {
        assert_eq!(WireSyntax::parse("proto2"), Some(WireSyntax::Proto2));
        assert_eq!(WireSyntax::parse("proto3"), Some(WireSyntax::Proto3));
        assert_eq!(WireSyntax::parse("Proto3"), None);
        assert_eq!(WireSyntax::parse("editions"), None);
    }

    #[test]
    fn failure_path_syntax_is_proto3() {
        assert_eq!(FAILURE_PATH_SYNTAX, WireSyntax::Proto3);
    }

    // ── assert tag domain ──────────────────────────────────────────────

    #[test]
    fn assert_tag_labels_round_trip() {
        let expected = [
            (AssertTag::Equivalence, "equivalence"),
            (AssertTag::ParseFailure, "f_parse"),
            (AssertTag::SerializeFailure, "f_serialize"),
            (AssertTag::JsonValidator, "json_validator"),
        ];
        for (tag, label) in expected {
            assert_eq!(tag.as_str(), label);
            assert_eq!(AssertTag::parse(label), Some(tag));
        }
        assert_eq!(AssertTag::parse("F_PARSE"), None);
        assert_eq!(AssertTag::parse("parse_failure"), None);
    }

    #[test]
    fn assert_tag_serde_uses_canonical_labels() {
        let json = serde_json::to_string(&AssertTag::ParseFailure).unwrap();
        assert_eq!(json, "\"f_parse\"");
        let parsed: AssertTag = serde_json::from_str("\"json_validator\"").unwrap();
        assert_eq!(parsed, AssertTag::JsonValidator);
    }

    #[test]
    fn failure_tags_exclude_equivalence() {
        assert!(!AssertTag::Equivalence.is_failure());
        assert!(AssertTag::ParseFailure.is_failure());
        assert!(AssertTag::SerializeFailure.is_failure());
        assert!(AssertTag::JsonValidator.is_failure());
    }

    // ── case constructors ──────────────────────────────────────────────

    #[test]
    fn equivalence_constructor_populates_all_fields() {
        let case = HarvestedCase::equivalence(
            "Required.Proto3.ProtobufInput.Scalar.ProtobufOutput",
            vec![0x0a, 0x01],
            ConformanceLevel::Required,
            WireSyntax::Proto3,
            vec![0x08, 0x01],
            true,
        );
        assert_eq!(case.assert_by, AssertTag::Equivalence);
        assert_eq!(case.payload, vec![0x0a, 0x01]);
        assert_eq!(case.equivalent, vec![0x08, 0x01]);
        assert!(case.require_same_wire_format);
        assert_eq!(
            case.assertion(),
            Assertion::Equivalence {
                equivalent: vec![0x08, 0x01],
                require_same_wire_format: true,
            }
        );
    }

    #[test]
    fn failure_constructor_pins_syntax_and_clears_equivalent() {
        let case = HarvestedCase::failure(
            "Required.Proto3.ProtobufInput.Truncated.ProtobufOutput",
            vec![0x08],
            ConformanceLevel::Required,
            AssertTag::ParseFailure,
        );
        assert_eq!(case.syntax, FAILURE_PATH_SYNTAX);
        assert!(case.equivalent.is_empty());
        assert!(!case.require_same_wire_format);
        assert_eq!(case.assertion(), Assertion::ParseFailure);
    }

    #[test]
    fn display_previews_payload_hex() {
        let case = HarvestedCase::failure(
            "Recommended.Proto3.JsonInput.X.Validator",
            vec![0xde, 0xad, 0xbe, 0xef],
            ConformanceLevel::Recommended,
            AssertTag::JsonValidator,
        );
        let rendered = case.to_string();
        assert!(rendered.contains("Recommended.Proto3.JsonInput.X.Validator"));
        assert!(rendered.contains("json_validator"));
        assert!(rendered.contains("deadbeef"));
        assert!(rendered.contains("4 bytes"));
    }

    #[test]
    fn display_truncates_long_payloads() {
        let case = HarvestedCase::failure(
            "Required.Proto3.ProtobufInput.Long.ProtobufOutput",
            vec![0xaa; 40],
            ConformanceLevel::Required,
            AssertTag::ParseFailure,
        );
        let rendered = case.to_string();
        assert!(rendered.contains(".."));
        assert!(rendered.contains("40 bytes"));
    }

    // ── hex helpers ────────────────────────────────────────────────────

    #[test]
    fn hex_round_trip() {
        let bytes = vec![0x00, 0x7f, 0xff, 0x10];
        assert_eq!(from_hex(&to_hex(&bytes)).unwrap(), bytes);
        assert_eq!(to_hex(&[]), "");
        assert_eq!(from_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn hex_rejects_odd_length_and_bad_chars() {
        let odd = from_hex("abc").unwrap_err();
        assert!(odd.contains("odd number of digits"));
        let bad = from_hex("zz").unwrap_err();
        assert!(bad.contains("not a hex digit"));
        assert_eq!(from_hex("DEad").unwrap(), vec![0xde, 0xad]);
    }
}
