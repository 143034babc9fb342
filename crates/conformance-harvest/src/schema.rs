//! Versioned interchange encoding for harvested catalogs.
//!
//! The record shape changed between corpus generations: the first harvester
//! wrote capitalized level labels and knew no assertion tag; current
//! documents carry the closed tag set and snake_case labels. Decoding
//! accepts both and migrates legacy records forward, so corpora harvested
//! under the old schema replay unchanged. Byte fields travel as lowercase
//! hex. Reading and writing operate on byte slices only; file handling
//! stays with the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::case::{from_hex, to_hex, AssertTag, ConformanceLevel, HarvestedCase, WireSyntax};

pub const CATALOG_SCHEMA_V1: &str = "conformance-harvest.catalog.v1";
pub const CATALOG_SCHEMA_V2: &str = "conformance-harvest.catalog.v2";
pub const CURRENT_SCHEMA: &str = CATALOG_SCHEMA_V2;

pub const ERROR_MALFORMED_DOCUMENT: &str = "CH-SCHEMA-3001";
pub const ERROR_UNSUPPORTED_SCHEMA: &str = "CH-SCHEMA-3002";
pub const ERROR_EMPTY_CASE_NAME: &str = "CH-SCHEMA-3003";
pub const ERROR_UNKNOWN_LEVEL: &str = "CH-SCHEMA-3004";
pub const ERROR_UNKNOWN_SYNTAX: &str = "CH-SCHEMA-3005";
pub const ERROR_UNKNOWN_ASSERT_TAG: &str = "CH-SCHEMA-3006";
pub const ERROR_MALFORMED_HEX: &str = "CH-SCHEMA-3007";
pub const ERROR_SERIALIZATION: &str = "CH-SCHEMA-3008";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("catalog document is not valid JSON: {0}")]
    MalformedDocument(String),
    #[error("unsupported catalog schema `{found}`")]
    UnsupportedSchema { found: String },
    #[error("case at index {index} has an empty name")]
    EmptyCaseName { index: usize },
    #[error("unknown conformance level `{label}` in case `{name}`")]
    UnknownLevel { name: String, label: String },
    #[error("unknown syntax `{label}` in case `{name}`")]
    UnknownSyntax { name: String, label: String },
    #[error("unknown assert tag `{label}` in case `{name}`")]
    UnknownAssertTag { name: String, label: String },
    #[error("malformed hex in field `{field}` of case `{name}`: {reason}")]
    MalformedHex {
        name: String,
        field: String,
        reason: String,
    },
    #[error("catalog serialization failure: {0}")]
    SerializationFailure(String),
}

impl SchemaError {
    pub fn stable_code(&self) -> &'static str {
        match self {
            Self::MalformedDocument(_) => ERROR_MALFORMED_DOCUMENT,
            Self::UnsupportedSchema { .. } => ERROR_UNSUPPORTED_SCHEMA,
            Self::EmptyCaseName { .. } => ERROR_EMPTY_CASE_NAME,
            Self::UnknownLevel { .. } => ERROR_UNKNOWN_LEVEL,
            Self::UnknownSyntax { .. } => ERROR_UNKNOWN_SYNTAX,
            Self::UnknownAssertTag { .. } => ERROR_UNKNOWN_ASSERT_TAG,
            Self::MalformedHex { .. } => ERROR_MALFORMED_HEX,
            Self::SerializationFailure(_) => ERROR_SERIALIZATION,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Current archived form of one harvested case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub name: String,
    /// Lowercase hex of the serialized request.
    pub payload: String,
    pub level: String,
    pub syntax: String,
    /// Lowercase hex; empty when no equivalent encoding applies.
    pub equivalent: String,
    pub require_same_wire_format: bool,
    pub assert_by: String,
}

impl CaseRecord {
    pub fn from_case(case: &HarvestedCase) -> Self {
        Self {
            name: case.name.clone(),
            payload: to_hex(&case.payload),
            level: case.level.as_str().to_string(),
            syntax: case.syntax.as_str().to_string(),
            equivalent: to_hex(&case.equivalent),
            require_same_wire_format: case.require_same_wire_format,
            assert_by: case.assert_by.as_str().to_string(),
        }
    }

    /// Decodes the record back into the in-memory case shape, enforcing the
    /// closed label domains. `index` is the record's position in the
    /// document, used when the name itself is unusable.
    pub fn to_case(&self, index: usize) -> Result<HarvestedCase, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyCaseName { index });
        }
        let level =
            ConformanceLevel::parse(&self.level).ok_or_else(|| SchemaError::UnknownLevel {
                name: self.name.clone(),
                label: self.level.clone(),
            })?;
        let syntax = WireSyntax::parse(&self.syntax).ok_or_else(|| SchemaError::UnknownSyntax {
            name: self.name.clone(),
            label: self.syntax.clone(),
        })?;
        let assert_by =
            AssertTag::parse(&self.assert_by).ok_or_else(|| SchemaError::UnknownAssertTag {
                name: self.name.clone(),
                label: self.assert_by.clone(),
            })?;
        let payload = from_hex(&self.payload).map_err(|reason| SchemaError::MalformedHex {
            name: self.name.clone(),
            field: "payload".to_string(),
            reason,
        })?;
        let equivalent = from_hex(&self.equivalent).map_err(|reason| SchemaError::MalformedHex {
            name: self.name.clone(),
            field: "equivalent".to_string(),
            reason,
        })?;
        Ok(HarvestedCase {
            name: self.name.clone(),
            payload,
            level,
            syntax,
            equivalent,
            require_same_wire_format: self.require_same_wire_format,
            assert_by,
        })
    }
}

/// First-generation record: capitalized level labels, no assertion tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCaseRecord {
    pub name: String,
    pub payload: String,
    pub level: String,
    pub syntax: String,
    pub equivalent: String,
    pub require_same_wire_format: bool,
}

impl LegacyCaseRecord {
    /// Lifts a legacy record to the current schema. The first-generation
    /// harvester kept only the valid-input path, so every legacy record
    /// checks by equivalence.
    pub fn migrate(&self, index: usize) -> Result<CaseRecord, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyCaseName { index });
        }
        let level = match self.level.as_str() {
            "Required" | "required" => ConformanceLevel::Required,
            "Recommended" | "recommended" => ConformanceLevel::Recommended,
            other => {
                return Err(SchemaError::UnknownLevel {
                    name: self.name.clone(),
                    label: other.to_string(),
                })
            }
        };
        let syntax = match self.syntax.as_str() {
            "Proto2" | "proto2" => WireSyntax::Proto2,
            "Proto3" | "proto3" => WireSyntax::Proto3,
            other => {
                return Err(SchemaError::UnknownSyntax {
                    name: self.name.clone(),
                    label: other.to_string(),
                })
            }
        };
        Ok(CaseRecord {
            name: self.name.clone(),
            payload: self.payload.clone(),
            level: level.as_str().to_string(),
            syntax: syntax.as_str().to_string(),
            equivalent: self.equivalent.clone(),
            require_same_wire_format: self.require_same_wire_format,
            assert_by: AssertTag::Equivalence.as_str().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Archive document
// ---------------------------------------------------------------------------

/// Complete catalog document in the current schema. Loading a v1 document
/// migrates it transparently; the loaded value always reports
/// [`CURRENT_SCHEMA`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogArchive {
    pub schema_version: String,
    #[serde(default)]
    pub generated_at_utc: String,
    #[serde(default)]
    pub source_label: String,
    pub cases: Vec<CaseRecord>,
}

#[derive(Deserialize)]
struct SchemaProbe {
    schema_version: String,
}

#[derive(Deserialize)]
struct LegacyArchive {
    #[serde(default)]
    generated_at_utc: String,
    #[serde(default)]
    source_label: String,
    cases: Vec<LegacyCaseRecord>,
}

impl CatalogArchive {
    pub fn to_json_vec(&self) -> Result<Vec<u8>, SchemaError> {
        serde_json::to_vec(self).map_err(|err| SchemaError::SerializationFailure(err.to_string()))
    }

    /// Parses an archive document, dispatching on its schema string and
    /// migrating v1 records forward. Unknown schema strings are rejected.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        let probe: SchemaProbe = serde_json::from_slice(bytes)
            .map_err(|err| SchemaError::MalformedDocument(err.to_string()))?;
        match probe.schema_version.as_str() {
            CATALOG_SCHEMA_V2 => serde_json::from_slice(bytes)
                .map_err(|err| SchemaError::MalformedDocument(err.to_string())),
            CATALOG_SCHEMA_V1 => {
                let legacy: LegacyArchive = serde_json::from_slice(bytes)
                    .map_err(|err| SchemaError::MalformedDocument(err.to_string()))?;
                let mut cases = Vec::with_capacity(legacy.cases.len());
                for (index, record) in legacy.cases.iter().enumerate() {
                    cases.push(record.migrate(index)?);
                }
                Ok(Self {
                    schema_version: CURRENT_SCHEMA.to_string(),
                    generated_at_utc: legacy.generated_at_utc,
                    source_label: legacy.source_label,
                    cases,
                })
            }
            _ => Err(SchemaError::UnsupportedSchema {
                found: probe.schema_version,
            }),
        }
    }

    /// Decodes every record into the in-memory case shape.
    pub fn decode_cases(&self) -> Result<Vec<HarvestedCase>, SchemaError> {
        let mut cases = Vec::with_capacity(self.cases.len());
        for (index, record) in self.cases.iter().enumerate() {
            cases.push(record.to_case(index)?);
        }
        Ok(cases)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_case() -> HarvestedCase {
        HarvestedCase::equivalence(
            "Required.Proto3.ProtobufInput.Scalar.ProtobufOutput",
            vec![0x0a, 0x02, 0x08, 0x2a],
            ConformanceLevel::Required,
            WireSyntax::Proto3,
            vec![0x08, 0x2a],
            false,
        )
    }

    fn sample_failure_case() -> HarvestedCase {
        HarvestedCase::failure(
            "Required.Proto3.ProtobufInput.Truncated.ProtobufOutput",
            vec![0x0a, 0x01, 0x08],
            ConformanceLevel::Required,
            AssertTag::ParseFailure,
        )
    }

    // ── record round trips ─────────────────────────────────────────────

    #[test]
    fn current_record_round_trips_every_field() {
        for case in [sample_case(), sample_failure_case()] {
            let record = CaseRecord::from_case(&case);
            assert_eq!(record.to_case(0).unwrap(), case);
        }
    }

    #[test]
    fn record_encodes_bytes_as_lowercase_hex() {
        let record = CaseRecord::from_case(&sample_case());
        assert_eq!(record.payload, "0a02082a");
        assert_eq!(record.equivalent, "082a");
        assert_eq!(record.level, "required");
        assert_eq!(record.assert_by, "equivalence");
    }

    #[test]
    fn record_rejects_unknown_labels_with_stable_codes() {
        let mut record = CaseRecord::from_case(&sample_case());
        record.level = "mandatory".to_string();
        let err = record.to_case(0).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownLevel { .. }));
        assert_eq!(err.stable_code(), ERROR_UNKNOWN_LEVEL);

        let mut record = CaseRecord::from_case(&sample_case());
        record.assert_by = "Equivalence".to_string();
        let err = record.to_case(0).unwrap_err();
        assert_eq!(err.stable_code(), ERROR_UNKNOWN_ASSERT_TAG);

        let mut record = CaseRecord::from_case(&sample_case());
        record.syntax = "editions".to_string();
        let err = record.to_case(0).unwrap_err();
        assert_eq!(err.stable_code(), ERROR_UNKNOWN_SYNTAX);
    }

    #[test]
    fn record_rejects_bad_hex_and_empty_names() {
        let mut record = CaseRecord::from_case(&sample_case());
        record.payload = "0a0".to_string();
        let err = record.to_case(0).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MalformedHex { ref field, .. } if field == "payload"
        ));
        assert_eq!(err.stable_code(), ERROR_MALFORMED_HEX);

        let mut record = CaseRecord::from_case(&sample_case());
        record.name = String::new();
        let err = record.to_case(3).unwrap_err();
        assert_eq!(err, SchemaError::EmptyCaseName { index: 3 });
        assert_eq!(err.stable_code(), ERROR_EMPTY_CASE_NAME);
    }

    // ── archive documents ──────────────────────────────────────────────

    #[test]
    fn current_archive_round_trips() {
        let archive = CatalogArchive {
            schema_version: CURRENT_SCHEMA.to_string(),
            generated_at_utc: "2024-11-02T09:00:00Z".to_string(),
            source_label: "/dev/null".to_string(),
            cases: vec![
                CaseRecord::from_case(&sample_case()),
                CaseRecord::from_case(&sample_failure_case()),
            ],
        };
        let bytes = archive.to_json_vec().unwrap();
        let back = CatalogArchive::from_json_slice(&bytes).unwrap();
        assert_eq!(back, archive);
        assert_eq!(
            back.decode_cases().unwrap(),
            vec![sample_case(), sample_failure_case()]
        );
    }

    #[test]
    fn legacy_archive_migrates_to_equivalence() {
        let document = format!(
            r#"{{
                "schema_version": "{CATALOG_SCHEMA_V1}",
                "cases": [
                    {{
                        "name": "Required.Proto3.ProtobufInput.Old.ProtobufOutput",
                        "payload": "0a02082a",
                        "level": "Required",
                        "syntax": "Proto3",
                        "equivalent": "082a",
                        "require_same_wire_format": false
                    }},
                    {{
                        "name": "Recommended.Proto3.ProtobufInput.Older.ProtobufOutput",
                        "payload": "",
                        "level": "Recommended",
                        "syntax": "proto3",
                        "equivalent": "",
                        "require_same_wire_format": true
                    }}
                ]
            }}"#
        );
        let archive = CatalogArchive::from_json_slice(document.as_bytes()).unwrap();
        assert_eq!(archive.schema_version, CURRENT_SCHEMA);
        assert_eq!(archive.cases.len(), 2);
        assert!(archive
            .cases
            .iter()
            .all(|record| record.assert_by == "equivalence"));
        assert_eq!(archive.cases[0].level, "required");
        assert_eq!(archive.cases[0].payload, "0a02082a");

        let cases = archive.decode_cases().unwrap();
        assert_eq!(cases[0].payload, vec![0x0a, 0x02, 0x08, 0x2a]);
        assert_eq!(cases[0].assert_by, AssertTag::Equivalence);
        assert_eq!(cases[1].level, ConformanceLevel::Recommended);
        assert!(cases[1].require_same_wire_format);
    }

    #[test]
    fn legacy_archive_with_unknown_level_is_rejected() {
        let document = format!(
            r#"{{
                "schema_version": "{CATALOG_SCHEMA_V1}",
                "cases": [
                    {{
                        "name": "X",
                        "payload": "",
                        "level": "Optional",
                        "syntax": "Proto3",
                        "equivalent": "",
                        "require_same_wire_format": false
                    }}
                ]
            }}"#
        );
        let err = CatalogArchive::from_json_slice(document.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownLevel { ref label, .. } if label == "Optional"));
        assert_eq!(err.stable_code(), ERROR_UNKNOWN_LEVEL);
    }

    #[test]
    fn unknown_schema_string_is_rejected() {
        let document = r#"{"schema_version": "conformance-harvest.catalog.v9", "cases": []}"#;
        let err = CatalogArchive::from_json_slice(document.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnsupportedSchema {
                found: "conformance-harvest.catalog.v9".to_string()
            }
        );
        assert_eq!(err.stable_code(), ERROR_UNSUPPORTED_SCHEMA);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = CatalogArchive::from_json_slice(b"not json").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedDocument(_)));
        assert_eq!(err.stable_code(), ERROR_MALFORMED_DOCUMENT);
    }

    #[test]
    fn error_messages_name_the_offending_case() {
        let err = SchemaError::UnknownLevel {
            name: "Required.Proto3.X".to_string(),
            label: "mandatory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown conformance level `mandatory` in case `Required.Proto3.X`"
        );
    }
}
