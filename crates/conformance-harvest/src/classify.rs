//! Maps driver failure diagnostics onto the closed assertion taxonomy.
//!
//! The driver exposes no structured outcome codes, only free text, so
//! matching is exact, ordered, and case-sensitive against the strings
//! published here. Wording drift on the driver side breaks classification
//! loudly in tests rather than silently reclassifying; that fragility is
//! accepted, not papered over. Anything outside the recognized set is
//! discarded and surfaced to operators, never guessed at.

use serde::{Deserialize, Serialize};

use crate::case::AssertTag;

/// An adversarial payload the parser was expected to reject went through.
pub const DIAG_PARSE_UNEXPECTED_SUCCESS: &str = "Should have failed to parse, but didn't.";

/// A value the serializer was expected to reject was serialized anyway.
pub const DIAG_SERIALIZE_UNEXPECTED_SUCCESS: &str = "Should have failed to serialize, but didn't.";

/// A JSON-output check saw an unset result oneof (field tag 0), which is
/// what the stub executor produces for every test.
pub const DIAG_JSON_EMPTY_RESULT: &str = "Expected JSON payload but got type 0";

/// Name fragment marking validator-runner tests.
pub const VALIDATOR_NAME_MARKER: &str = ".Validator";

/// Stable code attached to discard log events.
pub const ERROR_UNRECOGNIZED_DIAGNOSTIC: &str = "CH-CLASSIFY-2001";

/// Classifies one failure diagnostic. `None` means the diagnostic is outside
/// the recognized set and the case must be discarded; a `Some` value is
/// always one of the three failure tags, never [`AssertTag::Equivalence`].
pub fn classify_diagnostic(test_name: &str, diagnostic: &str) -> Option<AssertTag> {
    if diagnostic == DIAG_PARSE_UNEXPECTED_SUCCESS {
        return Some(AssertTag::ParseFailure);
    }
    if diagnostic == DIAG_SERIALIZE_UNEXPECTED_SUCCESS {
        return Some(AssertTag::SerializeFailure);
    }
    if diagnostic == DIAG_JSON_EMPTY_RESULT && test_name.contains(VALIDATOR_NAME_MARKER) {
        return Some(AssertTag::JsonValidator);
    }
    None
}

/// Diagnostic that matched nothing in the taxonomy, kept on the session for
/// operator inspection. The corresponding case is omitted from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardedDiagnostic {
    pub test_name: String,
    pub diagnostic: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── taxonomy table ─────────────────────────────────────────────────

    #[test]
    fn parse_diagnostic_classifies_regardless_of_name() {
        assert_eq!(
            classify_diagnostic("Required.Proto3.ProtobufInput.X", DIAG_PARSE_UNEXPECTED_SUCCESS),
            Some(AssertTag::ParseFailure)
        );
        assert_eq!(
            classify_diagnostic("anything", DIAG_PARSE_UNEXPECTED_SUCCESS),
            Some(AssertTag::ParseFailure)
        );
    }

    #[test]
    fn serialize_diagnostic_classifies_regardless_of_name() {
        assert_eq!(
            classify_diagnostic("", DIAG_SERIALIZE_UNEXPECTED_SUCCESS),
            Some(AssertTag::SerializeFailure)
        );
    }

    #[test]
    fn json_diagnostic_needs_validator_marker() {
        assert_eq!(
            classify_diagnostic(
                "Recommended.Proto3.JsonInput.FieldName.Validator",
                DIAG_JSON_EMPTY_RESULT
            ),
            Some(AssertTag::JsonValidator)
        );
        assert_eq!(
            classify_diagnostic(
                "Recommended.Proto3.JsonInput.FieldName.JsonOutput",
                DIAG_JSON_EMPTY_RESULT
            ),
            None
        );
    }

    #[test]
    fn validator_marker_is_a_plain_substring_check() {
        // No dot before "Validator": marker absent.
        assert_eq!(
            classify_diagnostic("RequiredValidator", DIAG_JSON_EMPTY_RESULT),
            None
        );
        // Marker mid-name counts.
        assert_eq!(
            classify_diagnostic("Required.Proto3.X.Validator.Tail", DIAG_JSON_EMPTY_RESULT),
            Some(AssertTag::JsonValidator)
        );
        // Marker as a prefix of a longer segment counts too.
        assert_eq!(
            classify_diagnostic("Required.ValidatorSuite.X", DIAG_JSON_EMPTY_RESULT),
            Some(AssertTag::JsonValidator)
        );
    }

    #[test]
    fn validator_name_without_diagnostic_does_not_classify() {
        assert_eq!(
            classify_diagnostic("Required.Proto3.X.Validator", "some other text"),
            None
        );
        assert_eq!(
            classify_diagnostic(
                "Required.Proto3.X.Validator",
                "Expected JSON payload but got type 3"
            ),
            None
        );
    }

    // ── near misses ────────────────────────────────────────────────────

    #[test]
    fn trailing_punctuation_is_rejected() {
        assert_eq!(
            classify_diagnostic("X", "Should have failed to parse, but didn't!"),
            None
        );
        assert_eq!(
            classify_diagnostic("X", "Should have failed to parse, but didn't. "),
            None
        );
    }

    #[test]
    fn case_changes_are_rejected() {
        assert_eq!(
            classify_diagnostic("X", "should have failed to parse, but didn't."),
            None
        );
        assert_eq!(
            classify_diagnostic("X.Validator", "expected JSON payload but got type 0"),
            None
        );
    }

    #[test]
    fn embedded_diagnostics_are_rejected() {
        assert_eq!(
            classify_diagnostic(
                "X",
                "note: Should have failed to parse, but didn't."
            ),
            None
        );
    }

    // ── closed-set guarantee ───────────────────────────────────────────

    #[test]
    fn classification_never_returns_equivalence() {
        let names = ["", "X", "X.Validator", "Required.Proto3.A.B"];
        let diagnostics = [
            DIAG_PARSE_UNEXPECTED_SUCCESS,
            DIAG_SERIALIZE_UNEXPECTED_SUCCESS,
            DIAG_JSON_EMPTY_RESULT,
            "unrelated",
            "",
        ];
        for name in names {
            for diagnostic in diagnostics {
                if let Some(tag) = classify_diagnostic(name, diagnostic) {
                    assert!(tag.is_failure());
                }
            }
        }
    }

    #[test]
    fn unrecognized_diagnostics_discard() {
        assert_eq!(classify_diagnostic("X", ""), None);
        assert_eq!(classify_diagnostic("X", "response could not be decoded"), None);
        assert_eq!(classify_diagnostic("X", "Output was not equivalent"), None);
    }
}
