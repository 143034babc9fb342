//! Shipped text-format suite variant. Off by default in the orchestrator
//! config; the binary+JSON variant is the one the extraction entry point has
//! always driven, and this roster exists for catalogs that also want
//! text-grammar coverage.

use prost::Message;

use crate::case::{ConformanceLevel, WireSyntax};
use crate::executor::TestExecutor;
use crate::suite::{
    run_seeds, AdversarialSeed, CaseSink, ConformanceSuite, OracleCheck, RequestSetting,
    SuiteBookkeeping, ValidSeed,
};
use crate::wire::{ConformanceRequest, TestAllTypesProto3, WireFormat};

pub const TEXT_FORMAT_SUITE_LABEL: &str = "text_format";

#[derive(Debug, Clone, PartialEq)]
pub struct TextFormatSuite {
    valid: Vec<ValidSeed>,
    adversarial: Vec<AdversarialSeed>,
    bookkeeping: SuiteBookkeeping,
}

impl TextFormatSuite {
    pub fn new() -> Self {
        Self {
            valid: valid_roster(),
            adversarial: adversarial_roster(),
            bookkeeping: SuiteBookkeeping::default(),
        }
    }
}

impl Default for TextFormatSuite {
    fn default() -> Self {
        Self::new()
    }
}

impl ConformanceSuite for TextFormatSuite {
    fn label(&self) -> &'static str {
        TEXT_FORMAT_SUITE_LABEL
    }

    fn bookkeeping(&self) -> &SuiteBookkeeping {
        &self.bookkeeping
    }

    fn bookkeeping_mut(&mut self) -> &mut SuiteBookkeeping {
        &mut self.bookkeeping
    }

    fn generate(&mut self, executor: &mut dyn TestExecutor, sink: &mut dyn CaseSink) {
        run_seeds(
            &self.valid,
            &self.adversarial,
            &mut self.bookkeeping,
            executor,
            sink,
        );
    }
}

/// Text-input seed: the equivalent encoding is the binary wire form the
/// text document must decode equal to.
fn text_seed(
    name: &str,
    level: ConformanceLevel,
    text: &str,
    message: &TestAllTypesProto3,
) -> ValidSeed {
    ValidSeed {
        setting: RequestSetting::new(
            name,
            level,
            WireSyntax::Proto3,
            ConformanceRequest::text_input(text, WireFormat::TextFormat),
        ),
        equivalent_wire_format: message.encode_to_vec(),
        require_same_wire_format: false,
    }
}

fn valid_roster() -> Vec<ValidSeed> {
    vec![
        text_seed(
            "Required.Proto3.TextFormatInput.ScalarField.TextFormatOutput",
            ConformanceLevel::Required,
            "optional_int32: 7",
            &TestAllTypesProto3 {
                optional_int32: 7,
                ..Default::default()
            },
        ),
        text_seed(
            "Recommended.Proto3.TextFormatInput.StringField.TextFormatOutput",
            ConformanceLevel::Recommended,
            "optional_string: \"vector\"",
            &TestAllTypesProto3 {
                optional_string: "vector".to_string(),
                ..Default::default()
            },
        ),
    ]
}

fn adversarial_roster() -> Vec<AdversarialSeed> {
    vec![AdversarialSeed {
        setting: RequestSetting::new(
            "Required.Proto3.TextFormatInput.UnterminatedString.TextFormatOutput",
            ConformanceLevel::Required,
            WireSyntax::Proto3,
            ConformanceRequest::text_input("optional_string: \"abc", WireFormat::TextFormat),
        ),
        check: OracleCheck::ExpectParseFailure,
    }]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::AssertTag;
    use crate::executor::NoopExecutor;
    use crate::session::HarvestSession;
    use crate::wire::conformance_request;

    #[test]
    fn noop_harvest_yields_two_equivalence_and_one_parse_failure() {
        let mut session = HarvestSession::new();
        let mut suite = TextFormatSuite::new();
        let mut executor = NoopExecutor;
        suite.generate(&mut executor, &mut session);

        assert_eq!(session.catalog().len(), 3);
        let tags: Vec<AssertTag> = session.catalog().iter().map(|c| c.assert_by).collect();
        assert_eq!(
            tags,
            vec![
                AssertTag::Equivalence,
                AssertTag::Equivalence,
                AssertTag::ParseFailure,
            ]
        );
        assert!(session.discards().is_empty());
        assert_eq!(suite.bookkeeping().test_names.len(), 1);
    }

    #[test]
    fn valid_seeds_carry_text_payloads_and_binary_equivalents() {
        let suite = TextFormatSuite::new();
        for seed in &suite.valid {
            match &seed.setting.request.payload {
                Some(conformance_request::Payload::TextPayload(text)) => {
                    assert!(text.starts_with("optional_"));
                }
                other => panic!("expected text payload, got {other:?}"),
            }
            assert!(
                !seed.equivalent_wire_format.is_empty(),
                "text seeds pin a binary equivalent"
            );
        }
    }

    #[test]
    fn roster_names_use_the_text_format_segment() {
        let suite = TextFormatSuite::new();
        assert!(suite
            .valid
            .iter()
            .all(|s| s.setting.test_name.contains(".TextFormatInput.")));
        assert!(suite
            .adversarial
            .iter()
            .all(|s| s.setting.test_name.contains(".TextFormatInput.")));
    }
}
