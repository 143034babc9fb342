//! Generation-pass seam between the harvester and a conformance suite: the
//! request descriptor the valid-input hook receives, the capability object a
//! suite reports into, per-suite advisory bookkeeping, and the shared roster
//! plumbing the shipped suite variants drive their seeds through.
//!
//! Suites never learn the concrete sink type; hooks are injected as a
//! capability object rather than by subclassing a driver base class.

use std::collections::BTreeSet;

use prost::Message;

use crate::case::{ConformanceLevel, WireSyntax};
use crate::classify::{DIAG_PARSE_UNEXPECTED_SUCCESS, DIAG_SERIALIZE_UNEXPECTED_SUCCESS};
use crate::executor::TestExecutor;
use crate::wire::{conformance_response, ConformanceRequest, ConformanceResponse};

// ---------------------------------------------------------------------------
// Request descriptor and hooks
// ---------------------------------------------------------------------------

/// Descriptor for one generated valid input: everything the valid-input hook
/// needs to build a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSetting {
    /// Fully qualified dotted test name, unique within a run.
    pub test_name: String,
    pub level: ConformanceLevel,
    pub syntax: WireSyntax,
    pub request: ConformanceRequest,
}

impl RequestSetting {
    pub fn new(
        test_name: impl Into<String>,
        level: ConformanceLevel,
        syntax: WireSyntax,
        request: ConformanceRequest,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            level,
            syntax,
            request,
        }
    }

    /// Canonical wire form of the driver request. Encoding an in-memory
    /// message cannot fail, so neither can this.
    pub fn serialized_request(&self) -> Vec<u8> {
        self.request.encode_to_vec()
    }
}

/// Capability object a suite reports into while generating. One call per
/// valid input, one call per reported failure.
pub trait CaseSink {
    /// A valid input the suite wants exercised, together with the wire
    /// encoding it must decode equivalently to.
    fn on_valid_case(
        &mut self,
        setting: &RequestSetting,
        equivalent_wire_format: &[u8],
        require_same_wire_format: bool,
    );

    /// A generated test behaved unexpectedly. `response` is accepted for
    /// interface fidelity but carries no classification signal.
    fn on_failure(
        &mut self,
        test_name: &str,
        level: ConformanceLevel,
        request: &ConformanceRequest,
        response: &ConformanceResponse,
        diagnostic: &str,
    );
}

// ---------------------------------------------------------------------------
// Bookkeeping
// ---------------------------------------------------------------------------

/// Per-run counters and sets a suite maintains while generating. Advisory
/// only; downstream consumers rely solely on the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteBookkeeping {
    pub successes: u32,
    pub expected_failures: u32,
    pub skipped: BTreeSet<String>,
    pub test_names: BTreeSet<String>,
    pub unexpected_failing: BTreeSet<String>,
    pub unexpected_succeeding: BTreeSet<String>,
}

impl SuiteBookkeeping {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A conformance suite variant: owns its bookkeeping and a generation pass
/// that reports into an injected sink.
pub trait ConformanceSuite {
    fn label(&self) -> &'static str;
    fn bookkeeping(&self) -> &SuiteBookkeeping;
    fn bookkeeping_mut(&mut self) -> &mut SuiteBookkeeping;

    /// Runs the generation pass, invoking the sink's hooks for every
    /// generated case or reported failure.
    fn generate(&mut self, executor: &mut dyn TestExecutor, sink: &mut dyn CaseSink);
}

// ---------------------------------------------------------------------------
// Roster plumbing
// ---------------------------------------------------------------------------

/// What the suite oracle asserts about an executed test's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleCheck {
    ExpectParseFailure,
    ExpectSerializeFailure,
    ExpectJsonPayload,
}

/// Valid roster entry: harvested straight off the descriptor, never
/// executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSeed {
    pub setting: RequestSetting,
    pub equivalent_wire_format: Vec<u8>,
    pub require_same_wire_format: bool,
}

/// Adversarial roster entry: executed, then judged by the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct AdversarialSeed {
    pub setting: RequestSetting,
    pub check: OracleCheck,
}

enum Verdict {
    Met,
    Skipped(String),
    Unmet(String),
}

fn oracle_verdict(check: OracleCheck, response: &ConformanceResponse) -> Verdict {
    use conformance_response::Result as ResponseResult;

    if let Some(ResponseResult::Skipped(reason)) = &response.result {
        return Verdict::Skipped(reason.clone());
    }
    match check {
        OracleCheck::ExpectParseFailure => match &response.result {
            Some(ResponseResult::ParseError(_)) => Verdict::Met,
            _ => Verdict::Unmet(DIAG_PARSE_UNEXPECTED_SUCCESS.to_string()),
        },
        OracleCheck::ExpectSerializeFailure => match &response.result {
            Some(ResponseResult::SerializeError(_)) => Verdict::Met,
            _ => Verdict::Unmet(DIAG_SERIALIZE_UNEXPECTED_SUCCESS.to_string()),
        },
        OracleCheck::ExpectJsonPayload => match &response.result {
            Some(ResponseResult::JsonPayload(_)) => Verdict::Met,
            _ => Verdict::Unmet(format!(
                "Expected JSON payload but got type {}",
                response.result_tag()
            )),
        },
    }
}

/// Drives a variant's rosters: valid seeds go to the sink directly, bypassing
/// execution entirely; adversarial seeds run through the executor and any
/// unmet oracle expectation is reported as a failure with the driver's
/// wording.
pub(crate) fn run_seeds(
    valid: &[ValidSeed],
    adversarial: &[AdversarialSeed],
    bookkeeping: &mut SuiteBookkeeping,
    executor: &mut dyn TestExecutor,
    sink: &mut dyn CaseSink,
) {
    for seed in valid {
        sink.on_valid_case(
            &seed.setting,
            &seed.equivalent_wire_format,
            seed.require_same_wire_format,
        );
    }
    for seed in adversarial {
        let name = seed.setting.test_name.as_str();
        bookkeeping.test_names.insert(name.to_string());
        let serialized = seed.setting.serialized_request();
        let mut response_out = Vec::new();
        executor.run_test(name, &serialized, &mut response_out);
        let response = match ConformanceResponse::decode(response_out.as_slice()) {
            Ok(response) => response,
            Err(err) => {
                bookkeeping.unexpected_failing.insert(name.to_string());
                sink.on_failure(
                    name,
                    seed.setting.level,
                    &seed.setting.request,
                    &ConformanceResponse::default(),
                    &format!("response could not be decoded: {err}"),
                );
                continue;
            }
        };
        match oracle_verdict(seed.check, &response) {
            Verdict::Met => {
                bookkeeping.successes += 1;
            }
            Verdict::Skipped(_) => {
                bookkeeping.skipped.insert(name.to_string());
            }
            Verdict::Unmet(diagnostic) => {
                bookkeeping.unexpected_failing.insert(name.to_string());
                sink.on_failure(
                    name,
                    seed.setting.level,
                    &seed.setting.request,
                    &response,
                    &diagnostic,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scripted suite
// ---------------------------------------------------------------------------

/// One pre-recorded hook invocation for [`ScriptedSuite`].
#[derive(Debug, Clone, PartialEq)]
pub enum SuiteEvent {
    Valid {
        setting: RequestSetting,
        equivalent_wire_format: Vec<u8>,
        require_same_wire_format: bool,
    },
    Failure {
        test_name: String,
        level: ConformanceLevel,
        request: ConformanceRequest,
        response: ConformanceResponse,
        diagnostic: String,
    },
}

/// Replays a fixed event script through the hooks. The seam for feeding
/// captured driver output into a session without the shipped rosters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptedSuite {
    script: Vec<SuiteEvent>,
    bookkeeping: SuiteBookkeeping,
}

impl ScriptedSuite {
    pub fn new(script: Vec<SuiteEvent>) -> Self {
        Self {
            script,
            bookkeeping: SuiteBookkeeping::default(),
        }
    }
}

impl ConformanceSuite for ScriptedSuite {
    fn label(&self) -> &'static str {
        "scripted"
    }

    fn bookkeeping(&self) -> &SuiteBookkeeping {
        &self.bookkeeping
    }

    fn bookkeeping_mut(&mut self) -> &mut SuiteBookkeeping {
        &mut self.bookkeeping
    }

    fn generate(&mut self, _executor: &mut dyn TestExecutor, sink: &mut dyn CaseSink) {
        let Self {
            script,
            bookkeeping,
        } = self;
        for event in script.iter() {
            match event {
                SuiteEvent::Valid {
                    setting,
                    equivalent_wire_format,
                    require_same_wire_format,
                } => {
                    sink.on_valid_case(setting, equivalent_wire_format, *require_same_wire_format);
                }
                SuiteEvent::Failure {
                    test_name,
                    level,
                    request,
                    response,
                    diagnostic,
                } => {
                    bookkeeping.test_names.insert(test_name.clone());
                    bookkeeping.unexpected_failing.insert(test_name.clone());
                    sink.on_failure(test_name, *level, request, response, diagnostic);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
