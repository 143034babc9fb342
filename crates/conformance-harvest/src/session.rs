//! Harvesting session: owns the catalog the hooks append to, the discarded
//! diagnostics surfaced to operators, and the structured run log.
//!
//! One session per harvesting context, created by the caller and passed to
//! the orchestrator; nothing is shared between sessions, so concurrent
//! harvesting means one session per thread rather than a lock. The catalog
//! is append-only while hooks fire and is never cleared implicitly;
//! [`HarvestSession::reset`] is the explicit isolation mechanism.

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::case::{ConformanceLevel, HarvestedCase};
use crate::classify::{classify_diagnostic, DiscardedDiagnostic, ERROR_UNRECOGNIZED_DIAGNOSTIC};
use crate::suite::{CaseSink, RequestSetting};
use crate::wire::{ConformanceRequest, ConformanceResponse};

/// One structured observability record. Collected on the session rather than
/// emitted through a logging framework so a harvesting run's full story
/// travels with its results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestLogEvent {
    pub component: String,
    pub event: String,
    pub outcome: String,
    pub suite: Option<String>,
    pub test_name: Option<String>,
    pub error_code: Option<String>,
    pub detail: Option<String>,
}

/// Owner of all per-harvest mutable state.
#[derive(Debug, Default)]
pub struct HarvestSession {
    catalog: Vec<HarvestedCase>,
    discards: Vec<DiscardedDiagnostic>,
    log: Vec<HarvestLogEvent>,
}

impl HarvestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered catalog, append order preserved.
    pub fn catalog(&self) -> &[HarvestedCase] {
        &self.catalog
    }

    /// Diagnostics that matched nothing in the taxonomy.
    pub fn discards(&self) -> &[DiscardedDiagnostic] {
        &self.discards
    }

    pub fn log(&self) -> &[HarvestLogEvent] {
        &self.log
    }

    /// Drops every harvested case, discard record, and log event. The only
    /// way catalog contents leave the session short of dropping it.
    pub fn reset(&mut self) {
        self.catalog.clear();
        self.discards.clear();
        self.log.clear();
    }

    pub(crate) fn push_event(&mut self, event: HarvestLogEvent) {
        self.log.push(event);
    }
}

impl CaseSink for HarvestSession {
    fn on_valid_case(
        &mut self,
        setting: &RequestSetting,
        equivalent_wire_format: &[u8],
        require_same_wire_format: bool,
    ) {
        let payload = setting.serialized_request();
        self.push_event(HarvestLogEvent {
            component: "harvest_session".to_string(),
            event: "valid_case_recorded".to_string(),
            outcome: "recorded".to_string(),
            suite: None,
            test_name: Some(setting.test_name.clone()),
            error_code: None,
            detail: None,
        });
        self.catalog.push(HarvestedCase::equivalence(
            setting.test_name.clone(),
            payload,
            setting.level,
            setting.syntax,
            equivalent_wire_format.to_vec(),
            require_same_wire_format,
        ));
    }

    fn on_failure(
        &mut self,
        test_name: &str,
        level: ConformanceLevel,
        request: &ConformanceRequest,
        _response: &ConformanceResponse,
        diagnostic: &str,
    ) {
        match classify_diagnostic(test_name, diagnostic) {
            Some(tag) => {
                self.push_event(HarvestLogEvent {
                    component: "harvest_session".to_string(),
                    event: "failure_case_recorded".to_string(),
                    outcome: "recorded".to_string(),
                    suite: None,
                    test_name: Some(test_name.to_string()),
                    error_code: None,
                    detail: Some(tag.as_str().to_string()),
                });
                // Payload is always the request, never the response.
                self.catalog.push(HarvestedCase::failure(
                    test_name,
                    request.encode_to_vec(),
                    level,
                    tag,
                ));
            }
            None => {
                self.push_event(HarvestLogEvent {
                    component: "harvest_session".to_string(),
                    event: "diagnostic_discarded".to_string(),
                    outcome: "discarded".to_string(),
                    suite: None,
                    test_name: Some(test_name.to_string()),
                    error_code: Some(ERROR_UNRECOGNIZED_DIAGNOSTIC.to_string()),
                    detail: Some(diagnostic.to_string()),
                });
                self.discards.push(DiscardedDiagnostic {
                    test_name: test_name.to_string(),
                    diagnostic: diagnostic.to_string(),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
