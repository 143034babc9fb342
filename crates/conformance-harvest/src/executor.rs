//! Execution seam the suite drives generated tests through.
//!
//! Harvesting needs the suite only to generate cases and self-report
//! verdicts through its own oracle; it never needs an executed response. The
//! shipped executor therefore does nothing, which leaves every response
//! buffer empty and every result oneof unset, and that is precisely the
//! signal that makes the oracle emit the diagnostics classification feeds
//! on.

/// Pluggable execution backend for one generated test. Implementations must
/// not fail regardless of input; an executor with nothing to say leaves
/// `response_out` untouched.
pub trait TestExecutor {
    fn run_test(&mut self, test_name: &str, serialized_request: &[u8], response_out: &mut Vec<u8>);
}

/// Executor that performs no work and writes no response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopExecutor;

impl TestExecutor for NoopExecutor {
    fn run_test(
        &mut self,
        _test_name: &str,
        _serialized_request: &[u8],
        _response_out: &mut Vec<u8>,
    ) {
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
