//! Limits fed to the router's timeout and body-size layers.

use std::time::Duration;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Allowance for the JSON fields around the envelope in a create request.
pub const BODY_OVERHEAD: usize = 4096;

/// Request body limit for a given maximum envelope length.
pub fn body_limit(max_envelope_len: usize) -> usize {
    max_envelope_len.saturating_add(BODY_OVERHEAD)
}
