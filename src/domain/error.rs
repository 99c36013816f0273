//! Errors raised while decoding a transaction trace

use thiserror::Error;

use super::Felt;

/// Fatal decode failures.
///
/// Unknown selectors and unsupported parameter types are not errors; they
/// are reported as gaps on the decoded node instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Interface or proxy implementation lookup failed for an address
    #[error("interface lookup failed for {address}")]
    LookupFailed {
        address: Felt,
        #[source]
        source: anyhow::Error,
    },

    /// The trace carries no invocation to decode
    #[error("trace has no validate, execute or fee transfer invocation")]
    EmptyTrace,
}
