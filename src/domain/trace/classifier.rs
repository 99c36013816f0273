//! Picks the invocation to decode, or the revert reason that stops decoding

use super::{CallType, FunctionInvocation, Invocation, TransactionTrace};
use crate::domain::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Root(FunctionInvocation),
    Reverted(String),
}

/// Classify a trace.
///
/// Reverts are checked in validate, execute, fee transfer order. The root is
/// the execute invocation, else validate, else fee transfer; a fee transfer
/// root is marked as an account deployment.
pub fn classify(trace: TransactionTrace) -> Result<Classification, DecodeError> {
    let TransactionTrace {
        validate_invocation,
        execute_invocation,
        fee_transfer_invocation,
        ..
    } = trace;

    for slot in [
        &validate_invocation,
        &execute_invocation,
        &fee_transfer_invocation,
    ] {
        if let Some(Invocation::Reverted(reverted)) = slot {
            return Ok(Classification::Reverted(reverted.revert_reason.clone()));
        }
    }

    let success = |slot: Option<Invocation>| match slot {
        Some(Invocation::Success(invocation)) => Some(invocation),
        _ => None,
    };

    if let Some(root) = success(execute_invocation).or_else(|| success(validate_invocation)) {
        return Ok(Classification::Root(root));
    }
    match success(fee_transfer_invocation) {
        Some(mut root) => {
            root.call_type = CallType::DeployAccount;
            Ok(Classification::Root(root))
        }
        None => Err(DecodeError::EmptyTrace),
    }
}
