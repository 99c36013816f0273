//! Transaction traces and the decoded call tree

mod builder;
mod classifier;
mod types;

pub use builder::build;
pub use classifier::{classify, Classification};
pub use types::{
    CallType, DecodeGap, DecodeOutcome, DecodedInvocation, FunctionInvocation, Invocation,
    RevertedInvocation, Side, TransactionTrace,
};
