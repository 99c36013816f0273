//! Account multicall calldata

use serde::{Deserialize, Serialize};

use crate::domain::{selector_from_name, Felt};

/// One call an account's `__execute__` should make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub contract_address: Felt,
    pub entrypoint: String,
    #[serde(default)]
    pub calldata: Vec<Felt>,
}

impl Call {
    pub fn new(contract_address: Felt, entrypoint: impl Into<String>, calldata: Vec<Felt>) -> Self {
        Self {
            contract_address,
            entrypoint: entrypoint.into(),
            calldata,
        }
    }
}

/// Account calldata for `calls`:
/// `[n_calls, (to, selector, calldata_len, ...calldata)*]`
pub fn flatten_calls(calls: &[Call]) -> Vec<Felt> {
    let mut out = vec![Felt::from(calls.len() as u64)];
    for call in calls {
        out.push(call.contract_address);
        out.push(selector_from_name(&call.entrypoint));
        out.push(Felt::from(call.calldata.len() as u64));
        out.extend_from_slice(&call.calldata);
    }
    out
}
