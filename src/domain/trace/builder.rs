//! Rebuilds the invocation tree with decoded values at every node

use tracing::trace;

use super::{DecodeGap, DecodedInvocation, FunctionInvocation, Side};
use crate::domain::abi::{decode, InterfaceCache};

/// Decode `root` and all its descendants against already-resolved interfaces.
///
/// Nodes whose contract or selector is unknown keep their place in the tree
/// with no function name, empty inputs and outputs and an `UnknownSelector` gap.
pub fn build(root: &FunctionInvocation, cache: &InterfaceCache) -> DecodedInvocation {
    let signature = cache
        .get(&root.contract_address)
        .and_then(|contract| {
            contract
                .selectors
                .lookup(&root.entry_point_selector)
                .map(|function| (contract, function))
        });

    let mut gaps = Vec::new();
    let (function_name, inputs, outputs) = match signature {
        Some((contract, function)) => {
            let inputs = decode(&root.calldata, &function.inputs, &contract.catalog);
            let outputs = decode(&root.result, &function.outputs, &contract.catalog);
            trace!(
                target: "tracelens::decode",
                function = %function.name,
                consumed_inputs = inputs.consumed,
                calldata_len = root.calldata.len(),
                "decoded invocation"
            );
            gaps.extend(inputs.omitted.into_iter().map(|omission| DecodeGap::Parameter {
                side: Side::Inputs,
                omission,
            }));
            gaps.extend(outputs.omitted.into_iter().map(|omission| DecodeGap::Parameter {
                side: Side::Outputs,
                omission,
            }));
            (Some(function.name.clone()), inputs.values, outputs.values)
        }
        None => {
            trace!(
                target: "tracelens::decode",
                contract = %root.contract_address,
                selector = %root.entry_point_selector,
                "unknown selector"
            );
            gaps.push(DecodeGap::UnknownSelector);
            (None, Vec::new(), Vec::new())
        }
    };

    DecodedInvocation {
        contract_address: root.contract_address,
        function_name,
        entry_point_selector: root.entry_point_selector,
        call_type: root.call_type,
        inputs,
        outputs,
        gaps,
        internal_calls: root.calls.iter().map(|child| build(child, cache)).collect(),
    }
}
