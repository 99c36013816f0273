//! Human-readable rendering of a decoded call tree
//!
//! Contract addresses are swapped for their labels, token amounts are scaled
//! by the token's decimals and each call is flattened into a single
//! `name(arg=value,...)` action string.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::abi::{DecodedValue, ParamType, Value};
use crate::domain::trace::{CallType, DecodeOutcome, DecodedInvocation};
use crate::domain::Felt;
use crate::store::{AddressLabel, LabelStore};

/// Account entry point rendered without arguments
const EXECUTE_ENTRYPOINT: &str = "__execute__";

/// Source of address labels
pub trait LabelLookup {
    fn label(&self, address: &Felt) -> Option<AddressLabel>;
}

impl LabelLookup for LabelStore {
    fn label(&self, address: &Felt) -> Option<AddressLabel> {
        match self.get(address) {
            Ok(label) => label,
            Err(err) => {
                warn!(target: "tracelens::labels", %address, %err, "label lookup failed");
                None
            }
        }
    }
}

impl LabelLookup for HashMap<Felt, AddressLabel> {
    fn label(&self, address: &Felt) -> Option<AddressLabel> {
        self.get(address).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanReadableTrace {
    pub contract: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub action: String,
    pub internal_calls: Vec<HumanReadableTrace>,
}

impl HumanReadableTrace {
    /// Image URLs in the tree, pre-order, without repeats
    pub fn images(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(url) = &node.image_url {
                if !out.contains(url) {
                    out.push(url.clone());
                }
            }
            stack.extend(node.internal_calls.iter().rev());
        }
        out
    }
}

/// Render a decode outcome; a reverted transaction has nothing to render
pub fn render_outcome<L: LabelLookup + ?Sized>(
    outcome: &DecodeOutcome,
    labels: &L,
) -> Option<HumanReadableTrace> {
    match outcome {
        DecodeOutcome::Reverted { .. } => None,
        DecodeOutcome::Decoded(root) => Some(render(root, labels)),
    }
}

pub fn render<L: LabelLookup + ?Sized>(node: &DecodedInvocation, labels: &L) -> HumanReadableTrace {
    let label = labels.label(&node.contract_address);
    let contract = match &label {
        Some(label) => contract_name(label, &node.contract_address),
        None => node.contract_address.to_fixed_hex(),
    };

    let name = node
        .function_name
        .clone()
        .unwrap_or_else(|| node.entry_point_selector.to_string());
    let action = if name == EXECUTE_ENTRYPOINT {
        name
    } else {
        let decimals = label.as_ref().and_then(|label| label.decimals);
        let args: Vec<String> = node
            .inputs
            .iter()
            .map(|input| render_argument(input, decimals, labels))
            .collect();
        let prefix = if node.call_type == CallType::DeployAccount {
            "deployAccountAnd"
        } else {
            ""
        };
        format!("{prefix}{name}({})", args.join(","))
    };

    HumanReadableTrace {
        contract,
        image_url: label.and_then(|label| label.image_url),
        action,
        internal_calls: node
            .internal_calls
            .iter()
            .map(|child| render(child, labels))
            .collect(),
    }
}

/// `"<label> <name> (<symbol>)"`, dropping the parts that are not set
fn contract_name(label: &AddressLabel, address: &Felt) -> String {
    let mut out = String::new();
    if let Some(label_name) = &label.label_name {
        out.push_str(label_name);
        out.push(' ');
    }
    match (&label.address_name, &label.symbol) {
        (Some(name), Some(symbol)) => out.push_str(&format!("{name} ({symbol})")),
        (Some(name), None) => out.push_str(name),
        (None, Some(symbol)) => out.push_str(symbol),
        (None, None) => out.push_str(&address.to_fixed_hex()),
    }
    out
}

/// Short name for an address argument: label and name or symbol
fn address_name(label: &AddressLabel) -> Option<String> {
    let name = label.address_name.as_ref().or(label.symbol.as_ref())?;
    Some(match &label.label_name {
        Some(label_name) => format!("{label_name} {name}"),
        None => name.clone(),
    })
}

fn render_argument<L: LabelLookup + ?Sized>(
    input: &DecodedValue,
    decimals: Option<u32>,
    labels: &L,
) -> String {
    let rendered = match (ParamType::parse(&input.kind), &input.value) {
        (ParamType::U256, Value::Scalar(raw)) => match decimals {
            Some(decimals) if decimals > 0 => format_units(raw, decimals),
            _ => raw.clone(),
        },
        (ParamType::ContractAddress, Value::Scalar(raw)) => raw
            .parse::<Felt>()
            .ok()
            .and_then(|address| labels.label(&address))
            .and_then(|label| address_name(&label))
            .unwrap_or_else(|| raw.clone()),
        (_, value) => value.to_string(),
    };
    format!("{}={rendered}", input.name)
}

/// Scale a decimal integer string down by `decimals` places.
///
/// Trailing zeros of the fraction are dropped, and so is the point when
/// nothing is left after it.
pub fn format_units(raw: &str, decimals: u32) -> String {
    let digits = raw.trim_start_matches('0');
    let decimals = decimals as usize;
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (integer, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_label(address: u64) -> AddressLabel {
        AddressLabel {
            address_name: Some("Ether".into()),
            symbol: Some("ETH".into()),
            decimals: Some(18),
            image_url: Some("https://img/eth.png".into()),
            ..AddressLabel::new(&Felt::from(address))
        }
    }

    fn node(
        address: u64,
        name: Option<&str>,
        inputs: Vec<DecodedValue>,
        children: Vec<DecodedInvocation>,
    ) -> DecodedInvocation {
        DecodedInvocation {
            contract_address: Felt::from(address),
            function_name: name.map(str::to_string),
            entry_point_selector: Felt::from(0xabcu64),
            call_type: CallType::Call,
            inputs,
            outputs: vec![],
            gaps: vec![],
            internal_calls: children,
        }
    }

    fn scalar(name: &str, kind: &str, value: &str) -> DecodedValue {
        DecodedValue {
            name: name.into(),
            kind: kind.into(),
            value: Value::Scalar(value.into()),
        }
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units("1500000000000000000", 18), "1.5");
        assert_eq!(format_units("1000000", 6), "1");
        assert_eq!(format_units("25", 6), "0.000025");
        assert_eq!(format_units("0", 18), "0");
    }

    #[test]
    fn test_render_transfer() {
        let mut labels = HashMap::new();
        labels.insert(Felt::from(1u64), token_label(1));
        let mut wallet = AddressLabel::new(&Felt::from(9u64));
        wallet.label_name = Some("Argent".into());
        wallet.address_name = Some("Account".into());
        labels.insert(Felt::from(9u64), wallet);

        let transfer = node(
            1,
            Some("transfer"),
            vec![
                scalar("recipient", "core::starknet::contract_address::ContractAddress", "0x9"),
                scalar("amount", "core::integer::u256", "2500000000000000000"),
            ],
            vec![],
        );
        let root = node(5, Some("__execute__"), vec![scalar("calls", "felt", "1")], vec![transfer]);

        let readable = render(&root, &labels);
        assert_eq!(readable.contract, Felt::from(5u64).to_fixed_hex());
        assert_eq!(readable.action, "__execute__");
        let child = &readable.internal_calls[0];
        assert_eq!(child.contract, "Ether (ETH)");
        assert_eq!(child.action, "transfer(recipient=Argent Account,amount=2.5)");
        assert_eq!(readable.images(), vec!["https://img/eth.png".to_string()]);
    }

    #[test]
    fn test_deploy_account_prefix_and_unknown_selector() {
        let labels: HashMap<Felt, AddressLabel> = HashMap::new();
        let mut fee = node(1, Some("transfer"), vec![], vec![]);
        fee.call_type = CallType::DeployAccount;
        assert_eq!(render(&fee, &labels).action, "deployAccountAndtransfer()");

        let unknown = node(1, None, vec![], vec![]);
        assert_eq!(render(&unknown, &labels).action, "0xabc()");
    }

    #[test]
    fn test_reverted_outcome_renders_nothing() {
        let outcome = DecodeOutcome::Reverted {
            revert_reason: "nope".into(),
        };
        let labels: HashMap<Felt, AddressLabel> = HashMap::new();
        assert!(render_outcome(&outcome, &labels).is_none());
    }
}
