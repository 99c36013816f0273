use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tracelens::config::{self, Config};
use tracelens::domain::trace::{DecodeOutcome, TransactionTrace};
use tracelens::domain::{selector_from_name, Felt};
use tracelens::infrastructure::abi::{AbiScanner, LayeredSource};
use tracelens::infrastructure::llm::{ChatClient, Tense};
use tracelens::infrastructure::starknet::{Call, StarknetRpc};
use tracelens::modules::export::export;
use tracelens::modules::explain::explain;
use tracelens::modules::readable::render_outcome;
use tracelens::modules::simulate::{simulate_calls, simulate_past, SimulationReport};
use tracelens::modules::TraceDecoder;
use tracelens::store::{AbiCache, AddressLabel, LabelStore};

#[derive(Debug, Parser)]
#[command(
    name = "tracelens",
    version,
    about = "tracelens: decode Starknet transaction traces against contract ABIs"
)]
struct Args {
    /// Starknet JSON-RPC endpoint (defaults to $STARKNET_RPC_URL, then the config file)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// Log filter (e.g. info, tracelens=debug); RUST_LOG is used when absent
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a transaction's trace into a typed call tree
    Decode {
        /// Transaction hash to fetch the trace for
        #[arg(required_unless_present = "trace")]
        tx_hash: Option<Felt>,

        /// Decode a trace saved as JSON instead of fetching one
        #[arg(long, conflicts_with = "tx_hash")]
        trace: Option<PathBuf>,

        /// Also write the result to a .json or .csv file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Decode and render with address labels and token decimals
    Readable {
        tx_hash: Felt,
    },
    /// Decode, render and ask a language model to explain the transaction
    Explain {
        tx_hash: Felt,
    },
    /// Simulate account calls (or replay a mined transaction) and decode the trace
    Simulate {
        /// Mined transaction to present as a simulation
        #[arg(long, conflicts_with_all = ["sender", "calls"])]
        tx: Option<Felt>,

        /// Account submitting the calls
        #[arg(long, requires = "calls")]
        sender: Option<Felt>,

        #[arg(long, default_value = "0x0")]
        nonce: Felt,

        /// JSON file with `[{"contract_address", "entrypoint", "calldata"}]`
        #[arg(long, requires = "sender")]
        calls: Option<PathBuf>,

        /// Explain the simulated transaction in future tense
        #[arg(long)]
        explain: bool,
    },
    /// Print the entry point selector of a function name
    Selector {
        name: String,
    },
    /// Manage address labels
    Label {
        #[command(subcommand)]
        action: LabelCommand,
    },
}

#[derive(Debug, Subcommand)]
enum LabelCommand {
    /// Add or replace a label
    Set {
        address: Felt,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        decimals: Option<u32>,
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a label
    Rm {
        address: Felt,
    },
    /// List all labels
    Ls,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());
    let config = config::load();

    match args.command {
        Command::Selector { name } => {
            println!("{}", selector_from_name(&name));
            Ok(())
        }
        Command::Label { action } => run_label(action),
        Command::Decode {
            tx_hash,
            trace,
            output,
        } => {
            let source = interface_source(&config, args.rpc.as_deref())?;
            let decoder = TraceDecoder::new(&source).with_concurrency(config.resolve_concurrency);
            let outcome = match (trace, tx_hash) {
                (Some(path), _) => decoder.decode_trace(read_trace(&path)?).await?,
                (None, Some(hash)) => decoder.decode_transaction(source.remote(), hash).await?,
                (None, None) => bail!("either a transaction hash or --trace is required"),
            };
            if let Some(path) = output {
                let count = export(&path, &outcome)?;
                info!(path = %path.display(), count, "exported calls");
            }
            print_json(&outcome)
        }
        Command::Readable { tx_hash } => {
            let source = interface_source(&config, args.rpc.as_deref())?;
            let decoder = TraceDecoder::new(&source).with_concurrency(config.resolve_concurrency);
            let outcome = decoder.decode_transaction(source.remote(), tx_hash).await?;
            let labels = open_labels()?;
            match render_outcome(&outcome, &labels) {
                Some(readable) => print_json(&[readable]),
                None => print_json(&outcome),
            }
        }
        Command::Explain { tx_hash } => {
            let source = interface_source(&config, args.rpc.as_deref())?;
            let decoder = TraceDecoder::new(&source).with_concurrency(config.resolve_concurrency);
            let outcome = decoder.decode_transaction(source.remote(), tx_hash).await?;
            explain_outcome(&config, &outcome, Tense::Past).await
        }
        Command::Simulate {
            tx,
            sender,
            nonce,
            calls,
            explain,
        } => {
            let source = interface_source(&config, args.rpc.as_deref())?;
            let decoder = TraceDecoder::new(&source).with_concurrency(config.resolve_concurrency);
            let report: SimulationReport = match (tx, sender, calls) {
                (Some(hash), _, _) => simulate_past(source.remote(), &decoder, hash).await?,
                (None, Some(sender), Some(path)) => {
                    let calls = read_calls(&path)?;
                    simulate_calls(source.remote(), &decoder, sender, nonce, &calls).await?
                }
                _ => bail!("either --tx or --sender with --calls is required"),
            };
            if explain {
                explain_outcome(&config, &report.outcome, Tense::Future).await
            } else {
                print_json(&report)
            }
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// RPC client behind local ABI overrides and the persistent class cache
fn interface_source(config: &Config, rpc_flag: Option<&str>) -> Result<LayeredSource<StarknetRpc>> {
    let url = config
        .rpc_url(rpc_flag)
        .ok_or_else(|| anyhow!("no RPC endpoint: pass --rpc or set {}", config::RPC_URL_ENV))?;
    let rpc = StarknetRpc::new(url, config.request_timeout())?;
    let mut source = LayeredSource::new(rpc);

    let roots = config.abi_roots();
    if !roots.is_empty() {
        let local = AbiScanner::scan_roots(&roots);
        for err in &local.errors {
            warn!(target: "tracelens::abi", %err, "ABI scan error");
        }
        debug!(
            target: "tracelens::abi",
            files = local.scanned_files,
            interfaces = local.len(),
            ms = local.scan_ms,
            "scanned local ABIs"
        );
        source = source.with_local(local);
    }

    match config::abi_cache_db_path() {
        Some(path) => match ensure_parent(&path).and_then(|()| AbiCache::open(&path)) {
            Ok(cache) => source = source.with_cache(cache),
            Err(err) => warn!(target: "tracelens::abi", %err, "ABI cache unavailable"),
        },
        None => debug!(target: "tracelens::abi", "no data dir, ABI cache disabled"),
    }
    Ok(source)
}

fn open_labels() -> Result<LabelStore> {
    match config::labels_db_path() {
        Some(path) => {
            ensure_parent(&path)?;
            LabelStore::open(&path)
        }
        None => {
            warn!("no data dir, labels are not persisted");
            LabelStore::open_in_memory()
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

async fn explain_outcome(config: &Config, outcome: &DecodeOutcome, tense: Tense) -> Result<()> {
    let labels = open_labels()?;
    let Some(readable) = render_outcome(outcome, &labels) else {
        // nothing to explain; the revert reason is the answer
        return print_json(outcome);
    };
    let client = ChatClient::new(
        config.llm_url.clone(),
        config.llm_model.clone(),
        config.llm_api_key(),
        config.request_timeout(),
    )?;
    let explanation = explain(&client, &readable, tense).await?;
    print_json(&explanation)
}

fn run_label(action: LabelCommand) -> Result<()> {
    let store = open_labels()?;
    match action {
        LabelCommand::Set {
            address,
            name,
            label,
            symbol,
            decimals,
            image,
        } => {
            let entry = AddressLabel {
                address_name: name,
                label_name: label,
                symbol,
                decimals,
                image_url: image,
                ..AddressLabel::new(&address)
            };
            store.set(&entry)?;
            println!("{}", entry.address);
        }
        LabelCommand::Rm { address } => {
            if !store.remove(&address)? {
                bail!("no label for {}", address.to_fixed_hex());
            }
        }
        LabelCommand::Ls => print_json(&store.load_all()?)?,
    }
    Ok(())
}

fn read_trace(path: &Path) -> Result<TransactionTrace> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a transaction trace", path.display()))
}

fn read_calls(path: &Path) -> Result<Vec<Call>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a list of calls", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
