//! ledgerops - balance-changing operations for sharded-chain transfers.
//!
//! # Usage
//!
//! ```bash
//! # Decompose indexed transfers (JSON array or one record per line)
//! ledgerops decompose --input transfers.json
//!
//! # Replay an account history against a known starting balance and
//! # compare it with the chain-reported balance history
//! ledgerops reconcile --address erd1... --starting-balance 1000 \
//!     --history balances.json --genesis-time 1648551600 < transfers.json
//!
//! # Environment overrides
//! MIN_GAS_LIMIT=50000 GAS_LIMIT_PER_BYTE=1500 ledgerops decompose
//! ```

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::DateTime;
use clap::{Args, Parser, Subcommand};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ledgerops_core::amount::parse_amount;
use ledgerops_core::metrics::init_metrics;
use ledgerops_core::models::{Operation, OperationDirection, TransferRecord};
use ledgerops_core::services::{BalanceHistory, BalanceRecord, BalanceTracker, round_to_timestamp};
use ledgerops_registry::{AddressEncoding, DecomposerConfig, DecomposerHandle, DecomposerRegistry};

/// ledgerops CLI.
#[derive(Parser, Debug)]
#[command(name = "ledgerops")]
#[command(about = "Decompose sharded-chain transfers into balance-changing operations")]
#[command(version)]
struct Cli {
    /// Minimum gas limit of any transaction.
    #[arg(long, env = "MIN_GAS_LIMIT", default_value = "50000", global = true)]
    min_gas_limit: u64,

    /// Gas charged per payload byte.
    #[arg(long, env = "GAS_LIMIT_PER_BYTE", default_value = "1500", global = true)]
    gas_limit_per_byte: u64,

    /// Length of account public keys in bytes.
    #[arg(long, env = "PUBKEY_LENGTH", default_value = "32", global = true)]
    pubkey_length: usize,

    /// Address encoding of records (bech32, hex).
    #[arg(long, env = "ADDRESS_ENCODING", default_value = "bech32", global = true)]
    address_encoding: AddressEncoding,

    /// Bech32 prefix of addresses.
    #[arg(long, env = "ADDRESS_HRP", default_value = "erd", global = true)]
    address_hrp: String,

    /// JSON decomposer config file. Overrides the gas and address flags.
    #[arg(long, env = "DECOMPOSER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS", global = true)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the operations of every record, one JSON object per line.
    Decompose {
        #[command(flatten)]
        input: InputArgs,

        /// Pretty-print each output object.
        #[arg(long)]
        pretty: bool,
    },

    /// Replay the operations touching one address and print a balance report.
    Reconcile(ReconcileArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Records file (JSON array or newline-delimited JSON). Reads stdin if omitted.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Log and skip records that cannot be decomposed instead of aborting.
    #[arg(long)]
    skip_errors: bool,
}

#[derive(Args, Debug)]
struct ReconcileArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Account to track.
    #[arg(long)]
    address: String,

    /// Balance before the first record.
    #[arg(long, default_value = "0", value_parser = parse_balance)]
    starting_balance: BigInt,

    /// Chain balance history of the account (JSON array or newline-delimited
    /// `{timestamp, balance}` records). Enables actual balance and delta lines.
    #[arg(long)]
    history: Option<PathBuf>,

    /// Chain genesis time; when set, history lookups use round start times
    /// instead of record timestamps.
    #[arg(long, env = "GENESIS_TIME")]
    genesis_time: Option<u64>,

    /// Round duration in seconds.
    #[arg(long, env = "ROUND_DURATION", default_value = "6")]
    round_duration: u64,
}

impl ReconcileArgs {
    /// Timestamp used to look up the actual balance of `record`.
    fn lookup_timestamp(&self, record: &TransferRecord) -> u64 {
        match self.genesis_time {
            Some(genesis) => round_to_timestamp(genesis, self.round_duration, record.round),
            None => record.timestamp,
        }
    }
}

/// Parse a signed decimal balance.
fn parse_balance(s: &str) -> Result<BigInt, String> {
    parse_amount(s).ok_or_else(|| format!("Invalid balance '{}': not a decimal integer", s))
}

/// One line of `decompose` output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecomposedRecord<'a> {
    tx_hash: &'a str,
    operations: &'a [Operation],
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);
    init_metrics();

    let config = load_config(&cli)?;
    debug!(?config, "Decomposer configuration");

    let registry = DecomposerRegistry::new();
    let handle = registry
        .create(config)
        .context("Failed to create decomposer")?;

    match cli.command {
        Command::Decompose { input, pretty } => run_decompose(&registry, handle, &input, pretty),
        Command::Reconcile(args) => run_reconcile(&registry, handle, &args),
    }
}

/// Initialize tracing subscriber. Logs go to stderr, stdout carries results.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<DecomposerConfig> {
    match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            DecomposerConfig::from_json(&json)
                .with_context(|| format!("Invalid config file {}", path.display()))
        }
        None => Ok(DecomposerConfig {
            min_gas_limit: cli.min_gas_limit,
            gas_limit_per_byte: cli.gas_limit_per_byte,
            pubkey_length: cli.pubkey_length,
            address_encoding: cli.address_encoding,
            address_hrp: cli.address_hrp.clone(),
        }),
    }
}

/// Read records from a file or stdin.
fn read_records(path: Option<&Path>) -> Result<Vec<TransferRecord>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read records from {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read records from stdin")?;
            text
        }
    };

    parse_records(&text)
}

/// Read a balance history file.
fn read_history(path: &Path) -> Result<BalanceHistory> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read balance history from {}", path.display()))?;
    let records: Vec<BalanceRecord> = parse_records(&text)
        .with_context(|| format!("Invalid balance history {}", path.display()))?;
    Ok(BalanceHistory::new(records))
}

/// Parse a JSON array of records, or one record per non-empty line.
fn parse_records<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).context("Invalid JSON array of records");
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid record on line {}", index + 1))
        })
        .collect()
}

/// Decompose one record, honouring `--skip-errors`.
fn decompose_record(
    registry: &DecomposerRegistry,
    handle: DecomposerHandle,
    record: &TransferRecord,
    skip_errors: bool,
) -> Result<Option<Vec<Operation>>> {
    match registry.decompose(handle, record) {
        Ok(operations) => Ok(Some(operations)),
        Err(e) if skip_errors => {
            warn!(tx = %record.hash, error = %e, "Skipping record");
            Ok(None)
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to decompose record {}", record.hash))
        }
    }
}

fn run_decompose(
    registry: &DecomposerRegistry,
    handle: DecomposerHandle,
    input: &InputArgs,
    pretty: bool,
) -> Result<()> {
    let records = read_records(input.input.as_deref())?;
    info!(records = records.len(), "Decomposing records");

    let mut out = BufWriter::new(io::stdout().lock());
    let mut skipped = 0usize;

    for record in &records {
        let Some(operations) = decompose_record(registry, handle, record, input.skip_errors)?
        else {
            skipped += 1;
            continue;
        };

        let line = DecomposedRecord {
            tx_hash: &record.hash,
            operations: &operations,
        };
        if pretty {
            serde_json::to_writer_pretty(&mut out, &line)?;
        } else {
            serde_json::to_writer(&mut out, &line)?;
        }
        writeln!(out)?;
    }
    out.flush()?;

    info!(
        decomposed = records.len() - skipped,
        skipped, "Decomposition complete"
    );
    Ok(())
}

fn run_reconcile(
    registry: &DecomposerRegistry,
    handle: DecomposerHandle,
    args: &ReconcileArgs,
) -> Result<()> {
    let records = read_records(args.input.input.as_deref())?;
    let history = args.history.as_deref().map(read_history).transpose()?;
    if let Some(history) = &history {
        info!(balance_records = history.len(), "Loaded balance history");
    }

    let mut out = BufWriter::new(io::stdout().lock());
    let final_delta = write_reconciliation(&mut out, registry, handle, args, records, history.as_ref())?;
    out.flush()?;

    check_final_delta(final_delta.as_ref())
}

/// Write the balance report and return the delta of the last transfer
/// checked against the history.
fn write_reconciliation<W: Write>(
    out: &mut W,
    registry: &DecomposerRegistry,
    handle: DecomposerHandle,
    args: &ReconcileArgs,
    mut records: Vec<TransferRecord>,
    history: Option<&BalanceHistory>,
) -> Result<Option<BigInt>> {
    if records.is_empty() {
        bail!("No records to reconcile");
    }
    records.sort_by_key(|record| (record.timestamp, record.round));

    let mut tracker = BalanceTracker::new(args.address.clone(), args.starting_balance.clone());
    let mut final_delta = None;

    writeln!(out, "Address: {}", tracker.address())?;
    writeln!(out, "Starting balance: {}", tracker.balance())?;

    for record in &records {
        let Some(operations) = decompose_record(registry, handle, record, args.input.skip_errors)?
        else {
            continue;
        };

        let delta = tracker.apply(record, &operations);

        writeln!(out)?;
        writeln!(out, "Round: {} ({})", record.round, render_time(record.timestamp))?;
        if record.is_smart_contract_result() {
            writeln!(out, "Smart Contract Result: {}", record.hash)?;
        } else {
            writeln!(out, "Transfer: {}", record.hash)?;
        }
        for entry in &delta.entries {
            match entry.direction {
                OperationDirection::Credit => {
                    writeln!(out, "\tCREDIT:\t + {} ({})", entry.amount, entry.operation_type)?
                }
                OperationDirection::Debit => {
                    writeln!(out, "\tDEBIT:\t - {} ({})", entry.amount, entry.operation_type)?
                }
            }
        }
        writeln!(out, "\t> Computed balance: {}", delta.balance)?;

        // Results land between balance snapshots, only transfers are checked
        let Some(history) = history else { continue };
        if record.is_smart_contract_result() {
            continue;
        }

        let actual = match args.genesis_time {
            Some(genesis) => {
                history.find_balance_at_round(genesis, args.round_duration, record.round)
            }
            None => history.find_balance_at(record.timestamp),
        };
        let Some(actual) = actual else {
            bail!(
                "No balance record at or after round {} (timestamp {})",
                record.round,
                args.lookup_timestamp(record)
            );
        };
        let balance_delta = tracker.delta_against(&actual.amount());

        writeln!(
            out,
            "\t> Actual balance: {} ({})",
            actual.amount(),
            render_time(actual.timestamp)
        )?;
        writeln!(out, "\t> Delta: {}", balance_delta)?;
        final_delta = Some(balance_delta);
    }

    writeln!(out)?;
    writeln!(out, "Final balance: {}", tracker.balance())?;

    info!(records = records.len(), balance = %tracker.balance(), "Reconciliation complete");
    Ok(final_delta)
}

/// Fail when the last checked balance does not match the history.
fn check_final_delta(delta: Option<&BigInt>) -> Result<()> {
    match delta {
        Some(delta) if !delta.is_zero() => bail!("Balance delta is not zero: {}", delta),
        _ => Ok(()),
    }
}

fn render_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}
