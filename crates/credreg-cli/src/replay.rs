//! # Replay Subcommand
//!
//! Runs a scenario file through the operation processors. Each block gets
//! its own `BlockSession`; every operation is pre-processed, processed and
//! committed to the in-memory ledger before the next one runs, so later
//! operations observe earlier ones.
//!
//! The report lists the outcome of every operation and the final
//! credential-registry states (designs, templates, credentials, holder
//! DIDs). Host ledger records are included with `--all-states`.
//!
//! Exit code 0 when no operation failed fatally, 2 otherwise. Rejections
//! are expected outcomes and do not change the exit code.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use credreg_operation::{BlockSession, OperationKind, OperationProcessor, ProcessorConfig};
use credreg_state::keys::{is_credential_key, is_design_key, is_holder_did_key, is_template_key};
use credreg_state::StateValue;

use crate::scenario::Scenario;

/// Arguments for the `credreg replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to the scenario YAML file.
    pub scenario: PathBuf,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Include host ledger records (accounts, balances, currencies) in the
    /// reported state.
    #[arg(long)]
    pub all_states: bool,
}

/// What happened to one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Processed and committed.
    Accepted {
        /// Number of directives committed.
        directives: usize,
    },
    /// A fact or state-precondition failure.
    Rejected {
        /// Rendered error.
        error: String,
    },
    /// Committed state is inconsistent with the fact.
    Fatal {
        /// Rendered error.
        error: String,
    },
}

/// One line of the report.
#[derive(Debug, Serialize)]
pub struct OperationReport {
    /// Zero-based block number.
    pub block: usize,
    /// Position within the block.
    pub index: usize,
    /// Operation kind.
    pub kind: OperationKind,
    /// Hex fact hash.
    pub fact_hash: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// The full replay report.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    /// Network id the operations were signed for.
    pub network_id: String,
    /// Count of accepted operations.
    pub accepted: usize,
    /// Count of rejected operations.
    pub rejected: usize,
    /// Count of fatal failures.
    pub fatal: usize,
    /// Per-operation outcomes in replay order.
    pub operations: Vec<OperationReport>,
    /// Final states, keyed by state key.
    pub states: BTreeMap<String, StateValue>,
}

/// Execute the replay subcommand.
pub fn run_replay(args: &ReplayArgs, config: ProcessorConfig) -> Result<u8> {
    let scenario = Scenario::load(&args.scenario)?;
    let report = replay(&scenario, config, args.all_states)?;

    let json = serde_json::to_string_pretty(&report)?;
    match &args.out {
        Some(path) => write_report(path, &json)?,
        None => println!("{json}"),
    }

    tracing::info!(
        accepted = report.accepted,
        rejected = report.rejected,
        fatal = report.fatal,
        "replay finished"
    );
    Ok(if report.fatal > 0 { 2 } else { 0 })
}

/// Run every block of `scenario` and collect the report.
pub fn replay(
    scenario: &Scenario,
    config: ProcessorConfig,
    all_states: bool,
) -> Result<ReplayReport> {
    let mut genesis = scenario.genesis()?;
    let network_id = config.network_id.clone();
    let processor = OperationProcessor::new(config);
    let mut session = BlockSession::open(&processor);
    let mut operations = Vec::new();

    for (block, specs) in scenario.blocks.iter().enumerate() {
        tracing::debug!(block, operations = specs.len(), "block opened");
        for (index, spec) in specs.iter().enumerate() {
            let op = genesis.sign(spec, network_id.as_bytes())?;
            let result = session
                .pre_process(&op, &genesis.ledger)
                .and_then(|()| session.process(&op, &genesis.ledger));
            let outcome = match result {
                Ok(directives) => {
                    genesis.ledger.commit(&directives).with_context(|| {
                        format!("block {block} operation {index}: failed to commit directives")
                    })?;
                    Outcome::Accepted {
                        directives: directives.len(),
                    }
                }
                Err(e) if e.is_fatal() => Outcome::Fatal {
                    error: e.to_string(),
                },
                Err(e) => Outcome::Rejected {
                    error: e.to_string(),
                },
            };
            operations.push(OperationReport {
                block,
                index,
                kind: op.fact.kind(),
                fact_hash: op.hash().to_hex(),
                outcome,
            });
        }
        session.close();
    }

    let count = |want: fn(&Outcome) -> bool| operations.iter().filter(|r| want(&r.outcome)).count();
    let accepted = count(|o| matches!(o, Outcome::Accepted { .. }));
    let rejected = count(|o| matches!(o, Outcome::Rejected { .. }));
    let fatal = count(|o| matches!(o, Outcome::Fatal { .. }));

    let states = genesis
        .ledger
        .filter_keys(|k| all_states || is_registry_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(ReplayReport {
        network_id,
        accepted,
        rejected,
        fatal,
        operations,
        states,
    })
}

fn is_registry_key(key: &str) -> bool {
    is_design_key(key) || is_template_key(key) || is_credential_key(key) || is_holder_did_key(key)
}

fn write_report(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    println!("  wrote: {}", path.display());
    Ok(())
}
