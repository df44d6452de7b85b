//! # credreg-cli — Command-Line Interface for the Credential Registry
//!
//! Provides the `credreg` binary.
//!
//! ## Subcommands
//!
//! - `credreg replay` — Build a genesis ledger from a scenario file, sign and
//!   run its operations block by block, and print a JSON report.
//! - `credreg keys` — Render or parse credential-registry state keys.
//!
//! ```bash
//! credreg replay demos/registry.yaml
//! credreg -v replay demos/registry.yaml --out report.json
//! credreg keys credential --contract contractmca --template tpl --credential c1
//! credreg keys parse credential:contractmca:design
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in their modules.
//! - Handlers delegate to `credreg-operation`; no processing logic here.

pub mod keys;
pub mod replay;
pub mod scenario;
