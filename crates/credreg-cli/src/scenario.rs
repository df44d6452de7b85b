//! # Scenario Files
//!
//! A scenario is a YAML document describing a genesis ledger and the blocks
//! of operations to run against it.
//!
//! ```yaml
//! accounts:
//!   - address: ownermca
//!     seed: "0101010101010101010101010101010101010101010101010101010101010101"
//!   - address: holdermca
//! contracts:
//!   - address: contractmca
//!     owner: ownermca
//!     operators: []
//! currencies:
//!   - id: MCC
//!     fee: { kind: fixed, receiver: ownermca, amount: 5 }
//! balances:
//!   - { address: ownermca, currency: MCC, amount: 1000 }
//! blocks:
//!   - - signers: [ownermca]
//!       fact:
//!         kind: register_model
//!         token: "746f6b31"
//!         sender: ownermca
//!         contract: contractmca
//!         currency: MCC
//! ```
//!
//! Accounts without a seed get a fresh random key; they can hold
//! credentials and balances but cannot sign.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use credreg_core::{Address, Amount, CurrencyId};
use credreg_crypto::Ed25519KeyPair;
use credreg_operation::{MemoryLedger, Operation, OperationFact};
use credreg_state::FeePolicy;

/// Top-level scenario document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub accounts: Vec<AccountSpec>,
    #[serde(default)]
    pub contracts: Vec<ContractSpec>,
    #[serde(default)]
    pub currencies: Vec<CurrencySpec>,
    #[serde(default)]
    pub balances: Vec<BalanceSpec>,
    /// Operations grouped by block. Each block runs in its own session.
    #[serde(default)]
    pub blocks: Vec<Vec<OperationSpec>>,
}

/// A plain account.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSpec {
    pub address: Address,
    /// Hex-encoded 32-byte Ed25519 seed.
    #[serde(default)]
    pub seed: Option<String>,
}

/// A contract account.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractSpec {
    pub address: Address,
    pub owner: Address,
    #[serde(default)]
    pub operators: Vec<Address>,
}

/// A currency and its fee policy.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurrencySpec {
    pub id: CurrencyId,
    pub fee: FeePolicy,
}

/// An opening balance.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BalanceSpec {
    pub address: Address,
    pub currency: CurrencyId,
    pub amount: Amount,
}

/// An unsigned fact and the accounts that sign it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationSpec {
    pub signers: Vec<Address>,
    pub fact: OperationFact,
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    /// Parse a scenario document.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Build the genesis ledger and the signing keys of seeded accounts.
    pub fn genesis(&self) -> Result<Genesis> {
        let mut ledger = MemoryLedger::new();
        let mut keys = BTreeMap::new();

        for account in &self.accounts {
            match &account.seed {
                Some(seed) => {
                    let key = Ed25519KeyPair::from_seed_hex(seed)
                        .with_context(|| format!("invalid seed for {}", account.address))?;
                    ledger.add_account(&account.address, key.public_key());
                    keys.insert(account.address.clone(), key);
                }
                None => ledger.add_account(&account.address, Ed25519KeyPair::generate().public_key()),
            }
        }
        for contract in &self.contracts {
            ledger.add_contract_account(
                &contract.address,
                &contract.owner,
                contract.operators.clone(),
            );
        }
        for currency in &self.currencies {
            ledger.add_currency(&currency.id, currency.fee.clone());
        }
        for balance in &self.balances {
            ledger.set_balance(&balance.address, &balance.currency, balance.amount);
        }

        tracing::debug!(
            accounts = self.accounts.len(),
            contracts = self.contracts.len(),
            currencies = self.currencies.len(),
            states = ledger.len(),
            "genesis ledger built"
        );
        Ok(Genesis { ledger, keys })
    }
}

/// Ledger and signing keys derived from a scenario.
#[derive(Debug)]
pub struct Genesis {
    pub ledger: MemoryLedger,
    keys: BTreeMap<Address, Ed25519KeyPair>,
}

impl Genesis {
    /// Sign `spec.fact` with every listed signer.
    pub fn sign(&self, spec: &OperationSpec, network_id: &[u8]) -> Result<Operation> {
        let mut op = Operation::new(spec.fact.clone());
        for signer in &spec.signers {
            let Some(key) = self.keys.get(signer) else {
                bail!("signer {signer} has no seed in the scenario");
            };
            op.sign(key, network_id);
        }
        Ok(op)
    }
}
