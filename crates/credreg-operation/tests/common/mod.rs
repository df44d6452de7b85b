//! Shared fixture: a genesis ledger with an owner, an operator, two
//! holders, one contract and one fee-charging currency.

#![allow(dead_code)]

use credreg_core::{Address, Amount, CurrencyId, Date};
use credreg_crypto::Ed25519KeyPair;
use credreg_operation::{
    AddTemplateFact, FactToken, IssueFact, IssueItem, MemoryLedger, Operation, OperationFact,
    OperationProcessor, ProcessError, ProcessorConfig, RegisterModelFact, RevokeFact, RevokeItem,
    StateMergeValue,
};
use credreg_state::keys::{credential_key, design_key, template_key};
use credreg_state::{Credential, FeePolicy, Policy, Template};

pub const FEE: u64 = 5;
pub const START_BALANCE: u64 = 1_000;

pub fn addr(s: &str) -> Address {
    Address::new(format!("{s}mca")).unwrap()
}

pub fn mcc() -> CurrencyId {
    CurrencyId::new("MCC").unwrap()
}

pub struct Harness {
    pub ledger: MemoryLedger,
    pub processor: OperationProcessor,
    pub owner: Ed25519KeyPair,
    pub operator: Ed25519KeyPair,
    pub stranger: Ed25519KeyPair,
    tokens: u32,
}

impl Harness {
    /// Fixed fee of [`FEE`] paid to `feemca`.
    pub fn new() -> Self {
        Self::with_fee(FeePolicy::Fixed {
            receiver: Some(addr("fee")),
            amount: Amount::from(FEE),
        })
    }

    pub fn with_fee(fee: FeePolicy) -> Self {
        let owner = Ed25519KeyPair::from_seed(&[1; 32]);
        let operator = Ed25519KeyPair::from_seed(&[2; 32]);
        let stranger = Ed25519KeyPair::from_seed(&[3; 32]);

        let mut ledger = MemoryLedger::new();
        ledger.add_account(&addr("owner"), owner.public_key());
        ledger.add_account(&addr("operator"), operator.public_key());
        ledger.add_account(&addr("stranger"), stranger.public_key());
        ledger.add_account(&addr("holder1"), Ed25519KeyPair::from_seed(&[4; 32]).public_key());
        ledger.add_account(&addr("holder2"), Ed25519KeyPair::from_seed(&[5; 32]).public_key());
        ledger.add_account(&addr("fee"), Ed25519KeyPair::from_seed(&[6; 32]).public_key());
        ledger.add_contract_account(&addr("contract"), &addr("owner"), vec![addr("operator")]);
        ledger.add_currency(&mcc(), fee);
        for who in ["owner", "operator", "stranger"] {
            ledger.set_balance(&addr(who), &mcc(), Amount::from(START_BALANCE));
        }
        ledger.set_balance(&addr("fee"), &mcc(), Amount::ZERO);

        Self {
            ledger,
            processor: OperationProcessor::new(ProcessorConfig::default()),
            owner,
            operator,
            stranger,
            tokens: 0,
        }
    }

    pub fn token(&mut self) -> FactToken {
        self.tokens += 1;
        FactToken::from_bytes(self.tokens.to_be_bytes().to_vec())
    }

    pub fn sign(&self, fact: impl Into<OperationFact>, key: &Ed25519KeyPair) -> Operation {
        Operation::new(fact).signed_by(key, self.processor.config().network_id_bytes())
    }

    /// Pre-process, process and commit. The ledger is untouched on error.
    pub fn run(&mut self, op: &Operation) -> Result<Vec<StateMergeValue>, ProcessError> {
        self.processor.pre_process(op, &self.ledger)?;
        let directives = self.processor.process(op, &self.ledger)?;
        self.ledger.commit(&directives).unwrap();
        Ok(directives)
    }

    // ─── Fact builders ───────────────────────────────────────────────

    pub fn register_fact(&mut self) -> RegisterModelFact {
        RegisterModelFact {
            token: self.token(),
            sender: addr("owner"),
            contract: addr("contract"),
            currency: mcc(),
        }
    }

    pub fn template_fact(&mut self, template_id: &str) -> AddTemplateFact {
        AddTemplateFact {
            token: self.token(),
            sender: addr("owner"),
            contract: addr("contract"),
            template_id: template_id.to_string(),
            template_name: "Diploma".to_string(),
            service_date: Date::parse("2024-01-01").unwrap(),
            expiration_date: Date::parse("2030-01-01").unwrap(),
            shareable: true,
            multi_audit: false,
            display_name: "Diploma".to_string(),
            subject_key: "subject".to_string(),
            description: "issued diploma".to_string(),
            creator: addr("owner"),
            currency: mcc(),
        }
    }

    pub fn issue_fact(&mut self, sender: &str, items: Vec<IssueItem>) -> IssueFact {
        IssueFact {
            token: self.token(),
            sender: addr(sender),
            items,
        }
    }

    pub fn revoke_fact(&mut self, sender: &str, items: Vec<RevokeItem>) -> RevokeFact {
        RevokeFact {
            token: self.token(),
            sender: addr(sender),
            items,
        }
    }

    // ─── Shortcuts ───────────────────────────────────────────────────

    pub fn register(&mut self) {
        let fact = self.register_fact();
        let op = self.sign(fact, &self.owner);
        self.run(&op).unwrap();
    }

    pub fn add_template(&mut self, template_id: &str) {
        let fact = self.template_fact(template_id);
        let op = self.sign(fact, &self.owner);
        self.run(&op).unwrap();
    }

    /// Registered contract with templates `tpl` and `tpl2`.
    pub fn ready() -> Self {
        let mut h = Self::new();
        h.register();
        h.add_template("tpl");
        h.add_template("tpl2");
        h
    }

    pub fn issue(&mut self, items: Vec<IssueItem>) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = self.issue_fact("owner", items);
        let op = self.sign(fact, &self.owner);
        self.run(&op)
    }

    pub fn revoke(&mut self, items: Vec<RevokeItem>) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = self.revoke_fact("owner", items);
        let op = self.sign(fact, &self.owner);
        self.run(&op)
    }

    // ─── State views ─────────────────────────────────────────────────

    pub fn policy(&self) -> Policy {
        self.ledger
            .get(&design_key(&addr("contract")))
            .and_then(|v| v.as_design())
            .map(|d| d.policy().clone())
            .unwrap()
    }

    pub fn template(&self, template_id: &str) -> Option<Template> {
        self.ledger
            .get(&template_key(&addr("contract"), template_id))
            .and_then(|v| v.as_template())
            .cloned()
    }

    pub fn credential(&self, template_id: &str, credential_id: &str) -> Option<(Credential, bool)> {
        self.ledger
            .get(&credential_key(&addr("contract"), template_id, credential_id))
            .and_then(|v| v.as_credential())
            .map(|(c, active)| (c.clone(), active))
    }

    pub fn balance(&self, who: &str) -> Amount {
        self.ledger.balance(&addr(who), &mcc())
    }
}

pub fn issue_item(holder: &str, template_id: &str, credential_id: &str, value: &str) -> IssueItem {
    IssueItem {
        contract: addr("contract"),
        holder: addr(holder),
        template_id: template_id.to_string(),
        credential_id: credential_id.to_string(),
        value: value.to_string(),
        valid_from: 100,
        valid_until: 200,
        did: format!("did:ex:{holder}"),
        currency: mcc(),
    }
}

pub fn revoke_item(holder: &str, template_id: &str, credential_id: &str) -> RevokeItem {
    RevokeItem {
        contract: addr("contract"),
        holder: addr(holder),
        template_id: template_id.to_string(),
        credential_id: credential_id.to_string(),
        currency: mcc(),
    }
}

/// Keys of the design directives in `directives`.
pub fn design_directives(directives: &[StateMergeValue]) -> usize {
    directives
        .iter()
        .filter(|d| credreg_state::keys::is_design_key(&d.key))
        .count()
}
