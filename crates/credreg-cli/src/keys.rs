//! # Keys Subcommand
//!
//! Renders credential-registry state keys from their components, or parses
//! a key string back into them. Components are validated the same way the
//! processors validate fact fields.

use anyhow::Result;
use clap::{Args, Subcommand};

use credreg_core::identity::{MAX_CREDENTIAL_ID_LEN, MAX_TEMPLATE_ID_LEN};
use credreg_core::{check_identifier, Address};
use credreg_state::keys::{credential_key, design_key, holder_did_key, template_key};
use credreg_state::{parse_state_key, StateKey};

/// Arguments for the `credreg keys` subcommand.
#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

/// Key subcommands.
#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Key of a contract's design.
    Design {
        #[arg(long)]
        contract: String,
    },
    /// Key of a registered template.
    Template {
        #[arg(long)]
        contract: String,
        #[arg(long = "template")]
        template_id: String,
    },
    /// Key of an issued credential.
    Credential {
        #[arg(long)]
        contract: String,
        #[arg(long = "template")]
        template_id: String,
        #[arg(long = "credential")]
        credential_id: String,
    },
    /// Key of a holder's DID under a contract.
    HolderDid {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        holder: String,
    },
    /// Split a key string into its components.
    Parse {
        key: String,
    },
}

/// Execute the keys subcommand.
pub fn run_keys(args: &KeysArgs) -> Result<u8> {
    println!("{}", render(&args.command)?);
    Ok(0)
}

/// The text printed for `command`.
pub fn render(command: &KeysCommand) -> Result<String> {
    let out = match command {
        KeysCommand::Design { contract } => design_key(&Address::new(contract.as_str())?),
        KeysCommand::Template {
            contract,
            template_id,
        } => {
            check_identifier("template_id", template_id, MAX_TEMPLATE_ID_LEN)?;
            template_key(&Address::new(contract.as_str())?, template_id)
        }
        KeysCommand::Credential {
            contract,
            template_id,
            credential_id,
        } => {
            check_identifier("template_id", template_id, MAX_TEMPLATE_ID_LEN)?;
            check_identifier("credential_id", credential_id, MAX_CREDENTIAL_ID_LEN)?;
            credential_key(&Address::new(contract.as_str())?, template_id, credential_id)
        }
        KeysCommand::HolderDid { contract, holder } => holder_did_key(
            &Address::new(contract.as_str())?,
            &Address::new(holder.as_str())?,
        ),
        KeysCommand::Parse { key } => describe(&parse_state_key(key)?),
    };
    Ok(out)
}

fn describe(key: &StateKey) -> String {
    match key {
        StateKey::Design { contract } => format!("design\n  contract: {contract}"),
        StateKey::Template {
            contract,
            template_id,
        } => format!("template\n  contract: {contract}\n  template_id: {template_id}"),
        StateKey::Credential {
            contract,
            template_id,
            credential_id,
        } => format!(
            "credential\n  contract: {contract}\n  template_id: {template_id}\n  credential_id: {credential_id}"
        ),
        StateKey::HolderDid { contract, holder } => {
            format!("holder-did\n  contract: {contract}\n  holder: {holder}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_credential_key() {
        let out = render(&KeysCommand::Credential {
            contract: "contractmca".into(),
            template_id: "tpl".into(),
            credential_id: "c1".into(),
        })
        .unwrap();
        assert_eq!(out, "credential:contractmca:tpl:c1:credential");
    }

    #[test]
    fn test_render_rejects_bad_address() {
        assert!(render(&KeysCommand::Design {
            contract: "nope".into()
        })
        .is_err());
    }

    #[test]
    fn test_render_rejects_separator_in_template_id() {
        assert!(render(&KeysCommand::Template {
            contract: "contractmca".into(),
            template_id: "a:b".into(),
        })
        .is_err());
    }

    #[test]
    fn test_parse_holder_did() {
        let out = render(&KeysCommand::Parse {
            key: "credential:contractmca:holdermca:holder-did".into(),
        })
        .unwrap();
        assert!(out.starts_with("holder-did"));
        assert!(out.contains("holder: holdermca"));
    }

    #[test]
    fn test_parse_rejects_foreign_key() {
        assert!(render(&KeysCommand::Parse {
            key: "balance:ownermca:MCC".into()
        })
        .is_err());
    }
}
