//! Externally visible account resources

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountThresholds {
    pub low_threshold: u8,
    pub med_threshold: u8,
    pub high_threshold: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFlags {
    pub auth_required: bool,
    pub auth_revocable: bool,
    pub auth_immutable: bool,
}

/// One balance line: a trust line, or the native balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_issuer: Option<String>,
    pub balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    pub buying_liabilities: String,
    pub selling_liabilities: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_ledger: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_authorized: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerResource {
    pub key: String,
    pub weight: i32,
    #[serde(rename = "type")]
    pub signer_type: String,
}

/// Full account resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResource {
    pub id: String,
    pub account_id: String,
    pub paging_token: String,
    pub sequence: String,
    pub subentry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflation_destination: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub home_domain: String,
    pub last_modified_ledger: u32,
    pub thresholds: AccountThresholds,
    pub flags: AccountFlags,
    pub balances: Vec<Balance>,
    pub signers: Vec<SignerResource>,
    /// Entry name to base64 value
    pub data: BTreeMap<String, String>,
}

/// Signer-scoped account summary returned by signer-mode listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSignerResource {
    pub id: String,
    pub account_id: String,
    pub paging_token: String,
    pub signer: SignerResource,
}

/// One row of a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountsRecord {
    Account(Box<AccountResource>),
    Signer(AccountSignerResource),
}

impl AccountsRecord {
    pub fn account_id(&self) -> &str {
        match self {
            AccountsRecord::Account(account) => &account.account_id,
            AccountsRecord::Signer(signer) => &signer.account_id,
        }
    }

    pub fn paging_token(&self) -> &str {
        match self {
            AccountsRecord::Account(account) => &account.paging_token,
            AccountsRecord::Signer(signer) => &signer.paging_token,
        }
    }

    pub fn as_account(&self) -> Option<&AccountResource> {
        match self {
            AccountsRecord::Account(account) => Some(account),
            AccountsRecord::Signer(_) => None,
        }
    }

    pub fn as_signer(&self) -> Option<&AccountSignerResource> {
        match self {
            AccountsRecord::Signer(signer) => Some(signer),
            AccountsRecord::Account(_) => None,
        }
    }
}

/// Cursor for the page after `records`, if any
pub fn next_cursor(records: &[AccountsRecord]) -> Option<String> {
    records.last().map(|r| r.paging_token().to_string())
}
