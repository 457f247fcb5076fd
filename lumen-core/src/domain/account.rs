//! Account records as read from the two stores
//!
//! `AccountState` is the authoritative ledger-state snapshot of one account.
//! `IndexedAccount` is the indexed store's last-known row for an account.
//! Signers, trust lines and data entries are shared by both stores and always
//! carry the owning account's address.

use serde::{Deserialize, Serialize};

use super::asset::Asset;

/// Account flag: trust lines require issuer authorization
pub const AUTH_REQUIRED_FLAG: u32 = 1;
/// Account flag: issuer may revoke authorization
pub const AUTH_REVOCABLE_FLAG: u32 = 2;
/// Account flag: flags can never change again
pub const AUTH_IMMUTABLE_FLAG: u32 = 4;
/// Trust line flag: holder is authorized by the issuer
pub const TRUSTLINE_AUTHORIZED_FLAG: u32 = 1;

/// Master key weight plus the three operation thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub master_weight: u8,
    pub low: u8,
    pub medium: u8,
    pub high: u8,
}

impl Thresholds {
    pub fn new(master_weight: u8, low: u8, medium: u8, high: u8) -> Self {
        Self {
            master_weight,
            low,
            medium,
            high,
        }
    }
}

/// Amounts reserved by open offers, in stroops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liabilities {
    pub buying: i64,
    pub selling: i64,
}

/// Authoritative per-account state, as of `last_modified_ledger`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub account_id: String,
    /// Native balance in stroops
    pub balance: i64,
    pub sequence: i64,
    pub num_subentries: u32,
    pub inflation_destination: Option<String>,
    pub home_domain: String,
    pub flags: u32,
    pub thresholds: Thresholds,
    pub liabilities: Liabilities,
    pub last_modified_ledger: u32,
}

impl AccountState {
    pub fn new(account_id: impl Into<String>, balance: i64, sequence: i64) -> Self {
        Self {
            account_id: account_id.into(),
            balance,
            sequence,
            num_subentries: 0,
            inflation_destination: None,
            home_domain: String::new(),
            flags: 0,
            thresholds: Thresholds::new(1, 0, 0, 0),
            liabilities: Liabilities::default(),
            last_modified_ledger: 0,
        }
    }
}

/// Indexed store row describing one account's last-known state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedAccount {
    pub account_id: String,
    pub balance: i64,
    pub sequence: i64,
    pub num_subentries: u32,
    pub inflation_destination: Option<String>,
    pub home_domain: String,
    pub flags: u32,
    pub thresholds: Thresholds,
    pub liabilities: Liabilities,
    pub last_modified_ledger: u32,
}

impl IndexedAccount {
    pub fn new(account_id: impl Into<String>, balance: i64, sequence: i64) -> Self {
        Self {
            account_id: account_id.into(),
            balance,
            sequence,
            num_subentries: 0,
            inflation_destination: None,
            home_domain: String::new(),
            flags: 0,
            thresholds: Thresholds::new(1, 0, 0, 0),
            liabilities: Liabilities::default(),
            last_modified_ledger: 0,
        }
    }
}

/// One signer of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub account_id: String,
    pub key: String,
    pub weight: i32,
}

impl Signer {
    pub fn new(account_id: impl Into<String>, key: impl Into<String>, weight: i32) -> Self {
        Self {
            account_id: account_id.into(),
            key: key.into(),
            weight,
        }
    }
}

/// A trust line held by an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustLine {
    pub account_id: String,
    pub asset: Asset,
    pub balance: i64,
    pub limit: i64,
    pub flags: u32,
    pub liabilities: Liabilities,
    pub last_modified_ledger: u32,
}

impl TrustLine {
    pub fn is_authorized(&self) -> bool {
        self.flags & TRUSTLINE_AUTHORIZED_FLAG != 0
    }
}

/// A named data entry attached to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntry {
    pub account_id: String,
    pub name: String,
    pub value: Vec<u8>,
    pub last_modified_ledger: u32,
}

impl DataEntry {
    pub fn new(account_id: impl Into<String>, name: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            account_id: account_id.into(),
            name: name.into(),
            value,
            last_modified_ledger: 0,
        }
    }
}

/// Child records that belong to exactly one account
pub trait AccountScoped {
    fn account_id(&self) -> &str;
}

impl AccountScoped for Signer {
    fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl AccountScoped for TrustLine {
    fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl AccountScoped for DataEntry {
    fn account_id(&self) -> &str {
        &self.account_id
    }
}
