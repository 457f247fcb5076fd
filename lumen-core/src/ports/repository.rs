//! Store ports - the two read-only record sources

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{AccountState, Asset, DataEntry, IndexedAccount, PageQuery, Signer, TrustLine};

/// Authoritative ledger-state store
///
/// Every lookup is scoped to a single address.
#[async_trait]
pub trait CoreStore: Send + Sync {
    /// Current state of an account, `None` when the account does not exist
    async fn account_by_address(&self, address: &str) -> Result<Option<AccountState>>;

    /// All data entries of an account, ordered by name
    async fn all_data_by_address(&self, address: &str) -> Result<Vec<DataEntry>>;

    /// All signers of an account, ordered by key
    async fn signers_by_address(&self, address: &str) -> Result<Vec<Signer>>;

    /// All trust lines of an account, ordered by asset
    async fn trust_lines_by_address(&self, address: &str) -> Result<Vec<TrustLine>>;
}

/// Indexed (history) store
///
/// Paged lookups are ordered by account address and honour the page's
/// cursor, order and limit. Batch lookups are never paged.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Signer rows whose key is `signer`, one per account
    async fn accounts_for_signer(&self, signer: &str, page: &PageQuery) -> Result<Vec<Signer>>;

    /// Accounts holding a trust line for `asset`
    async fn accounts_for_asset(&self, asset: &Asset, page: &PageQuery)
        -> Result<Vec<IndexedAccount>>;

    /// All signer rows of the given accounts
    async fn signers_for_accounts(&self, account_ids: &[String]) -> Result<Vec<Signer>>;

    /// All trust lines of the given accounts
    async fn trust_lines_for_accounts(&self, account_ids: &[String]) -> Result<Vec<TrustLine>>;

    /// All data entries of the given accounts
    async fn data_for_accounts(&self, account_ids: &[String]) -> Result<Vec<DataEntry>>;
}
