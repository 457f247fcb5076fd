//! Batch loading of account child records
//!
//! Loads signers, trust lines and data entries for a whole page of accounts
//! with one store query per kind, then groups the rows by account address.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::result::{QueryStage, Result};
use crate::domain::{AccountScoped, DataEntry, Signer, TrustLine};
use crate::ports::HistoryStore;

use super::context::RequestContext;

/// Child rows grouped by account address
///
/// Rows keep the order the store returned them in. Accounts without rows
/// read as an empty slice.
#[derive(Debug, Clone)]
pub struct AccountGroups<T> {
    groups: HashMap<String, Vec<T>>,
}

impl<T> Default for AccountGroups<T> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }
}

impl<T: AccountScoped> AccountGroups<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: T) {
        self.groups
            .entry(row.account_id().to_string())
            .or_default()
            .push(row);
    }

    pub fn get(&self, account_id: &str) -> &[T] {
        self.groups
            .get(account_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of accounts with at least one row
    pub fn account_count(&self) -> usize {
        self.groups.len()
    }

    pub fn row_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<T: AccountScoped> FromIterator<T> for AccountGroups<T> {
    fn from_iter<I: IntoIterator<Item = T>>(rows: I) -> Self {
        let mut groups = Self::new();
        for row in rows {
            groups.push(row);
        }
        groups
    }
}

/// Distinct addresses in first-seen order
pub fn distinct_account_ids<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// All child collections for one page of accounts
#[derive(Debug, Default)]
pub struct AccountChildren {
    pub signers: AccountGroups<Signer>,
    pub trust_lines: AccountGroups<TrustLine>,
    pub data: AccountGroups<DataEntry>,
}

/// Loads child records for a set of accounts from the indexed store
pub struct BatchLoader<'a> {
    store: &'a dyn HistoryStore,
    ctx: &'a RequestContext,
}

impl<'a> BatchLoader<'a> {
    pub fn new(store: &'a dyn HistoryStore, ctx: &'a RequestContext) -> Self {
        Self { store, ctx }
    }

    pub async fn load_signers(&self, account_ids: &[String]) -> Result<AccountGroups<Signer>> {
        let rows = self
            .ctx
            .run(
                QueryStage::BatchSigners,
                self.store.signers_for_accounts(account_ids),
            )
            .await?;
        debug!(request_id = %self.ctx.request_id, rows = rows.len(), "loaded signers");
        Ok(rows.into_iter().collect())
    }

    pub async fn load_trust_lines(
        &self,
        account_ids: &[String],
    ) -> Result<AccountGroups<TrustLine>> {
        let rows = self
            .ctx
            .run(
                QueryStage::BatchTrustlines,
                self.store.trust_lines_for_accounts(account_ids),
            )
            .await?;
        debug!(request_id = %self.ctx.request_id, rows = rows.len(), "loaded trust lines");
        Ok(rows.into_iter().collect())
    }

    pub async fn load_data(&self, account_ids: &[String]) -> Result<AccountGroups<DataEntry>> {
        let rows = self
            .ctx
            .run(
                QueryStage::BatchData,
                self.store.data_for_accounts(account_ids),
            )
            .await?;
        debug!(request_id = %self.ctx.request_id, rows = rows.len(), "loaded data entries");
        Ok(rows.into_iter().collect())
    }

    /// Signers, then trust lines, then data; stops at the first failure
    pub async fn load_children(&self, account_ids: &[String]) -> Result<AccountChildren> {
        let signers = self.load_signers(account_ids).await?;
        let trust_lines = self.load_trust_lines(account_ids).await?;
        let data = self.load_data(account_ids).await?;
        Ok(AccountChildren {
            signers,
            trust_lines,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_preserve_store_order() {
        let groups: AccountGroups<Signer> = vec![
            Signer::new("GA", "K3", 1),
            Signer::new("GB", "K1", 1),
            Signer::new("GA", "K1", 2),
            Signer::new("GA", "K2", 3),
        ]
        .into_iter()
        .collect();

        let keys: Vec<&str> = groups.get("GA").iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["K3", "K1", "K2"]);
        assert_eq!(groups.get("GB").len(), 1);
        assert_eq!(groups.account_count(), 2);
        assert_eq!(groups.row_count(), 4);
    }

    #[test]
    fn test_missing_account_reads_empty() {
        let groups: AccountGroups<DataEntry> = AccountGroups::new();
        assert!(groups.is_empty());
        assert!(groups.get("GC").is_empty());
    }

    #[test]
    fn test_groups_never_mix_accounts() {
        let groups: AccountGroups<DataEntry> = vec![
            DataEntry::new("GA", "a", vec![1]),
            DataEntry::new("GB", "b", vec![2]),
            DataEntry::new("GA", "c", vec![3]),
        ]
        .into_iter()
        .collect();

        for id in ["GA", "GB"] {
            assert!(groups.get(id).iter().all(|d| d.account_id == id));
        }
    }

    #[test]
    fn test_distinct_ids_keep_first_seen_order() {
        let ids = distinct_account_ids(["GB", "GA", "GB", "GC", "GA"]);
        assert_eq!(ids, vec!["GB", "GA", "GC"]);
    }
}
