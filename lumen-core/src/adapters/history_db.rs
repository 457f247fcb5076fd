//! Indexed (history) store backed by DuckDB

use std::path::Path;

use async_trait::async_trait;
use duckdb::{params, ToSql};

use crate::domain::result::{Error, Result};
use crate::domain::{
    Asset, DataEntry, IndexedAccount, Liabilities, PageQuery, Signer, Thresholds, TrustLine,
};
use crate::migrations::HISTORY_MIGRATIONS;
use crate::ports::HistoryStore;

use super::duckdb::{blocking, placeholders, Database};

const ACCOUNT_COLUMNS: &str = "a.account_id, a.balance, a.buying_liabilities, a.selling_liabilities,
    a.sequence_number, a.num_subentries, a.inflation_destination, a.flags, a.home_domain,
    a.master_weight, a.threshold_low, a.threshold_medium, a.threshold_high, a.last_modified_ledger";

fn row_to_account(row: &duckdb::Row) -> duckdb::Result<IndexedAccount> {
    Ok(IndexedAccount {
        account_id: row.get(0)?,
        balance: row.get(1)?,
        liabilities: Liabilities {
            buying: row.get(2)?,
            selling: row.get(3)?,
        },
        sequence: row.get(4)?,
        num_subentries: row.get::<_, i32>(5)? as u32,
        inflation_destination: row.get(6)?,
        flags: row.get::<_, i32>(7)? as u32,
        home_domain: row.get(8)?,
        thresholds: Thresholds::new(
            row.get::<_, i16>(9)? as u8,
            row.get::<_, i16>(10)? as u8,
            row.get::<_, i16>(11)? as u8,
            row.get::<_, i16>(12)? as u8,
        ),
        last_modified_ledger: row.get::<_, i32>(13)? as u32,
    })
}

fn row_to_signer(row: &duckdb::Row) -> duckdb::Result<Signer> {
    Ok(Signer {
        account_id: row.get(0)?,
        key: row.get(1)?,
        weight: row.get(2)?,
    })
}

/// Append the cursor bound, ordering and limit for `page` on `column`
fn push_page(
    sql: &mut String,
    params: &mut Vec<Box<dyn ToSql>>,
    column: &str,
    page: &PageQuery,
) -> Result<()> {
    let limit = i64::try_from(page.limit)
        .map_err(|_| Error::validation(format!("limit {} is out of range", page.limit)))?;
    if page.has_cursor() {
        sql.push_str(&format!(" AND {} {} ?", column, page.order.cursor_comparator()));
        params.push(Box::new(page.cursor.clone()));
    }
    sql.push_str(&format!(" ORDER BY {} {} LIMIT ?", column, page.order.as_sql()));
    params.push(Box::new(limit));
    Ok(())
}

#[derive(Clone)]
pub struct DuckDbHistoryStore {
    db: Database,
}

impl DuckDbHistoryStore {
    pub fn new(db_path: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(db_path, HISTORY_MIGRATIONS)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory(HISTORY_MIGRATIONS)?,
        })
    }

    // === Paged queries ===

    pub fn get_accounts_for_signer(&self, signer: &str, page: &PageQuery) -> Result<Vec<Signer>> {
        let mut sql = String::from(
            "SELECT account_id, signer, weight FROM accounts_signers WHERE signer = ?",
        );
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(signer.to_string())];
        push_page(&mut sql, &mut params, "account_id", page)?;

        let conn = self.db.lock()?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|b| b.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs.as_slice(), row_to_signer)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn get_accounts_for_asset(
        &self,
        asset: &Asset,
        page: &PageQuery,
    ) -> Result<Vec<IndexedAccount>> {
        let mut sql = format!(
            "SELECT {} FROM accounts a
             JOIN trust_lines t ON a.account_id = t.account_id
             WHERE t.asset_type = ? AND t.asset_code = ? AND t.asset_issuer = ?",
            ACCOUNT_COLUMNS
        );
        let mut params: Vec<Box<dyn ToSql>> = vec![
            Box::new(asset.asset_type.as_str().to_string()),
            Box::new(asset.code.clone()),
            Box::new(asset.issuer.clone()),
        ];
        push_page(&mut sql, &mut params, "a.account_id", page)?;

        let conn = self.db.lock()?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|b| b.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs.as_slice(), row_to_account)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // === Batch queries ===

    pub fn get_signers_for_accounts(&self, account_ids: &[String]) -> Result<Vec<Signer>> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT account_id, signer, weight FROM accounts_signers
             WHERE account_id IN ({}) ORDER BY account_id, signer",
            placeholders(account_ids.len())
        );
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(duckdb::params_from_iter(account_ids), row_to_signer)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn get_trust_lines_for_accounts(&self, account_ids: &[String]) -> Result<Vec<TrustLine>> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT account_id, asset_code, asset_issuer, balance, trust_line_limit, flags,
                    buying_liabilities, selling_liabilities, last_modified_ledger
             FROM trust_lines
             WHERE account_id IN ({})
             ORDER BY account_id, asset_type, asset_code, asset_issuer",
            placeholders(account_ids.len())
        );
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(duckdb::params_from_iter(account_ids), |row| {
                Ok(TrustLine {
                    account_id: row.get(0)?,
                    asset: Asset::credit(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
                    balance: row.get(3)?,
                    limit: row.get(4)?,
                    flags: row.get::<_, i32>(5)? as u32,
                    liabilities: Liabilities {
                        buying: row.get(6)?,
                        selling: row.get(7)?,
                    },
                    last_modified_ledger: row.get::<_, i32>(8)? as u32,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn get_data_for_accounts(&self, account_ids: &[String]) -> Result<Vec<DataEntry>> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT account_id, name, value, last_modified_ledger FROM accounts_data
             WHERE account_id IN ({}) ORDER BY account_id, name",
            placeholders(account_ids.len())
        );
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(duckdb::params_from_iter(account_ids), |row| {
                Ok(DataEntry {
                    account_id: row.get(0)?,
                    name: row.get(1)?,
                    value: row.get(2)?,
                    last_modified_ledger: row.get::<_, i32>(3)? as u32,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // === Ingestion (seeding and tests) ===

    pub fn insert_account(&self, account: &IndexedAccount) -> Result<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO accounts (account_id, balance, buying_liabilities,
                    selling_liabilities, sequence_number, num_subentries, inflation_destination,
                    flags, home_domain, master_weight, threshold_low, threshold_medium,
                    threshold_high, last_modified_ledger)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                account.account_id,
                account.balance,
                account.liabilities.buying,
                account.liabilities.selling,
                account.sequence,
                account.num_subentries as i32,
                account.inflation_destination,
                account.flags as i32,
                account.home_domain,
                account.thresholds.master_weight as i16,
                account.thresholds.low as i16,
                account.thresholds.medium as i16,
                account.thresholds.high as i16,
                account.last_modified_ledger as i32,
            ],
        )?;
        Ok(())
    }

    pub fn insert_signer(&self, signer: &Signer) -> Result<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO accounts_signers (account_id, signer, weight) VALUES (?, ?, ?)",
            params![signer.account_id, signer.key, signer.weight],
        )?;
        Ok(())
    }

    pub fn insert_trust_line(&self, line: &TrustLine) -> Result<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO trust_lines (account_id, asset_type, asset_issuer, asset_code,
                    balance, trust_line_limit, buying_liabilities, selling_liabilities, flags,
                    last_modified_ledger)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                line.account_id,
                line.asset.asset_type.as_str(),
                line.asset.issuer,
                line.asset.code,
                line.balance,
                line.limit,
                line.liabilities.buying,
                line.liabilities.selling,
                line.flags as i32,
                line.last_modified_ledger as i32,
            ],
        )?;
        Ok(())
    }

    pub fn insert_data(&self, entry: &DataEntry) -> Result<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO accounts_data (account_id, name, value, last_modified_ledger)
             VALUES (?, ?, ?, ?)",
            params![
                entry.account_id,
                entry.name,
                entry.value,
                entry.last_modified_ledger as i32,
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for DuckDbHistoryStore {
    async fn accounts_for_signer(&self, signer: &str, page: &PageQuery) -> Result<Vec<Signer>> {
        let (store, signer, page) = (self.clone(), signer.to_string(), page.clone());
        blocking(move || store.get_accounts_for_signer(&signer, &page)).await
    }

    async fn accounts_for_asset(
        &self,
        asset: &Asset,
        page: &PageQuery,
    ) -> Result<Vec<IndexedAccount>> {
        let (store, asset, page) = (self.clone(), asset.clone(), page.clone());
        blocking(move || store.get_accounts_for_asset(&asset, &page)).await
    }

    async fn signers_for_accounts(&self, account_ids: &[String]) -> Result<Vec<Signer>> {
        let (store, ids) = (self.clone(), account_ids.to_vec());
        blocking(move || store.get_signers_for_accounts(&ids)).await
    }

    async fn trust_lines_for_accounts(&self, account_ids: &[String]) -> Result<Vec<TrustLine>> {
        let (store, ids) = (self.clone(), account_ids.to_vec());
        blocking(move || store.get_trust_lines_for_accounts(&ids)).await
    }

    async fn data_for_accounts(&self, account_ids: &[String]) -> Result<Vec<DataEntry>> {
        let (store, ids) = (self.clone(), account_ids.to_vec());
        blocking(move || store.get_data_for_accounts(&ids)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Order;

    const SIGNER: &str = "GCXKG6RN4ONIEPCMNFB732A436Z5PNDSRLGWK7GBLCMQLIFO4S7EYWVU";
    const ISSUER: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    fn seeded_signers() -> DuckDbHistoryStore {
        let store = DuckDbHistoryStore::in_memory().unwrap();
        for (i, account) in ["GA", "GB", "GC", "GD"].iter().enumerate() {
            store
                .insert_signer(&Signer::new(*account, SIGNER, i as i32 + 1))
                .unwrap();
        }
        store.insert_signer(&Signer::new("GA", "GOTHER", 1)).unwrap();
        store
    }

    fn ids(rows: &[Signer]) -> Vec<&str> {
        rows.iter().map(|r| r.account_id.as_str()).collect()
    }

    #[test]
    fn test_signer_pages_ascending() {
        let store = seeded_signers();
        let first = store
            .get_accounts_for_signer(SIGNER, &PageQuery::new("", Order::Asc, 2))
            .unwrap();
        assert_eq!(ids(&first), vec!["GA", "GB"]);

        let second = store
            .get_accounts_for_signer(SIGNER, &PageQuery::new("GB", Order::Asc, 2))
            .unwrap();
        assert_eq!(ids(&second), vec!["GC", "GD"]);
    }

    #[test]
    fn test_signer_pages_descending() {
        let store = seeded_signers();
        let first = store
            .get_accounts_for_signer(SIGNER, &PageQuery::new("", Order::Desc, 3))
            .unwrap();
        assert_eq!(ids(&first), vec!["GD", "GC", "GB"]);

        let second = store
            .get_accounts_for_signer(SIGNER, &PageQuery::new("GB", Order::Desc, 3))
            .unwrap();
        assert_eq!(ids(&second), vec!["GA"]);
    }

    #[test]
    fn test_asset_query_matches_full_descriptor() {
        let store = DuckDbHistoryStore::in_memory().unwrap();
        store.insert_account(&IndexedAccount::new("GA", 10, 1)).unwrap();
        store.insert_account(&IndexedAccount::new("GB", 20, 2)).unwrap();
        let line = |account: &str, code: &str| TrustLine {
            account_id: account.to_string(),
            asset: Asset::credit(code, ISSUER),
            balance: 1,
            limit: 100,
            flags: 1,
            liabilities: Liabilities::default(),
            last_modified_ledger: 1,
        };
        store.insert_trust_line(&line("GA", "EUR")).unwrap();
        store.insert_trust_line(&line("GB", "USD")).unwrap();

        let usd = store
            .get_accounts_for_asset(&Asset::credit("USD", ISSUER), &PageQuery::default())
            .unwrap();
        assert_eq!(usd.len(), 1);
        assert_eq!(usd[0].account_id, "GB");
        assert_eq!(usd[0].balance, 20);

        let other_issuer = store
            .get_accounts_for_asset(&Asset::credit("USD", SIGNER), &PageQuery::default())
            .unwrap();
        assert!(other_issuer.is_empty());
    }

    #[test]
    fn test_batch_queries_cover_only_requested_accounts() {
        let store = seeded_signers();
        store.insert_data(&DataEntry::new("GA", "x", vec![1])).unwrap();
        store.insert_data(&DataEntry::new("GC", "y", vec![2])).unwrap();

        let ids = vec!["GA".to_string(), "GC".to_string()];
        let signers = store.get_signers_for_accounts(&ids).unwrap();
        assert_eq!(signers.len(), 3);
        assert!(signers.iter().all(|s| s.account_id == "GA" || s.account_id == "GC"));

        let data = store.get_data_for_accounts(&ids).unwrap();
        assert_eq!(data.len(), 2);

        assert!(store.get_trust_lines_for_accounts(&ids).unwrap().is_empty());
        assert!(store.get_signers_for_accounts(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_limit_is_rejected() {
        let store = seeded_signers();
        let err = store
            .get_accounts_for_signer(SIGNER, &PageQuery::new("", Order::Asc, u64::MAX))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_port_calls_match_direct_queries() {
        let store = seeded_signers();
        let page = PageQuery::new("GA", Order::Asc, 10);
        let via_port = store.accounts_for_signer(SIGNER, &page).await.unwrap();
        assert_eq!(via_port, store.get_accounts_for_signer(SIGNER, &page).unwrap());
        assert_eq!(ids(&via_port), vec!["GB", "GC", "GD"]);
    }
}
