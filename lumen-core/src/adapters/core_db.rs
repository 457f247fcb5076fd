//! Authoritative ledger-state store backed by DuckDB

use std::path::Path;

use async_trait::async_trait;
use duckdb::params;

use crate::domain::result::Result;
use crate::domain::{AccountState, Asset, DataEntry, Liabilities, Signer, Thresholds, TrustLine};
use crate::migrations::CORE_MIGRATIONS;
use crate::ports::CoreStore;

use super::duckdb::{blocking, Database};

#[derive(Clone)]
pub struct DuckDbCoreStore {
    db: Database,
}

impl DuckDbCoreStore {
    pub fn new(db_path: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(db_path, CORE_MIGRATIONS)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory(CORE_MIGRATIONS)?,
        })
    }

    // === Lookups ===

    pub fn get_account(&self, address: &str) -> Result<Option<AccountState>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT accountid, balance, seqnum, numsubentries, inflationdest, homedomain,
                    flags, masterweight, thresholdlow, thresholdmedium, thresholdhigh,
                    buyingliabilities, sellingliabilities, lastmodified
             FROM accounts WHERE accountid = ?",
        )?;

        let mut rows = stmt.query_map([address], |row| {
            Ok(AccountState {
                account_id: row.get(0)?,
                balance: row.get(1)?,
                sequence: row.get(2)?,
                num_subentries: row.get::<_, i32>(3)? as u32,
                inflation_destination: row.get(4)?,
                home_domain: row.get(5)?,
                flags: row.get::<_, i32>(6)? as u32,
                thresholds: Thresholds::new(
                    row.get::<_, i16>(7)? as u8,
                    row.get::<_, i16>(8)? as u8,
                    row.get::<_, i16>(9)? as u8,
                    row.get::<_, i16>(10)? as u8,
                ),
                liabilities: Liabilities {
                    buying: row.get(11)?,
                    selling: row.get(12)?,
                },
                last_modified_ledger: row.get::<_, i32>(13)? as u32,
            })
        })?;

        let account = rows.next().transpose()?;
        Ok(account)
    }

    pub fn get_data(&self, address: &str) -> Result<Vec<DataEntry>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT accountid, dataname, datavalue, lastmodified
             FROM accountdata WHERE accountid = ? ORDER BY dataname",
        )?;
        let entries = stmt
            .query_map([address], |row| {
                Ok(DataEntry {
                    account_id: row.get(0)?,
                    name: row.get(1)?,
                    value: row.get(2)?,
                    last_modified_ledger: row.get::<_, i32>(3)? as u32,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn get_signers(&self, address: &str) -> Result<Vec<Signer>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT accountid, publickey, weight
             FROM signers WHERE accountid = ? ORDER BY publickey",
        )?;
        let signers = stmt
            .query_map([address], |row| {
                Ok(Signer {
                    account_id: row.get(0)?,
                    key: row.get(1)?,
                    weight: row.get(2)?,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(signers)
    }

    pub fn get_trust_lines(&self, address: &str) -> Result<Vec<TrustLine>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT accountid, assetcode, issuer, balance, tlimit, flags,
                    buyingliabilities, sellingliabilities, lastmodified
             FROM trustlines WHERE accountid = ?
             ORDER BY assettype, assetcode, issuer",
        )?;
        let lines = stmt
            .query_map([address], |row| {
                Ok(TrustLine {
                    account_id: row.get(0)?,
                    // the code length fixes the credit type
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
        Ok(lines)
    }

    // === Ingestion (seeding and tests) ===

    pub fn insert_account(&self, account: &AccountState) -> Result<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO accounts (accountid, balance, seqnum, numsubentries,
                    inflationdest, homedomain, flags, masterweight, thresholdlow,
                    thresholdmedium, thresholdhigh, buyingliabilities, sellingliabilities,
                    lastmodified)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                account.account_id,
                account.balance,
                account.sequence,
                account.num_subentries as i32,
                account.inflation_destination,
                account.home_domain,
                account.flags as i32,
                account.thresholds.master_weight as i16,
                account.thresholds.low as i16,
                account.thresholds.medium as i16,
                account.thresholds.high as i16,
                account.liabilities.buying,
                account.liabilities.selling,
                account.last_modified_ledger as i32,
            ],
        )?;
        Ok(())
    }

    pub fn insert_signer(&self, signer: &Signer) -> Result<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO signers (accountid, publickey, weight) VALUES (?, ?, ?)",
            params![signer.account_id, signer.key, signer.weight],
        )?;
        Ok(())
    }

    pub fn insert_trust_line(&self, line: &TrustLine) -> Result<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO trustlines (accountid, assettype, issuer, assetcode, tlimit,
                    balance, flags, buyingliabilities, sellingliabilities, lastmodified)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                line.account_id,
                line.asset.asset_type.as_str(),
                line.asset.issuer,
                line.asset.code,
                line.limit,
                line.balance,
                line.flags as i32,
                line.liabilities.buying,
                line.liabilities.selling,
                line.last_modified_ledger as i32,
            ],
        )?;
        Ok(())
    }

    pub fn insert_data(&self, entry: &DataEntry) -> Result<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO accountdata (accountid, dataname, datavalue, lastmodified)
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
impl CoreStore for DuckDbCoreStore {
    async fn account_by_address(&self, address: &str) -> Result<Option<AccountState>> {
        let (store, address) = (self.clone(), address.to_string());
        blocking(move || store.get_account(&address)).await
    }

    async fn all_data_by_address(&self, address: &str) -> Result<Vec<DataEntry>> {
        let (store, address) = (self.clone(), address.to_string());
        blocking(move || store.get_data(&address)).await
    }

    async fn signers_by_address(&self, address: &str) -> Result<Vec<Signer>> {
        let (store, address) = (self.clone(), address.to_string());
        blocking(move || store.get_signers(&address)).await
    }

    async fn trust_lines_by_address(&self, address: &str) -> Result<Vec<TrustLine>> {
        let (store, address) = (self.clone(), address.to_string());
        blocking(move || store.get_trust_lines(&address)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::domain::result::{Error, QueryStage};
    use crate::domain::AssetType;
    use crate::services::RequestContext;

    const ACCOUNT: &str = "GABGMPEKKDWR2WFH5AJOZV5PDKLJEHGCR3Q24ALETWR5H3A7GI3YTS7V";
    const ISSUER: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    #[test]
    fn test_missing_account_is_none() {
        let store = DuckDbCoreStore::in_memory().unwrap();
        assert!(store.get_account(ACCOUNT).unwrap().is_none());
    }

    #[test]
    fn test_account_round_trip() {
        let store = DuckDbCoreStore::in_memory().unwrap();
        let mut account = AccountState::new(ACCOUNT, 20000, 223456789);
        account.thresholds = Thresholds::new(1, 2, 3, 4);
        account.inflation_destination = Some(ISSUER.to_string());
        account.liabilities = Liabilities { buying: 3, selling: 4 };
        store.insert_account(&account).unwrap();

        assert_eq!(store.get_account(ACCOUNT).unwrap(), Some(account));
    }

    #[test]
    fn test_child_lookups_are_scoped_and_ordered() {
        let store = DuckDbCoreStore::in_memory().unwrap();
        store.insert_signer(&Signer::new(ACCOUNT, "GZ", 1)).unwrap();
        store.insert_signer(&Signer::new(ACCOUNT, "GB", 2)).unwrap();
        store.insert_signer(&Signer::new(ISSUER, "GC", 3)).unwrap();
        store
            .insert_data(&DataEntry::new(ACCOUNT, "b", vec![0, 255]))
            .unwrap();
        store
            .insert_data(&DataEntry::new(ACCOUNT, "a", vec![1]))
            .unwrap();
        store
            .insert_trust_line(&TrustLine {
                account_id: ACCOUNT.to_string(),
                asset: Asset::credit("LONGCODE", ISSUER),
                balance: 5,
                limit: 10,
                flags: 1,
                liabilities: Liabilities::default(),
                last_modified_ledger: 7,
            })
            .unwrap();

        let keys: Vec<String> = store.get_signers(ACCOUNT).unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["GB", "GZ"]);

        let data = store.get_data(ACCOUNT).unwrap();
        assert_eq!(data[0].name, "a");
        assert_eq!(data[1].value, vec![0, 255]);

        let lines = store.get_trust_lines(ACCOUNT).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].asset.asset_type, AssetType::CreditAlphanum12);
        assert!(store.get_trust_lines(ISSUER).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_fires_while_connection_is_busy() {
        let store = DuckDbCoreStore::in_memory().unwrap();
        store.insert_account(&AccountState::new(ACCOUNT, 1, 1)).unwrap();

        // Another holder keeps the connection well past the deadline
        let holder = store.clone();
        let (locked_tx, locked_rx) = mpsc::channel();
        let busy = thread::spawn(move || {
            let _conn = holder.db.lock().unwrap();
            locked_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(1500));
        });
        locked_rx.recv().unwrap();

        let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));
        let started = Instant::now();
        let err = ctx
            .run(QueryStage::Account, store.account_by_address(ACCOUNT))
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Cancelled { stage: QueryStage::Account, .. }),
            "unexpected error: {}",
            err
        );
        assert!(started.elapsed() < Duration::from_millis(1000));

        busy.join().unwrap();
        // The connection is usable again once released
        assert!(store.get_account(ACCOUNT).unwrap().is_some());
    }
}
