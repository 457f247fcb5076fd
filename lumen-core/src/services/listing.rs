//! Listing service - paginated account queries against the indexed store
//!
//! Signer mode maps each signer row straight to a summary. Asset mode pages
//! the account rows, batch-loads signers, trust lines and data for the whole
//! page (one query per kind), then merges each row with its children.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::result::{QueryStage, Result};
use crate::domain::{AccountsFilter, AccountsQuery, AccountsRecord, Asset, PageQuery};
use crate::ports::HistoryStore;

use super::assembler::{merge_indexed_account, to_signer_summary};
use super::batch::{distinct_account_ids, BatchLoader};
use super::context::RequestContext;
use super::logging::{describe_error, LogEvent, LoggingService};

pub struct ListingService {
    history: Arc<dyn HistoryStore>,
    logger: Option<Arc<LoggingService>>,
}

impl ListingService {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self {
            history,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// One page of accounts, in base-query order
    pub async fn list_accounts(
        &self,
        ctx: &RequestContext,
        query: &AccountsQuery,
    ) -> Result<Vec<AccountsRecord>> {
        let result = match &query.filter {
            AccountsFilter::BySigner(signer) => self.list_by_signer(ctx, signer, &query.page).await,
            AccountsFilter::ByAsset(asset) => self.list_by_asset(ctx, asset, &query.page).await,
        };

        if let Some(logger) = &self.logger {
            let mut event = LogEvent::new("accounts.list")
                .with_request_id(ctx.request_id.to_string())
                .with_mode(query.filter.mode());
            event = match &result {
                Ok(records) => event.with_record_count(records.len() as u64),
                Err(err) => event.with_error(describe_error(err)),
            };
            if let Err(err) = logger.log(event) {
                warn!(request_id = %ctx.request_id, error = %err, "failed to record accounts.list event");
            }
        }

        result
    }

    async fn list_by_signer(
        &self,
        ctx: &RequestContext,
        signer: &str,
        page: &PageQuery,
    ) -> Result<Vec<AccountsRecord>> {
        let rows = ctx
            .run(
                QueryStage::BasePage,
                self.history.accounts_for_signer(signer, page),
            )
            .await?;
        debug!(request_id = %ctx.request_id, rows = rows.len(), "signer page loaded");

        Ok(rows
            .iter()
            .map(|row| AccountsRecord::Signer(to_signer_summary(row)))
            .collect())
    }

    async fn list_by_asset(
        &self,
        ctx: &RequestContext,
        asset: &Asset,
        page: &PageQuery,
    ) -> Result<Vec<AccountsRecord>> {
        let records = ctx
            .run(
                QueryStage::BasePage,
                self.history.accounts_for_asset(asset, page),
            )
            .await?;
        debug!(request_id = %ctx.request_id, rows = records.len(), "asset page loaded");

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let account_ids = distinct_account_ids(records.iter().map(|r| r.account_id.as_str()));
        let children = BatchLoader::new(self.history.as_ref(), ctx)
            .load_children(&account_ids)
            .await?;

        Ok(records
            .iter()
            .map(|record| {
                let id = record.account_id.as_str();
                let resource = merge_indexed_account(
                    record,
                    children.data.get(id),
                    children.signers.get(id),
                    children.trust_lines.get(id),
                );
                AccountsRecord::Account(Box::new(resource))
            })
            .collect())
    }
}
