//! Account service - single account lookup

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::result::{Error, QueryStage, Result};
use crate::domain::AccountResource;
use crate::ports::CoreStore;

use super::assembler::merge_full_account;
use super::context::RequestContext;
use super::logging::{describe_error, LogEvent, LoggingService};

/// Looks up one account in the authoritative store
pub struct AccountService {
    core: Arc<dyn CoreStore>,
    logger: Option<Arc<LoggingService>>,
}

impl AccountService {
    pub fn new(core: Arc<dyn CoreStore>) -> Self {
        Self { core, logger: None }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Fetch and merge the account at `address`
    ///
    /// Issues four lookups in order: account state, data entries, signers,
    /// trust lines. A missing account is `Error::NotFound`; any store
    /// failure aborts the call and is labelled with the failing lookup.
    pub async fn get_account(&self, ctx: &RequestContext, address: &str) -> Result<AccountResource> {
        let result = self.fetch(ctx, address).await;

        if let Some(logger) = &self.logger {
            let mut event =
                LogEvent::new("account.get").with_request_id(ctx.request_id.to_string());
            if let Err(err) = &result {
                event = event.with_error(describe_error(err));
            }
            if let Err(err) = logger.log(event) {
                warn!(request_id = %ctx.request_id, error = %err, "failed to record account.get event");
            }
        }

        result
    }

    async fn fetch(&self, ctx: &RequestContext, address: &str) -> Result<AccountResource> {
        let state = ctx
            .run(QueryStage::Account, self.core.account_by_address(address))
            .await?
            .ok_or_else(|| Error::not_found(format!("account {}", address)))?;

        let data = ctx
            .run(QueryStage::Data, self.core.all_data_by_address(address))
            .await?;
        let signers = ctx
            .run(QueryStage::Signers, self.core.signers_by_address(address))
            .await?;
        let trust_lines = ctx
            .run(QueryStage::Trustlines, self.core.trust_lines_by_address(address))
            .await?;

        debug!(
            request_id = %ctx.request_id,
            data = data.len(),
            signers = signers.len(),
            trust_lines = trust_lines.len(),
            "merging account"
        );

        Ok(merge_full_account(&state, &data, &signers, &trust_lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DuckDbCoreStore;
    use crate::domain::AccountState;
    use crate::services::EntryPoint;

    const ADDRESS: &str = "GADTXHUTHIAESMMQ2ZWSTIIGBZRLHUCBLCHPLLUEIAWDEFRDC4SYDKOZ";

    #[tokio::test]
    async fn test_log_failure_does_not_fail_request() {
        let core = DuckDbCoreStore::in_memory().unwrap();
        core.insert_account(&AccountState::new(ADDRESS, 100, 1)).unwrap();

        let logger = Arc::new(LoggingService::in_memory(EntryPoint::Cli, "test").unwrap());
        logger
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE sys_logs")
            .unwrap();

        let service = AccountService::new(Arc::new(core)).with_logger(logger.clone());
        let account = service
            .get_account(&RequestContext::new(), ADDRESS)
            .await
            .unwrap();

        assert_eq!(account.id, ADDRESS);
        assert!(logger.count().is_err());
    }
}
