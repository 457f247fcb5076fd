//! Lumen Core - account query service over ledger and indexed state
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (AccountState, Signer, TrustLine, Asset, resources)
//! - **ports**: Trait definitions for the two stores (CoreStore, HistoryStore)
//! - **services**: Account merging, paginated listing, batch loading, logging
//! - **adapters**: Concrete implementations (DuckDB)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
mod log_migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{DuckDbCoreStore, DuckDbHistoryStore};
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    AccountResource, AccountSignerResource, AccountsFilter, AccountsQuery, AccountsRecord, Asset,
    Order, PageQuery,
};
pub use domain::result::{Error, ErrorKind, QueryStage};
pub use services::{CancelHandle, EntryPoint, RequestContext};

/// Main context for Lumen operations
///
/// This is the primary entry point for all business logic. It holds
/// both stores, configuration, and all services.
pub struct LumenContext {
    pub config: Config,
    pub core_store: Arc<DuckDbCoreStore>,
    pub history_store: Arc<DuckDbHistoryStore>,
    pub logger: Arc<LoggingService>,
    pub account_service: AccountService,
    pub listing_service: ListingService,
}

impl LumenContext {
    /// Create a new Lumen context rooted at `data_dir`
    pub fn new(data_dir: &Path, entry_point: EntryPoint) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        let config = Config::load(data_dir)?;

        let core_path = config.core_db_path(data_dir);
        let core_store = Arc::new(
            DuckDbCoreStore::new(&core_path)
                .with_context(|| format!("Failed to open {}", core_path.display()))?,
        );
        let history_path = config.history_db_path(data_dir);
        let history_store = Arc::new(
            DuckDbHistoryStore::new(&history_path)
                .with_context(|| format!("Failed to open {}", history_path.display()))?,
        );
        let logger = Arc::new(LoggingService::new(
            data_dir,
            entry_point,
            env!("CARGO_PKG_VERSION"),
        )?);

        let account_service =
            AccountService::new(core_store.clone()).with_logger(Arc::clone(&logger));
        let listing_service =
            ListingService::new(history_store.clone()).with_logger(Arc::clone(&logger));

        Ok(Self {
            config,
            core_store,
            history_store,
            logger,
            account_service,
            listing_service,
        })
    }

    /// A fresh request context carrying the configured query timeout
    pub fn request_context(&self) -> RequestContext {
        let ctx = RequestContext::new();
        match self.config.query_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }

    /// Validate raw listing parameters against the configured limits
    pub fn accounts_query(
        &self,
        params: &std::collections::HashMap<String, String>,
    ) -> domain::result::Result<AccountsQuery> {
        AccountsQuery::from_params(
            params,
            self.config.default_page_limit,
            self.config.max_page_limit,
        )
    }
}
