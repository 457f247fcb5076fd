//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account;
pub mod assembler;
pub mod batch;
mod context;
mod listing;
pub mod logging;
pub mod migration;

pub use account::AccountService;
pub use assembler::{format_amount, merge_full_account, merge_indexed_account, to_signer_summary};
pub use batch::{distinct_account_ids, AccountChildren, AccountGroups, BatchLoader};
pub use context::{CancelHandle, RequestContext};
pub use listing::ListingService;
pub use logging::{describe_error, EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
