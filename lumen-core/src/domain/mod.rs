//! Core domain entities
//!
//! Pure data structures and boundary validation - no I/O.

mod account;
pub mod asset;
pub mod filter;
pub mod keys;
pub mod page;
pub mod resource;
pub mod result;

pub use account::{
    AccountScoped, AccountState, DataEntry, IndexedAccount, Liabilities, Signer, Thresholds,
    TrustLine, AUTH_IMMUTABLE_FLAG, AUTH_REQUIRED_FLAG, AUTH_REVOCABLE_FLAG,
    TRUSTLINE_AUTHORIZED_FLAG,
};
pub use asset::{Asset, AssetType};
pub use filter::{AccountsFilter, AccountsQuery};
pub use page::{Order, PageQuery};
pub use resource::{
    AccountFlags, AccountResource, AccountSignerResource, AccountThresholds, AccountsRecord,
    Balance, SignerResource,
};
