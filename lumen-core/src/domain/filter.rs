//! Account listing filters and boundary validation
//!
//! Listing runs in one of two modes. `BySigner` returns signer-scoped
//! summaries; `ByAsset` returns full account resources for every holder of
//! a credit asset. Raw query parameters are validated here, before the
//! listing service runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::keys::parse_account_address;
use super::page::PageQuery;
use super::result::{Error, Result};

/// Exactly one listing mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountsFilter {
    BySigner(String),
    ByAsset(Asset),
}

impl AccountsFilter {
    pub fn mode(&self) -> &'static str {
        match self {
            AccountsFilter::BySigner(_) => "signer",
            AccountsFilter::ByAsset(_) => "asset",
        }
    }
}

/// A validated listing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsQuery {
    pub filter: AccountsFilter,
    pub page: PageQuery,
}

impl AccountsQuery {
    pub fn new(filter: AccountsFilter, page: PageQuery) -> Self {
        Self { filter, page }
    }

    /// Validate raw query parameters
    ///
    /// Recognized keys: `signer`, `asset_type`, `asset_code`, `asset_issuer`,
    /// `cursor`, `limit`, `order`. A non-empty `signer` selects signer mode
    /// even when asset parameters are also present. Otherwise a complete
    /// credit asset descriptor is required.
    pub fn from_params(
        params: &HashMap<String, String>,
        default_limit: u64,
        max_limit: u64,
    ) -> Result<Self> {
        let get = |key: &str| params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let page = PageQuery::parse(
            get("cursor"),
            get("order"),
            get("limit"),
            default_limit,
            max_limit,
        )?;

        if let Some(signer) = get("signer") {
            let signer = parse_account_address("signer", signer)?;
            return Ok(Self::new(AccountsFilter::BySigner(signer), page));
        }

        let asset_type = get("asset_type");
        let asset_code = get("asset_code");
        let asset_issuer = get("asset_issuer");
        if asset_type.is_none() && asset_code.is_none() && asset_issuer.is_none() {
            return Err(Error::validation(
                "either signer or asset_type, asset_code and asset_issuer must be provided",
            ));
        }

        let asset_type = asset_type.ok_or_else(|| Error::validation("asset_type is required"))?;
        if asset_type == "native" {
            return Err(Error::validation(
                "native asset cannot be used to filter accounts",
            ));
        }
        let asset_code = asset_code.ok_or_else(|| Error::validation("asset_code is required"))?;
        let asset_issuer =
            asset_issuer.ok_or_else(|| Error::validation("asset_issuer is required"))?;

        let asset = Asset::parse(asset_type, asset_code, asset_issuer)?;
        Ok(Self::new(AccountsFilter::ByAsset(asset), page))
    }
}
