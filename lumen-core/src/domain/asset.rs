//! Asset descriptors

use std::fmt;

use serde::{Deserialize, Serialize};

use super::keys::parse_account_address;
use super::result::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Native,
    CreditAlphanum4,
    CreditAlphanum12,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Native => "native",
            AssetType::CreditAlphanum4 => "credit_alphanum4",
            AssetType::CreditAlphanum12 => "credit_alphanum12",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "native" => Ok(AssetType::Native),
            "credit_alphanum4" => Ok(AssetType::CreditAlphanum4),
            "credit_alphanum12" => Ok(AssetType::CreditAlphanum12),
            other => Err(Error::validation(format!("unknown asset_type: {}", other))),
        }
    }

    /// Derive the credit type from a code's length
    pub fn for_code(code: &str) -> Self {
        if code.len() <= 4 {
            AssetType::CreditAlphanum4
        } else {
            AssetType::CreditAlphanum12
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asset: native, or a credit asset identified by code and issuer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub asset_type: AssetType,
    pub code: String,
    pub issuer: String,
}

impl Asset {
    pub fn native() -> Self {
        Self {
            asset_type: AssetType::Native,
            code: String::new(),
            issuer: String::new(),
        }
    }

    /// Build a credit asset, picking alphanum4 or alphanum12 from the code length
    pub fn credit(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            asset_type: AssetType::for_code(&code),
            code,
            issuer: issuer.into(),
        }
    }

    pub fn is_native(&self) -> bool {
        self.asset_type == AssetType::Native
    }

    /// Parse and validate a descriptor from its three parts
    pub fn parse(asset_type: &str, code: &str, issuer: &str) -> Result<Self> {
        let asset_type = AssetType::parse(asset_type)?;
        if asset_type == AssetType::Native {
            if !code.is_empty() || !issuer.is_empty() {
                return Err(Error::validation(
                    "native asset must not carry asset_code or asset_issuer",
                ));
            }
            return Ok(Self::native());
        }

        let (min, max) = match asset_type {
            AssetType::CreditAlphanum4 => (1, 4),
            _ => (5, 12),
        };
        if code.len() < min || code.len() > max || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::validation(format!(
                "asset_code must be {}-{} alphanumeric characters for {}",
                min, max, asset_type
            )));
        }
        let issuer = parse_account_address("asset_issuer", issuer)?;

        Ok(Self {
            asset_type,
            code: code.to_string(),
            issuer,
        })
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            f.write_str("native")
        } else {
            write!(f, "{}:{}", self.code, self.issuer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    #[test]
    fn test_parse_credit_asset() {
        let asset = Asset::parse("credit_alphanum4", "USD", ISSUER).unwrap();
        assert_eq!(asset, Asset::credit("USD", ISSUER));
        assert_eq!(asset.to_string(), format!("USD:{}", ISSUER));
    }

    #[test]
    fn test_code_length_must_match_type() {
        assert!(Asset::parse("credit_alphanum4", "TOOLONG", ISSUER).is_err());
        assert!(Asset::parse("credit_alphanum12", "USD", ISSUER).is_err());
        assert!(Asset::parse("credit_alphanum12", "LONGCODE", ISSUER).is_ok());
        assert!(Asset::parse("credit_alphanum4", "U$D", ISSUER).is_err());
    }

    #[test]
    fn test_bad_issuer_and_type() {
        assert!(Asset::parse("credit_alphanum4", "USD", "issuer").is_err());
        assert!(Asset::parse("credit", "USD", ISSUER).is_err());
        assert!(Asset::parse("native", "", "").unwrap().is_native());
        assert!(Asset::parse("native", "XLM", "").is_err());
    }
}
