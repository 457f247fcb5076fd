//! Address and signer key helpers

use std::sync::OnceLock;

use regex::Regex;

use super::result::{Error, Result};

/// Strkey: one version character followed by 55 base32 characters
fn strkey_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[GTX][A-Z2-7]{55}$").expect("valid strkey pattern"))
}

/// Check that `value` looks like an account address (`G...`)
///
/// Only the shape is checked; the embedded checksum is left to the ledger.
pub fn is_account_address(value: &str) -> bool {
    value.starts_with('G') && strkey_re().is_match(value)
}

/// Validate an account address, naming the offending parameter on failure
pub fn parse_account_address(param: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if is_account_address(value) {
        Ok(value.to_string())
    } else {
        Err(Error::validation(format!(
            "{} must be a valid account address",
            param
        )))
    }
}

/// Signer type as derived from the key's version character
pub fn signer_type(key: &str) -> &'static str {
    match key.chars().next() {
        Some('T') => "preauth_tx",
        Some('X') => "sha256_hash",
        _ => "ed25519_public_key",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "GABGMPEKKDWR2WFH5AJOZV5PDKLJEHGCR3Q24ALETWR5H3A7GI3YTS7V";

    #[test]
    fn test_account_address_shape() {
        assert!(is_account_address(ADDRESS));
        assert!(!is_account_address(&ADDRESS[1..]));
        assert!(!is_account_address(&ADDRESS.to_lowercase()));
        assert!(!is_account_address(&ADDRESS.replacen('G', "T", 1)));
    }

    #[test]
    fn test_parse_account_address_reports_param() {
        let err = parse_account_address("signer", "nope").unwrap_err();
        assert!(err.to_string().contains("signer"));
        assert_eq!(parse_account_address("signer", ADDRESS).unwrap(), ADDRESS);
    }

    #[test]
    fn test_signer_type_from_prefix() {
        assert_eq!(signer_type(ADDRESS), "ed25519_public_key");
        assert_eq!(signer_type("TABC"), "preauth_tx");
        assert_eq!(signer_type("XABC"), "sha256_hash");
    }
}
