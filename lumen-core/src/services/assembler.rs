//! Resource assembly - pure mapping from store records to resources

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rust_decimal::Decimal;

use crate::domain::keys::signer_type;
use crate::domain::{
    AccountFlags, AccountResource, AccountSignerResource, AccountState, AccountThresholds,
    Balance, DataEntry, IndexedAccount, Liabilities, Signer, SignerResource, Thresholds,
    TrustLine, AUTH_IMMUTABLE_FLAG, AUTH_REQUIRED_FLAG, AUTH_REVOCABLE_FLAG,
};

/// Stroops per lumen: amounts render with seven fractional digits
const AMOUNT_SCALE: u32 = 7;

/// Render a stroop amount as a fixed seven-digit decimal string
pub fn format_amount(stroops: i64) -> String {
    Decimal::new(stroops, AMOUNT_SCALE).to_string()
}

/// The account fields both stores provide
struct AccountFields<'a> {
    account_id: &'a str,
    balance: i64,
    sequence: i64,
    num_subentries: u32,
    inflation_destination: Option<&'a str>,
    home_domain: &'a str,
    flags: u32,
    thresholds: Thresholds,
    liabilities: Liabilities,
    last_modified_ledger: u32,
}

/// Merge authoritative account state with its child records
pub fn merge_full_account(
    state: &AccountState,
    data: &[DataEntry],
    signers: &[Signer],
    trust_lines: &[TrustLine],
) -> AccountResource {
    let fields = AccountFields {
        account_id: &state.account_id,
        balance: state.balance,
        sequence: state.sequence,
        num_subentries: state.num_subentries,
        inflation_destination: state.inflation_destination.as_deref(),
        home_domain: &state.home_domain,
        flags: state.flags,
        thresholds: state.thresholds,
        liabilities: state.liabilities,
        last_modified_ledger: state.last_modified_ledger,
    };
    assemble(fields, data, signers, trust_lines)
}

/// Merge an indexed account row with its batch-loaded child records
pub fn merge_indexed_account(
    record: &IndexedAccount,
    data: &[DataEntry],
    signers: &[Signer],
    trust_lines: &[TrustLine],
) -> AccountResource {
    let fields = AccountFields {
        account_id: &record.account_id,
        balance: record.balance,
        sequence: record.sequence,
        num_subentries: record.num_subentries,
        inflation_destination: record.inflation_destination.as_deref(),
        home_domain: &record.home_domain,
        flags: record.flags,
        thresholds: record.thresholds,
        liabilities: record.liabilities,
        last_modified_ledger: record.last_modified_ledger,
    };
    assemble(fields, data, signers, trust_lines)
}

/// Signer-scoped summary of one signer row
pub fn to_signer_summary(row: &Signer) -> AccountSignerResource {
    AccountSignerResource {
        id: row.account_id.clone(),
        account_id: row.account_id.clone(),
        paging_token: row.account_id.clone(),
        signer: signer_resource(&row.key, row.weight),
    }
}

fn assemble(
    account: AccountFields<'_>,
    data: &[DataEntry],
    signers: &[Signer],
    trust_lines: &[TrustLine],
) -> AccountResource {
    let id = account.account_id;

    // Trust lines first, native balance last
    let mut balances: Vec<Balance> = trust_lines
        .iter()
        .filter(|line| line.account_id == id)
        .map(trust_line_balance)
        .collect();
    balances.push(native_balance(account.balance, account.liabilities));

    let mut signer_resources: Vec<SignerResource> = signers
        .iter()
        .filter(|signer| signer.account_id == id)
        .map(|signer| signer_resource(&signer.key, signer.weight))
        .collect();
    if !signer_resources.iter().any(|s| s.key == id) {
        signer_resources.push(signer_resource(id, i32::from(account.thresholds.master_weight)));
    }

    let data: BTreeMap<String, String> = data
        .iter()
        .filter(|entry| entry.account_id == id)
        .map(|entry| (entry.name.clone(), BASE64.encode(&entry.value)))
        .collect();

    AccountResource {
        id: id.to_string(),
        account_id: id.to_string(),
        paging_token: id.to_string(),
        sequence: account.sequence.to_string(),
        subentry_count: account.num_subentries,
        inflation_destination: account.inflation_destination.map(str::to_string),
        home_domain: account.home_domain.to_string(),
        last_modified_ledger: account.last_modified_ledger,
        thresholds: AccountThresholds {
            low_threshold: account.thresholds.low,
            med_threshold: account.thresholds.medium,
            high_threshold: account.thresholds.high,
        },
        flags: AccountFlags {
            auth_required: account.flags & AUTH_REQUIRED_FLAG != 0,
            auth_revocable: account.flags & AUTH_REVOCABLE_FLAG != 0,
            auth_immutable: account.flags & AUTH_IMMUTABLE_FLAG != 0,
        },
        balances,
        signers: signer_resources,
        data,
    }
}

fn trust_line_balance(line: &TrustLine) -> Balance {
    Balance {
        asset_type: line.asset.asset_type.as_str().to_string(),
        asset_code: Some(line.asset.code.clone()),
        asset_issuer: Some(line.asset.issuer.clone()),
        balance: format_amount(line.balance),
        limit: Some(format_amount(line.limit)),
        buying_liabilities: format_amount(line.liabilities.buying),
        selling_liabilities: format_amount(line.liabilities.selling),
        last_modified_ledger: Some(line.last_modified_ledger),
        is_authorized: Some(line.is_authorized()),
    }
}

fn native_balance(balance: i64, liabilities: Liabilities) -> Balance {
    Balance {
        asset_type: "native".to_string(),
        asset_code: None,
        asset_issuer: None,
        balance: format_amount(balance),
        limit: None,
        buying_liabilities: format_amount(liabilities.buying),
        selling_liabilities: format_amount(liabilities.selling),
        last_modified_ledger: None,
        is_authorized: None,
    }
}

fn signer_resource(key: &str, weight: i32) -> SignerResource {
    SignerResource {
        key: key.to_string(),
        weight,
        signer_type: signer_type(key).to_string(),
    }
}
