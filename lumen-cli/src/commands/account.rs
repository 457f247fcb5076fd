//! Account command - show one account from the ledger state

use anyhow::Result;
use colored::Colorize;
use lumen_core::domain::keys::parse_account_address;
use lumen_core::AccountResource;

use super::get_context;
use crate::output::{create_table, short_key};

pub async fn run(address: &str, json: bool) -> Result<()> {
    let address = parse_account_address("address", address)?;
    let ctx = get_context()?;
    let request = ctx.request_context();

    let account = ctx.account_service.get_account(&request, &address).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
        return Ok(());
    }

    print_account(&account);
    Ok(())
}

pub fn print_account(account: &AccountResource) {
    println!("{}", account.account_id.bold());
    println!("  Sequence: {}", account.sequence);
    println!("  Subentries: {}", account.subentry_count);
    if !account.home_domain.is_empty() {
        println!("  Home domain: {}", account.home_domain);
    }
    if let Some(dest) = &account.inflation_destination {
        println!("  Inflation destination: {}", dest);
    }
    println!(
        "  Thresholds: low {} / med {} / high {}",
        account.thresholds.low_threshold,
        account.thresholds.med_threshold,
        account.thresholds.high_threshold
    );
    println!(
        "  Flags: auth_required={} auth_revocable={} auth_immutable={}",
        account.flags.auth_required, account.flags.auth_revocable, account.flags.auth_immutable
    );
    println!();

    let mut balances = create_table();
    balances.set_header(vec!["Asset", "Balance", "Limit", "Buying", "Selling"]);
    for balance in &account.balances {
        let asset = match (&balance.asset_code, &balance.asset_issuer) {
            (Some(code), Some(issuer)) => format!("{}:{}", code, short_key(issuer)),
            _ => balance.asset_type.clone(),
        };
        balances.add_row(vec![
            asset,
            balance.balance.clone(),
            balance.limit.clone().unwrap_or_default(),
            balance.buying_liabilities.clone(),
            balance.selling_liabilities.clone(),
        ]);
    }
    println!("{}", "Balances".bold());
    println!("{}", balances);

    let mut signers = create_table();
    signers.set_header(vec!["Key", "Weight", "Type"]);
    for signer in &account.signers {
        signers.add_row(vec![
            signer.key.clone(),
            signer.weight.to_string(),
            signer.signer_type.clone(),
        ]);
    }
    println!("{}", "Signers".bold());
    println!("{}", signers);

    if !account.data.is_empty() {
        println!("{}", "Data".bold());
        for (name, value) in &account.data {
            println!("  {} = {}", name, value);
        }
    }
}
