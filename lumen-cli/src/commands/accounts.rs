//! Accounts command - list accounts by signer or by held asset

use std::collections::HashMap;

use anyhow::Result;
use clap::Args;
use lumen_core::domain::resource::next_cursor;
use lumen_core::AccountsRecord;

use super::get_context;
use crate::output::{create_table, info, short_key};

#[derive(Args)]
pub struct AccountsArgs {
    /// List accounts this key signs for (takes precedence over asset filters)
    #[arg(long)]
    pub signer: Option<String>,
    /// Asset type (credit_alphanum4 or credit_alphanum12)
    #[arg(long)]
    pub asset_type: Option<String>,
    /// Asset code
    #[arg(long)]
    pub asset_code: Option<String>,
    /// Asset issuer address
    #[arg(long)]
    pub asset_issuer: Option<String>,
    /// Start after this paging token
    #[arg(long)]
    pub cursor: Option<String>,
    /// Page size
    #[arg(long)]
    pub limit: Option<String>,
    /// Sort order (asc or desc)
    #[arg(long)]
    pub order: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AccountsArgs {
    /// Raw request parameters, as a query string would carry them
    fn to_params(&self) -> HashMap<String, String> {
        [
            ("signer", &self.signer),
            ("asset_type", &self.asset_type),
            ("asset_code", &self.asset_code),
            ("asset_issuer", &self.asset_issuer),
            ("cursor", &self.cursor),
            ("limit", &self.limit),
            ("order", &self.order),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}

pub async fn run(args: AccountsArgs) -> Result<()> {
    let ctx = get_context()?;
    let query = ctx.accounts_query(&args.to_params())?;
    let request = ctx.request_context();

    let records = ctx.listing_service.list_accounts(&request, &query).await?;
    let next = next_cursor(&records);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "records": records,
                "next_cursor": next,
            }))?
        );
        return Ok(());
    }

    if records.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    let mut table = create_table();
    match records.first() {
        Some(AccountsRecord::Signer(_)) => {
            table.set_header(vec!["Account", "Signer", "Weight", "Type"]);
        }
        _ => {
            table.set_header(vec!["Account", "Sequence", "Balances", "Signers", "Data"]);
        }
    }

    for record in &records {
        match record {
            AccountsRecord::Signer(row) => {
                table.add_row(vec![
                    row.account_id.clone(),
                    short_key(&row.signer.key),
                    row.signer.weight.to_string(),
                    row.signer.signer_type.clone(),
                ]);
            }
            AccountsRecord::Account(account) => {
                table.add_row(vec![
                    account.account_id.clone(),
                    account.sequence.clone(),
                    account.balances.len().to_string(),
                    account.signers.len().to_string(),
                    account.data.len().to_string(),
                ]);
            }
        }
    }

    println!("{}", table);
    if let Some(cursor) = next {
        info(&format!("Next page: --cursor {}", cursor));
    }

    Ok(())
}
