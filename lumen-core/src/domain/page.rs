//! Cursor pagination

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "" | "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            other => Err(Error::validation(format!(
                "order must be \"asc\" or \"desc\", got {:?}",
                other
            ))),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }

    /// Comparison that selects rows strictly after the cursor in this order
    pub fn cursor_comparator(&self) -> &'static str {
        match self {
            Order::Asc => ">",
            Order::Desc => "<",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Asc => f.write_str("asc"),
            Order::Desc => f.write_str("desc"),
        }
    }
}

/// One page request: resume after `cursor`, in `order`, at most `limit` rows
///
/// The cursor is an account address (the paging token of the last record
/// seen). An empty cursor starts at the beginning of the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub cursor: String,
    pub order: Order,
    pub limit: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            cursor: String::new(),
            order: Order::Asc,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageQuery {
    pub fn new(cursor: impl Into<String>, order: Order, limit: u64) -> Self {
        Self {
            cursor: cursor.into(),
            order,
            limit,
        }
    }

    /// Parse raw `cursor`/`order`/`limit` parameters
    ///
    /// A missing limit takes `default_limit`; zero or anything above
    /// `max_limit` is rejected.
    pub fn parse(
        cursor: Option<&str>,
        order: Option<&str>,
        limit: Option<&str>,
        default_limit: u64,
        max_limit: u64,
    ) -> Result<Self> {
        let order = Order::parse(order.unwrap_or("").trim())?;

        let limit = match limit.map(str::trim).filter(|l| !l.is_empty()) {
            None => default_limit,
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| Error::validation(format!("limit must be a positive integer, got {:?}", raw)))?,
        };
        if limit == 0 || limit > max_limit {
            return Err(Error::validation(format!(
                "limit must be between 1 and {}",
                max_limit
            )));
        }

        Ok(Self {
            cursor: cursor.unwrap_or("").trim().to_string(),
            order,
            limit,
        })
    }

    pub fn has_cursor(&self) -> bool {
        !self.cursor.is_empty()
    }

    /// The request for the page following one that ended at `last_token`
    pub fn next(&self, last_token: impl Into<String>) -> Self {
        Self {
            cursor: last_token.into(),
            order: self.order,
            limit: self.limit,
        }
    }
}
