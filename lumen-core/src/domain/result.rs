//! Result and error types for the core library

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The logical lookup a failed store call belonged to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryStage {
    Account,
    Data,
    Signers,
    Trustlines,
    BasePage,
    BatchSigners,
    BatchTrustlines,
    BatchData,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStage::Account => "account",
            QueryStage::Data => "data",
            QueryStage::Signers => "signers",
            QueryStage::Trustlines => "trustlines",
            QueryStage::BasePage => "base-page",
            QueryStage::BatchSigners => "batch-signers",
            QueryStage::BatchTrustlines => "batch-trustlines",
            QueryStage::BatchData => "batch-data",
        }
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A store call failed; `stage` names the lookup that failed
    #[error("Query failed ({stage}): {source}")]
    Query {
        stage: QueryStage,
        #[source]
        source: Box<Error>,
    },

    #[error("Cancelled during {stage}: {reason}")]
    Cancelled { stage: QueryStage, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification used by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Internal,
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a store failure with the stage it happened in
    pub fn query(stage: QueryStage, source: Error) -> Self {
        Self::Query {
            stage,
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Internal,
        }
    }

    /// Stage label for query and cancellation failures
    pub fn stage(&self) -> Option<QueryStage> {
        match self {
            Error::Query { stage, .. } | Error::Cancelled { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
