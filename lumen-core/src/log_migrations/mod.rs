//! Event log database migrations
//!
//! logs.duckdb lives next to the stores but is versioned on its own, so
//! the request log can be dropped or rotated without touching account data.

/// Event log migrations, applied in order
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
