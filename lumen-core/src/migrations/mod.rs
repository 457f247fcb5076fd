//! Database migrations - embedded SQL files
//!
//! Migrations are compiled into the binary at build time using include_str!.
//! Each migration is a tuple of (name, sql_content), applied in order.
//! The core (ledger state) and history (indexed) databases have separate sets.

/// Authoritative ledger-state store migrations
///
/// IMPORTANT: When adding a new migration:
/// 1. Create the SQL file: core/NNN_description.sql
/// 2. Add an entry here in order
pub const CORE_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("core/000_migrations.sql")),
    ("001_ledger_state.sql", include_str!("core/001_ledger_state.sql")),
];

/// Indexed (history) store migrations
pub const HISTORY_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("history/000_migrations.sql")),
    ("001_accounts.sql", include_str!("history/001_accounts.sql")),
    (
        "002_trust_lines_data.sql",
        include_str!("history/002_trust_lines_data.sql"),
    ),
];
