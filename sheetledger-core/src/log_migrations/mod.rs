//! Embedded migrations for the event log database
//!
//! Each entry is `(file name, sql)`. Entries are applied in the order listed
//! and recorded in `sys_migrations`; `000_migrations.sql` bootstraps that
//! table and must stay first.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
