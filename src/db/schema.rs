pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sales (
    position         INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id           INTEGER NOT NULL,
    date             TEXT NOT NULL,
    channel          TEXT NOT NULL DEFAULT '',
    ad               TEXT NOT NULL DEFAULT 'N',
    rent             TEXT NOT NULL DEFAULT 'N',
    amount           TEXT NOT NULL DEFAULT '0',
    shipping         TEXT NOT NULL DEFAULT '0',
    total_amount     TEXT NOT NULL DEFAULT '0',
    paid_by          TEXT NOT NULL DEFAULT '0',
    operator_income  TEXT NOT NULL DEFAULT '0',
    item             TEXT NOT NULL DEFAULT '',
    items            TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_sales_date ON sales(date);
CREATE INDEX IF NOT EXISTS idx_sales_channel ON sales(channel);
"#;

pub(crate) const CURRENT_VERSION: i32 = 2;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    (1, "CREATE INDEX IF NOT EXISTS idx_sales_job ON sales(job_id);"),
];
