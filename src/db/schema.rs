pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS income (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT NOT NULL,
    method      TEXT,
    category    TEXT,
    description TEXT,
    amount      TEXT,
    note        TEXT
);

CREATE TABLE IF NOT EXISTS expense (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT NOT NULL,
    method      TEXT,
    category    TEXT,
    description TEXT,
    amount      TEXT,
    note        TEXT
);

CREATE INDEX IF NOT EXISTS idx_income_date ON income(date);
CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);
"#;

const DAY_REVISIONS: &str = r#"
CREATE TABLE IF NOT EXISTS day_revisions (
    date     TEXT PRIMARY KEY,
    revision INTEGER NOT NULL DEFAULT 0
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 2;

/// `(applies to versions <= n, sql)`. Every statement is additive and safe to
/// run again.
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[(1, DAY_REVISIONS)];
