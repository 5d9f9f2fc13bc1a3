//! Validation of model-generated SQL.
//!
//! [`validate_sql`] is the only way to obtain a [`ValidatedSql`], and the
//! [`QueryExecutor`](crate::QueryExecutor) only accepts that type, so no
//! unvalidated statement can reach the database.
//!
//! The checks run in order and the first violation wins:
//!
//! 1. Trim whitespace and strip trailing `;` terminators.
//! 2. Reject any remaining `;` (multi-statement input).
//! 3. Reject any whole-word, case-insensitive match of a [`DENYLIST`] keyword.
//!
//! The denylist is intentionally narrow. The connection itself runs every
//! statement in a read-only transaction, and this layer targets a model that
//! drifts into emitting a mutating statement.

use regex::Regex;
use std::sync::OnceLock;

/// Keywords that are never allowed in generated SQL
pub const DENYLIST: [&str; 10] = [
    "DROP", "DELETE", "TRUNCATE", "ALTER", "CREATE", "INSERT", "UPDATE", "GRANT", "REVOKE",
    "EXEC",
];

/// Why a candidate statement was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqlViolation {
    #[error("SQL statement is empty")]
    EmptyStatement,
    #[error("Multiple SQL statements are not allowed")]
    MultipleStatements,
    #[error("Use of '{0}' is not allowed in queries")]
    ForbiddenKeyword(String),
}

/// A single statement that passed [`validate_sql`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSql(String);

impl ValidatedSql {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ValidatedSql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn denylist_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b(?:{})\b", DENYLIST.join("|")))
            .expect("denylist pattern is valid")
    })
}

/// Clean and validate a candidate statement
pub fn validate_sql(candidate: &str) -> Result<ValidatedSql, SqlViolation> {
    let cleaned = candidate
        .trim()
        .trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    if cleaned.is_empty() {
        return Err(SqlViolation::EmptyStatement);
    }

    if cleaned.contains(';') {
        return Err(SqlViolation::MultipleStatements);
    }

    if let Some(found) = denylist_regex().find(cleaned) {
        return Err(SqlViolation::ForbiddenKeyword(found.as_str().to_uppercase()));
    }

    Ok(ValidatedSql(cleaned.to_string()))
}
