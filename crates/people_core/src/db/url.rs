//! `DATABASE_URL` parsing.
//!
//! Accepted forms:
//! - `sqlite::memory:` (or `:memory:`) for a private in-memory store.
//! - `sqlite://relative/path.db` and `sqlite:///absolute/path.db`.
//! - A bare filesystem path.
//!
//! Any other `scheme://` is rejected; only SQLite is wired into core.

use super::{DbError, DbResult};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const SQLITE_SCHEME: &str = "sqlite:";
const MEMORY_ALIASES: &[&str] = &["sqlite::memory:", ":memory:", "sqlite://:memory:"];

/// Concrete storage location resolved from a database URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    /// SQLite database file on disk.
    File(PathBuf),
    /// Process-private in-memory database.
    Memory,
}

impl Display for DbTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "sqlite file {}", path.display()),
            Self::Memory => write!(f, "sqlite memory"),
        }
    }
}

/// Parses a `DATABASE_URL` value into a [`DbTarget`].
///
/// # Errors
/// - Returns `DbError::InvalidDatabaseUrl` for empty input, an empty path, or
///   a non-SQLite scheme.
pub fn parse_database_url(raw: &str) -> DbResult<DbTarget> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DbError::InvalidDatabaseUrl(
            "database url cannot be empty".to_string(),
        ));
    }

    if MEMORY_ALIASES.contains(&trimmed) {
        return Ok(DbTarget::Memory);
    }

    if let Some(rest) = trimmed.strip_prefix(SQLITE_SCHEME) {
        // `sqlite://a.db` is relative, `sqlite:///tmp/a.db` keeps the leading slash.
        let path = rest.strip_prefix("//").unwrap_or(rest);
        if path.is_empty() {
            return Err(DbError::InvalidDatabaseUrl(format!(
                "missing database path in `{trimmed}`"
            )));
        }
        return Ok(DbTarget::File(PathBuf::from(path)));
    }

    if let Some((scheme, _)) = trimmed.split_once("://") {
        return Err(DbError::InvalidDatabaseUrl(format!(
            "unsupported database scheme `{scheme}`; expected sqlite"
        )));
    }

    Ok(DbTarget::File(PathBuf::from(trimmed)))
}

#[cfg(test)]
mod tests {
    use super::{parse_database_url, DbTarget};
    use crate::db::DbError;
    use std::path::PathBuf;

    #[test]
    fn memory_aliases_resolve_to_memory() {
        for raw in ["sqlite::memory:", ":memory:", " sqlite://:memory: "] {
            assert_eq!(parse_database_url(raw).unwrap(), DbTarget::Memory);
        }
    }

    #[test]
    fn sqlite_urls_keep_relative_and_absolute_paths() {
        assert_eq!(
            parse_database_url("sqlite://data/people.db").unwrap(),
            DbTarget::File(PathBuf::from("data/people.db"))
        );
        assert_eq!(
            parse_database_url("sqlite:///var/lib/people.db").unwrap(),
            DbTarget::File(PathBuf::from("/var/lib/people.db"))
        );
    }

    #[test]
    fn bare_path_is_a_file_target() {
        assert_eq!(
            parse_database_url("people.sqlite3").unwrap(),
            DbTarget::File(PathBuf::from("people.sqlite3"))
        );
    }

    #[test]
    fn rejects_other_schemes_and_empty_values() {
        let err = parse_database_url("postgres://user@db/people").unwrap_err();
        assert!(matches!(err, DbError::InvalidDatabaseUrl(ref msg) if msg.contains("postgres")));

        assert!(matches!(
            parse_database_url("   ").unwrap_err(),
            DbError::InvalidDatabaseUrl(_)
        ));
        assert!(matches!(
            parse_database_url("sqlite://").unwrap_err(),
            DbError::InvalidDatabaseUrl(_)
        ));
    }
}
