//! Query classification.
//!
//! Decides whether a query mutates data and therefore has to be held for
//! operator confirmation. The base rule is a lexical check on the leading
//! verb. It does not parse the statement, so a read that merely mentions
//! `UPDATE` in a literal is still a read, and a batch starting with `SELECT`
//! but ending in `DELETE` is *also* a read. Strict mode closes the second gap
//! by parsing the text; it can only upgrade a verdict, never downgrade one.

mod parser;

pub use parser::{contains_modification, contains_transaction_control};

use std::fmt;
use tracing::debug;

/// Leading verbs that mark a query as mutating.
pub const MUTATING_VERBS: [&str; 3] = ["INSERT", "UPDATE", "DELETE"];

/// Leading verbs that open, close or nest a transaction.
pub const TRANSACTION_VERBS: [&str; 6] =
    ["BEGIN", "COMMIT", "END", "ROLLBACK", "SAVEPOINT", "RELEASE"];

/// Whether a query reads or mutates data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Anything not starting with a mutating verb.
    Read,
    /// Starts with INSERT, UPDATE or DELETE.
    Mutating,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "Read"),
            Self::Mutating => write!(f, "Mutating"),
        }
    }
}

/// Lexical classification: trim, uppercase, check the prefix.
pub fn classify(query: &str) -> QueryKind {
    let upper = query.trim().to_uppercase();
    if MUTATING_VERBS.iter().any(|verb| upper.starts_with(verb)) {
        QueryKind::Mutating
    } else {
        QueryKind::Read
    }
}

/// True when the query would begin or end a transaction itself, either as
/// its leading verb or as any statement of a batch that parses.
pub fn controls_transaction(query: &str) -> bool {
    let upper = query.trim_start().to_uppercase();
    let leading = upper
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    TRANSACTION_VERBS.contains(&leading) || contains_transaction_control(query) == Some(true)
}

/// Classifier with configurable strictness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classifier {
    strict: bool,
}

impl Classifier {
    /// Lexical-only classifier.
    pub fn lexical() -> Self {
        Self { strict: false }
    }

    /// Classifier that also parses the query.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Builds a classifier from the `strict` flag.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Classifies a query.
    pub fn classify(&self, query: &str) -> QueryKind {
        let lexical = classify(query);
        let kind = match lexical {
            QueryKind::Read if self.strict && contains_modification(query) == Some(true) => {
                QueryKind::Mutating
            }
            other => other,
        };
        debug!(strict = self.strict, %kind, "Classified query");
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutating_prefixes() {
        for sql in [
            "INSERT INTO users (name) VALUES ('a')",
            "update users set name = 'x'",
            "  Delete From users",
            "\n\tUPDATE t SET a = 1",
            "INSERTED", // prefix only, by definition
        ] {
            assert_eq!(classify(sql), QueryKind::Mutating, "{sql}");
        }
    }

    #[test]
    fn test_read_prefixes() {
        for sql in [
            "SELECT * FROM users",
            "select 'UPDATE' as word",
            "PRAGMA table_info(users)",
            "WITH x AS (SELECT 1) SELECT * FROM x",
            "REPLACE INTO users VALUES (1, 'a')",
            "-- comment\nDELETE FROM users",
        ] {
            assert_eq!(classify(sql), QueryKind::Read, "{sql}");
        }
    }

    #[test]
    fn test_empty_is_read() {
        assert_eq!(classify(""), QueryKind::Read);
        assert_eq!(classify("   \n"), QueryKind::Read);
    }

    #[test]
    fn test_lexical_classifier_misses_trailing_delete() {
        let sql = "SELECT 1; DELETE FROM users";
        assert_eq!(Classifier::lexical().classify(sql), QueryKind::Read);
    }

    #[test]
    fn test_strict_classifier_catches_trailing_delete() {
        let sql = "SELECT 1; DELETE FROM users";
        assert_eq!(Classifier::strict().classify(sql), QueryKind::Mutating);
    }

    #[test]
    fn test_strict_never_downgrades() {
        assert_eq!(
            Classifier::strict().classify("DELETE FROM ((("),
            QueryKind::Mutating
        );
    }

    #[test]
    fn test_strict_keeps_string_literal_reads() {
        assert_eq!(
            Classifier::strict().classify("SELECT 'UPDATE users' AS note"),
            QueryKind::Read
        );
    }

    #[test]
    fn test_transaction_control_verbs() {
        for sql in [
            "BEGIN",
            "begin immediate transaction",
            "  END;",
            "COMMIT",
            "ROLLBACK TO sp1",
            "SAVEPOINT sp1",
            "RELEASE sp1",
            "SELECT 1; COMMIT",
        ] {
            assert!(controls_transaction(sql), "{sql}");
        }
    }

    #[test]
    fn test_ordinary_queries_do_not_control_transactions() {
        for sql in [
            "SELECT * FROM users",
            "SELECT 'COMMIT' AS word",
            "UPDATE users SET name = 'Ending' WHERE id = 1",
            "REPLACE INTO users (id, name) VALUES (2, 'R')",
            "BEGINNING",
        ] {
            assert!(!controls_transaction(sql), "{sql}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(QueryKind::Read.to_string(), "Read");
        assert_eq!(QueryKind::Mutating.to_string(), "Mutating");
    }
}
