//! Parser-backed modification scan.
//!
//! Uses sqlparser-rs with the SQLite dialect to look for data-modifying
//! statements anywhere in the text, including later statements of a batch
//! and modifying CTE bodies.

use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

/// Returns `Some(true)` if any parsed statement inserts, updates or deletes
/// rows, `Some(false)` if none does, and `None` if the text does not parse.
pub fn contains_modification(sql: &str) -> Option<bool> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, sql).ok()?;
    Some(statements.iter().any(statement_modifies))
}

/// Returns `Some(true)` if any parsed statement begins, ends or nests a
/// transaction, `None` if the text does not parse.
pub fn contains_transaction_control(sql: &str) -> Option<bool> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, sql).ok()?;
    Some(statements.iter().any(|statement| {
        matches!(
            statement,
            Statement::StartTransaction { .. }
                | Statement::Commit { .. }
                | Statement::Rollback { .. }
                | Statement::Savepoint { .. }
                | Statement::ReleaseSavepoint { .. }
        )
    }))
}

fn statement_modifies(statement: &Statement) -> bool {
    match statement {
        Statement::Insert(_) | Statement::Update { .. } | Statement::Delete(_) => true,
        Statement::Query(query) => query_modifies(query),
        _ => false,
    }
}

fn query_modifies(query: &Query) -> bool {
    let in_ctes = query
        .with
        .as_ref()
        .is_some_and(|with| with.cte_tables.iter().any(|cte| query_modifies(&cte.query)));

    in_ctes || set_expr_modifies(&query.body)
}

fn set_expr_modifies(set_expr: &SetExpr) -> bool {
    match set_expr {
        SetExpr::Insert(stmt) | SetExpr::Update(stmt) => statement_modifies(stmt),
        SetExpr::Query(query) => query_modifies(query),
        SetExpr::SetOperation { left, right, .. } => {
            set_expr_modifies(left) || set_expr_modifies(right)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_control_in_batch() {
        assert_eq!(
            contains_transaction_control("SELECT 1; COMMIT"),
            Some(true)
        );
        assert_eq!(contains_transaction_control("SAVEPOINT a"), Some(true));
        assert_eq!(
            contains_transaction_control("SELECT 'COMMIT' AS word"),
            Some(false)
        );
    }

    #[test]
    fn test_plain_select() {
        assert_eq!(contains_modification("SELECT * FROM users"), Some(false));
    }

    #[test]
    fn test_single_modifications() {
        assert_eq!(
            contains_modification("INSERT INTO users (name) VALUES ('a')"),
            Some(true)
        );
        assert_eq!(
            contains_modification("UPDATE users SET name = 'b' WHERE id = 1"),
            Some(true)
        );
        assert_eq!(contains_modification("DELETE FROM users"), Some(true));
    }

    #[test]
    fn test_batch_with_trailing_modification() {
        assert_eq!(
            contains_modification("SELECT * FROM users; DELETE FROM users"),
            Some(true)
        );
    }

    #[test]
    fn test_union_of_reads() {
        assert_eq!(
            contains_modification("SELECT id FROM a UNION SELECT id FROM b"),
            Some(false)
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(contains_modification("SELEC * FORM"), None);
    }
}
