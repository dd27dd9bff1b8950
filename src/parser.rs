//! Statement classification for log categories.

/// Category for ordinary statements.
pub const STATEMENT_CATEGORY: &str = "statement";
/// Category for transaction commits.
pub const COMMIT_CATEGORY: &str = "commit";
/// Category for transaction rollbacks.
pub const ROLLBACK_CATEGORY: &str = "rollback";

/// Log category for a SQL statement, taken from its leading keyword.
pub fn categorize(sql: &str) -> &'static str {
    let keyword = sql.split_whitespace().next().unwrap_or_default();

    if keyword.eq_ignore_ascii_case("COMMIT") {
        COMMIT_CATEGORY
    } else if keyword.eq_ignore_ascii_case("ROLLBACK") {
        ROLLBACK_CATEGORY
    } else {
        STATEMENT_CATEGORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements() {
        assert_eq!(categorize("SELECT 1"), "statement");
        assert_eq!(categorize("INSERT INTO t VALUES (1)"), "statement");
        assert_eq!(categorize("BEGIN"), "statement");
        assert_eq!(categorize("COMMITTED_AT"), "statement");
        assert_eq!(categorize(""), "statement");
    }

    #[test]
    fn test_transaction_endings() {
        assert_eq!(categorize("COMMIT"), "commit");
        assert_eq!(categorize("  commit work"), "commit");
        assert_eq!(categorize(" rollback"), "rollback");
        assert_eq!(categorize("ROLLBACK TO SAVEPOINT sp1"), "rollback");
    }
}
