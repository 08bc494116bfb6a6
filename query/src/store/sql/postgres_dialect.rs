//! PostgreSQL SQL dialect implementation

use super::SqlDialect;

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn cast_to_string(&self, col: &str) -> String {
        format!("{}::TEXT", col)
    }

    fn contains(&self, col: &str, param_idx: usize) -> String {
        format!(
            "{} ILIKE {} ESCAPE '\\'",
            self.cast_to_string(col),
            self.placeholder(param_idx)
        )
    }

    fn order_term(&self, col: &str, desc: bool) -> String {
        let (dir, nulls) = if desc {
            ("DESC", "NULLS LAST")
        } else {
            ("ASC", "NULLS FIRST")
        };
        format!("{} {} {}", col, dir, nulls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.placeholder(1), "$1");
        assert_eq!(dialect.placeholder(10), "$10");
    }

    #[test]
    fn test_contains() {
        let dialect = PostgresDialect;
        assert_eq!(
            dialect.contains("comments.text", 2),
            "comments.text::TEXT ILIKE $2 ESCAPE '\\'"
        );
    }

    #[test]
    fn test_order_term() {
        let dialect = PostgresDialect;
        assert_eq!(
            dialect.order_term("published_at", false),
            "published_at ASC NULLS FIRST"
        );
        assert_eq!(
            dialect.order_term("published_at", true),
            "published_at DESC NULLS LAST"
        );
    }
}
