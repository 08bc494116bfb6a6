//! SQLite SQL dialect implementation

use super::SqlDialect;

/// SQLite SQL dialect
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn cast_to_string(&self, col: &str) -> String {
        format!("CAST({} AS TEXT)", col)
    }

    fn contains(&self, col: &str, param_idx: usize) -> String {
        // LIKE is already case-insensitive for ASCII in SQLite
        format!(
            "{} LIKE {} ESCAPE '\\'",
            self.cast_to_string(col),
            self.placeholder(param_idx)
        )
    }

    fn order_term(&self, col: &str, desc: bool) -> String {
        // SQLite treats NULL as the smallest value
        let dir = if desc { "DESC" } else { "ASC" };
        format!("{} {}", col, dir)
    }
}
