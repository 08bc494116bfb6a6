//! SQL dialect trait
//!
//! Scopes render the same joins, conditions and orderings for every backend;
//! the dialect only supplies the pieces whose syntax differs.

/// SQL dialect trait for generating database-specific SQL
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Cast a column to string type
    ///
    /// - SQLite: `CAST(col AS TEXT)`
    /// - PostgreSQL: `col::TEXT`
    fn cast_to_string(&self, col: &str) -> String;

    /// Case-insensitive substring match against a bound, already escaped
    /// `%pattern%` parameter
    ///
    /// - SQLite: `CAST(col AS TEXT) LIKE ? ESCAPE '\'`
    /// - PostgreSQL: `col::TEXT ILIKE $1 ESCAPE '\'`
    fn contains(&self, col: &str, param_idx: usize) -> String;

    /// ORDER BY term that sorts nulls first ascending and last descending
    ///
    /// - SQLite: native behavior, `col DESC`
    /// - PostgreSQL: `col DESC NULLS LAST`
    fn order_term(&self, col: &str, desc: bool) -> String;
}
