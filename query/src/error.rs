//! Error types for query declaration and backing stores
//!
//! Declaration problems (unknown operators, malformed orderings or JSON
//! declarations) surface while a definition is being built. Store errors are
//! passed through untouched from whichever backend materializes a scope.

use thiserror::Error;

/// Errors raised while declaring or running a query
#[derive(Error, Debug)]
pub enum QueryError {
    /// Operator token is not one of the supported operators
    #[error("Unknown operator {0}.")]
    UnknownOperator(String),

    /// Ordering text could not be parsed
    #[error("Invalid ordering: {0}")]
    InvalidOrdering(String),

    /// JSON declaration is malformed or exceeds limits
    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    pub fn unknown_operator(token: impl Into<String>) -> Self {
        Self::UnknownOperator(token.into())
    }

    pub fn invalid_ordering(reason: impl Into<String>) -> Self {
        Self::InvalidOrdering(reason.into())
    }

    pub fn invalid_declaration(reason: impl Into<String>) -> Self {
        Self::InvalidDeclaration(reason.into())
    }

    /// True for errors raised while building a definition, before any
    /// filter value is looked at
    pub fn is_declaration_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// Errors raised by backing stores while resolving or materializing a scope
#[derive(Error, Debug)]
pub enum StoreError {
    /// Table is not registered in the catalog
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Association hop cannot be resolved from the owning table
    #[error("Unknown association {association} on {table}")]
    UnknownAssociation { table: String, association: String },

    /// Record inserted without an `id` field
    #[error("Record for {table} is missing an id")]
    MissingId { table: String },

    /// Record is not a JSON object
    #[error("Record for {table} must be a JSON object")]
    NotAnObject { table: String },

    /// Two different join paths resolve to the same table alias
    #[error("Join alias {0} is used by more than one path")]
    DuplicateAlias(String),

    /// Table, alias or field name that cannot be rendered into SQL
    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    /// SQLite error from sqlx
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),
}

impl StoreError {
    pub fn unknown_table(table: impl Into<String>) -> Self {
        Self::UnknownTable(table.into())
    }

    pub fn unknown_association(table: impl Into<String>, association: impl Into<String>) -> Self {
        Self::UnknownAssociation {
            table: table.into(),
            association: association.into(),
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::UnknownTable(_)
            | Self::UnknownAssociation { .. }
            | Self::MissingId { .. }
            | Self::NotAnObject { .. }
            | Self::DuplicateAlias(_) => "catalog",
            Self::InvalidIdentifier(_) => "sql",
        }
    }
}
