// =============================================================================
// Declarations
// =============================================================================

/// Maximum size of a JSON declaration document in bytes (64KB)
pub const MAX_DECLARATION_JSON_SIZE: usize = 64 * 1024;

/// Maximum number of filter declarations in one JSON document
pub const MAX_DECLARED_FILTERS: usize = 100;

/// Maximum number of order_by entries in one JSON document
pub const MAX_DECLARED_ORDERINGS: usize = 20;

// =============================================================================
// SQL
// =============================================================================

/// Column alias carrying the parent id when selecting eager-loaded children
pub const SQL_PARENT_ID_ALIAS: &str = "__parent_id";

/// Primary key column assumed on every table
pub const PRIMARY_KEY: &str = "id";
