//! Helpers for splicing filter input into SQL text

/// Escape a `contains` needle so LIKE treats it as a literal substring
///
/// The stores bind `%needle%` with `ESCAPE '\'`, so backslash, `%` and `_`
/// in the needle are each prefixed with a backslash.
///
/// ```
/// use index_query::utils::sql::escape_like_pattern;
///
/// let needle = "50%_off";
/// assert_eq!(format!("%{}%", escape_like_pattern(needle)), "%50\\%\\_off%");
/// ```
pub fn escape_like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Check that an identifier is safe to splice into SQL unquoted
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_needle_is_unchanged() {
        assert_eq!(escape_like_pattern("amazing"), "amazing");
        assert_eq!(escape_like_pattern(""), "");
    }

    #[test]
    fn test_needle_wildcards_are_escaped() {
        assert_eq!(escape_like_pattern("50%"), "50\\%");
        assert_eq!(escape_like_pattern("sku_code"), "sku\\_code");
    }

    #[test]
    fn test_needle_backslash_is_escaped() {
        assert_eq!(escape_like_pattern("C:\\tmp_%"), "C:\\\\tmp\\_\\%");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("view_count"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("table2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("id; DROP TABLE posts"));
        assert!(!is_identifier("posts.id"));
    }
}
