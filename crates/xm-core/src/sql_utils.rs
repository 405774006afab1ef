//! SQL quoting utilities
//!
//! Identifier quoting differs per dialect, so each helper takes the opening
//! and closing delimiter explicitly.

/// Quote an identifier using ANSI double quotes.
///
/// # Examples
/// ```
/// use xm_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    quote_ident_with(ident, '"', '"')
}

/// Quote an identifier with explicit delimiters, doubling any embedded
/// closing delimiter.
///
/// # Examples
/// ```
/// use xm_core::sql_utils::quote_ident_with;
/// assert_eq!(quote_ident_with("users", '`', '`'), "`users`");
/// assert_eq!(quote_ident_with("a]b", '[', ']'), "[a]]b]");
/// ```
pub fn quote_ident_with(ident: &str, open: char, close: char) -> String {
    let mut escaped = String::with_capacity(ident.len() + 2);
    escaped.push(open);
    for ch in ident.chars() {
        if ch == close {
            escaped.push(close);
        }
        escaped.push(ch);
    }
    escaped.push(close);
    escaped
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render a complete single-quoted SQL string literal
pub fn quote_string(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}
