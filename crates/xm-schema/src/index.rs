//! Index descriptors and the default naming rule

use std::fmt;

/// Kind of key or index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
    Foreign,
}

impl IndexKind {
    /// Suffix used by [`default_index_name`]
    pub fn suffix(&self) -> &'static str {
        match self {
            IndexKind::Primary => "primary",
            IndexKind::Unique => "unique",
            IndexKind::Index => "index",
            IndexKind::Foreign => "foreign",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexKind::Primary => "primary key",
            IndexKind::Unique => "unique index",
            IndexKind::Index => "index",
            IndexKind::Foreign => "foreign key",
        })
    }
}

/// Deterministic name for a key: `{table}_{col1_col2..}_{kind}`.
///
/// Declaring and dropping a key both go through this rule, so a drop never
/// needs to repeat the name the key was created with.
pub fn default_index_name(table: &str, columns: &[String], kind: IndexKind) -> String {
    format!("{}_{}_{}", table, columns.join("_"), kind.suffix())
}

/// A primary key, unique index, plain index, or (for drops) foreign key over
/// one or more columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    name: String,
    columns: Vec<String>,
    kind: IndexKind,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<String>, kind: IndexKind) -> Self {
        Self {
            name: name.into(),
            columns,
            kind,
        }
    }

    /// Override the synthesized name
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    /// Whether `column` is one of the indexed columns
    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Anything accepted where a key takes one or several column names
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for &[&str] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_single_column() {
        let cols = "id".into_columns();
        assert_eq!(
            default_index_name("testcases", &cols, IndexKind::Primary),
            "testcases_id_primary"
        );
    }

    #[test]
    fn test_default_name_composite() {
        let cols = ["first", "last"].into_columns();
        assert_eq!(
            default_index_name("users", &cols, IndexKind::Index),
            "users_first_last_index"
        );
    }

    #[test]
    fn test_named_overrides() {
        let mut idx = IndexDescriptor::new("users_email_unique", "email".into_columns(), IndexKind::Unique);
        idx.named("uq_email");
        assert_eq!(idx.name(), "uq_email");
        assert!(idx.covers("email"));
        assert!(!idx.covers("id"));
    }
}
