//! Column declarations
//!
//! A [`Column`] is an engine-agnostic description: an abstract [`TypeToken`],
//! its [`ColumnParams`], and the nullable/default/unsigned modifiers. It only
//! becomes a native type when the [`TypeMapper`](crate::TypeMapper) resolves
//! it for a dialect.

use std::fmt;

/// Abstract column type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeToken {
    BigInteger,
    Integer,
    MediumInteger,
    SmallInteger,
    Decimal,
    Double,
    Float,
    Char,
    String,
    Text,
    MediumText,
    LongText,
    Date,
    DateTime,
    Time,
    Timestamp,
    Binary,
    Boolean,
    Enum,
    Json,
    Array,
    /// Anything not recognised; resolved to the dialect's generic text type
    Unknown(String),
}

impl TypeToken {
    /// Parse a type token. Never fails: unrecognised names become
    /// [`TypeToken::Unknown`].
    ///
    /// Matching ignores case and underscores, so `big_integer`,
    /// `bigInteger` and `BIGINTEGER` are the same token.
    pub fn parse(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "biginteger" | "bigint" => TypeToken::BigInteger,
            "integer" | "int" => TypeToken::Integer,
            "mediuminteger" | "mediumint" => TypeToken::MediumInteger,
            "smallinteger" | "smallint" => TypeToken::SmallInteger,
            "decimal" | "numeric" => TypeToken::Decimal,
            "double" => TypeToken::Double,
            "float" => TypeToken::Float,
            "char" => TypeToken::Char,
            "string" | "varchar" => TypeToken::String,
            "text" => TypeToken::Text,
            "mediumtext" => TypeToken::MediumText,
            "longtext" => TypeToken::LongText,
            "date" => TypeToken::Date,
            "datetime" => TypeToken::DateTime,
            "time" => TypeToken::Time,
            "timestamp" => TypeToken::Timestamp,
            "binary" | "blob" => TypeToken::Binary,
            "boolean" | "bool" => TypeToken::Boolean,
            "enum" | "enumeration" => TypeToken::Enum,
            "json" => TypeToken::Json,
            "array" => TypeToken::Array,
            _ => TypeToken::Unknown(name.to_string()),
        }
    }

    /// Canonical snake_case token name
    pub fn as_str(&self) -> &str {
        match self {
            TypeToken::BigInteger => "big_integer",
            TypeToken::Integer => "integer",
            TypeToken::MediumInteger => "medium_integer",
            TypeToken::SmallInteger => "small_integer",
            TypeToken::Decimal => "decimal",
            TypeToken::Double => "double",
            TypeToken::Float => "float",
            TypeToken::Char => "char",
            TypeToken::String => "string",
            TypeToken::Text => "text",
            TypeToken::MediumText => "medium_text",
            TypeToken::LongText => "long_text",
            TypeToken::Date => "date",
            TypeToken::DateTime => "datetime",
            TypeToken::Time => "time",
            TypeToken::Timestamp => "timestamp",
            TypeToken::Binary => "binary",
            TypeToken::Boolean => "boolean",
            TypeToken::Enum => "enum",
            TypeToken::Json => "json",
            TypeToken::Array => "array",
            TypeToken::Unknown(name) => name,
        }
    }

    /// Whether this is one of the integer tokens
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeToken::BigInteger
                | TypeToken::Integer
                | TypeToken::MediumInteger
                | TypeToken::SmallInteger
        )
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type parameters attached to a column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnParams {
    /// Character length for `char` / `string`
    pub length: Option<u32>,
    /// Total digits for `decimal` / `double` / `float`
    pub precision: Option<u32>,
    /// Fractional digits for `decimal` / `double` / `float`
    pub scale: Option<u32>,
    /// Allowed values for `enum`
    pub fields: Vec<String>,
    /// Element type for `array`
    pub element: Option<Box<TypeToken>>,
    /// Array dimensions (defaults to one)
    pub dimensions: Option<u32>,
    /// Whether the store generates values for this column
    pub autoincrement: bool,
}

impl ColumnParams {
    /// Params carrying only a length
    pub fn with_length(length: Option<u32>) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// Params carrying precision and scale
    pub fn with_precision(precision: u32, scale: u32) -> Self {
        Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::default()
        }
    }

    /// Params for an auto-incrementing integer
    pub fn autoincrement() -> Self {
        Self {
            autoincrement: true,
            ..Self::default()
        }
    }
}

/// Column default value
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// A string literal; quoted and escaped when rendered
    Text(String),
    /// Raw SQL expression emitted verbatim (e.g. `CURRENT_TIMESTAMP`)
    Expression(String),
}

impl DefaultValue {
    /// A raw SQL default expression
    pub fn expression(sql: impl Into<String>) -> Self {
        DefaultValue::Expression(sql.into())
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Boolean(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Integer(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Integer(i64::from(value))
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Float(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Text(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::Text(value)
    }
}

/// One declared column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    token: TypeToken,
    params: ColumnParams,
    nullable: bool,
    default: Option<DefaultValue>,
    unsigned: bool,
}

impl Column {
    /// Declare a NOT NULL column without a default
    pub fn new(name: impl Into<String>, token: TypeToken, params: ColumnParams) -> Self {
        Self {
            name: name.into(),
            token,
            params,
            nullable: false,
            default: None,
            unsigned: false,
        }
    }

    /// Allow NULL values
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Set the default value
    pub fn default(&mut self, value: impl Into<DefaultValue>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    /// Mark an integer column as unsigned
    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &TypeToken {
        &self.token
    }

    pub fn params(&self) -> &ColumnParams {
        &self.params
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }
}
