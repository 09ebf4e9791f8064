//! Validated table names and their shadow/retired counterparts

use std::fmt;

use crate::domain::DomainError;

const MAX_IDENTIFIER_LEN: usize = 63;
const TEMP_SUFFIX: &str = "_temp";
const OLD_SUFFIX: &str = "_old";

/// Validate a single SQL identifier part
pub fn validate_identifier(part: &str) -> Result<(), DomainError> {
    if part.is_empty() {
        return Err(DomainError::validation("Table name part cannot be empty"));
    }

    // Room for the longest derived suffix
    if part.len() + TEMP_SUFFIX.len() > MAX_IDENTIFIER_LEN {
        return Err(DomainError::validation(format!(
            "Table name part '{}' is too long",
            part
        )));
    }

    let mut chars = part.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DomainError::validation(format!(
            "Invalid table name part '{}': use letters, digits and underscores",
            part
        )));
    }

    Ok(())
}

/// Live table name, optionally schema-qualified (`schema.table`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    schema: Option<String>,
    name: String,
}

impl TableName {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = value.trim().split('.').collect();

        let (schema, name) = match parts.as_slice() {
            [name] => (None, *name),
            [schema, name] => (Some(*schema), *name),
            _ => {
                return Err(DomainError::validation(format!(
                    "Invalid table name '{}'",
                    value
                )))
            }
        };

        if let Some(schema) = schema {
            validate_identifier(schema)?;
        }
        validate_identifier(name)?;

        Ok(Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        })
    }

    /// Unqualified name, used as the target of renames
    pub fn short(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Fully qualified live name
    pub fn qualified(&self) -> String {
        self.qualify(&self.name)
    }

    /// Qualified shadow (staging) table name
    pub fn temp(&self) -> String {
        self.qualify(&self.temp_short())
    }

    pub fn temp_short(&self) -> String {
        format!("{}{}", self.name, TEMP_SUFFIX)
    }

    /// Qualified retired table name
    pub fn old(&self) -> String {
        self.qualify(&self.old_short())
    }

    pub fn old_short(&self) -> String {
        format!("{}{}", self.name, OLD_SUFFIX)
    }

    fn qualify(&self, name: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, name),
            None => name.to_string(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

impl std::str::FromStr for TableName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
