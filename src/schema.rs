use std::collections::HashMap;
use thiserror::Error;

/// Field names of the combined access-log format, in record order.
pub const COMBINED_FIELDS: [&str; 10] = [
    "ipaddr",
    "garbage",
    "timestamp",
    "method",
    "url",
    "version",
    "code",
    "size",
    "referrer",
    "useragent",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field schema must name at least one field")]
    Empty,

    #[error("Invalid field name '{0}': names start with a letter and contain only letters, digits and '_'")]
    InvalidName(String),

    #[error("Duplicate field name '{0}'")]
    Duplicate(String),
}

/// Ordered mapping from field name to record index.
///
/// A schema is built once and handed to the expression parser, which resolves
/// every field identifier through it. Records produced for the same schema
/// carry exactly `len()` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    names: Vec<String>,
    indexes: HashMap<String, usize>,
}

impl FieldSchema {
    /// Build a schema from names in record order.
    pub fn new<I, S>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut indexes = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if !is_identifier(name) {
                return Err(SchemaError::InvalidName(name.clone()));
            }
            if indexes.insert(name.clone(), index).is_some() {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }

        Ok(Self { names, indexes })
    }

    /// The ten-field schema of the combined access-log format.
    pub fn combined() -> Self {
        let names: Vec<String> = COMBINED_FIELDS.iter().map(|s| s.to_string()).collect();
        let indexes = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();
        Self { names, indexes }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indexes.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Every index in record order.
    pub fn all_indexes(&self) -> Vec<usize> {
        (0..self.names.len()).collect()
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::combined()
    }
}

/// Same rule the expression tokenizer uses for field identifiers.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_schema_indexes() {
        let schema = FieldSchema::combined();
        assert_eq!(schema.len(), 10);
        assert_eq!(schema.index_of("ipaddr"), Some(0));
        assert_eq!(schema.index_of("method"), Some(3));
        assert_eq!(schema.index_of("useragent"), Some(9));
        assert_eq!(schema.index_of("ipcraddr"), None);
        assert_eq!(schema.name_of(4), Some("url"));
        assert_eq!(schema.name_of(10), None);
    }

    #[test]
    fn test_custom_schema() {
        let schema = FieldSchema::new(["host", "status_code"]).unwrap();
        assert_eq!(schema.index_of("status_code"), Some(1));
        assert_eq!(schema.all_indexes(), vec![0, 1]);
    }

    #[test]
    fn test_schema_rejects_bad_names() {
        assert_eq!(
            FieldSchema::new(Vec::<String>::new()),
            Err(SchemaError::Empty)
        );
        assert_eq!(
            FieldSchema::new(["ok", "1bad"]),
            Err(SchemaError::InvalidName("1bad".to_string()))
        );
        assert_eq!(
            FieldSchema::new(["a", "b", "a"]),
            Err(SchemaError::Duplicate("a".to_string()))
        );
    }
}
