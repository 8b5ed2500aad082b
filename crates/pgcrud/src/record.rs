//! Ordered column/value/type records.

use crate::codec::{self, BoundValue};
use crate::error::{CrudError, CrudResult};
use std::fmt;

/// One `(column, value, declared type)` entry of a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub column: String,
    /// `None` is SQL NULL.
    pub value: Option<String>,
    /// Type name as reported by the catalog.
    pub declared_type: String,
}

impl Field {
    /// Bind this field's value through the codec using its stored type.
    pub fn bind(&self) -> CrudResult<BoundValue> {
        codec::bind_value(&self.declared_type, self.value.as_deref())
    }
}

/// An ordered set of fields with unique column names.
///
/// Used both as an insert payload and as an equality filter for updates and
/// deletes. Iteration order is insertion order, which is also the order of
/// columns and placeholders in the generated SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Append a column value. Fails if the column is already present.
    pub fn push(
        &mut self,
        column: impl Into<String>,
        value: impl Into<String>,
        declared_type: impl Into<String>,
    ) -> CrudResult<()> {
        self.push_field(Field {
            column: column.into(),
            value: Some(value.into()),
            declared_type: declared_type.into(),
        })
    }

    /// Append a NULL column value.
    pub fn push_null(
        &mut self,
        column: impl Into<String>,
        declared_type: impl Into<String>,
    ) -> CrudResult<()> {
        self.push_field(Field {
            column: column.into(),
            value: None,
            declared_type: declared_type.into(),
        })
    }

    pub fn push_field(&mut self, field: Field) -> CrudResult<()> {
        if self.contains(&field.column) {
            return Err(CrudError::DuplicateColumn(field.column));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Builder form of [`Record::push`].
    pub fn with(
        mut self,
        column: impl Into<String>,
        value: impl Into<String>,
        declared_type: impl Into<String>,
    ) -> CrudResult<Self> {
        self.push(column, value, declared_type)?;
        Ok(self)
    }

    pub fn field(&self, column: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// Value of `column`; `None` when the column is absent or NULL.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.field(column).and_then(|f| f.value.as_deref())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.field(column).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{}: {}",
                field.column,
                field.value.as_deref().unwrap_or("NULL")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Record {
        Record::new()
            .with("id", "1", "integer")
            .and_then(|r| r.with("name", "Ana", "character varying"))
            .and_then(|r| r.with("active", "true", "boolean"))
            .unwrap()
    }

    #[test]
    fn keeps_insertion_order() {
        let record = student();
        assert_eq!(record.column_names(), vec!["id", "name", "active"]);
        assert_eq!(record.len(), 3);
        let types: Vec<_> = record.iter().map(|f| f.declared_type.as_str()).collect();
        assert_eq!(types, vec!["integer", "character varying", "boolean"]);
    }

    #[test]
    fn lookup_by_exact_name() {
        let record = student();
        assert_eq!(record.value("name"), Some("Ana"));
        assert_eq!(record.value("Name"), None);
        assert!(record.contains("active"));
        assert!(!record.contains("missing"));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let mut record = student();
        let err = record.push("id", "2", "integer").unwrap_err();
        assert!(matches!(err, CrudError::DuplicateColumn(c) if c == "id"));
        assert!(record.push_null("name", "character varying").is_err());
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn nulls_are_distinct_from_missing() {
        let mut record = Record::new();
        record.push_null("born", "date").unwrap();
        assert!(record.contains("born"));
        assert_eq!(record.value("born"), None);
        assert_eq!(record.field("born").unwrap().value, None);
    }

    #[test]
    fn display_lists_pairs() {
        let mut record = student();
        record.push_null("born", "date").unwrap();
        assert_eq!(
            record.to_string(),
            "id: 1, name: Ana, active: true, born: NULL"
        );
        assert_eq!(Record::new().to_string(), "");
    }

    #[test]
    fn fields_bind_with_their_stored_type() {
        let record = student();
        let bound: Vec<_> = record.iter().map(|f| f.bind().unwrap()).collect();
        assert_eq!(
            bound,
            vec![
                BoundValue::Integer(1),
                BoundValue::Text("Ana".into()),
                BoundValue::Boolean(true)
            ]
        );
    }
}
