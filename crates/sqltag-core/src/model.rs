//! Model metadata: the ordered field descriptors a table is built from.
//!
//! Descriptors are plain owned values. They are normally produced by
//! `#[derive(Model)]`, but can equally be assembled at runtime:
//!
//! ```rust
//! use sqltag_core::ModelDescriptor;
//!
//! let category = ModelDescriptor::new("Category")
//!     .field("Id", "i64", "PRIMARY KEY AUTOINCREMENT")
//!     .field("Name", "String", "NOT NULL UNIQUE");
//! assert_eq!(category.table_name(), "category");
//! assert!(category.has_field("Name"));
//! ```

use crate::naming::to_snake_case;

/// One field of a data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name as declared.
    pub name: String,
    /// Declared type, either a storage class keyword or a Rust type.
    pub declared_type: String,
    /// Raw annotation text. Empty or `-` means the field has no column.
    pub annotation: String,
}

impl FieldDescriptor {
    /// Creates a field descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        annotation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            annotation: annotation.into(),
        }
    }

    /// Returns true if the field maps to a column.
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        let annotation = self.annotation.trim();
        !annotation.is_empty() && annotation != "-"
    }

    /// Returns the SQL identifier of the field.
    #[must_use]
    pub fn column_name(&self) -> String {
        to_snake_case(&self.name)
    }
}

/// A data model: its entity name and ordered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Entity name as declared.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    /// Creates a model with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        annotation: impl Into<String>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, declared_type, annotation));
        self
    }

    /// Returns the SQL identifier of the entity.
    #[must_use]
    pub fn table_name(&self) -> String {
        to_snake_case(&self.name)
    }

    /// Returns the field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns true if a field with exactly this name exists.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Returns true if `name` designates a field, either by its declared
    /// name or by its SQL identifier.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        let wanted = to_snake_case(name);
        self.fields
            .iter()
            .any(|f| f.name == name || f.column_name() == wanted)
    }

    /// Like [`ModelDescriptor::has_column`], but only matches fields that
    /// produce a column.
    #[must_use]
    pub fn maps_column(&self, name: &str) -> bool {
        let wanted = to_snake_case(name);
        self.fields
            .iter()
            .filter(|f| f.is_mapped())
            .any(|f| f.name == name || f.column_name() == wanted)
    }
}

/// Types that describe a data model.
///
/// Implemented by `#[derive(Model)]`.
pub trait Model {
    /// Returns the model's descriptor.
    fn descriptor() -> ModelDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_fields() {
        assert!(!FieldDescriptor::new("Cache", "String", "").is_mapped());
        assert!(!FieldDescriptor::new("Cache", "String", " - ").is_mapped());
        assert!(FieldDescriptor::new("Id", "i64", "PRIMARY KEY").is_mapped());
    }

    #[test]
    fn test_column_lookup() {
        let model = ModelDescriptor::new("OrderLine")
            .field("OrderID", "i64", "NOT NULL")
            .field("Qty", "i32", "NOT NULL");
        assert_eq!(model.table_name(), "order_line");
        assert!(model.has_field("OrderID"));
        assert!(!model.has_field("order_id"));
        assert!(model.has_column("order_id"));
        assert!(!model.has_column("price"));
        assert_eq!(model.field_names().collect::<Vec<_>>(), vec!["OrderID", "Qty"]);
    }

    #[test]
    fn test_unmapped_field_is_not_a_column() {
        let model = ModelDescriptor::new("Item")
            .field("Id", "i64", "PRIMARY KEY")
            .field("Cache", "String", "-")
            .field("Note", "String", "");
        assert!(model.has_column("Cache"));
        assert!(!model.maps_column("Cache"));
        assert!(!model.maps_column("note"));
        assert!(model.maps_column("id"));
    }
}
