//! JSON schema documents.
//!
//! A document lists models with their annotated fields, and the pragmas,
//! tables and indexes to build from them:
//!
//! ```json
//! {
//!   "name": "shop",
//!   "pragmas": [{ "name": "foreign_keys", "value": true }],
//!   "models": [
//!     { "name": "Category", "fields": [{ "name": "Id", "type": "i64", "sql": "PRIMARY KEY" }] }
//!   ],
//!   "tables": [{ "model": "Category", "if_not_exists": true }],
//!   "indexes": []
//! }
//! ```

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use sqltag_core::clause::IndexedColumn;
use sqltag_core::expr::Expression;
use sqltag_core::{Index, ModelDescriptor, Pragma, Schema, SchemaError, Table};

/// A whole schema document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub name: String,
    #[serde(default)]
    pub pragmas: Vec<PragmaSpec>,
    #[serde(default)]
    pub models: Vec<ModelSpec>,
    #[serde(default)]
    pub tables: Vec<TableSpec>,
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PragmaSpec {
    pub name: String,
    pub schema: Option<String>,
    pub value: Option<Value>,
    pub argument: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub sql: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct TableSpec {
    pub model: String,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub temporary: bool,
    #[serde(default)]
    pub if_not_exists: bool,
    #[serde(default)]
    pub without_rowid: bool,
    #[serde(default)]
    pub strict: bool,
    pub schema: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexSpec {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub if_not_exists: bool,
    pub schema: Option<String>,
    #[serde(rename = "where")]
    pub predicate: Option<String>,
}

/// A model whose table could not be built.
#[derive(Debug)]
pub struct ModelFailure {
    pub model: String,
    pub error: SchemaError,
}

impl ModelSpec {
    fn descriptor(&self) -> ModelDescriptor {
        self.fields
            .iter()
            .fold(ModelDescriptor::new(&self.name), |model, field| {
                model.field(&field.name, &field.declared_type, &field.sql)
            })
    }
}

fn scalar(value: &Value) -> anyhow::Result<String> {
    match value {
        Value::Bool(true) => Ok(String::from("ON")),
        Value::Bool(false) => Ok(String::from("OFF")),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => bail!("expected a string, number or boolean, found {other}"),
    }
}

impl PragmaSpec {
    fn pragma(&self) -> anyhow::Result<Pragma> {
        let mut pragma = Pragma::new(&self.name);
        if let Some(schema) = &self.schema {
            pragma = pragma.in_schema(schema);
        }
        match (&self.value, &self.argument) {
            (Some(_), Some(_)) => bail!(
                "pragma '{}' has both a value and an argument",
                self.name
            ),
            (Some(value), None) => Ok(pragma.value(scalar(value)?)),
            (None, Some(argument)) => Ok(pragma.argument(scalar(argument)?)),
            (None, None) => Ok(pragma),
        }
    }
}

impl TableSpec {
    fn apply(&self, mut table: Table) -> Table {
        if self.temporary {
            table = table.temporary();
        }
        if self.if_not_exists {
            table = table.if_not_exists();
        }
        if let Some(schema) = &self.schema {
            table = table.schema(schema);
        }
        if self.without_rowid {
            table = table.without_rowid();
        }
        if self.strict {
            table = table.strict();
        }
        table
    }
}

impl IndexSpec {
    fn index(&self) -> Index {
        let mut index = Index::new(&self.name, &self.table)
            .columns(self.columns.iter().map(|c| IndexedColumn::new(c.as_str())));
        if self.unique {
            index = index.unique();
        }
        if self.if_not_exists {
            index = index.if_not_exists();
        }
        if let Some(schema) = &self.schema {
            index = index.schema(schema);
        }
        if let Some(predicate) = &self.predicate {
            index = index.where_clause(Expression::raw(predicate.as_str()));
        }
        index
    }
}

impl SchemaDocument {
    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let document: Self =
            serde_json::from_str(text).context("failed to parse schema document")?;
        debug!(
            schema = %document.name,
            models = document.models.len(),
            tables = document.tables.len(),
            "loaded schema document"
        );
        Ok(document)
    }

    fn descriptors(&self) -> Vec<ModelDescriptor> {
        self.models.iter().map(ModelSpec::descriptor).collect()
    }

    fn find_model<'m>(models: &'m [ModelDescriptor], name: &str) -> anyhow::Result<&'m ModelDescriptor> {
        models
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| anyhow!("unknown model '{name}'"))
    }

    /// Returns the models a table may reference. A table without an explicit
    /// list may reference every model of the document.
    fn candidates(spec: Option<&TableSpec>, models: &[ModelDescriptor]) -> anyhow::Result<Vec<ModelDescriptor>> {
        match spec {
            Some(spec) if !spec.references.is_empty() => spec
                .references
                .iter()
                .map(|name| Self::find_model(models, name).cloned())
                .collect(),
            _ => Ok(models.to_vec()),
        }
    }

    fn table(&self, spec: &TableSpec, models: &[ModelDescriptor]) -> anyhow::Result<Table> {
        let model = Self::find_model(models, &spec.model)?;
        let candidates = Self::candidates(Some(spec), models)?;
        let table = Table::new(model, &candidates)?;
        Ok(spec.apply(table))
    }

    /// Assembles the full schema.
    pub fn schema(&self) -> anyhow::Result<Schema> {
        let models = self.descriptors();
        let mut schema = Schema::new(&self.name);
        for spec in &self.pragmas {
            schema = schema.pragma(spec.pragma()?);
        }
        for spec in &self.tables {
            schema = schema.table(self.table(spec, &models)?);
        }
        for spec in &self.indexes {
            schema = schema.index(spec.index());
        }
        Ok(schema)
    }

    /// Renders the CREATE TABLE statement of one model.
    pub fn table_sql(&self, name: &str) -> anyhow::Result<String> {
        let models = self.descriptors();
        let table = match self.tables.iter().find(|t| t.model == name) {
            Some(spec) => self.table(spec, &models)?,
            None => {
                let model = Self::find_model(&models, name)?;
                Table::new(model, &models)?
            }
        };
        Ok(table.build()?)
    }

    /// Builds every model and collects the failures instead of stopping at
    /// the first one.
    pub fn check(&self) -> anyhow::Result<Vec<ModelFailure>> {
        let models = self.descriptors();
        let mut failures = Vec::new();
        for model in &models {
            let spec = self.tables.iter().find(|t| t.model == model.name);
            let candidates = Self::candidates(spec, &models)?;
            if let Err(error) = Table::new(model, &candidates).and_then(|t| t.build()) {
                warn!(model = %model.name, error = %error, "model failed");
                failures.push(ModelFailure {
                    model: model.name.clone(),
                    error,
                });
            }
        }
        Ok(failures)
    }
}
