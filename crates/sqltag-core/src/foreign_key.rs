//! Foreign key references.
//!
//! A [`ForeignKey`] is built either from a captured annotation clause
//! (`REFERENCES Category (Id) ON DELETE CASCADE`) with [`ForeignKey::parse`],
//! or directly with the builder methods. The target entity is resolved by
//! exact name against a set of candidate models; referenced columns are
//! checked against the target's fields when the reference is rendered.

use tracing::debug;

use crate::annotation::{tokenize, Piece, PieceKind};
use crate::error::{Result, SchemaError};
use crate::model::ModelDescriptor;
use crate::naming::join_identifiers;
use crate::types::{DeferrableAction, RowAction};

/// Deferral mode of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferrable {
    /// `DEFERRABLE [INITIALLY ...]`
    Deferrable(DeferrableAction),
    /// `NOT DEFERRABLE [INITIALLY ...]`
    NotDeferrable(DeferrableAction),
}

impl Deferrable {
    fn to_sql(self) -> String {
        let (keyword, action) = match self {
            Self::Deferrable(action) => ("DEFERRABLE", action),
            Self::NotDeferrable(action) => ("NOT DEFERRABLE", action),
        };
        match action {
            DeferrableAction::Unspecified => keyword.to_string(),
            other => format!("{keyword} {}", other.as_sql()),
        }
    }
}

/// A foreign key reference from one or more owning columns to a target model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    columns: Vec<String>,
    table_level: bool,
    target: ModelDescriptor,
    target_columns: Vec<String>,
    on_delete: Option<RowAction>,
    on_update: Option<RowAction>,
    match_name: Option<String>,
    deferrable: Option<Deferrable>,
}

impl ForeignKey {
    fn with_columns(columns: Vec<String>, table_level: bool, target: &ModelDescriptor) -> Self {
        Self {
            columns,
            table_level,
            target: target.clone(),
            target_columns: Vec::new(),
            on_delete: None,
            on_update: None,
            match_name: None,
            deferrable: None,
        }
    }

    /// Creates a column-level reference. It renders without the
    /// `FOREIGN KEY (...)` prefix.
    #[must_use]
    pub fn column(column: impl Into<String>, target: &ModelDescriptor) -> Self {
        Self::with_columns(vec![column.into()], false, target)
    }

    /// Creates a table-level `FOREIGN KEY (cols) REFERENCES ...` constraint.
    #[must_use]
    pub fn table<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        target: &ModelDescriptor,
    ) -> Self {
        Self::with_columns(columns.into_iter().map(Into::into).collect(), true, target)
    }

    /// Finds the candidate model named exactly `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnresolvedReference`] if no candidate matches.
    pub fn resolve<'m>(
        column: &str,
        target: &str,
        candidates: &'m [ModelDescriptor],
    ) -> Result<&'m ModelDescriptor> {
        candidates
            .iter()
            .find(|m| m.name == target)
            .ok_or_else(|| SchemaError::UnresolvedReference {
                column: column.to_string(),
                target: target.to_string(),
            })
    }

    /// Parses a captured `REFERENCES ...` clause for column `column`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidReference`] if the clause does not start
    /// with `REFERENCES <target>`, [`SchemaError::UnresolvedReference`] if
    /// the target is not among `candidates`, [`SchemaError::InvalidAction`]
    /// for an unknown `ON DELETE`/`ON UPDATE`/`DEFERRABLE` action and
    /// [`SchemaError::ColumnCountMismatch`] if more than one target column is
    /// listed.
    ///
    /// ```rust
    /// use sqltag_core::{ForeignKey, ModelDescriptor};
    ///
    /// let category = ModelDescriptor::new("Category").field("Id", "i64", "PRIMARY KEY");
    /// let fk = ForeignKey::parse(
    ///     "CategoryId",
    ///     "REFERENCES Category (Id) ON DELETE SET NULL",
    ///     &[category],
    /// )
    /// .unwrap();
    /// assert_eq!(fk.build().unwrap(), "REFERENCES category (id) ON DELETE SET NULL");
    /// ```
    pub fn parse(column: &str, clause: &str, candidates: &[ModelDescriptor]) -> Result<Self> {
        let invalid = |message: &str| SchemaError::InvalidReference {
            column: column.to_string(),
            message: message.to_string(),
        };
        let pieces = tokenize(clause).map_err(|e| SchemaError::Syntax {
            column: column.to_string(),
            message: e.message.to_string(),
            offset: e.offset,
        })?;

        match pieces.first() {
            Some(p) if p.is_word("REFERENCES") => {}
            Some(p) => return Err(invalid(&format!("expected REFERENCES, found '{}'", p.text))),
            None => return Err(invalid("empty clause")),
        }
        let target_name = pieces
            .get(1)
            .filter(|p| p.kind == PieceKind::Word)
            .ok_or_else(|| invalid("missing target entity"))?
            .text;
        let target = Self::resolve(column, target_name, candidates)?;
        let mut fk = Self::column(column, target);

        let mut pos = 2;
        if let Some(inner) = pieces.get(pos).and_then(Piece::group_inner) {
            let target_columns: Vec<&str> = inner
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .collect();
            fk = fk.references(target_columns)?;
            pos += 1;
        }

        ActionParser {
            column,
            pieces: &pieces,
            pos,
        }
        .apply(fk)
    }

    /// Sets the referenced columns of the target.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ColumnCountMismatch`] if the number of columns
    /// differs from the number of owning columns.
    pub fn references<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let target_columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if !target_columns.is_empty() && target_columns.len() != self.columns.len() {
            return Err(SchemaError::ColumnCountMismatch {
                columns: self.columns.join(", "),
                expected: self.columns.len(),
                found: target_columns.len(),
            });
        }
        self.target_columns = target_columns;
        Ok(self)
    }

    /// Sets the `ON DELETE` action.
    #[must_use]
    pub fn on_delete(mut self, action: RowAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the `ON UPDATE` action.
    #[must_use]
    pub fn on_update(mut self, action: RowAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Sets the `MATCH` name.
    #[must_use]
    pub fn match_name(mut self, name: impl Into<String>) -> Self {
        self.match_name = Some(name.into());
        self
    }

    /// Marks the key `DEFERRABLE`. Has no effect if a deferral mode is
    /// already set.
    #[must_use]
    pub fn deferrable(mut self, action: DeferrableAction) -> Self {
        self.deferrable.get_or_insert(Deferrable::Deferrable(action));
        self
    }

    /// Marks the key `NOT DEFERRABLE`. Has no effect if a deferral mode is
    /// already set.
    #[must_use]
    pub fn not_deferrable(mut self, action: DeferrableAction) -> Self {
        self.deferrable
            .get_or_insert(Deferrable::NotDeferrable(action));
        self
    }

    /// Returns the owning columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the target model.
    #[must_use]
    pub const fn target(&self) -> &ModelDescriptor {
        &self.target
    }

    /// Returns true for a table-level constraint.
    #[must_use]
    pub const fn is_table_level(&self) -> bool {
        self.table_level
    }

    /// Checks that every referenced column exists on the target.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTargetColumn`] for the first column the
    /// target does not declare.
    pub fn validate(&self) -> Result<()> {
        if let Some(missing) = self
            .target_columns
            .iter()
            .find(|c| !self.target.maps_column(c))
        {
            return Err(SchemaError::UnknownTargetColumn {
                target: self.target.name.clone(),
                column: missing.clone(),
            });
        }
        Ok(())
    }

    /// Validates and renders the reference.
    ///
    /// # Errors
    ///
    /// See [`ForeignKey::validate`].
    pub fn build(&self) -> Result<String> {
        self.validate()?;
        Ok(self.render())
    }

    fn render(&self) -> String {
        let mut sql = String::new();
        if self.table_level {
            sql.push_str(&format!("FOREIGN KEY ({}) ", join_identifiers(&self.columns)));
        }
        sql.push_str("REFERENCES ");
        sql.push_str(&self.target.table_name());
        if !self.target_columns.is_empty() {
            sql.push_str(&format!(" ({})", join_identifiers(&self.target_columns)));
        }
        if let Some(action) = self.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = self.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        if let Some(name) = &self.match_name {
            sql.push_str(" MATCH ");
            sql.push_str(name);
        }
        if let Some(deferrable) = self.deferrable {
            sql.push(' ');
            sql.push_str(&deferrable.to_sql());
        }
        sql
    }
}

/// Reads the action clauses that follow the target of a REFERENCES clause.
struct ActionParser<'p, 'a> {
    column: &'p str,
    pieces: &'p [Piece<'a>],
    pos: usize,
}

impl ActionParser<'_, '_> {
    fn is_word(&self, offset: usize, word: &str) -> bool {
        self.pieces
            .get(self.pos + offset)
            .is_some_and(|p| p.is_word(word))
    }

    fn at_clause_start(&self) -> bool {
        self.is_word(0, "ON")
            || self.is_word(0, "MATCH")
            || self.is_word(0, "DEFERRABLE")
            || (self.is_word(0, "NOT") && self.is_word(1, "DEFERRABLE"))
    }

    /// Collects the words of a clause body, up to the next clause.
    fn body(&mut self) -> String {
        let mut words = Vec::new();
        while let Some(&piece) = self.pieces.get(self.pos) {
            if self.at_clause_start() {
                break;
            }
            words.push(piece.text.to_ascii_uppercase());
            self.pos += 1;
        }
        words.join(" ")
    }

    fn invalid(&self, clause: &'static str, value: String) -> SchemaError {
        SchemaError::InvalidAction {
            column: self.column.to_string(),
            clause,
            value,
        }
    }

    fn row_action(&mut self, clause: &'static str) -> Result<RowAction> {
        let body = self.body();
        RowAction::from_sql(&body).ok_or_else(|| self.invalid(clause, body))
    }

    fn deferrable_action(&mut self, clause: &'static str) -> Result<DeferrableAction> {
        let body = self.body();
        DeferrableAction::from_sql(&body).ok_or_else(|| self.invalid(clause, body))
    }

    fn apply(mut self, mut fk: ForeignKey) -> Result<ForeignKey> {
        while let Some(&piece) = self.pieces.get(self.pos) {
            if piece.is_word("ON") {
                self.pos += 1;
                if self.is_word(0, "DELETE") {
                    self.pos += 1;
                    fk = fk.on_delete(self.row_action("ON DELETE")?);
                } else if self.is_word(0, "UPDATE") {
                    self.pos += 1;
                    fk = fk.on_update(self.row_action("ON UPDATE")?);
                } else {
                    let value = self
                        .pieces
                        .get(self.pos)
                        .map_or_else(String::new, |p| p.text.to_string());
                    return Err(self.invalid("ON", value));
                }
            } else if piece.is_word("MATCH") {
                self.pos += 1;
                match self.pieces.get(self.pos) {
                    Some(&name) if name.kind == PieceKind::Word && !self.at_clause_start() => {
                        fk = fk.match_name(name.text);
                        self.pos += 1;
                    }
                    _ => return Err(self.invalid("MATCH", String::new())),
                }
            } else if piece.is_word("DEFERRABLE") {
                self.pos += 1;
                fk = fk.deferrable(self.deferrable_action("DEFERRABLE")?);
            } else if piece.is_word("NOT") && self.is_word(1, "DEFERRABLE") {
                self.pos += 2;
                fk = fk.not_deferrable(self.deferrable_action("NOT DEFERRABLE")?);
            } else {
                debug!(
                    column = self.column,
                    token = piece.text,
                    "skipping unrecognized REFERENCES token"
                );
                self.pos += 1;
            }
        }
        Ok(fk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category() -> ModelDescriptor {
        ModelDescriptor::new("Category")
            .field("Id", "i64", "PRIMARY KEY")
            .field("Code", "String", "UNIQUE")
    }

    #[test]
    fn test_parse_full_clause() {
        let fk = ForeignKey::parse(
            "CategoryId",
            "REFERENCES Category (Id) ON DELETE SET NULL ON UPDATE CASCADE MATCH SIMPLE DEFERRABLE INITIALLY DEFERRED",
            &[category()],
        )
        .unwrap();
        assert_eq!(
            fk.build().unwrap(),
            "REFERENCES category (id) ON DELETE SET NULL ON UPDATE CASCADE MATCH SIMPLE DEFERRABLE INITIALLY DEFERRED"
        );
    }

    #[test]
    fn test_parse_without_target_columns() {
        let fk = ForeignKey::parse("CategoryId", "references Category", &[category()]).unwrap();
        assert_eq!(fk.build().unwrap(), "REFERENCES category");
    }

    #[test]
    fn test_parse_attached_column_list() {
        let fk = ForeignKey::parse("CategoryId", "REFERENCES Category(Id)", &[category()]).unwrap();
        assert_eq!(fk.build().unwrap(), "REFERENCES category (id)");
    }

    #[test]
    fn test_parse_missing_keyword() {
        let err = ForeignKey::parse("CategoryId", "Category (Id)", &[category()]).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidReference { .. }));
    }

    #[test]
    fn test_parse_unresolved_target() {
        let err = ForeignKey::parse("OwnerId", "REFERENCES User (Id)", &[category()]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnresolvedReference {
                column: "OwnerId".into(),
                target: "User".into()
            }
        );
    }

    #[test]
    fn test_target_name_is_case_sensitive() {
        assert!(ForeignKey::parse("CategoryId", "REFERENCES category", &[category()]).is_err());
    }

    #[test]
    fn test_parse_invalid_action() {
        let err = ForeignKey::parse(
            "CategoryId",
            "REFERENCES Category (Id) ON DELETE EXPLODE",
            &[category()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidAction {
                column: "CategoryId".into(),
                clause: "ON DELETE",
                value: "EXPLODE".into()
            }
        );
    }

    #[test]
    fn test_parse_too_many_target_columns() {
        let err = ForeignKey::parse("CategoryId", "REFERENCES Category (Id, Code)", &[category()])
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::ColumnCountMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_target_column_fails_on_build() {
        let fk = ForeignKey::parse("CategoryId", "REFERENCES Category (Uid)", &[category()]).unwrap();
        assert_eq!(
            fk.build().unwrap_err(),
            SchemaError::UnknownTargetColumn {
                target: "Category".into(),
                column: "Uid".into()
            }
        );
    }

    #[test]
    fn test_first_deferral_mode_wins() {
        let fk = ForeignKey::column("CategoryId", &category())
            .not_deferrable(DeferrableAction::Unspecified)
            .deferrable(DeferrableAction::InitiallyDeferred);
        assert_eq!(fk.build().unwrap(), "REFERENCES category NOT DEFERRABLE");

        let parsed = ForeignKey::parse(
            "CategoryId",
            "REFERENCES Category DEFERRABLE NOT DEFERRABLE INITIALLY IMMEDIATE",
            &[category()],
        )
        .unwrap();
        assert_eq!(parsed.build().unwrap(), "REFERENCES category DEFERRABLE");
    }

    #[test]
    fn test_table_level_prefix() {
        let fk = ForeignKey::table(["CategoryId", "CategoryCode"], &category())
            .references(["Id", "Code"])
            .unwrap()
            .on_delete(RowAction::Cascade);
        assert!(fk.is_table_level());
        assert_eq!(
            fk.build().unwrap(),
            "FOREIGN KEY (category_id, category_code) REFERENCES category (id, code) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_table_level_count_mismatch() {
        let err = ForeignKey::table(["A", "B"], &category())
            .references(["Id"])
            .unwrap_err();
        assert!(matches!(err, SchemaError::ColumnCountMismatch { .. }));
    }
}
