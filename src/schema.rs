//! Schema graph produced by the DDL parser.
//!
//! Column key flags are not stored: `isPrimary` and `isForeign` are derived
//! from the owning table's `primaryKeys` and `foreignKeys` whenever they are
//! read or serialized.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared type as written, minus trailing constraint keywords.
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    #[serde(rename = "type")]
    pub index_type: String,
}

impl Index {
    pub const DEFAULT_TYPE: &'static str = "BTREE";
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

/// Read-only view of a column together with its derived key flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub data_type: &'a str,
    pub nullable: bool,
    pub is_primary: bool,
    pub is_foreign: bool,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn is_primary(&self, column: &str) -> bool {
        self.primary_keys
            .iter()
            .any(|k| k.eq_ignore_ascii_case(column))
    }

    pub fn is_foreign(&self, column: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.column.eq_ignore_ascii_case(column))
    }

    /// Add a primary key column unless it is already listed.
    pub fn add_primary_key(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.is_primary(&column) {
            self.primary_keys.push(column);
        }
    }

    /// Add a foreign key unless an identical one is already present.
    /// Returns whether the key was added.
    pub fn add_foreign_key(&mut self, fk: ForeignKey) -> bool {
        if self.foreign_keys.contains(&fk) {
            return false;
        }
        self.foreign_keys.push(fk);
        true
    }

    pub fn column_views(&self) -> impl Iterator<Item = ColumnView<'_>> {
        self.columns.iter().map(|c| ColumnView {
            name: &c.name,
            data_type: &c.data_type,
            nullable: c.nullable,
            is_primary: self.is_primary(&c.name),
            is_foreign: self.is_foreign(&c.name),
        })
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns: Vec<ColumnView<'_>> = self.column_views().collect();
        let mut state = serializer.serialize_struct("Table", 5)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("columns", &columns)?;
        state.serialize_field("primaryKeys", &self.primary_keys)?;
        state.serialize_field("foreignKeys", &self.foreign_keys)?;
        state.serialize_field("indexes", &self.indexes)?;
        state.end()
    }
}

/// Directed edge from the referencing table to the referenced table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub from: String,
    pub to: String,
    pub from_column: String,
    pub to_column: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
}

impl Schema {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Derived copy without the given tables and any relationship touching them.
    pub fn without_tables<S: AsRef<str>>(&self, hidden: &[S]) -> Schema {
        let hidden: HashSet<String> = hidden
            .iter()
            .map(|h| h.as_ref().to_lowercase())
            .collect();
        let is_hidden = |name: &str| hidden.contains(&name.to_lowercase());

        Schema {
            tables: self
                .tables
                .iter()
                .filter(|t| !is_hidden(&t.name))
                .cloned()
                .collect(),
            relationships: self
                .relationships
                .iter()
                .filter(|r| !is_hidden(&r.from) && !is_hidden(&r.to))
                .cloned()
                .collect(),
        }
    }
}
