//! Table roles inferred from key structure and naming.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

use crate::schema::{Schema, Table};

const LOOKUP_SUFFIXES: [&str; 9] = [
    "_type",
    "_types",
    "_status",
    "_statuses",
    "_category",
    "_categories",
    "_kind",
    "_kinds",
    "_lookup",
];

/// Incoming relationships that make a table a hub.
const HUB_REFERENCES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableRole {
    /// Links two or more tables; little besides its keys.
    Junction,
    /// Small reference table with no outgoing keys.
    Lookup,
    /// Referenced by many tables.
    Core,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown table role '{0}' (expected junction, lookup, core or standard)")]
pub struct UnknownRole(String);

impl TableRole {
    pub const ALL: [TableRole; 4] = [Self::Junction, Self::Lookup, Self::Core, Self::Standard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junction => "junction",
            Self::Lookup => "lookup",
            Self::Core => "core",
            Self::Standard => "standard",
        }
    }
}

impl FromStr for TableRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of one table given how many relationships point at it.
pub fn table_role(table: &Table, incoming: usize) -> TableRole {
    let fk_count = table.foreign_keys.len();
    let columns = table.columns.len();

    if fk_count >= 2 {
        let keys_only = table
            .columns
            .iter()
            .all(|c| table.is_primary(&c.name) || table.is_foreign(&c.name));
        if keys_only || columns <= fk_count + 2 {
            return TableRole::Junction;
        }
    }

    if fk_count == 0 && columns <= 4 {
        let name = table.name.to_lowercase();
        if incoming >= HUB_REFERENCES || LOOKUP_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            return TableRole::Lookup;
        }
    }

    if incoming >= HUB_REFERENCES {
        TableRole::Core
    } else {
        TableRole::Standard
    }
}

/// Role of every table, in schema order.
pub fn classify(schema: &Schema) -> Vec<(String, TableRole)> {
    schema
        .tables
        .iter()
        .map(|table| {
            let incoming = schema
                .relationships
                .iter()
                .filter(|r| {
                    r.to.eq_ignore_ascii_case(&table.name) && !r.from.eq_ignore_ascii_case(&r.to)
                })
                .count();
            let role = table_role(table, incoming);
            trace!(table = %table.name, incoming, %role, "classified table");
            (table.name.clone(), role)
        })
        .collect()
}

impl Schema {
    /// Derived copy keeping only tables with one of `roles`.
    pub fn retain_roles(&self, roles: &[TableRole]) -> Schema {
        let hidden: Vec<String> = classify(self)
            .into_iter()
            .filter(|(_, role)| !roles.contains(role))
            .map(|(name, _)| name)
            .collect();
        self.without_tables(&hidden)
    }
}
