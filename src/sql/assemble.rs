//! Merges tables and indexes into a schema and derives relationships.

use tracing::debug;

use super::index::IndexDefinition;
use super::parser::{report, SqlParseError};
use crate::schema::{Relationship, Schema, Table};

pub fn assemble(
    mut tables: Vec<Table>,
    indexes: Vec<IndexDefinition>,
    diagnostics: &mut Vec<SqlParseError>,
) -> Schema {
    for def in indexes {
        match tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(&def.table))
        {
            Some(table) => table.indexes.push(def.index),
            None => report(
                diagnostics,
                SqlParseError::UnknownIndexTable {
                    index: def.index.name,
                    table: def.table,
                },
            ),
        }
    }

    // Point references at the declared spelling of the target table.
    let names: Vec<String> = tables.iter().map(|t| t.name.clone()).collect();
    for table in &mut tables {
        for fk in &mut table.foreign_keys {
            if let Some(name) = names
                .iter()
                .find(|n| n.eq_ignore_ascii_case(&fk.referenced_table))
            {
                fk.referenced_table.clone_from(name);
            }
        }
    }

    let relationships = derive_relationships(&tables);
    debug!(
        tables = tables.len(),
        relationships = relationships.len(),
        "schema assembled"
    );

    Schema {
        tables,
        relationships,
    }
}

/// One relationship per foreign key, numbered in discovery order.
pub fn derive_relationships(tables: &[Table]) -> Vec<Relationship> {
    let mut relationships = Vec::new();
    for table in tables {
        for fk in &table.foreign_keys {
            relationships.push(Relationship {
                id: format!("{}-{}-{}", table.name, fk.referenced_table, relationships.len()),
                from: table.name.clone(),
                to: fk.referenced_table.clone(),
                from_column: fk.column.clone(),
                to_column: fk.referenced_column.clone(),
            });
        }
    }
    relationships
}
