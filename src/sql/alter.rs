//! ALTER TABLE ... ADD [CONSTRAINT name] FOREIGN KEY / PRIMARY KEY extraction.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

use super::parser::{report, SqlParseError};
use super::table::zip_foreign_keys;
use super::types::{parse_column_list, referenced_columns, unquote, IDENT};
use crate::schema::Table;

/// Groups: 1 table, 2 local columns, 3 referenced table, 4 optional
/// referenced columns.
static ALTER_FOREIGN_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)\bALTER\s+TABLE\s+(?:IF\s+(?:NOT\s+)?EXISTS\s+)?(?:ONLY\s+)?(?:{IDENT}\s*\.\s*)?({IDENT})\s+ADD\s+(?:CONSTRAINT\s+{IDENT}\s+)?FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+(?:{IDENT}\s*\.\s*)?({IDENT})(?:\s*\(([^)]*)\))?"
    ))
    .unwrap()
});

/// Groups: 1 table, 2 key columns.
static ALTER_PRIMARY_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)\bALTER\s+TABLE\s+(?:IF\s+(?:NOT\s+)?EXISTS\s+)?(?:ONLY\s+)?(?:{IDENT}\s*\.\s*)?({IDENT})\s+ADD\s+(?:CONSTRAINT\s+{IDENT}\s+)?PRIMARY\s+KEY\s*\(([^)]*)\)"
    ))
    .unwrap()
});

/// A primary key declared outside its table's CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterPrimaryKey {
    pub table: String,
    pub columns: Vec<String>,
}

pub fn extract_alter_primary_keys(sql: &str) -> Vec<AlterPrimaryKey> {
    ALTER_PRIMARY_KEY_RE
        .captures_iter(sql)
        .map(|caps| AlterPrimaryKey {
            table: unquote(&caps[1]),
            columns: parse_column_list(&caps[2]),
        })
        .collect()
}

/// Add ALTER TABLE primary keys to already parsed tables.
pub fn merge_alter_primary_keys(
    tables: &mut [Table],
    alters: Vec<AlterPrimaryKey>,
    diagnostics: &mut Vec<SqlParseError>,
) {
    for alter in alters {
        let Some(table) = tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(&alter.table))
        else {
            report(
                diagnostics,
                SqlParseError::UnknownAlterTarget { table: alter.table },
            );
            continue;
        };
        for column in alter.columns {
            let column = table.column(&column).map(|c| c.name.clone()).unwrap_or(column);
            table.add_primary_key(column);
        }
    }
}

/// A foreign key declared outside its table's CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterForeignKey {
    pub table: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

pub fn extract_alter_foreign_keys(sql: &str) -> Vec<AlterForeignKey> {
    ALTER_FOREIGN_KEY_RE
        .captures_iter(sql)
        .map(|caps| {
            let fk = AlterForeignKey {
                table: unquote(&caps[1]),
                columns: parse_column_list(&caps[2]),
                referenced_table: unquote(&caps[3]),
                referenced_columns: referenced_columns(caps.get(4).map(|m| m.as_str())),
            };
            trace!(table = %fk.table, referenced = %fk.referenced_table, "extracted ALTER TABLE foreign key");
            fk
        })
        .collect()
}

/// Attach ALTER TABLE foreign keys to already parsed tables.
///
/// Tables are matched case-insensitively. Column names are rewritten to the
/// spelling used in the table definition when the column exists.
pub fn merge_alter_foreign_keys(
    tables: &mut [Table],
    alters: Vec<AlterForeignKey>,
    diagnostics: &mut Vec<SqlParseError>,
) {
    for alter in alters {
        let Some(table) = tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(&alter.table))
        else {
            report(
                diagnostics,
                SqlParseError::UnknownAlterTarget { table: alter.table },
            );
            continue;
        };

        let fks = zip_foreign_keys(
            &table.name,
            &alter.columns,
            &alter.referenced_table,
            &alter.referenced_columns,
            diagnostics,
        );
        for mut fk in fks {
            if let Some(column) = table.column(&fk.column) {
                fk.column = column.name.clone();
            }
            if table.add_foreign_key(fk) {
                debug!(table = %table.name, referenced = %alter.referenced_table, "merged ALTER TABLE foreign key");
            }
        }
    }
}
