//! DDL text to schema graph.

use thiserror::Error;
use tracing::{debug, debug_span, warn};

use super::alter::{
    extract_alter_foreign_keys, extract_alter_primary_keys, merge_alter_foreign_keys,
    merge_alter_primary_keys,
};
use super::assemble::assemble;
use super::dialect::strip_comments;
use super::index::extract_indexes;
use super::statement::extract_create_tables;
use super::table::parse_table;
use crate::schema::{Schema, Table};

/// Problems the parser recovered from. None of these abort a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlParseError {
    #[error("CREATE TABLE {table} has unbalanced parentheses; statement dropped")]
    UnterminatedTable { table: String },
    #[error("table {table} is defined more than once; later definition ignored")]
    DuplicateTable { table: String },
    #[error(
        "foreign key from {table} to {referenced_table} pairs {columns} column(s) with {referenced_columns}; extra columns ignored"
    )]
    CompositeKeyMismatch {
        table: String,
        referenced_table: String,
        columns: usize,
        referenced_columns: usize,
    },
    #[error("ALTER TABLE targets unknown table {table}; constraint ignored")]
    UnknownAlterTarget { table: String },
    #[error("index {index} is on unknown table {table}; index dropped")]
    UnknownIndexTable { index: String, table: String },
}

/// Record a recovered problem and log it.
pub(super) fn report(diagnostics: &mut Vec<SqlParseError>, err: SqlParseError) {
    warn!("{err}");
    diagnostics.push(err);
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub schema: Schema,
    pub diagnostics: Vec<SqlParseError>,
}

/// Parse DDL text to a schema. Never fails: unrecognized input is skipped
/// and text without any CREATE TABLE yields an empty schema.
pub fn parse_sql(input: &str) -> Schema {
    parse_sql_with_diagnostics(input).schema
}

/// Same as [`parse_sql`], also returning what was skipped and why.
pub fn parse_sql_with_diagnostics(input: &str) -> ParseOutput {
    let span = debug_span!("parse_sql", bytes = input.len());
    let _guard = span.enter();

    let mut diagnostics = Vec::new();
    let sql = strip_comments(input);

    let indexes = extract_indexes(&sql);

    let mut tables: Vec<Table> = Vec::new();
    for statement in extract_create_tables(&sql, &mut diagnostics) {
        if tables
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&statement.name))
        {
            report(
                &mut diagnostics,
                SqlParseError::DuplicateTable {
                    table: statement.name,
                },
            );
            continue;
        }
        tables.push(parse_table(&statement, &mut diagnostics));
    }

    if tables.is_empty() {
        debug!("no CREATE TABLE statements; returning empty schema");
        return ParseOutput {
            schema: Schema::default(),
            diagnostics,
        };
    }

    merge_alter_primary_keys(&mut tables, extract_alter_primary_keys(&sql), &mut diagnostics);
    merge_alter_foreign_keys(&mut tables, extract_alter_foreign_keys(&sql), &mut diagnostics);

    let schema = assemble(tables, indexes, &mut diagnostics);
    ParseOutput {
        schema,
        diagnostics,
    }
}
