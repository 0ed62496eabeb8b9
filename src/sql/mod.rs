//! SQL DDL to schema graph conversion.

mod alter;
mod assemble;
mod dialect;
mod index;
mod parser;
mod statement;
mod table;
mod types;

pub use dialect::normalize_ddl;
pub use parser::{parse_sql, parse_sql_with_diagnostics, ParseOutput, SqlParseError};
