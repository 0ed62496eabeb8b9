//! CREATE TABLE body parsing: clause splitting and classification.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

use super::parser::{report, SqlParseError};
use super::statement::TableStatement;
use super::types::{
    parse_column_list, referenced_columns, serial_base_type, unquote, DEFAULT_REFERENCED_COLUMN,
    IDENT,
};
use crate::schema::{Column, ForeignKey, Table};

/// `[CONSTRAINT name] PRIMARY KEY (cols)`
static TABLE_PRIMARY_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)^(?:CONSTRAINT\s+{IDENT}\s+)?PRIMARY\s+KEY\s*(?:CLUSTERED\s+|NONCLUSTERED\s+)?\(([^)]*)\)"
    ))
    .unwrap()
});

/// `[CONSTRAINT name] FOREIGN KEY (cols) REFERENCES [schema.]table [(cols)]`
static TABLE_FOREIGN_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)^(?:CONSTRAINT\s+{IDENT}\s+)?FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+(?:{IDENT}\s*\.\s*)?({IDENT})(?:\s*\(([^)]*)\))?"
    ))
    .unwrap()
});

/// Inline `REFERENCES [schema.]table [(col)]` inside a column definition.
static INLINE_REFERENCES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)\bREFERENCES\s+(?:{IDENT}\s*\.\s*)?({IDENT})\s*(?:\(\s*({IDENT})\s*\))?"
    ))
    .unwrap()
});

/// Column name followed by the rest of the definition.
static COLUMN_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?s)^({IDENT})\s*(.*)$")).unwrap());

/// Keywords that end the declared type of a column.
static TYPE_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:PRIMARY\s+KEY|NOT\s+NULL|NULL|UNIQUE|DEFAULT|REFERENCES|CHECK|CONSTRAINT|COLLATE|GENERATED|COMMENT|AUTO_INCREMENT|AUTOINCREMENT|IDENTITY|ON\s+UPDATE)\b",
    )
    .unwrap()
});

static INLINE_PRIMARY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

static NOT_NULL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());

/// Leading keywords of table-level clauses that carry nothing we record.
static IGNORED_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:CONSTRAINT|PRIMARY\s+KEY|FOREIGN\s+KEY|UNIQUE|FULLTEXT|SPATIAL|CHECK|EXCLUDE)\b")
        .unwrap()
});

/// MySQL inline `KEY name (cols)` / `INDEX (cols)`. The column list must not
/// start with a digit so a column named `key VARCHAR(10)` still parses.
static INDEX_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:KEY|INDEX)\s*(?:{IDENT}\s*)?(?:USING\s+\w+\s*)?\(\s*[^\d\s)]"
    ))
    .unwrap()
});

/// What a single clause of a table body turned out to be.
#[derive(Debug, Clone, PartialEq)]
enum Clause {
    PrimaryKey(Vec<String>),
    ForeignKey {
        columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
    },
    Column {
        column: Column,
        primary: bool,
        reference: Option<(String, String)>,
    },
    Ignored,
}

/// Parse one extracted CREATE TABLE statement into a table.
pub fn parse_table(statement: &TableStatement, diagnostics: &mut Vec<SqlParseError>) -> Table {
    let mut table = Table::new(statement.name.clone());

    for clause in split_clauses(&statement.body) {
        match classify_clause(&clause) {
            Clause::PrimaryKey(columns) => {
                for column in columns {
                    table.add_primary_key(column);
                }
            }
            Clause::ForeignKey {
                columns,
                referenced_table,
                referenced_columns,
            } => {
                for fk in zip_foreign_keys(
                    &table.name,
                    &columns,
                    &referenced_table,
                    &referenced_columns,
                    diagnostics,
                ) {
                    table.add_foreign_key(fk);
                }
            }
            Clause::Column {
                column,
                primary,
                reference,
            } => {
                if primary {
                    table.add_primary_key(column.name.clone());
                }
                if let Some((referenced_table, referenced_column)) = reference {
                    table.add_foreign_key(ForeignKey {
                        column: column.name.clone(),
                        referenced_table,
                        referenced_column,
                    });
                }
                table.columns.push(column);
            }
            Clause::Ignored => trace!(table = %table.name, clause = %clause, "clause skipped"),
        }
    }

    debug!(
        table = %table.name,
        columns = table.columns.len(),
        primary_keys = table.primary_keys.len(),
        foreign_keys = table.foreign_keys.len(),
        "parsed table"
    );
    table
}

/// Split a table body on commas outside parentheses and quotes.
pub fn split_clauses(body: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in body.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                clauses.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    clauses.push(current.trim().to_string());

    clauses.retain(|c| !c.is_empty());
    clauses
}

fn classify_clause(clause: &str) -> Clause {
    if let Some(caps) = TABLE_PRIMARY_KEY_RE.captures(clause) {
        return Clause::PrimaryKey(parse_column_list(&caps[1]));
    }

    if let Some(caps) = TABLE_FOREIGN_KEY_RE.captures(clause) {
        return Clause::ForeignKey {
            columns: parse_column_list(&caps[1]),
            referenced_table: unquote(&caps[2]),
            referenced_columns: referenced_columns(caps.get(3).map(|m| m.as_str())),
        };
    }

    if IGNORED_CLAUSE_RE.is_match(clause) || INDEX_CLAUSE_RE.is_match(clause) {
        return Clause::Ignored;
    }

    parse_column(clause).unwrap_or(Clause::Ignored)
}

fn parse_column(clause: &str) -> Option<Clause> {
    let caps = COLUMN_DEF_RE.captures(clause)?;
    let name = unquote(&caps[1]);
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    let type_end = top_level_keyword(rest).unwrap_or(rest.len());
    let declared = rest[..type_end].trim();

    let (data_type, serial) = match serial_base_type(declared) {
        Some(base) => (base.to_string(), true),
        None => (declared.to_string(), false),
    };

    let reference = INLINE_REFERENCES_RE.captures(rest).map(|caps| {
        let referenced_table = unquote(&caps[1]);
        let referenced_column = caps
            .get(2)
            .map(|m| unquote(m.as_str()))
            .unwrap_or_else(|| DEFAULT_REFERENCED_COLUMN.to_string());
        (referenced_table, referenced_column)
    });

    Some(Clause::Column {
        column: Column {
            name,
            data_type,
            nullable: !NOT_NULL_RE.is_match(rest),
        },
        primary: serial || INLINE_PRIMARY_KEY_RE.is_match(rest),
        reference,
    })
}

/// Offset of the first type-ending keyword outside parentheses and quotes.
fn top_level_keyword(rest: &str) -> Option<usize> {
    TYPE_END_RE
        .find_iter(rest)
        .map(|m| m.start())
        .find(|&start| is_top_level(&rest[..start]))
}

fn is_top_level(prefix: &str) -> bool {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for c in prefix.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            },
        }
    }
    depth <= 0 && quote.is_none()
}

/// Pair local and referenced columns positionally.
///
/// Lists of unequal length are truncated to the shorter one.
pub(super) fn zip_foreign_keys(
    table: &str,
    columns: &[String],
    referenced_table: &str,
    referenced_columns: &[String],
    diagnostics: &mut Vec<SqlParseError>,
) -> Vec<ForeignKey> {
    if columns.len() != referenced_columns.len() {
        report(
            diagnostics,
            SqlParseError::CompositeKeyMismatch {
                table: table.to_string(),
                referenced_table: referenced_table.to_string(),
                columns: columns.len(),
                referenced_columns: referenced_columns.len(),
            },
        );
    }

    columns
        .iter()
        .zip(referenced_columns)
        .map(|(column, referenced_column)| ForeignKey {
            column: column.clone(),
            referenced_table: referenced_table.to_string(),
            referenced_column: referenced_column.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str, body: &str) -> (Table, Vec<SqlParseError>) {
        let statement = TableStatement {
            name: name.to_string(),
            body: body.to_string(),
            text: String::new(),
        };
        let mut diagnostics = Vec::new();
        let table = parse_table(&statement, &mut diagnostics);
        (table, diagnostics)
    }

    #[test]
    fn test_split_respects_nesting() {
        let clauses = split_clauses(
            "id INT, price DECIMAL(10, 2), note VARCHAR(20) DEFAULT 'a,b', PRIMARY KEY (id, price),",
        );
        assert_eq!(
            clauses,
            vec![
                "id INT",
                "price DECIMAL(10, 2)",
                "note VARCHAR(20) DEFAULT 'a,b'",
                "PRIMARY KEY (id, price)",
            ]
        );
    }

    #[test]
    fn test_column_types_and_nullability() {
        let (table, _) = parse(
            "users",
            "id INTEGER PRIMARY KEY, name VARCHAR(50) NOT NULL, bio character varying(255) DEFAULT NULL, \
             score NUMERIC(5, 2) CHECK (score >= 0), kind ENUM('NULL', 'x') NOT NULL",
        );

        let types: Vec<&str> = table.columns.iter().map(|c| c.data_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "INTEGER",
                "VARCHAR(50)",
                "character varying(255)",
                "NUMERIC(5, 2)",
                "ENUM('NULL', 'x')"
            ]
        );
        let nullable: Vec<bool> = table.columns.iter().map(|c| c.nullable).collect();
        assert_eq!(nullable, vec![true, false, true, true, false]);
        assert_eq!(table.primary_keys, vec!["id"]);
    }

    #[test]
    fn test_composite_primary_key_after_columns() {
        let (table, _) = parse(
            "order_items",
            "order_id INT NOT NULL, product_id INT NOT NULL, qty INT, PRIMARY KEY (order_id, product_id)",
        );
        assert_eq!(table.primary_keys, vec!["order_id", "product_id"]);
        assert!(table.is_primary("order_id"));
        assert!(table.is_primary("product_id"));
        assert!(!table.is_primary("qty"));
    }

    #[test]
    fn test_named_primary_key_constraint() {
        let (table, _) = parse(
            "t",
            "CONSTRAINT pk_t PRIMARY KEY (\"Code\"), \"Code\" CHAR(3)",
        );
        assert_eq!(table.primary_keys, vec!["Code"]);
        assert_eq!(table.columns[0].name, "Code");
        assert!(table.column_views().all(|c| c.is_primary));
    }

    #[test]
    fn test_inline_reference() {
        let (table, _) = parse(
            "orders",
            "id SERIAL PRIMARY KEY, user_id INTEGER NOT NULL REFERENCES public.users(id) ON DELETE CASCADE",
        );
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].data_type, "INT");
        assert_eq!(table.primary_keys, vec!["id"]);
        assert_eq!(table.columns[1].data_type, "INTEGER");
        assert_eq!(
            table.foreign_keys,
            vec![ForeignKey {
                column: "user_id".to_string(),
                referenced_table: "users".to_string(),
                referenced_column: "id".to_string(),
            }]
        );
        assert!(table.is_foreign("user_id"));
    }

    #[test]
    fn test_inline_reference_without_column() {
        let (table, _) = parse("posts", "author_id BIGINT REFERENCES authors");
        assert_eq!(table.foreign_keys[0].referenced_table, "authors");
        assert_eq!(table.foreign_keys[0].referenced_column, "id");
    }

    #[test]
    fn test_serial_implies_primary_key() {
        let (table, _) = parse("events", "seq bigserial, payload JSONB");
        assert_eq!(table.columns[0].data_type, "BIGINT");
        assert_eq!(table.primary_keys, vec!["seq"]);
        assert_eq!(table.columns[1].data_type, "JSONB");
    }

    #[test]
    fn test_table_level_foreign_keys() {
        let (table, diags) = parse(
            "shipments",
            "id INT, order_id INT, line_no INT, carrier_id INT, \
             CONSTRAINT fk_line FOREIGN KEY (order_id, line_no) REFERENCES order_lines (order_id, line_no), \
             FOREIGN KEY (carrier_id) REFERENCES `carriers`(`id`) ON UPDATE CASCADE",
        );
        assert!(diags.is_empty());
        assert_eq!(table.columns.len(), 4);
        assert_eq!(table.foreign_keys.len(), 3);
        assert_eq!(table.foreign_keys[1].column, "line_no");
        assert_eq!(table.foreign_keys[1].referenced_column, "line_no");
        assert_eq!(table.foreign_keys[2].referenced_table, "carriers");
        assert!(table.is_foreign("carrier_id"));
        assert!(!table.is_foreign("id"));
    }

    #[test]
    fn test_table_level_foreign_key_without_columns() {
        let (table, diags) = parse(
            "comments",
            "id INT, post_id INT, CONSTRAINT fk_post FOREIGN KEY (post_id) REFERENCES posts ON DELETE CASCADE",
        );
        assert!(diags.is_empty());
        assert_eq!(
            table.foreign_keys,
            vec![ForeignKey {
                column: "post_id".to_string(),
                referenced_table: "posts".to_string(),
                referenced_column: "id".to_string(),
            }]
        );
    }

    #[test]
    fn test_mismatched_composite_key_truncates() {
        let (table, diags) = parse(
            "a",
            "x INT, y INT, FOREIGN KEY (x, y) REFERENCES b (x)",
        );
        assert_eq!(table.foreign_keys.len(), 1);
        assert_eq!(table.foreign_keys[0].column, "x");
        assert!(matches!(
            diags.as_slice(),
            [SqlParseError::CompositeKeyMismatch { columns: 2, referenced_columns: 1, .. }]
        ));
    }

    #[test]
    fn test_ignored_clauses() {
        let (table, _) = parse(
            "t",
            "id INT, UNIQUE (id), KEY idx_id (id), INDEX idx2 (id), CHECK (id > 0), CONSTRAINT uq UNIQUE (id)",
        );
        assert_eq!(table.columns.len(), 1);
        assert!(table.primary_keys.is_empty());
        assert!(table.foreign_keys.is_empty());
    }

    #[test]
    fn test_keyword_named_columns() {
        let (table, _) = parse("settings", "key VARCHAR(64) NOT NULL, period INT, index INT");
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["key", "period", "index"]);
        assert_eq!(table.columns[0].data_type, "VARCHAR(64)");
    }

    #[test]
    fn test_mysql_column_options() {
        let (table, _) = parse(
            "users",
            "`id` int(11) unsigned NOT NULL AUTO_INCREMENT, `email` varchar(255) COLLATE utf8mb4_bin DEFAULT NULL, PRIMARY KEY (`id`)",
        );
        assert_eq!(table.columns[0].name, "id");
        assert_eq!(table.columns[0].data_type, "int(11) unsigned");
        assert_eq!(table.columns[1].data_type, "varchar(255)");
        assert_eq!(table.primary_keys, vec!["id"]);
    }
}
