//! CREATE INDEX extraction.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

use super::types::{parse_column_list, unquote, IDENT};
use crate::schema::Index;

/// Groups: 1 UNIQUE, 2 index name, 3 table name, 4 USING method, 5 column list.
static CREATE_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bCREATE\s+(UNIQUE\s+)?(?:CLUSTERED\s+|NONCLUSTERED\s+)?INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+NOT\s+EXISTS\s+)?(?:{IDENT}\s*\.\s*)?({IDENT})\s+ON\s+(?:ONLY\s+)?(?:{IDENT}\s*\.\s*)?({IDENT})\s*(?:USING\s+(\w+)\s*)?\(([^)]*)\)"
    ))
    .unwrap()
});

/// An index waiting to be attached to the table it names.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub table: String,
    pub index: Index,
}

/// Find every CREATE INDEX statement in `sql`.
pub fn extract_indexes(sql: &str) -> Vec<IndexDefinition> {
    CREATE_INDEX_RE
        .captures_iter(sql)
        .filter_map(|caps| {
            let name = unquote(caps.get(2)?.as_str());
            let table = unquote(caps.get(3)?.as_str());
            let index_type = caps
                .get(4)
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_else(|| Index::DEFAULT_TYPE.to_string());
            let columns = parse_column_list(caps.get(5)?.as_str());
            trace!(index = %name, table = %table, "extracted CREATE INDEX");

            Some(IndexDefinition {
                table,
                index: Index {
                    name,
                    columns,
                    is_unique: caps.get(1).is_some(),
                    index_type,
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_index() {
        let defs = extract_indexes("CREATE UNIQUE INDEX idx_email ON users (email);");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].table, "users");
        assert_eq!(
            defs[0].index,
            Index {
                name: "idx_email".to_string(),
                columns: vec!["email".to_string()],
                is_unique: true,
                index_type: "BTREE".to_string(),
            }
        );
    }

    #[test]
    fn test_qualified_index_with_method() {
        let sql = r#"
            create index if not exists "idx_orders_user" on public.orders using gin (user_id, created_at DESC);
            CREATE INDEX idx_plain ON items(sku);
        "#;
        let defs = extract_indexes(sql);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].table, "orders");
        assert_eq!(defs[0].index.name, "idx_orders_user");
        assert_eq!(defs[0].index.index_type, "GIN");
        assert_eq!(defs[0].index.columns, vec!["user_id", "created_at"]);
        assert!(!defs[0].index.is_unique);
        assert_eq!(defs[1].table, "items");
    }

    #[test]
    fn test_no_indexes() {
        assert!(extract_indexes("CREATE TABLE t (id INT);").is_empty());
    }
}
