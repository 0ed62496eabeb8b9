//! Identifier and declared-type helpers.

/// Regex fragment for one identifier: backtick, double-quote or bracket
/// quoted, or a bare word.
pub const IDENT: &str = r#"(?:`[^`]+`|"[^"]+"|\[[^\]]+\]|[\w$]+)"#;

/// Column assumed when a REFERENCES clause names no columns.
pub const DEFAULT_REFERENCED_COLUMN: &str = "id";

/// Strip one layer of backtick, double-quote or bracket quoting.
pub fn unquote(ident: &str) -> String {
    let ident = ident.trim();
    let quoted = [('`', '`'), ('"', '"'), ('[', ']')];
    for (open, close) in quoted {
        if ident.len() >= 2 && ident.starts_with(open) && ident.ends_with(close) {
            return ident[1..ident.len() - 1].to_string();
        }
    }
    ident.to_string()
}

/// Parse a parenthesized column list body such as `a, "b" DESC, c(10)`.
///
/// Each entry keeps only the column name: quotes, sort order and prefix
/// lengths are dropped.
pub fn parse_column_list(list: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            let name = match entry.chars().next()? {
                '`' | '"' | '[' => {
                    let close = match entry.as_bytes()[0] {
                        b'[' => ']',
                        other => other as char,
                    };
                    let end = entry[1..].find(close).map(|i| i + 2).unwrap_or(entry.len());
                    unquote(&entry[..end])
                }
                _ => entry
                    .split(|c: char| c.is_whitespace() || c == '(')
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            };
            (!name.is_empty()).then_some(name)
        })
        .collect()
}

/// Columns of an optional `REFERENCES t (cols)` list; a missing list means
/// the referenced table's `id`.
pub fn referenced_columns(list: Option<&str>) -> Vec<String> {
    match list {
        Some(list) => parse_column_list(list),
        None => vec![DEFAULT_REFERENCED_COLUMN.to_string()],
    }
}

/// Concrete integer type behind a PostgreSQL serial pseudo-type.
pub fn serial_base_type(declared: &str) -> Option<&'static str> {
    match declared.trim().to_lowercase().as_str() {
        "serial" | "serial4" => Some("INT"),
        "bigserial" | "serial8" => Some("BIGINT"),
        "smallserial" | "serial2" => Some("SMALLINT"),
        _ => None,
    }
}
