//! Isolates CREATE TABLE statements from surrounding SQL.

use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{debug, trace};

use super::parser::{report, SqlParseError};
use super::types::{unquote, IDENT};

/// Header up to and including the opening parenthesis of the body.
/// Group 1 is the table name without any schema qualifier.
static CREATE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bCREATE\s+(?:OR\s+REPLACE\s+)?(?:(?:GLOBAL|LOCAL)\s+)?(?:(?:TEMP|TEMPORARY|UNLOGGED)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:{IDENT}\s*\.\s*)*({IDENT})\s*\("
    ))
    .unwrap()
});

/// SQL Server batch separator on a line of its own.
static BATCH_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*GO[ \t]*$").unwrap());

/// One CREATE TABLE statement cut out of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStatement {
    pub name: String,
    /// Text between the outer parentheses.
    pub body: String,
    /// Whole statement, from `CREATE` through the terminating `;` if present.
    pub text: String,
}

/// Extract every CREATE TABLE statement from comment-free SQL.
///
/// The body runs to the parenthesis that balances the opening one. A `;`
/// reached while a parenthesis is still open, or the end of input, means the
/// statement is unterminated and it is dropped. Headers and `;` inside
/// quoted literals are not statement boundaries.
pub fn extract_create_tables(
    sql: &str,
    diagnostics: &mut Vec<SqlParseError>,
) -> Vec<TableStatement> {
    let quoted = quoted_spans(sql);
    let mut statements = Vec::new();
    let mut pos = 0;

    while let Some(caps) = next_header(sql, pos, &quoted) {
        let (Some(header), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let name = unquote(name.as_str());
        let open = header.end() - 1;

        match find_closing_paren(sql, open) {
            Some(close) => {
                let end = statement_end(sql, close, &quoted);
                trace!(table = %name, bytes = end - header.start(), "extracted CREATE TABLE");
                statements.push(TableStatement {
                    name,
                    body: sql[open + 1..close].to_string(),
                    text: sql[header.start()..end].to_string(),
                });
                pos = end;
            }
            None => {
                report(diagnostics, SqlParseError::UnterminatedTable { table: name });
                pos = header.end();
            }
        }
    }

    debug!(count = statements.len(), "CREATE TABLE statements found");
    statements
}

/// First CREATE TABLE header at or after `from` that is not inside a literal.
fn next_header<'a>(sql: &'a str, from: usize, quoted: &[Range<usize>]) -> Option<Captures<'a>> {
    let mut pos = from;
    while let Some(caps) = CREATE_TABLE_RE.captures_at(sql, pos) {
        let start = caps.get(0)?.start();
        if !is_quoted(quoted, start) {
            return Some(caps);
        }
        pos = start + 1;
    }
    None
}

/// End of the statement whose body closes at `close`.
///
/// Table options may follow the body up to a `;`. That `;` only counts when
/// it comes before the next CREATE TABLE header or `GO` line; otherwise the
/// statement ends right after the closing parenthesis.
fn statement_end(sql: &str, close: usize, quoted: &[Range<usize>]) -> usize {
    let after = close + 1;
    let next_statement = next_header(sql, after, quoted).and_then(|caps| caps.get(0));
    let batch_end = BATCH_SEPARATOR_RE
        .find_iter(&sql[after..])
        .map(|m| after + m.start())
        .find(|&start| !is_quoted(quoted, start));
    let limit = next_statement
        .map(|m| m.start())
        .into_iter()
        .chain(batch_end)
        .min()
        .unwrap_or(sql.len());

    sql[after..limit]
        .match_indices(';')
        .map(|(i, _)| after + i)
        .find(|&i| !is_quoted(quoted, i))
        .map_or(after, |i| i + 1)
}

/// Byte ranges of quoted literals and identifiers, in input order. An
/// unclosed quote runs to the end of input.
fn quoted_spans(sql: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<(char, usize)> = None;

    for (i, c) in sql.char_indices() {
        match open {
            Some((q, start)) if c == q => {
                spans.push(start..i + 1);
                open = None;
            }
            Some(_) => {}
            None if matches!(c, '\'' | '"' | '`') => open = Some((c, i)),
            None => {}
        }
    }
    if let Some((_, start)) = open {
        spans.push(start..sql.len());
    }
    spans
}

fn is_quoted(spans: &[Range<usize>], pos: usize) -> bool {
    let i = spans.partition_point(|span| span.end <= pos);
    spans.get(i).is_some_and(|span| span.start <= pos)
}

/// Byte offset of the parenthesis closing the one at `open`.
fn find_closing_paren(sql: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in sql[open..].char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + i);
                }
            }
            ';' => return None,
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(sql: &str) -> (Vec<TableStatement>, Vec<SqlParseError>) {
        let mut diagnostics = Vec::new();
        let statements = extract_create_tables(sql, &mut diagnostics);
        (statements, diagnostics)
    }

    #[test]
    fn test_extract_simple() {
        let (stmts, diags) = extract("CREATE TABLE users (id INT, name VARCHAR(50));");
        assert!(diags.is_empty());
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].name, "users");
        assert_eq!(stmts[0].body, "id INT, name VARCHAR(50)");
        assert_eq!(stmts[0].text, "CREATE TABLE users (id INT, name VARCHAR(50));");
    }

    #[test]
    fn test_extract_among_noise() {
        let sql = r#"
            SET search_path = public;
            INSERT INTO logs VALUES (1, 'CREATE TABLE fake');
            create table if not exists "public"."Orders" (
                id int,
                total numeric(10, 2) check (total > (0))
            ) ENGINE=InnoDB;
            SELECT 1;
        "#;
        let (stmts, _) = extract(sql);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].name, "Orders");
        assert!(stmts[0].body.contains("check (total > (0))"));
        assert!(stmts[0].text.ends_with("ENGINE=InnoDB;"));
    }

    #[test]
    fn test_unbalanced_statement_dropped() {
        let sql = "CREATE TABLE broken (id INT, name VARCHAR(20;\nCREATE TABLE ok (id INT);";
        let (stmts, diags) = extract(sql);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].name, "ok");
        assert!(matches!(
            &diags[0],
            SqlParseError::UnterminatedTable { table } if table == "broken"
        ));
    }

    #[test]
    fn test_parenthesis_inside_string() {
        let sql = "CREATE TABLE t (label VARCHAR(5) DEFAULT ')', id INT);";
        let (stmts, _) = extract(sql);
        assert_eq!(stmts[0].body, "label VARCHAR(5) DEFAULT ')', id INT");
    }

    #[test]
    fn test_missing_semicolon_at_end() {
        let (stmts, _) = extract("CREATE TABLE a (id INT)");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].text, "CREATE TABLE a (id INT)");
    }

    #[test]
    fn test_statements_without_semicolons() {
        let sql = "CREATE TABLE a (id INT)\nGO\nCREATE TABLE b (id INT, a_id INT REFERENCES a(id))\nGO\nCREATE TABLE c (id INT);";
        let (stmts, diags) = extract(sql);
        assert!(diags.is_empty());
        let names: Vec<&str> = stmts.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(stmts[0].text, "CREATE TABLE a (id INT)");
        assert_eq!(stmts[2].text, "CREATE TABLE c (id INT);");
    }

    #[test]
    fn test_unterminated_before_terminated() {
        let sql = "CREATE TABLE a (id INT) ENGINE=InnoDB\nCREATE TABLE b (id INT);\nINSERT INTO b VALUES (1);";
        let (stmts, _) = extract(sql);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text, "CREATE TABLE a (id INT)");
        assert_eq!(stmts[1].text, "CREATE TABLE b (id INT);");
    }

    #[test]
    fn test_quoted_table_option() {
        let sql = "CREATE TABLE a (id INT) COMMENT='x; CREATE TABLE ghost (z INT)';\nCREATE TABLE b (id INT);";
        let (stmts, _) = extract(sql);
        let names: Vec<&str> = stmts.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            stmts[0].text,
            "CREATE TABLE a (id INT) COMMENT='x; CREATE TABLE ghost (z INT)';"
        );
    }

    #[test]
    fn test_header_inside_literal_ignored() {
        let sql = "INSERT INTO scripts VALUES ('CREATE TABLE ghost (z INT);');\nCREATE TABLE real (id INT);";
        let (stmts, _) = extract(sql);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].name, "real");
    }
}
