//! Dialect cleanup: comment stripping and syntax normalization.

use regex::Regex;
use std::sync::LazyLock;

use super::statement::extract_create_tables;

static IF_NOT_EXISTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bIF\s+NOT\s+EXISTS\s+").unwrap());

static PUBLIC_SCHEMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:\bpublic|"public")\s*\.\s*"#).unwrap());

static BIGSERIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbigserial\b").unwrap());

static SERIAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bserial\b").unwrap());

/// TEXT only where a type is expected: followed by a clause end or a constraint.
static TEXT_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bTEXT(\s*(?:,|\)|\bNOT\b|\bNULL\b|\bDEFAULT\b|\bPRIMARY\b|\bUNIQUE\b|\bREFERENCES\b|\bCHECK\b|\bCOLLATE\b))",
    )
    .unwrap()
});

static JSONB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bJSONB\b").unwrap());

static TIMESTAMP_TZ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bTIMESTAMP\s+WITH(?:OUT)?\s+TIME\s+ZONE\b").unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Remove `--` line comments and `/* */` block comments.
/// Quoted strings and quoted identifiers are left untouched.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                // Doubled quote is an escaped quote, stay inside the literal.
                if chars.peek() == Some(&q) {
                    out.push(q);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

pub fn collapse_whitespace(input: &str) -> String {
    WHITESPACE_RE.replace_all(input.trim(), " ").into_owned()
}

/// Map dialect-specific syntax in one statement onto a common form.
pub fn normalize_statement(statement: &str) -> String {
    let text = strip_comments(statement);
    let text = IF_NOT_EXISTS_RE.replace_all(&text, "");
    let text = PUBLIC_SCHEMA_RE.replace_all(&text, "");
    let text = BIGSERIAL_RE.replace_all(&text, "BIGINT AUTO_INCREMENT");
    let text = SERIAL_RE.replace_all(&text, "INT AUTO_INCREMENT");
    let text = TEXT_TYPE_RE.replace_all(&text, "VARCHAR(65535)$1");
    let text = JSONB_RE.replace_all(&text, "JSON");
    let text = TIMESTAMP_TZ_RE.replace_all(&text, "TIMESTAMP");
    collapse_whitespace(&text)
}

/// Normalized form of every CREATE TABLE statement in `input`, one per line.
/// Everything that is not a CREATE TABLE statement is dropped.
pub fn normalize_ddl(input: &str) -> String {
    let text = strip_comments(input);
    let mut ignored = Vec::new();
    extract_create_tables(&text, &mut ignored)
        .iter()
        .map(|stmt| normalize_statement(&stmt.text))
        .collect::<Vec<_>>()
        .join("\n")
}
