//! Text metrics for estimating rendered table node sizes.

use std::collections::HashMap;
use unicode_width::UnicodeWidthStr;

use crate::schema::{Schema, Table};

pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub header_padding: f64,
    /// Room for the key marker drawn before a column name.
    pub key_marker_width: f64,
    pub min_node_width: f64,
    pub min_node_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            padding_x: 12.0,
            padding_y: 8.0,
            header_padding: 4.0,
            key_marker_width: 24.0,
            min_node_width: 180.0,
            min_node_height: 60.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Size of a node with a header label and `(name, type)` rows.
    pub fn node_size(&self, label: &str, columns: &[(&str, &str)]) -> (f64, f64) {
        let header_width = self.text_width(label);

        let max_col_width = columns
            .iter()
            .map(|(name, typ)| {
                self.key_marker_width
                    + self.text_width(name)
                    + self.text_width(typ)
                    + self.char_width * 2.0
            })
            .fold(0.0, f64::max);

        let content_width = header_width.max(max_col_width) + self.padding_x * 2.0;
        let width = content_width.max(self.min_node_width);

        let header_height = self.line_height + self.header_padding * 2.0;
        let body_height = if columns.is_empty() {
            0.0
        } else {
            columns.len() as f64 * self.line_height + self.padding_y * 2.0
        };

        let height = (header_height + body_height).max(self.min_node_height);

        (width, height)
    }

    pub fn table_size(&self, table: &Table) -> (f64, f64) {
        let columns: Vec<(&str, &str)> = table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type.as_str()))
            .collect();
        self.node_size(&table.name, &columns)
    }

    /// Estimated size of every table, keyed by table name.
    pub fn table_sizes(&self, schema: &Schema) -> HashMap<String, (f64, f64)> {
        schema
            .tables
            .iter()
            .map(|t| (t.name.clone(), self.table_size(t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("User"), 4.0 * 8.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = TextMetrics::default();
        // full-width characters count double
        assert_eq!(m.text_width("ユーザー"), 8.0 * 8.0);
    }

    #[test]
    fn test_mixed_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("Userテスト"), 10.0 * 8.0);
    }

    #[test]
    fn test_node_size_no_columns() {
        let m = TextMetrics::default();
        let (w, h) = m.node_size("User", &[]);
        assert_eq!(w, m.min_node_width);
        assert_eq!(h, m.min_node_height);
    }

    #[test]
    fn test_table_size_grows_with_columns() {
        let m = TextMetrics::default();
        let mut table = Table::new("customer_addresses");
        let empty = m.table_size(&table);

        for name in ["id", "customer_id", "street_line_1", "postal_code"] {
            table.columns.push(Column {
                name: name.to_string(),
                data_type: "character varying(255)".to_string(),
                nullable: true,
            });
        }
        let (w, h) = m.table_size(&table);
        assert!(w > empty.0);
        assert_eq!(h, 28.0 + 4.0 * 20.0 + 16.0);
    }

    #[test]
    fn test_table_sizes_keyed_by_name() {
        let m = TextMetrics::default();
        let schema = Schema {
            tables: vec![Table::new("a"), Table::new("b")],
            relationships: Vec::new(),
        };
        let sizes = m.table_sizes(&schema);
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes["a"], (m.min_node_width, m.min_node_height));
    }
}
