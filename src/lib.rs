pub mod classify;
pub mod ir;
pub mod layout;
pub mod measure;
pub mod schema;
pub mod sql;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use classify::TableRole;
use layout::{
    route_relationships, LayoutConfig, LayoutEngine, LayoutError, LayoutKind, PositionMap,
    RoutedEdge,
};
use measure::TextMetrics;
use schema::Schema;
use sql::parse_sql_with_diagnostics;

/// A laid out schema, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub schema: Schema,
    pub positions: PositionMap,
    pub connections: Vec<RoutedEdge>,
}

#[derive(Debug, Clone, Default)]
pub struct DiagramOptions {
    pub kind: LayoutKind,
    pub config: LayoutConfig,
    /// Tables left out of the diagram, matched case-insensitively.
    pub hidden: Vec<String>,
    /// When non-empty, only tables with one of these roles are kept.
    pub roles: Vec<TableRole>,
    pub distribute: bool,
    pub resolve_overlaps: bool,
}

/// Lay out a derived view of `schema`; the schema itself is not modified.
pub fn build_diagram(schema: &Schema, options: &DiagramOptions) -> Result<Diagram, LayoutError> {
    let engine = LayoutEngine::new(options.config.clone())?;

    let mut view = schema.without_tables(&options.hidden);
    if !options.roles.is_empty() {
        view = view.retain_roles(&options.roles);
    }

    let mut positions = engine.layout(options.kind, &view.tables, &view.relationships);
    if options.distribute {
        positions = engine.distribute_evenly(&positions);
    }
    if options.resolve_overlaps {
        positions = engine.resolve_overlaps(&positions);
    }

    let sizes = TextMetrics::default().table_sizes(&view);
    let connections = route_relationships(&view, &positions, &sizes);

    Ok(Diagram {
        schema: view,
        positions,
        connections,
    })
}

#[derive(Serialize)]
struct ParseResult {
    schema: Schema,
    diagnostics: Vec<String>,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&text)
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Parse SQL DDL into `{ schema, diagnostics }`.
#[wasm_bindgen(js_name = "parseSql")]
pub fn parse_sql_js(sql: &str) -> Result<JsValue, JsValue> {
    let output = parse_sql_with_diagnostics(sql);
    to_js(&ParseResult {
        schema: output.schema,
        diagnostics: output.diagnostics.iter().map(ToString::to_string).collect(),
    })
}

/// Parse SQL DDL and lay it out into `{ schema, positions, connections }`.
#[wasm_bindgen(js_name = "layoutSql")]
pub fn layout_sql_js(
    sql: &str,
    layout: Option<String>,
    spacing: Option<f64>,
) -> Result<JsValue, JsValue> {
    let kind = layout
        .as_deref()
        .map(str::parse::<LayoutKind>)
        .transpose()
        .map_err(|e| JsValue::from_str(&e.to_string()))?
        .unwrap_or_default();
    let mut config = LayoutConfig::default();
    if let Some(spacing) = spacing {
        config = config.with_spacing(spacing);
    }

    let schema = parse_sql_with_diagnostics(sql).schema;
    let options = DiagramOptions {
        kind,
        config,
        ..DiagramOptions::default()
    };
    let diagram = build_diagram(&schema, &options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&diagram)
}
