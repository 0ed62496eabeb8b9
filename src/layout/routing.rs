//! Connection side selection for relationship edges.

use std::collections::HashMap;
use tracing::trace;

use crate::schema::Schema;

use super::types::{Connection, NodeBox, PositionMap, RoutedEdge, Side};

/// Node size assumed when a table's measured size is unknown.
pub const DEFAULT_NODE_WIDTH: f64 = 250.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 200.0;

/// Pick the sides an edge leaves `source` and enters `target` by.
///
/// The axis with the larger centre displacement wins; equal displacement
/// goes to the vertical pair.
pub fn calculate_optimal_connection(source: &NodeBox, target: &NodeBox) -> Connection {
    let (sx, sy) = source.center();
    let (tx, ty) = target.center();
    let (dx, dy) = (tx - sx, ty - sy);

    let (source_handle, target_handle) = if dx.abs() > dy.abs() {
        if dx > 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    };

    Connection {
        source_handle,
        target_handle,
    }
}

/// Route every relationship whose two tables have a position.
///
/// `sizes` maps table names to measured `(width, height)`; tables missing
/// from it use [`DEFAULT_NODE_WIDTH`] x [`DEFAULT_NODE_HEIGHT`].
pub fn route_relationships(
    schema: &Schema,
    positions: &PositionMap,
    sizes: &HashMap<String, (f64, f64)>,
) -> Vec<RoutedEdge> {
    let node = |name: &str| {
        let position = positions.get(name)?;
        let size = sizes
            .get(name)
            .copied()
            .unwrap_or((DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT));
        Some(NodeBox::new(*position, size))
    };

    schema
        .relationships
        .iter()
        .filter_map(|rel| {
            let (source, target) = (node(&rel.from)?, node(&rel.to)?);
            let connection = calculate_optimal_connection(&source, &target);
            trace!(id = %rel.id, ?connection, "routed relationship");
            Some(RoutedEdge {
                id: rel.id.clone(),
                from: rel.from.clone(),
                to: rel.to.clone(),
                connection,
            })
        })
        .collect()
}
