//! Tables grouped by name prefix, groups on a grid of sub-grids.

use crate::ir::GraphIR;

use super::analysis::{prefix_groups, square_columns};
use super::types::Position;
use super::LayoutConfig;

const INNER_SPACING: f64 = 0.8;

pub fn layout(ir: &GraphIR, config: &LayoutConfig) -> Vec<Position> {
    let groups = prefix_groups(ir);
    let group_cols = square_columns(groups.len());
    let largest = groups.iter().map(|(_, m)| m.len()).max().unwrap_or(1);

    let inner = config.spacing * INNER_SPACING;
    let block = square_columns(largest) as f64 * inner + config.spacing;

    let mut points = vec![Position::new(0.0, 0.0); ir.len()];
    for (g, (_, members)) in groups.iter().enumerate() {
        let origin_x = config.padding + (g % group_cols) as f64 * block;
        let origin_y = config.padding + (g / group_cols) as f64 * block;
        let cols = square_columns(members.len());

        for (slot, &node) in members.iter().enumerate() {
            points[node] = Position::new(
                origin_x + (slot % cols) as f64 * inner,
                origin_y + (slot / cols) as f64 * inner,
            );
        }
    }

    points
}
