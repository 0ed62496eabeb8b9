//! Dependency levels stacked vertically, referenced tables below.

use crate::ir::GraphIR;

use super::analysis::dependency_levels;
use super::types::Position;
use super::LayoutConfig;

const LEVEL_GAP: f64 = 1.2;

pub fn layout(ir: &GraphIR, config: &LayoutConfig) -> Vec<Position> {
    let levels = dependency_levels(ir);
    let deepest = levels.len().saturating_sub(1);
    let anchor = config.padding + config.viewport_width / 2.0;
    let mut points = vec![Position::new(0.0, 0.0); ir.len()];

    for (level, members) in levels.iter().enumerate() {
        let y = config.padding + (deepest - level) as f64 * config.spacing * LEVEL_GAP;
        let span = members.len().saturating_sub(1) as f64 * config.spacing;
        let left = (anchor - span / 2.0).max(config.padding);

        for (slot, &node) in members.iter().enumerate() {
            points[node] = Position::new(left + slot as f64 * config.spacing, y);
        }
    }

    points
}
