//! Two concentric rings, most connected tables inside.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::ir::GraphIR;

use super::analysis::degrees;
use super::types::Position;
use super::LayoutConfig;

pub fn layout(ir: &GraphIR, config: &LayoutConfig) -> Vec<Position> {
    let degree = degrees(ir);
    let mut ranked: Vec<usize> = (0..ir.len()).collect();
    // stable: ties keep input order
    ranked.sort_by(|&a, &b| degree[b].cmp(&degree[a]));

    let inner_count = 3.min((ir.len() as f64 * 0.3).ceil() as usize);
    let (inner, outer) = ranked.split_at(inner_count);

    let inner_radius = (config.spacing * 0.8).max(200.0);
    let outer_radius = (config.spacing * 1.5).max(400.0);
    let center = config.padding + outer_radius;

    let mut points = vec![Position::new(center, center); ir.len()];
    for (ring, radius) in [(inner, inner_radius), (outer, outer_radius)] {
        let step = TAU / ring.len().max(1) as f64;
        for (slot, &node) in ring.iter().enumerate() {
            let angle = -FRAC_PI_2 + slot as f64 * step;
            points[node] = Position::new(
                center + radius * angle.cos(),
                center + radius * angle.sin(),
            );
        }
    }

    points
}
