//! Force-directed placement: pairwise repulsion, spring attraction along
//! relationships, damped integration inside a padded bounding box.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::ir::GraphIR;

use super::analysis::square_columns;
use super::types::Position;
use super::LayoutConfig;

const ITERATIONS: usize = 300;
const REPULSION: f64 = 50.0;
const ATTRACTION: f64 = 0.1;
const DAMPING: f64 = 0.9;
const MIN_DISTANCE: f64 = 0.01;

pub fn layout(ir: &GraphIR, config: &LayoutConfig) -> Vec<Position> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    debug!(seed = ?config.seed, iterations = ITERATIONS, "force layout");

    let n = ir.len();
    let fit = square_columns(n) as f64 * config.spacing + 2.0 * config.padding;
    let (min_x, max_x) = (config.padding, config.viewport_width.max(fit) - config.padding);
    let (min_y, max_y) = (config.padding, config.viewport_height.max(fit) - config.padding);

    let mut points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(min_x..=max_x), rng.random_range(min_y..=max_y)))
        .collect();
    let mut velocity = vec![(0.0, 0.0); n];
    let repulsion = REPULSION * config.spacing * config.spacing;

    for _ in 0..ITERATIONS {
        let mut force = vec![(0.0, 0.0); n];

        for i in 0..n {
            for j in i + 1..n {
                let (mut dx, mut dy) = (points[i].0 - points[j].0, points[i].1 - points[j].1);
                let mut d = dx.hypot(dy);
                if d < MIN_DISTANCE {
                    dx = rng.random_range(-1.0..1.0);
                    dy = rng.random_range(-1.0..1.0);
                    d = dx.hypot(dy).max(MIN_DISTANCE);
                }
                let push = repulsion / (d * d);
                let (fx, fy) = (push * dx / d, push * dy / d);
                force[i].0 += fx;
                force[i].1 += fy;
                force[j].0 -= fx;
                force[j].1 -= fy;
            }
        }

        for edge in ir.edges.iter().filter(|e| !e.is_self_ref()) {
            let (from, to) = (points[edge.from], points[edge.to]);
            let (dx, dy) = (to.0 - from.0, to.1 - from.1);
            let d = dx.hypot(dy);
            if d < MIN_DISTANCE {
                continue;
            }
            let pull = ATTRACTION * d;
            let (fx, fy) = (pull * dx / d, pull * dy / d);
            force[edge.from].0 += fx;
            force[edge.from].1 += fy;
            force[edge.to].0 -= fx;
            force[edge.to].1 -= fy;
        }

        for i in 0..n {
            let (vx, vy) = (
                ((velocity[i].0 + force[i].0) * DAMPING).clamp(-config.spacing, config.spacing),
                ((velocity[i].1 + force[i].1) * DAMPING).clamp(-config.spacing, config.spacing),
            );
            velocity[i] = (vx, vy);
            points[i] = (
                (points[i].0 + vx).clamp(min_x, max_x),
                (points[i].1 + vy).clamp(min_y, max_y),
            );
        }
    }

    points.into_iter().map(|(x, y)| Position::new(x, y)).collect()
}
