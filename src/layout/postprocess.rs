//! Passes that adjust an existing position map.

use std::f64::consts::TAU;
use tracing::{debug, warn};

use super::analysis::square_columns;
use super::types::{Position, PositionMap};

pub const MAX_OVERLAP_ROUNDS: usize = 50;
const MIN_DISTANCE_FACTOR: f64 = 0.7;
const TOLERANCE: f64 = 1e-6;

/// Snap every table onto a uniform grid spanning the current bounding box.
///
/// Tables are taken top-to-bottom, then left-to-right, then by name, and
/// fill the grid row by row. An axis with no extent steps by `spacing`.
pub fn distribute_evenly(positions: &PositionMap, spacing: f64) -> PositionMap {
    if positions.is_empty() {
        return PositionMap::new();
    }

    let mut ordered: Vec<(&String, &Position)> = positions.iter().collect();
    ordered.sort_by(|(an, a), (bn, b)| {
        a.y.total_cmp(&b.y)
            .then(a.x.total_cmp(&b.x))
            .then_with(|| an.cmp(bn))
    });

    let (min_x, max_x, min_y, max_y) = positions.values().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
    );

    let cols = square_columns(ordered.len());
    let rows = ordered.len().div_ceil(cols);
    let step = |extent: f64, cells: usize| {
        if cells > 1 && extent > 0.0 {
            extent / (cells - 1) as f64
        } else {
            spacing
        }
    };
    let step_x = step(max_x - min_x, cols);
    let step_y = step(max_y - min_y, rows);

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, (name, _))| {
            let position = Position::new(
                min_x + (i % cols) as f64 * step_x,
                min_y + (i / cols) as f64 * step_y,
            );
            (name.clone(), position)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlapReport {
    pub positions: PositionMap,
    /// Separation rounds performed.
    pub rounds: usize,
    /// Whether every pair ended at least the minimum distance apart.
    pub converged: bool,
}

pub fn resolve_overlaps(positions: &PositionMap, spacing: f64) -> PositionMap {
    resolve_overlaps_report(positions, spacing).positions
}

/// Push table pairs apart until every centre-to-centre distance is at
/// least `0.7 * spacing`, for at most [`MAX_OVERLAP_ROUNDS`] rounds.
pub fn resolve_overlaps_report(positions: &PositionMap, spacing: f64) -> OverlapReport {
    let min_distance = spacing * MIN_DISTANCE_FACTOR;
    let names: Vec<&String> = positions.keys().collect();
    let mut points: Vec<Position> = positions.values().copied().collect();

    let mut rounds = 0;
    let mut converged = !has_overlap(&points, min_distance);
    while !converged && rounds < MAX_OVERLAP_ROUNDS {
        separate(&mut points, min_distance);
        rounds += 1;
        converged = !has_overlap(&points, min_distance);
    }

    if converged {
        debug!(rounds, tables = points.len(), "overlaps resolved");
    } else {
        warn!(
            rounds,
            min_distance, "overlap resolution stopped at round cap with tables still overlapping"
        );
    }

    OverlapReport {
        positions: names.into_iter().cloned().zip(points).collect(),
        rounds,
        converged,
    }
}

fn has_overlap(points: &[Position], min_distance: f64) -> bool {
    points.iter().enumerate().any(|(i, a)| {
        points[i + 1..]
            .iter()
            .any(|b| a.distance(b) + TOLERANCE < min_distance)
    })
}

fn separate(points: &mut [Position], min_distance: f64) {
    let n = points.len();
    for i in 0..n {
        for j in i + 1..n {
            let (dx, dy) = (points[j].x - points[i].x, points[j].y - points[i].y);
            let d = dx.hypot(dy);
            if d + TOLERANCE >= min_distance {
                continue;
            }

            let (ux, uy) = if d > TOLERANCE {
                (dx / d, dy / d)
            } else {
                // coincident centres: spread by pair index
                let angle = (i * n + j) as f64 * TAU / (n * n) as f64;
                (angle.cos(), angle.sin())
            };
            let half = (min_distance - d) / 2.0;
            points[i].x -= ux * half;
            points[i].y -= uy * half;
            points[j].x += ux * half;
            points[j].y += uy * half;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(points: &[(&str, f64, f64)]) -> PositionMap {
        points
            .iter()
            .map(|&(name, x, y)| (name.to_string(), Position::new(x, y)))
            .collect()
    }

    fn min_pair_distance(positions: &PositionMap) -> f64 {
        let points: Vec<&Position> = positions.values().collect();
        let mut min = f64::INFINITY;
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                min = min.min(a.distance(b));
            }
        }
        min
    }

    #[test]
    fn test_distribute_evenly_grid() {
        let positions = map(&[
            ("d", 400.0, 300.0),
            ("a", 0.0, 0.0),
            ("c", 10.0, 280.0),
            ("b", 350.0, 20.0),
        ]);
        let out = distribute_evenly(&positions, 450.0);
        assert_eq!(out["a"], Position::new(0.0, 0.0));
        assert_eq!(out["b"], Position::new(400.0, 0.0));
        assert_eq!(out["c"], Position::new(0.0, 300.0));
        assert_eq!(out["d"], Position::new(400.0, 300.0));
    }

    #[test]
    fn test_distribute_evenly_degenerate_box() {
        let positions = map(&[("a", 50.0, 50.0), ("b", 50.0, 50.0)]);
        let out = distribute_evenly(&positions, 200.0);
        assert_eq!(out["a"], Position::new(50.0, 50.0));
        assert_eq!(out["b"], Position::new(250.0, 50.0));
        assert!(distribute_evenly(&PositionMap::new(), 200.0).is_empty());
    }

    #[test]
    fn test_resolve_coincident_pair() {
        let positions = map(&[("a", 100.0, 100.0), ("b", 100.0, 100.0)]);
        let report = resolve_overlaps_report(&positions, 450.0);
        assert!(report.converged);
        assert_eq!(report.rounds, 1);
        assert!(min_pair_distance(&report.positions) + TOLERANCE >= 315.0);
    }

    #[test]
    fn test_resolve_cluster_reaches_minimum() {
        let positions = map(&[
            ("a", 0.0, 0.0),
            ("b", 10.0, 0.0),
            ("c", 0.0, 10.0),
            ("d", 5.0, 5.0),
            ("e", 500.0, 500.0),
        ]);
        let report = resolve_overlaps_report(&positions, 200.0);
        assert!(report.converged);
        assert!(report.rounds <= MAX_OVERLAP_ROUNDS);
        assert!(min_pair_distance(&report.positions) + TOLERANCE >= 140.0);
    }

    #[test]
    fn test_resolve_stops_at_round_cap() {
        let positions: PositionMap = (0..30)
            .map(|i| (format!("t{i:02}"), Position::new(0.0, 0.0)))
            .collect();
        let report = resolve_overlaps_report(&positions, 1000.0);
        assert!(!report.converged);
        assert_eq!(report.rounds, MAX_OVERLAP_ROUNDS);
        assert_eq!(report.positions.len(), 30);
        assert!(report.positions.values().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_resolve_noop_when_spread() {
        let positions = map(&[("a", 0.0, 0.0), ("b", 1000.0, 0.0)]);
        let report = resolve_overlaps_report(&positions, 450.0);
        assert_eq!(report.rounds, 0);
        assert_eq!(report.positions, positions);
        assert_eq!(resolve_overlaps(&positions, 450.0), positions);
    }
}
