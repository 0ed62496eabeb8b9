//! Graph analysis shared by the layout algorithms.

use crate::ir::GraphIR;
use tracing::debug;

/// Assign nodes to dependency levels.
///
/// Level 0 holds nodes with no dependencies; each later round takes every
/// node whose dependencies are all placed. When a round finds nothing (a
/// cycle), all remaining nodes go into that level at once.
pub fn dependency_levels(ir: &GraphIR) -> Vec<Vec<usize>> {
    let n = ir.len();
    let mut depends_on: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in ir.edges.iter().filter(|e| !e.is_self_ref()) {
        depends_on[edge.from].push(edge.to);
    }

    let mut placed = vec![false; n];
    let mut remaining = n;
    let mut levels = Vec::new();

    while remaining > 0 {
        let mut level: Vec<usize> = (0..n)
            .filter(|&i| !placed[i] && depends_on[i].iter().all(|&d| placed[d]))
            .collect();

        if level.is_empty() {
            level = (0..n).filter(|&i| !placed[i]).collect();
            debug!(
                level = levels.len(),
                nodes = level.len(),
                "dependency cycle; placing remaining tables together"
            );
        }

        for &i in &level {
            placed[i] = true;
        }
        remaining -= level.len();
        levels.push(level);
    }

    levels
}

/// In-degree plus out-degree for each node.
pub fn degrees(ir: &GraphIR) -> Vec<usize> {
    let mut degree = vec![0; ir.len()];
    for edge in &ir.edges {
        degree[edge.from] += 1;
        degree[edge.to] += 1;
    }
    degree
}

/// Partition nodes by name prefix, groups in order of first appearance.
pub fn prefix_groups(ir: &GraphIR) -> Vec<(&str, Vec<usize>)> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (i, node) in ir.nodes.iter().enumerate() {
        match groups.iter_mut().find(|(g, _)| *g == node.group) {
            Some((_, members)) => members.push(i),
            None => groups.push((node.group.as_str(), vec![i])),
        }
    }
    groups
}

/// Number of columns in a near-square grid holding `count` cells.
pub fn square_columns(count: usize) -> usize {
    ((count as f64).sqrt().ceil() as usize).max(1)
}
