//! Table placement: five layout algorithms plus post-processing passes.

mod analysis;
mod circular;
mod force;
mod grid;
mod hierarchical;
mod modular;
mod postprocess;
mod routing;
mod types;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::ir::GraphIR;
use crate::schema::{Relationship, Table};

pub use postprocess::{
    distribute_evenly, resolve_overlaps, resolve_overlaps_report, OverlapReport,
    MAX_OVERLAP_ROUNDS,
};
pub use routing::{
    calculate_optimal_connection, route_relationships, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH,
};
pub use types::{Connection, NodeBox, Position, PositionMap, RoutedEdge, Side};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("unknown layout '{0}' (expected grid, hierarchical, circular, modular or force)")]
    UnknownKind(String),
    #[error("{field} must be a finite positive number, got {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Grid,
    #[default]
    Hierarchical,
    Circular,
    Modular,
    Force,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 5] = [
        Self::Grid,
        Self::Hierarchical,
        Self::Circular,
        Self::Modular,
        Self::Force,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Hierarchical => "hierarchical",
            Self::Circular => "circular",
            Self::Modular => "modular",
            Self::Force => "force",
        }
    }
}

impl FromStr for LayoutKind {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LayoutError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Distance unit between neighbouring tables, in pixels.
    pub spacing: f64,
    /// Margin between the canvas origin and the first table.
    pub padding: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Seed for the force-directed layout; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 450.0,
            padding: 100.0,
            viewport_width: 1920.0,
            viewport_height: 1080.0,
            seed: None,
        }
    }
}

impl LayoutConfig {
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = [
            ("spacing", self.spacing),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidValue { field, value });
            }
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(LayoutError::InvalidValue {
                field: "padding",
                value: self.padding,
            });
        }
        Ok(())
    }
}

/// Layout engine configuration and computation.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Position every table with the selected algorithm.
    ///
    /// Every layout except [`LayoutKind::Force`] without a seed is a pure
    /// function of its inputs.
    pub fn layout(
        &self,
        kind: LayoutKind,
        tables: &[Table],
        relationships: &[Relationship],
    ) -> PositionMap {
        let ir = GraphIR::from_tables(tables, relationships);
        debug!(
            layout = %kind,
            tables = ir.len(),
            edges = ir.edges.len(),
            spacing = self.config.spacing,
            "computing layout"
        );
        if ir.is_empty() {
            return PositionMap::new();
        }

        let points = match kind {
            LayoutKind::Grid => grid::layout(&ir, &self.config),
            LayoutKind::Hierarchical => hierarchical::layout(&ir, &self.config),
            LayoutKind::Circular => circular::layout(&ir, &self.config),
            LayoutKind::Modular => modular::layout(&ir, &self.config),
            LayoutKind::Force => force::layout(&ir, &self.config),
        };

        ir.nodes
            .iter()
            .zip(points)
            .map(|(node, position)| (node.id.clone(), position))
            .collect()
    }

    pub fn distribute_evenly(&self, positions: &PositionMap) -> PositionMap {
        distribute_evenly(positions, self.config.spacing)
    }

    pub fn resolve_overlaps(&self, positions: &PositionMap) -> PositionMap {
        resolve_overlaps(positions, self.config.spacing)
    }

    pub fn resolve_overlaps_report(&self, positions: &PositionMap) -> OverlapReport {
        resolve_overlaps_report(positions, self.config.spacing)
    }
}

/// Lay out tables with the default configuration.
pub fn apply_layout(
    kind: LayoutKind,
    tables: &[Table],
    relationships: &[Relationship],
) -> PositionMap {
    LayoutEngine::default().layout(kind, tables, relationships)
}
