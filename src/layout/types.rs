//! Data structures shared by the layout algorithms and the edge router.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canvas coordinates of a table's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Table name -> position. Ordered so output is stable across runs.
pub type PositionMap = BTreeMap<String, Position>;

/// A placed node with its size, used for routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn new(position: Position, (width, height): (f64, f64)) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Side of a table node an edge leaves or enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Left,
    Right,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source_handle: Side,
    pub target_handle: Side,
}

/// A relationship with the sides chosen for its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub connection: Connection,
}
