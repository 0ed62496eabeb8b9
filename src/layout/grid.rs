//! Near-square grid with a small parity-keyed offset.

use crate::ir::GraphIR;

use super::types::Position;
use super::LayoutConfig;

/// Tables per grid row are sized for a 4:3 canvas.
const ASPECT: f64 = 0.75;

pub fn layout(ir: &GraphIR, config: &LayoutConfig) -> Vec<Position> {
    let cols = columns(ir.len());
    let spacing = config.spacing;

    (0..ir.len())
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            let jitter_x = if row % 2 == 1 { spacing * 0.1 } else { 0.0 };
            let jitter_y = if col % 2 == 1 { spacing * 0.05 } else { 0.0 };
            Position::new(
                config.padding + col as f64 * spacing + jitter_x,
                config.padding + row as f64 * spacing * 0.8 + jitter_y,
            )
        })
        .collect()
}

fn columns(count: usize) -> usize {
    ((count as f64 / ASPECT).sqrt().ceil() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Table;

    fn ir(n: usize) -> GraphIR {
        let tables: Vec<Table> = (0..n).map(|i| Table::new(format!("t{i}"))).collect();
        GraphIR::from_tables(&tables, &[])
    }

    #[test]
    fn test_columns() {
        assert_eq!(columns(1), 2);
        assert_eq!(columns(3), 2);
        assert_eq!(columns(12), 4);
    }

    #[test]
    fn test_grid_positions() {
        let config = LayoutConfig::default().with_spacing(100.0).with_padding(10.0);
        let points = layout(&ir(3), &config);
        assert_eq!(points[0], Position::new(10.0, 10.0));
        assert_eq!(points[1], Position::new(110.0, 15.0));
        assert_eq!(points[2], Position::new(20.0, 90.0));
    }
}
