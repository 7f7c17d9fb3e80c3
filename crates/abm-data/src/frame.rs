//! Grid Frames
//!
//! Per-cell capture of the grid at one tick, for external renderers.

use serde::{Deserialize, Serialize};

use crate::Tick;

/// Row-major per-cell values. `None` marks an empty cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFrame {
    pub tick: Tick,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Option<f64>>,
}

impl GridFrame {
    /// Value of the cell at `(x, y)`, or `None` when out of range or empty.
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.cells.get(idx).copied().flatten()
    }

    /// Iterates rows from `y = 0` upward.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_lookup() {
        let frame = GridFrame {
            tick: 2,
            width: 3,
            height: 2,
            cells: vec![None, Some(1.0), None, Some(2.0), None, Some(0.0)],
        };

        assert_eq!(frame.get(1, 0), Some(1.0));
        assert_eq!(frame.get(0, 1), Some(2.0));
        assert_eq!(frame.get(2, 1), Some(0.0));
        assert_eq!(frame.get(0, 0), None);
        assert_eq!(frame.get(3, 0), None);
        assert_eq!(frame.occupied(), 3);
        assert_eq!(frame.rows().count(), 2);
    }
}
