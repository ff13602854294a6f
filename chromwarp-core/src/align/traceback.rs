use super::recurrence::{Predecessor, PredecessorGrid};
use crate::error::{WarpError, WarpResult};

/// Monotone correspondence path from `(0, 0)` to the terminal cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarpPath {
    points: Vec<(usize, usize)>,
    diagonal: usize,
    compression: usize,
    expansion: usize,
}

impl WarpPath {
    pub fn points(&self) -> &[(usize, usize)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(usize, usize)> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn diagonal_moves(&self) -> usize {
        self.diagonal
    }

    /// Number of `Up` moves.
    pub fn compression_moves(&self) -> usize {
        self.compression
    }

    /// Number of `Left` moves.
    pub fn expansion_moves(&self) -> usize {
        self.expansion
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.points.binary_search(&(row, col)).is_ok()
    }
}

/// Follows recorded predecessors from `terminal` back to the origin.
pub fn traceback(
    predecessors: &PredecessorGrid,
    terminal: (usize, usize),
) -> WarpResult<WarpPath> {
    let (mut row, mut col) = terminal;
    let mut rev = vec![(row, col)];
    let (mut diagonal, mut compression, mut expansion) = (0usize, 0usize, 0usize);

    loop {
        let pred = predecessors
            .get(row, col)
            .ok_or(WarpError::BrokenTraceback { row, col })?;
        if row == 0 && col == 0 {
            break;
        }
        match pred {
            Predecessor::Diagonal if row > 0 && col > 0 => {
                row -= 1;
                col -= 1;
                diagonal += 1;
            }
            Predecessor::Up if row > 0 => {
                row -= 1;
                compression += 1;
            }
            Predecessor::Left if col > 0 => {
                col -= 1;
                expansion += 1;
            }
            _ => return Err(WarpError::BrokenTraceback { row, col }),
        }
        rev.push((row, col));
    }

    rev.reverse();
    Ok(WarpPath {
        points: rev,
        diagonal,
        compression,
        expansion,
    })
}
