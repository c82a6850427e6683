use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Position;

/// Terrain classification of a single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Open floor.
    Empty,
    /// Impassable for every entity.
    Wall,
    /// Where the player enters the maze and returns on reset.
    Start,
    /// Reaching this cell wins the round.
    End,
    /// Hurts the player each time they step onto it.
    Hazard,
    /// Open floor where a spider starts its patrol.
    SpiderSpawn,
    /// Open floor where a fly starts its patrol.
    FlySpawn,
}

impl CellKind {
    /// Reports whether entities may occupy the cell.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

/// Errors raised while building or querying a [`Grid`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The queried position lies beyond the grid extents.
    #[error("position {position} lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Position that was queried.
        position: Position,
        /// Number of columns in the grid.
        width: u32,
        /// Number of rows in the grid.
        height: u32,
    },
    /// The grid would contain no cells.
    #[error("grid must contain at least one row and one column")]
    Empty,
    /// A row does not match the width of the first row.
    #[error("row {row} has {actual} cells but {expected} were expected")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// The flat cell buffer does not match the declared dimensions.
    #[error("a {width}x{height} grid needs {expected} cells but {actual} were supplied")]
    SizeMismatch {
        /// Declared number of columns.
        width: u32,
        /// Declared number of rows.
        height: u32,
        /// Cells required by the dimensions.
        expected: usize,
        /// Cells actually supplied.
        actual: usize,
    },
    /// A dimension does not fit the coordinate type.
    #[error("grid dimension {0} exceeds the supported range")]
    TooLarge(usize),
}

/// Immutable map of cell kinds laid out row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates a grid from a flat row-major buffer.
    pub fn new(width: u32, height: u32, cells: Vec<CellKind>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }

        let expected = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| GridError::TooLarge(usize::MAX))?;
        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                width,
                height,
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Creates a grid from individual rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != expected)
        {
            return Err(GridError::Ragged {
                row,
                expected,
                actual: cells.len(),
            });
        }

        let width = u32::try_from(expected).map_err(|_| GridError::TooLarge(expected))?;
        let height = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge(rows.len()))?;
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    /// Creates a grid where every cell has the same kind.
    pub fn filled(width: u32, height: u32, kind: CellKind) -> Result<Self, GridError> {
        let count = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| GridError::TooLarge(usize::MAX))?;
        Self::new(width, height, vec![kind; count])
    }

    /// Returns the grid with one cell replaced. Intended for building maps
    /// before the grid is shared.
    pub fn with_cell(mut self, position: Position, kind: CellKind) -> Result<Self, GridError> {
        let index = self.index(position).ok_or(self.out_of_bounds(position))?;
        self.cells[index] = kind;
        Ok(self)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether `position` lies within the grid extents.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x() < self.width && position.y() < self.height
    }

    /// Kind of the cell at `position`.
    pub fn cell_at(&self, position: Position) -> Result<CellKind, GridError> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(self.out_of_bounds(position))
    }

    /// Every position holding `kind`, in row-major order.
    #[must_use]
    pub fn positions_of(&self, kind: CellKind) -> Vec<Position> {
        self.iter()
            .filter(|(_, cell)| *cell == kind)
            .map(|(position, _)| position)
            .collect()
    }

    /// Iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellKind]> {
        let width = usize::try_from(self.width).unwrap_or(usize::MAX);
        self.cells.chunks(width)
    }

    /// Iterator over every cell together with its position, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Position, CellKind)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(index, cell)| {
            let index = u32::try_from(index).ok()?;
            Some((Position::new(index % width, index / width), *cell))
        })
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let row = usize::try_from(position.y()).ok()?;
        let column = usize::try_from(position.x()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    const fn out_of_bounds(&self, position: Position) -> GridError {
        GridError::OutOfBounds {
            position,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_at_reports_out_of_bounds() {
        let grid = Grid::filled(3, 2, CellKind::Empty).expect("valid grid");

        assert_eq!(grid.cell_at(Position::new(2, 1)), Ok(CellKind::Empty));
        assert_eq!(
            grid.cell_at(Position::new(3, 0)),
            Err(GridError::OutOfBounds {
                position: Position::new(3, 0),
                width: 3,
                height: 2,
            })
        );
        assert!(grid.cell_at(Position::new(0, 2)).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let error = Grid::from_rows(vec![
            vec![CellKind::Empty, CellKind::Wall],
            vec![CellKind::Empty],
        ])
        .expect_err("ragged rows must be rejected");

        assert_eq!(
            error,
            GridError::Ragged {
                row: 1,
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn from_rows_rejects_empty_input() {
        assert_eq!(Grid::from_rows(Vec::new()), Err(GridError::Empty));
        assert_eq!(Grid::from_rows(vec![Vec::new()]), Err(GridError::Empty));
    }

    #[test]
    fn new_rejects_mismatched_buffer() {
        let error = Grid::new(2, 2, vec![CellKind::Empty; 3]).expect_err("size mismatch");
        assert!(matches!(
            error,
            GridError::SizeMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn positions_of_lists_cells_row_major() {
        let grid = Grid::filled(3, 3, CellKind::Empty)
            .and_then(|grid| grid.with_cell(Position::new(2, 0), CellKind::FlySpawn))
            .and_then(|grid| grid.with_cell(Position::new(0, 2), CellKind::FlySpawn))
            .and_then(|grid| grid.with_cell(Position::new(1, 1), CellKind::FlySpawn))
            .expect("valid grid");

        assert_eq!(
            grid.positions_of(CellKind::FlySpawn),
            vec![
                Position::new(2, 0),
                Position::new(1, 1),
                Position::new(0, 2)
            ]
        );
    }

    #[test]
    fn rows_follow_declared_width() {
        let grid = Grid::filled(4, 3, CellKind::Wall).expect("valid grid");
        let rows: Vec<&[CellKind]> = grid.rows().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn only_walls_block_movement() {
        assert!(!CellKind::Wall.is_passable());
        for kind in [
            CellKind::Empty,
            CellKind::Start,
            CellKind::End,
            CellKind::Hazard,
            CellKind::SpiderSpawn,
            CellKind::FlySpawn,
        ] {
            assert!(kind.is_passable(), "{kind:?} should be passable");
        }
    }
}
