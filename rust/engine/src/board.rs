use crate::errors::BoardError;

/// Side length of a bingo board.
pub const GRID_SIZE: usize = 5;
/// Highest callable number in the 75-ball game.
pub const MAX_NUMBER: u8 = 75;
/// Numbers each column may hold: column `c` spans `[BAND_WIDTH*c + 1, BAND_WIDTH*(c+1)]`.
pub const BAND_WIDTH: u8 = 15;

/// A single board cell: the free marker or a number in `[1, 75]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Cell {
    Free,
    Number(u8),
}

/// An immutable, validated 5x5 bingo board.
///
/// Construction enforces the structural invariants: exactly one free cell,
/// every number inside its column's band, and no number repeated. Grids are
/// never mutated after construction; the room core only reads them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BoardGrid {
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
}

impl BoardGrid {
    pub fn new(cells: [[Cell; GRID_SIZE]; GRID_SIZE]) -> Result<Self, BoardError> {
        let mut free_count = 0;
        let mut seen = [false; MAX_NUMBER as usize + 1];

        for (row, row_cells) in cells.iter().enumerate() {
            for (col, cell) in row_cells.iter().enumerate() {
                match cell {
                    Cell::Free => free_count += 1,
                    Cell::Number(value) => {
                        let (low, high) = Self::column_band(col);
                        if *value < low || *value > high {
                            return Err(BoardError::OutOfBand {
                                row,
                                col,
                                value: *value,
                                low,
                                high,
                            });
                        }
                        if seen[*value as usize] {
                            return Err(BoardError::DuplicateNumber { value: *value });
                        }
                        seen[*value as usize] = true;
                    }
                }
            }
        }

        if free_count != 1 {
            return Err(BoardError::FreeCellCount { count: free_count });
        }

        Ok(Self { cells })
    }

    /// Builds a grid from plain numbers, with `0` as the free marker. This is
    /// the representation catalog files use.
    pub fn from_numbers(numbers: [[u8; GRID_SIZE]; GRID_SIZE]) -> Result<Self, BoardError> {
        let mut cells = [[Cell::Free; GRID_SIZE]; GRID_SIZE];
        for (row, row_numbers) in numbers.iter().enumerate() {
            for (col, &n) in row_numbers.iter().enumerate() {
                cells[row][col] = if n == 0 { Cell::Free } else { Cell::Number(n) };
            }
        }
        Self::new(cells)
    }

    /// Inclusive number band for a column index.
    pub fn column_band(col: usize) -> (u8, u8) {
        let low = BAND_WIDTH * col as u8 + 1;
        (low, low + BAND_WIDTH - 1)
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn cells(&self) -> &[[Cell; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    pub fn contains(&self, number: u8) -> bool {
        self.cells
            .iter()
            .flatten()
            .any(|cell| matches!(cell, Cell::Number(n) if *n == number))
    }
}
