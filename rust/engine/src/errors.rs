use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell at row {row}, column {col} holds {value}, outside column band {low}-{high}")]
    OutOfBand {
        row: usize,
        col: usize,
        value: u8,
        low: u8,
        high: u8,
    },
    #[error("expected exactly one free cell, found {count}")]
    FreeCellCount { count: usize },
    #[error("number {value} appears more than once on the board")]
    DuplicateNumber { value: u8 },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read board catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse board catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("board {id} is invalid: {source}")]
    InvalidBoard { id: u32, source: BoardError },
    #[error("board {0} is defined more than once")]
    DuplicateBoard(u32),
    #[error("board catalog is empty")]
    Empty,
}
