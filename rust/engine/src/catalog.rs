use crate::board::{BoardGrid, GRID_SIZE};
use crate::errors::CatalogError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Identifier a player uses to pick a board.
pub type BoardId = u32;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    boards: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: BoardId,
    cells: [[u8; GRID_SIZE]; GRID_SIZE],
}

/// The pre-generated board catalog: a read-only `BoardId -> BoardGrid` map.
///
/// Catalog generation is out of scope here; the catalog is loaded once at
/// startup from a JSON file of the shape
/// `{"boards": [{"id": 1, "cells": [[..5 rows of 5 numbers..]]}]}` where `0`
/// marks the free cell. Every grid is validated on load.
#[derive(Debug)]
pub struct BoardCatalog {
    boards: HashMap<BoardId, BoardGrid>,
}

impl BoardCatalog {
    pub fn from_boards(
        boards: impl IntoIterator<Item = (BoardId, BoardGrid)>,
    ) -> Result<Self, CatalogError> {
        let mut map = HashMap::new();
        for (id, grid) in boards {
            if map.insert(id, grid).is_some() {
                return Err(CatalogError::DuplicateBoard(id));
            }
        }
        if map.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { boards: map })
    }

    /// Parses and validates a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut boards = Vec::with_capacity(file.boards.len());
        for entry in file.boards {
            let grid = BoardGrid::from_numbers(entry.cells)
                .map_err(|source| CatalogError::InvalidBoard {
                    id: entry.id,
                    source,
                })?;
            boards.push((entry.id, grid));
        }
        Self::from_boards(boards)
    }

    /// Loads and validates a catalog file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// A small fixed catalog for demos and tests.
    pub fn sample() -> Self {
        let rows: [[[u8; 5]; 5]; 4] = [
            [
                [1, 16, 31, 46, 61],
                [2, 17, 32, 47, 62],
                [3, 18, 0, 48, 63],
                [4, 19, 34, 49, 64],
                [5, 20, 35, 50, 65],
            ],
            [
                [6, 21, 36, 51, 66],
                [7, 22, 37, 52, 67],
                [8, 23, 0, 53, 68],
                [9, 24, 39, 54, 69],
                [10, 25, 40, 55, 70],
            ],
            [
                [11, 26, 41, 56, 71],
                [12, 27, 42, 57, 72],
                [13, 28, 0, 58, 73],
                [14, 29, 44, 59, 74],
                [15, 30, 45, 60, 75],
            ],
            [
                [5, 20, 35, 50, 65],
                [4, 19, 34, 49, 64],
                [3, 18, 0, 48, 63],
                [2, 17, 32, 47, 62],
                [1, 16, 31, 46, 61],
            ],
        ];

        let boards = rows.into_iter().enumerate().map(|(idx, numbers)| {
            let grid = BoardGrid::from_numbers(numbers).expect("sample board is valid");
            (idx as BoardId + 1, grid)
        });
        Self::from_boards(boards).expect("sample catalog is valid")
    }

    pub fn lookup(&self, id: BoardId) -> Option<&BoardGrid> {
        self.boards.get(&id)
    }

    pub fn contains(&self, id: BoardId) -> bool {
        self.boards.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = BoardId> + '_ {
        self.boards.keys().copied()
    }
}
