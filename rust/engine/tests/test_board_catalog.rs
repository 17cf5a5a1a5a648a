use bingo_engine::board::{BoardGrid, Cell};
use bingo_engine::catalog::BoardCatalog;
use bingo_engine::errors::{BoardError, CatalogError};

fn valid_numbers() -> [[u8; 5]; 5] {
    [
        [1, 16, 31, 46, 61],
        [2, 17, 32, 47, 62],
        [3, 18, 0, 48, 63],
        [4, 19, 34, 49, 64],
        [5, 20, 35, 50, 65],
    ]
}

#[test]
fn valid_grid_constructs() {
    let grid = BoardGrid::from_numbers(valid_numbers()).expect("valid grid");
    assert_eq!(grid.cell(2, 2), Cell::Free);
    assert_eq!(grid.cell(0, 0), Cell::Number(1));
    assert!(grid.contains(48));
    assert!(!grid.contains(75));
}

#[test]
fn number_outside_column_band_is_rejected() {
    let mut numbers = valid_numbers();
    // Column 0 only accepts 1-15.
    numbers[0][0] = 20;
    let err = BoardGrid::from_numbers(numbers).unwrap_err();
    assert_eq!(
        err,
        BoardError::OutOfBand {
            row: 0,
            col: 0,
            value: 20,
            low: 1,
            high: 15,
        }
    );
}

#[test]
fn duplicate_number_is_rejected() {
    let mut numbers = valid_numbers();
    numbers[1][0] = 1;
    let err = BoardGrid::from_numbers(numbers).unwrap_err();
    assert_eq!(err, BoardError::DuplicateNumber { value: 1 });
}

#[test]
fn wrong_free_cell_count_is_rejected() {
    let mut numbers = valid_numbers();
    numbers[0][0] = 0;
    let err = BoardGrid::from_numbers(numbers).unwrap_err();
    assert_eq!(err, BoardError::FreeCellCount { count: 2 });

    let mut numbers = valid_numbers();
    numbers[2][2] = 38;
    let err = BoardGrid::from_numbers(numbers).unwrap_err();
    assert_eq!(err, BoardError::FreeCellCount { count: 0 });
}

#[test]
fn column_bands_are_fifteen_wide() {
    assert_eq!(BoardGrid::column_band(0), (1, 15));
    assert_eq!(BoardGrid::column_band(2), (31, 45));
    assert_eq!(BoardGrid::column_band(4), (61, 75));
}

#[test]
fn catalog_parses_valid_json() {
    let json = r#"{
        "boards": [
            {"id": 7, "cells": [
                [1, 16, 31, 46, 61],
                [2, 17, 32, 47, 62],
                [3, 18, 0, 48, 63],
                [4, 19, 34, 49, 64],
                [5, 20, 35, 50, 65]
            ]}
        ]
    }"#;
    let catalog = BoardCatalog::from_json(json).expect("catalog parses");
    assert_eq!(catalog.len(), 1);
    assert!(catalog.contains(7));
    assert!(catalog.lookup(7).unwrap().contains(48));
    assert!(!catalog.contains(8));
}

#[test]
fn catalog_rejects_invalid_board_with_id_context() {
    let json = r#"{
        "boards": [
            {"id": 3, "cells": [
                [20, 16, 31, 46, 61],
                [2, 17, 32, 47, 62],
                [3, 18, 0, 48, 63],
                [4, 19, 34, 49, 64],
                [5, 20, 35, 50, 65]
            ]}
        ]
    }"#;
    match BoardCatalog::from_json(json) {
        Err(CatalogError::InvalidBoard { id: 3, .. }) => {}
        other => panic!("expected InvalidBoard for id 3, got {:?}", other),
    }
}

#[test]
fn catalog_rejects_duplicate_ids() {
    let grid = BoardGrid::from_numbers(valid_numbers()).unwrap();
    let result = BoardCatalog::from_boards([(1, grid.clone()), (1, grid)]);
    match result {
        Err(CatalogError::DuplicateBoard(1)) => {}
        other => panic!("expected DuplicateBoard, got {:?}", other),
    }
}

#[test]
fn catalog_rejects_empty_board_list() {
    match BoardCatalog::from_json(r#"{"boards": []}"#) {
        Err(CatalogError::Empty) => {}
        other => panic!("expected Empty, got {:?}", other),
    }
}

#[test]
fn catalog_rejects_malformed_json() {
    assert!(matches!(
        BoardCatalog::from_json("{not json"),
        Err(CatalogError::Parse(_))
    ));
}

#[test]
fn sample_catalog_is_usable() {
    let catalog = BoardCatalog::sample();
    assert!(!catalog.is_empty());
    for id in catalog.ids() {
        assert!(catalog.lookup(id).is_some());
    }
}
