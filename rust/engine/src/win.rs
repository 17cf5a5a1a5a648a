use crate::board::{BoardGrid, Cell, GRID_SIZE};
use serde::{Deserialize, Serialize};

/// One of the twelve payable lines on a board: five rows, five columns and
/// both diagonals.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind {
    Row { index: u8 },
    Column { index: u8 },
    MainDiagonal,
    AntiDiagonal,
}

impl LineKind {
    /// Every payable line, in the order they are checked.
    pub fn all() -> impl Iterator<Item = LineKind> {
        let rows = (0..GRID_SIZE as u8).map(|index| LineKind::Row { index });
        let cols = (0..GRID_SIZE as u8).map(|index| LineKind::Column { index });
        rows.chain(cols)
            .chain([LineKind::MainDiagonal, LineKind::AntiDiagonal])
    }

    /// The `(row, col)` coordinates this line covers.
    pub fn cells(self) -> [(usize, usize); GRID_SIZE] {
        let mut coords = [(0, 0); GRID_SIZE];
        for (i, coord) in coords.iter_mut().enumerate() {
            *coord = match self {
                LineKind::Row { index } => (index as usize, i),
                LineKind::Column { index } => (i, index as usize),
                LineKind::MainDiagonal => (i, i),
                LineKind::AntiDiagonal => (i, GRID_SIZE - 1 - i),
            };
        }
        coords
    }
}

/// A validated winning line: which line completed and the numbers on it,
/// free cell excluded.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WinningLine {
    pub kind: LineKind,
    pub numbers: Vec<u8>,
}

/// The authoritative win check.
///
/// A claim is valid only if some line on the grid is fully covered by the
/// call history and that line contains `last_call`. The second condition
/// ties the win to the call that produced it: a player cannot sit on a
/// completed line and claim it rounds of calls later.
pub fn find_winning_line(
    grid: &BoardGrid,
    call_history: &[u8],
    last_call: u8,
) -> Option<WinningLine> {
    if call_history.is_empty() || !call_history.contains(&last_call) {
        return None;
    }

    for kind in LineKind::all() {
        let mut numbers = Vec::with_capacity(GRID_SIZE);
        let mut complete = true;
        let mut holds_last_call = false;

        for (row, col) in kind.cells() {
            match grid.cell(row, col) {
                Cell::Free => {}
                Cell::Number(n) => {
                    if !call_history.contains(&n) {
                        complete = false;
                        break;
                    }
                    if n == last_call {
                        holds_last_call = true;
                    }
                    numbers.push(n);
                }
            }
        }

        if complete && holds_last_call {
            return Some(WinningLine { kind, numbers });
        }
    }

    None
}
