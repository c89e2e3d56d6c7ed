use crate::core::{Board, Cell, DigitSet, Index, GRID};

pub const BOX: usize = 3;

/// Which 3x3 box an index falls in, numbered row-major.
pub fn box_of(index: Index) -> usize {
    (index[0] / BOX) * BOX + index[1] / BOX
}

/// The final full-board validity check, invoked by the solver exactly once
/// per complete assignment. Cage-sum pruning alone does not rule out
/// repeated digits, so this check is mandatory, not optional.
pub trait WinCheck {
    fn check_win(&self, board: &Board) -> bool;
}

/// Standard sudoku uniqueness: no digit occurs twice in any row, column, or
/// 3x3 box. Boundary and empty cells do not participate, so on a unit with
/// nine fillable cells this is exactly permutation-of-1..9.
#[derive(Debug, Clone, Default)]
pub struct StdWinCheck;

impl WinCheck for StdWinCheck {
    fn check_win(&self, board: &Board) -> bool {
        let mut rows: Vec<DigitSet> = vec![DigitSet::empty(); GRID];
        let mut cols: Vec<DigitSet> = vec![DigitSet::empty(); GRID];
        let mut boxes: Vec<DigitSet> = vec![DigitSet::empty(); GRID];
        for r in 0..GRID {
            for c in 0..GRID {
                let d = match board.get([r, c]) {
                    Cell::Filled(d) => d,
                    _ => continue,
                };
                let b = box_of([r, c]);
                if rows[r].contains(d) || cols[c].contains(d) || boxes[b].contains(d) {
                    return false;
                }
                rows[r].insert(d);
                cols[c].insert(d);
                boxes[b].insert(d);
            }
        }
        true
    }
}
