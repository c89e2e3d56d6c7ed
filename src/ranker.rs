use crate::core::{Board, Cell, Index};
use crate::domain::DomainGrid;

/// A ranker finds the "best" unassigned cell to branch on next. Since a cell
/// provides a mutually exclusive and exhaustive set of guesses, one cell per
/// branch point is all the solver needs.
pub trait Ranker {
    /// The next cell to branch on, or `None` once every fillable cell is
    /// assigned. The ranker must not suggest already filled cells.
    fn select(&self, domains: &DomainGrid, board: &Board, fills: &[Index]) -> Option<Index>;
}

/// Most-constrained-variable selection: the unassigned cell with the fewest
/// digits left in its stored domain, ties broken by fill order. This keeps
/// the branching factor low enough to make 81-cell puzzles tractable.
#[derive(Debug, Clone, Default)]
pub struct MrvRanker;

impl Ranker for MrvRanker {
    fn select(&self, domains: &DomainGrid, board: &Board, fills: &[Index]) -> Option<Index> {
        let mut top: Option<(usize, Index)> = None;
        for &cell in fills {
            if board.get(cell) != Cell::Empty {
                continue;
            }
            let size = domains.get(cell).len();
            match top {
                Some((best, _)) if size >= best => {}
                _ => top = Some((size, cell)),
            }
        }
        top.map(|(_, cell)| cell)
    }
}
