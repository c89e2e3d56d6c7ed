use crate::cages::{CageMap, SumBounds};
use crate::core::{Attribution, Board, CageDir, Cell, Digit, DigitSet, Error, Index};
use crate::domain::DomainGrid;
use crate::puzzle::PuzzleDef;
use crate::ranker::Ranker;
use crate::sudoku::WinCheck;

pub const NO_CANDIDATES_ATTRIBUTION: &str = "NO_CANDIDATES";
pub const WIN_CHECK_ATTRIBUTION: &str = "WIN_CHECK_FAILED";

pub const PUZZLE_ALREADY_DONE: Error = Error::new_const("Puzzle already done");
pub const UNDO_MISMATCH: Error = Error::new_const("Undo value mismatch");
pub const NOT_FILLABLE: Error = Error::new_const("Not a fillable cell");
pub const ALREADY_FILLED: Error = Error::new_const("Cell already filled");

/// A decision point: one cell and the candidate digits that were feasible
/// when the branch was created. Deeper commits are always undone before a
/// sibling is tried, so the candidate list stays valid for the lifetime of
/// the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchPoint {
    pub cell: Index,
    values: Vec<Digit>,
    cursor: usize,
}

impl BranchPoint {
    pub fn new(cell: Index, values: Vec<Digit>) -> Self {
        if values.is_empty() {
            panic!("Cannot create a BranchPoint for a cell with no values");
        }
        BranchPoint { cell, values, cursor: 0 }
    }

    pub fn chosen(&self) -> Digit {
        self.values[self.cursor]
    }

    pub fn remaining(&self) -> usize {
        self.values.len() - 1 - self.cursor
    }

    pub fn advance(&mut self) -> Option<Digit> {
        if self.cursor < self.values.len() - 1 {
            self.cursor += 1;
            Some(self.chosen())
        } else {
            None
        }
    }
}

/// The state of the DFS solver. At any point in time the solver is either
/// advancing (ready to take a new action), backtracking (undoing actions),
/// solved, or exhausted (no assignment satisfies the puzzle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfsSolverState {
    Advancing,
    Backtracking,
    Solved,
    Exhausted,
}

/// DFS solver over a cage puzzle. Most users should prefer
/// FindFirstSolution; this lower-level API is useful for UIs, tests, and
/// debugging, since it exposes every step of the search.
pub struct DfsSolver<'a, R: Ranker, W: WinCheck> {
    board: Board,
    cages: CageMap,
    domains: DomainGrid,
    fills: Vec<Index>,
    ranker: &'a R,
    win_check: &'a W,
    trail: Vec<(Index, Digit)>,
    stack: Vec<BranchPoint>,
    state: DfsSolverState,
    steps: usize,
    conflict: Option<Attribution>,
    no_candidates_attr: Attribution,
    win_check_attr: Attribution,
}

impl<'a, R: Ranker, W: WinCheck> std::fmt::Debug for DfsSolver<'a, R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "State: {:?} (step {})\n{}", self.state, self.steps, self.board)
    }
}

impl<'a, R: Ranker, W: WinCheck> DfsSolver<'a, R, W> {
    /// Builds the board, resolves the cage geometry, and initializes the
    /// domains. Every configuration fault in the definition is reported
    /// here, before the first step.
    pub fn new(def: &PuzzleDef, ranker: &'a R, win_check: &'a W) -> Result<Self, Error> {
        let board = def.build_board()?;
        let cages = CageMap::build(&board, &def.fills)?;
        let domains = DomainGrid::new(&def.fills);
        Ok(DfsSolver {
            board,
            cages,
            domains,
            fills: def.fills.clone(),
            ranker,
            win_check,
            trail: Vec::new(),
            stack: Vec::new(),
            state: DfsSolverState::Advancing,
            steps: 0,
            conflict: None,
            no_candidates_attr: Attribution::new(NO_CANDIDATES_ATTRIBUTION),
            win_check_attr: Attribution::new(WIN_CHECK_ATTRIBUTION),
        })
    }

    pub fn state(&self) -> DfsSolverState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, DfsSolverState::Solved | DfsSolverState::Exhausted)
    }

    pub fn solved(&self) -> bool {
        self.state == DfsSolverState::Solved
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fills(&self) -> &[Index] {
        &self.fills
    }

    /// The committed assignments in order. On success this is the solution.
    pub fn trail(&self) -> &[(Index, Digit)] {
        &self.trail
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// What sent the solver into its most recent backtrack, if it is
    /// currently unwinding.
    pub fn conflict(&self) -> Option<Attribution> {
        self.conflict
    }

    pub fn domain(&self, index: Index) -> &DigitSet {
        self.domains.get(index)
    }

    /// The digits still worth trying for a fillable cell: its stored domain
    /// filtered through the sum bounds of both cages crossing it. Digits
    /// that cannot keep either cage's target reachable are rejected here,
    /// before any recursion happens. Empty for an already assigned cell.
    pub fn candidates(&self, index: Index) -> Vec<Digit> {
        let cage = self.cages.get(index)
            .unwrap_or_else(|| panic!("candidates() on non-fillable cell {:?}", index));
        if self.board.get(index) != Cell::Empty {
            return vec![];
        }
        let row = SumBounds::scan(&self.board, cage.across, CageDir::Across);
        let col = SumBounds::scan(&self.board, cage.down, CageDir::Down);
        self.domains.get(index).iter()
            .filter(|&v| {
                row.admits(v, cage.across_target) && col.admits(v, cage.down_target)
            })
            .collect()
    }

    fn commit(&mut self, cell: Index, value: Digit) {
        let cage = self.cages.get(cell).unwrap();
        self.board.set(cell, Cell::Filled(value));
        self.trail.push((cell, value));
        self.domains.prune_run(&self.board, cage.across, CageDir::Across, value);
        self.domains.prune_run(&self.board, cage.down, CageDir::Down, value);
    }

    fn uncommit(&mut self, cell: Index, value: Digit) -> Result<(), Error> {
        let cage = self.cages.get(cell).unwrap();
        self.domains.restore_run(&self.board, cage.across, CageDir::Across, value);
        self.domains.restore_run(&self.board, cage.down, CageDir::Down, value);
        match self.trail.pop() {
            Some((i, v)) if i == cell && v == value => {}
            _ => return Err(UNDO_MISMATCH),
        }
        self.board.set(cell, Cell::Empty);
        Ok(())
    }

    /// Overriding any logic the solver has, manually do a move.
    pub fn manual_step(&mut self, index: Index, value: Digit) -> Result<(), Error> {
        if self.is_done() {
            return Err(PUZZLE_ALREADY_DONE);
        }
        if self.cages.get(index).is_none() {
            return Err(NOT_FILLABLE);
        }
        if self.board.get(index) != Cell::Empty {
            return Err(ALREADY_FILLED);
        }
        self.steps += 1;
        self.commit(index, value);
        self.stack.push(BranchPoint::new(index, vec![value]));
        Ok(())
    }

    pub fn step(&mut self) -> Result<(), Error> {
        match self.state {
            DfsSolverState::Solved | DfsSolverState::Exhausted => Err(PUZZLE_ALREADY_DONE),
            DfsSolverState::Advancing => {
                self.steps += 1;
                match self.ranker.select(&self.domains, &self.board, &self.fills) {
                    None => {
                        // Every fillable cell is assigned; the cage bounds
                        // don't rule out repeated digits, so the external
                        // check has the final word.
                        if self.win_check.check_win(&self.board) {
                            self.state = DfsSolverState::Solved;
                        } else {
                            self.conflict = Some(self.win_check_attr);
                            self.state = DfsSolverState::Backtracking;
                        }
                    }
                    Some(cell) => {
                        let values = self.candidates(cell);
                        if values.is_empty() {
                            self.conflict = Some(self.no_candidates_attr);
                            self.state = DfsSolverState::Backtracking;
                        } else {
                            let bp = BranchPoint::new(cell, values);
                            self.commit(cell, bp.chosen());
                            self.stack.push(bp);
                        }
                    }
                }
                Ok(())
            }
            DfsSolverState::Backtracking => {
                self.steps += 1;
                match self.stack.pop() {
                    None => {
                        self.state = DfsSolverState::Exhausted;
                    }
                    Some(mut bp) => {
                        self.uncommit(bp.cell, bp.chosen())?;
                        if let Some(value) = bp.advance() {
                            self.commit(bp.cell, value);
                            self.stack.push(bp);
                            self.state = DfsSolverState::Advancing;
                            self.conflict = None;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Back to the initial (pre-search) configuration: boundaries stay,
    /// every fillable cell empty, every domain full.
    pub fn reset(&mut self) {
        self.board.clear_filled();
        self.domains.reset(&self.fills);
        self.trail.clear();
        self.stack.clear();
        self.state = DfsSolverState::Advancing;
        self.steps = 0;
        self.conflict = None;
    }
}

/// Allows the caller of the solver to inspect the state after each step.
/// This is where timing and logging instrumentation belongs; the solver
/// itself never prints or measures anything.
pub trait StepObserver<R: Ranker, W: WinCheck> {
    fn after_step(&mut self, solver: &DfsSolver<R, W>);
}

/// Find the first solution to the puzzle. Exhaustion is a normal negative
/// outcome (`Ok(None)`), not an error.
pub struct FindFirstSolution<'a, R: Ranker, W: WinCheck> {
    solver: DfsSolver<'a, R, W>,
    observer: Option<&'a mut dyn StepObserver<R, W>>,
}

impl<'a, R: Ranker, W: WinCheck> FindFirstSolution<'a, R, W> {
    pub fn new(
        def: &PuzzleDef,
        ranker: &'a R,
        win_check: &'a W,
        observer: Option<&'a mut dyn StepObserver<R, W>>,
    ) -> Result<Self, Error> {
        Ok(FindFirstSolution {
            solver: DfsSolver::new(def, ranker, win_check)?,
            observer,
        })
    }

    pub fn solver(&self) -> &DfsSolver<'a, R, W> {
        &self.solver
    }

    pub fn step(&mut self) -> Result<(), Error> {
        self.solver.step()?;
        if let Some(observer) = &mut self.observer {
            observer.after_step(&self.solver);
        }
        Ok(())
    }

    pub fn solve(&mut self) -> Result<Option<&DfsSolver<'a, R, W>>, Error> {
        while !self.solver.is_done() {
            self.step()?;
        }
        if self.solver.solved() {
            Ok(Some(&self.solver))
        } else {
            Ok(None)
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;

    /// Asserts the trail/board consistency invariant: every trailed cell is
    /// filled with its trail value, every other fillable cell is empty.
    pub fn assert_trail_consistent<R: Ranker, W: WinCheck>(solver: &DfsSolver<R, W>) {
        for &(i, v) in solver.trail() {
            assert_eq!(
                solver.board().get(i),
                Cell::Filled(v),
                "trailed cell {:?} disagrees with board", i,
            );
        }
        for &f in solver.fills() {
            if !solver.trail().iter().any(|&(i, _)| i == f) {
                assert_eq!(
                    solver.board().get(f),
                    Cell::Empty,
                    "untrailed cell {:?} is not empty", f,
                );
            }
        }
    }
}
