use std::collections::HashMap;
use std::time::SystemTime;
use rand::{distr::{Bernoulli, Distribution}, rng, rngs::ThreadRng};
use crate::core::readable_attribution;
use crate::ranker::Ranker;
use crate::solver::{DfsSolver, DfsSolverState, StepObserver};
use crate::sudoku::WinCheck;

pub struct NullObserver;

impl<R: Ranker, W: WinCheck> StepObserver<R, W> for NullObserver {
    fn after_step(&mut self, _solver: &DfsSolver<R, W>) {}
}

enum SampleKind {
    Never,
    AtEnd,
    EveryN(usize),
    Probability(Bernoulli, ThreadRng),
}

/// Decides when a DbgObserver dumps the board mid-solve.
pub struct Sample {
    kind: SampleKind,
}

impl Sample {
    pub fn never() -> Self {
        Sample { kind: SampleKind::Never }
    }

    pub fn at_end() -> Self {
        Sample { kind: SampleKind::AtEnd }
    }

    pub fn every_n(n: usize) -> Self {
        Sample { kind: SampleKind::EveryN(n) }
    }

    pub fn probability(p: f64) -> Self {
        let b = Bernoulli::new(p).expect("probability must be in [0, 1]");
        Sample { kind: SampleKind::Probability(b, rng()) }
    }

    fn fire(&mut self, steps: usize, done: bool) -> bool {
        match &mut self.kind {
            SampleKind::Never => false,
            SampleKind::AtEnd => done,
            SampleKind::EveryN(n) => steps % *n == 0,
            SampleKind::Probability(b, r) => b.sample(r),
        }
    }
}

/// Counts steps, backtrack episodes, and conflict causes, and optionally
/// dumps the board as the solve progresses. This is the caller-side home
/// for all timing and reporting; the solver itself stays silent.
pub struct DbgObserver {
    start: Option<SystemTime>,
    steps: usize,
    backtracks: usize,
    conflicts: HashMap<usize, usize>,
    last_state: Option<DfsSolverState>,
    unwinding: bool,
    print: Sample,
}

impl DbgObserver {
    pub fn new() -> Self {
        DbgObserver {
            start: None,
            steps: 0,
            backtracks: 0,
            conflicts: HashMap::new(),
            last_state: None,
            unwinding: false,
            print: Sample::never(),
        }
    }

    pub fn sample_print(mut self, sample: Sample) -> Self {
        self.print = sample;
        self
    }

    pub fn backtracks(&self) -> usize {
        self.backtracks
    }

    /// Prints the final accounting for a finished (or abandoned) solve.
    pub fn summarize(&self) {
        let outcome = match self.last_state {
            Some(DfsSolverState::Solved) => "solved",
            Some(DfsSolverState::Exhausted) => "exhausted",
            Some(_) => "in progress",
            None => "not started",
        };
        match self.start.map(|s| s.elapsed().unwrap_or_default()) {
            Some(elapsed) => println!(
                "{}: {} steps, {} backtracks in {:?}",
                outcome, self.steps, self.backtracks, elapsed,
            ),
            None => println!("{}: no steps taken", outcome),
        }
        let mut causes: Vec<(usize, usize)> =
            self.conflicts.iter().map(|(id, n)| (*id, *n)).collect();
        causes.sort_by(|a, b| b.1.cmp(&a.1));
        for (id, n) in causes {
            println!("  {}: {}", readable_attribution(id).unwrap_or("???"), n);
        }
    }
}

impl Default for DbgObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Ranker, W: WinCheck> StepObserver<R, W> for DbgObserver {
    fn after_step(&mut self, solver: &DfsSolver<R, W>) {
        if self.start.is_none() {
            self.start = Some(SystemTime::now());
        }
        self.steps += 1;
        self.last_state = Some(solver.state());
        let backtracking = solver.state() == DfsSolverState::Backtracking;
        if backtracking && !self.unwinding {
            self.backtracks += 1;
            if let Some(attr) = solver.conflict() {
                *self.conflicts.entry(attr.id()).or_insert(0) += 1;
            }
        }
        self.unwinding = backtracking;
        if self.print.fire(self.steps, solver.is_done()) {
            println!("step {}:\n{}", solver.steps(), solver.board());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::Attribution;
    use crate::puzzle::PuzzleDef;
    use crate::ranker::MrvRanker;
    use crate::solver::{FindFirstSolution, NO_CANDIDATES_ATTRIBUTION, WIN_CHECK_ATTRIBUTION};
    use crate::sudoku::StdWinCheck;

    #[test]
    fn test_sample_every_n() {
        let mut s = Sample::every_n(3);
        let fired: Vec<bool> = (1..=6).map(|i| s.fire(i, false)).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true]);
        assert!(!Sample::never().fire(100, true));
        assert!(Sample::at_end().fire(100, true));
        assert!(!Sample::at_end().fire(100, false));
    }

    #[test]
    fn test_sample_probability_extremes() {
        let mut always = Sample::probability(1.0);
        let mut never = Sample::probability(0.0);
        for i in 1..=20 {
            assert!(always.fire(i, false));
            assert!(!never.fire(i, false));
        }
    }

    #[test]
    fn test_observer_counts_conflict_causes() {
        // Every completion of this puzzle has a box duplicate, so the solve
        // exhausts: two win-check rejections and one wiped-out domain.
        let def = PuzzleDef::new()
            .across([1, 0], 4)
            .across([2, 0], 8)
            .down([0, 1], 4)
            .down([0, 2], 8)
            .fill_across([1, 1], 2)
            .fill_across([2, 1], 2);
        let ranker = MrvRanker;
        let win = StdWinCheck;
        let mut obs = DbgObserver::new();
        {
            let mut finder =
                FindFirstSolution::new(&def, &ranker, &win, Some(&mut obs)).unwrap();
            assert!(finder.solve().unwrap().is_none());
        }
        assert_eq!(obs.backtracks(), 3);
        assert_eq!(obs.last_state, Some(DfsSolverState::Exhausted));
        let win_id = Attribution::new(WIN_CHECK_ATTRIBUTION).id();
        let wipe_id = Attribution::new(NO_CANDIDATES_ATTRIBUTION).id();
        assert_eq!(obs.conflicts.get(&win_id), Some(&2));
        assert_eq!(obs.conflicts.get(&wipe_id), Some(&1));
    }

    #[test]
    fn test_summarize_smoke() {
        let def = PuzzleDef::new()
            .across([1, 0], 3)
            .down([0, 1], 1)
            .down([0, 2], 2)
            .fill_across([1, 1], 2);
        let ranker = MrvRanker;
        let win = StdWinCheck;
        let mut obs = DbgObserver::new().sample_print(Sample::at_end());
        {
            let mut finder =
                FindFirstSolution::new(&def, &ranker, &win, Some(&mut obs)).unwrap();
            assert!(finder.solve().unwrap().is_some());
        }
        obs.summarize();
    }
}
