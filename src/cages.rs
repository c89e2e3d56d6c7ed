use std::collections::HashSet;
use strum::IntoEnumIterator;
use crate::core::{Board, CageDir, Cell, Digit, Error, Index, GRID};

/// Scans strictly leftward (for across cages) or strictly upward (for down
/// cages) from `index` for the boundary cell that terminates the cage
/// containing it. Returns `None` if the scan falls off the grid, which means
/// the puzzle definition is malformed.
pub fn locate_boundary(board: &Board, index: Index, dir: CageDir) -> Option<Index> {
    let [mut r, mut c] = index;
    loop {
        match dir {
            CageDir::Across => {
                if c == 0 {
                    return None;
                }
                c -= 1;
            }
            CageDir::Down => {
                if r == 0 {
                    return None;
                }
                r -= 1;
            }
        }
        if board.get([r, c]).is_boundary() {
            return Some([r, c]);
        }
    }
}

/// Iterates the cells of a cage run: outward from the boundary cell `from`
/// (rightward for across, downward for down) until the grid edge or another
/// boundary. The boundary itself is not yielded.
pub struct RunIter<'a> {
    board: &'a Board,
    cur: Index,
    dir: CageDir,
}

impl<'a> Iterator for RunIter<'a> {
    type Item = Index;

    fn next(&mut self) -> Option<Index> {
        let [mut r, mut c] = self.cur;
        match self.dir {
            CageDir::Across => c += 1,
            CageDir::Down => r += 1,
        }
        if r >= GRID || c >= GRID || self.board.get([r, c]).is_boundary() {
            return None;
        }
        self.cur = [r, c];
        Some([r, c])
    }
}

pub fn run_cells(board: &Board, from: Index, dir: CageDir) -> RunIter<'_> {
    RunIter { board, cur: from, dir }
}

lazy_static::lazy_static! {
    // Min/max total that k open cells can still contribute to a cage,
    // assuming they take the k smallest/largest distinct digits.
    static ref OPEN_SUM_RANGE: [(u8, u8); GRID + 1] = {
        let mut table = [(0u8, 0u8); GRID + 1];
        for (k, entry) in table.iter_mut().enumerate() {
            let k = k as u8;
            *entry = (k * (k + 1) / 2, 45 - (9 - k) * (10 - k) / 2);
        }
        table
    };
}

/// The committed total and open-cell count of one cage run under the current
/// partial assignment, from which achievable-sum bounds follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumBounds {
    pub filled: u8,
    pub open: u8,
}

impl SumBounds {
    pub fn scan(board: &Board, from: Index, dir: CageDir) -> Self {
        let mut filled = 0;
        let mut open = 0;
        for index in run_cells(board, from, dir) {
            match board.get(index) {
                Cell::Filled(d) => filled += d.val(),
                Cell::Empty => open += 1,
                Cell::Boundary { .. } => {}
            }
        }
        SumBounds { filled, open }
    }

    /// The (min, max) total this cage can still reach. Exact once no open
    /// cells remain.
    pub fn bounds(&self) -> (u8, u8) {
        let (lo, hi) = OPEN_SUM_RANGE[self.open as usize];
        (self.filled + lo, self.filled + hi)
    }

    /// Whether placing `value` into one of this cage's open cells leaves the
    /// target total achievable.
    pub fn admits(&self, value: Digit, target: u8) -> bool {
        debug_assert!(self.open > 0, "admits() on a cage with no open cells");
        let after = SumBounds {
            filled: self.filled + value.val(),
            open: self.open - 1,
        };
        let (lo, hi) = after.bounds();
        lo <= target && target <= hi
    }
}

/// The memoized geometry for one fillable cell: the boundary cells
/// terminating its across and down cages, and their target totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CageRef {
    pub across: Index,
    pub down: Index,
    pub across_target: u8,
    pub down_target: u8,
}

impl CageRef {
    pub fn boundary(&self, dir: CageDir) -> Index {
        match dir {
            CageDir::Across => self.across,
            CageDir::Down => self.down,
        }
    }

    pub fn target(&self, dir: CageDir) -> u8 {
        match dir {
            CageDir::Across => self.across_target,
            CageDir::Down => self.down_target,
        }
    }
}

/// Per-cell cage references, resolved once at setup and immutable thereafter.
/// Building the map performs all geometry validation, so a successful build
/// means every fillable cell is covered by a targeted cage in both
/// directions and every targeted run consists entirely of fillable cells.
#[derive(Debug, Clone)]
pub struct CageMap {
    refs: Box<[Option<CageRef>]>,
}

impl CageMap {
    pub fn build(board: &Board, fills: &[Index]) -> Result<Self, Error> {
        let mut fill_set = HashSet::new();
        for &f in fills {
            if f[0] >= GRID || f[1] >= GRID {
                return Err(Error::new(format!("Fillable cell out of bounds: {:?}", f)));
            }
            if board.get(f) != Cell::Empty {
                return Err(Error::new(format!(
                    "Fillable cell {:?} collides with a boundary marker", f,
                )));
            }
            if !fill_set.insert(f) {
                return Err(Error::new(format!("Duplicate fillable cell: {:?}", f)));
            }
        }

        let mut refs = vec![None; GRID * GRID].into_boxed_slice();
        for &f in fills {
            let mut boundary = [f; 2];
            let mut target = [0u8; 2];
            for (i, dir) in CageDir::iter().enumerate() {
                let b = locate_boundary(board, f, dir).ok_or_else(|| Error::new(format!(
                    "Fillable cell {:?} has no boundary in the {} direction", f, dir,
                )))?;
                target[i] = board.get(b).total(dir).ok_or_else(|| Error::new(format!(
                    "Boundary {:?} carries no {} total but cell {:?} depends on it", b, dir, f,
                )))?;
                boundary[i] = b;
            }
            refs[f[0] * GRID + f[1]] = Some(CageRef {
                across: boundary[0],
                down: boundary[1],
                across_target: target[0],
                down_target: target[1],
            });
        }

        // Every targeted run must be a non-empty row/column of fillable
        // cells; anything else would leave its cage total unenforceable.
        for r in 0..GRID {
            for c in 0..GRID {
                let cell = board.get([r, c]);
                if !cell.is_boundary() {
                    continue;
                }
                for dir in CageDir::iter() {
                    if cell.total(dir).is_none() {
                        continue;
                    }
                    let mut len = 0;
                    for index in run_cells(board, [r, c], dir) {
                        if !fill_set.contains(&index) {
                            return Err(Error::new(format!(
                                "Cell {:?} in the {} cage at {:?} is not fillable",
                                index, dir, [r, c],
                            )));
                        }
                        len += 1;
                    }
                    if len == 0 {
                        return Err(Error::new(format!(
                            "Boundary {:?} has a {} total but no cells in that cage",
                            [r, c], dir,
                        )));
                    }
                }
            }
        }

        Ok(CageMap { refs })
    }

    /// The cage reference for a fillable cell; `None` for any other cell.
    pub fn get(&self, index: Index) -> Option<CageRef> {
        self.refs[index[0] * GRID + index[1]]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn boundary(across: Option<u8>, down: Option<u8>) -> Cell {
        Cell::Boundary { across, down }
    }

    // A 2x2 fillable block at (1..=2, 1..=2) with one cage per row/column.
    fn two_by_two() -> (Board, Vec<Index>) {
        let mut b = Board::new();
        for i in 0..GRID {
            b.set([0, i], boundary(None, None));
            b.set([i, 0], boundary(None, None));
        }
        b.set([1, 0], boundary(Some(3), None));
        b.set([2, 0], boundary(Some(7), None));
        b.set([0, 1], boundary(None, Some(4)));
        b.set([0, 2], boundary(None, Some(6)));
        b.set([1, 3], boundary(None, None));
        b.set([2, 3], boundary(None, None));
        b.set([3, 1], boundary(None, None));
        b.set([3, 2], boundary(None, None));
        (b, vec![[1, 1], [1, 2], [2, 1], [2, 2]])
    }

    #[test]
    fn test_locate_boundary() {
        let (b, _) = two_by_two();
        assert_eq!(locate_boundary(&b, [1, 2], CageDir::Across), Some([1, 0]));
        assert_eq!(locate_boundary(&b, [2, 2], CageDir::Down), Some([0, 2]));
        // A boundary in between shadows the edge one.
        let mut b2 = b.clone();
        b2.set([1, 1], boundary(Some(9), None));
        assert_eq!(locate_boundary(&b2, [1, 2], CageDir::Across), Some([1, 1]));
    }

    #[test]
    fn test_locate_boundary_missing() {
        let b = Board::new();
        assert_eq!(locate_boundary(&b, [0, 5], CageDir::Down), None);
        assert_eq!(locate_boundary(&b, [5, 0], CageDir::Across), None);
        assert_eq!(locate_boundary(&b, [5, 5], CageDir::Across), None);
    }

    #[test]
    fn test_run_cells_stops_at_boundary_and_edge() {
        let (b, _) = two_by_two();
        let across: Vec<Index> = run_cells(&b, [1, 0], CageDir::Across).collect();
        assert_eq!(across, vec![[1, 1], [1, 2]]);
        let down: Vec<Index> = run_cells(&b, [0, 1], CageDir::Down).collect();
        assert_eq!(down, vec![[1, 1], [2, 1]]);
        // Running off the right edge terminates the scan.
        let mut b2 = Board::new();
        b2.set([4, 6], boundary(Some(10), None));
        let tail: Vec<Index> = run_cells(&b2, [4, 6], CageDir::Across).collect();
        assert_eq!(tail, vec![[4, 7], [4, 8]]);
    }

    #[test]
    fn test_sum_bounds_scan() {
        let (mut b, _) = two_by_two();
        let sb = SumBounds::scan(&b, [1, 0], CageDir::Across);
        assert_eq!(sb, SumBounds { filled: 0, open: 2 });
        b.set([1, 1], Cell::Filled(Digit::new(2)));
        let sb = SumBounds::scan(&b, [1, 0], CageDir::Across);
        assert_eq!(sb, SumBounds { filled: 2, open: 1 });
        assert_eq!(sb.bounds(), (3, 11));
    }

    #[test]
    fn test_bounds_exact_when_complete() {
        for filled in 0..=45u8 {
            let sb = SumBounds { filled, open: 0 };
            assert_eq!(sb.bounds(), (filled, filled));
        }
    }

    #[test]
    fn test_bounds_monotonic() {
        for open in 0..=8u8 {
            let mut prev = None;
            for filled in 0..=40u8 {
                let (lo, hi) = SumBounds { filled, open }.bounds();
                assert!(lo <= hi, "lo > hi at filled={} open={}", filled, open);
                if let Some((plo, phi)) = prev {
                    assert!(lo >= plo && hi >= phi);
                }
                prev = Some((lo, hi));
            }
        }
    }

    #[test]
    fn test_admits_single_open_cell_is_exact() {
        let sb = SumBounds { filled: 2, open: 1 };
        assert!(sb.admits(Digit::new(3), 5));
        assert!(!sb.admits(Digit::new(4), 5));
        assert!(!sb.admits(Digit::new(2), 5));
    }

    #[test]
    fn test_admits_rejects_unreachable_target() {
        // Two open cells left after the trial digit: the other can add at
        // most 9, at least 1.
        let sb = SumBounds { filled: 0, open: 3 };
        assert!(sb.admits(Digit::new(1), 4));
        assert!(!sb.admits(Digit::new(1), 2));
        assert!(sb.admits(Digit::new(9), 26));
        assert!(!sb.admits(Digit::new(1), 27));
    }

    #[test]
    fn test_cage_map_build() {
        let (b, fills) = two_by_two();
        let map = CageMap::build(&b, &fills).unwrap();
        let cr = map.get([2, 2]).unwrap();
        assert_eq!(cr.across, [2, 0]);
        assert_eq!(cr.down, [0, 2]);
        assert_eq!(cr.across_target, 7);
        assert_eq!(cr.down_target, 6);
        assert_eq!(map.get([5, 5]), None);
        assert_eq!(map.get([0, 0]), None);
    }

    #[test]
    fn test_cage_map_missing_boundary_is_fault() {
        let b = Board::new();
        assert!(CageMap::build(&b, &[[1, 1]]).is_err());
    }

    #[test]
    fn test_cage_map_missing_total_is_fault() {
        let (mut b, fills) = two_by_two();
        // Drop the across total that row 2 depends on.
        b.set([2, 0], boundary(None, None));
        assert!(CageMap::build(&b, &fills).is_err());
    }

    #[test]
    fn test_cage_map_orphan_run_cell_is_fault() {
        let (b, mut fills) = two_by_two();
        // (2, 2) is inside two targeted runs but no longer fillable.
        fills.pop();
        assert!(CageMap::build(&b, &fills).is_err());
    }

    #[test]
    fn test_cage_map_empty_cage_is_fault() {
        let (mut b, fills) = two_by_two();
        // A total whose run is immediately cut off by another boundary.
        b.set([3, 0], boundary(Some(5), None));
        b.set([3, 1], boundary(None, None));
        assert!(CageMap::build(&b, &fills).is_err());
    }

    #[test]
    fn test_cage_map_duplicate_fill_is_fault() {
        let (b, mut fills) = two_by_two();
        fills.push([1, 1]);
        assert!(CageMap::build(&b, &fills).is_err());
    }

    #[test]
    fn test_cage_map_fill_on_boundary_is_fault() {
        let (b, mut fills) = two_by_two();
        fills.push([0, 1]);
        assert!(CageMap::build(&b, &fills).is_err());
    }
}
