use std::collections::HashSet;
use serde_derive::{Deserialize, Serialize};
use crate::core::{Board, CageDir, Cell, Error, Index, GRID};

/// One pre-filled fact from the puzzle definition: the target total for the
/// cage running `dir`-ward from the boundary cell `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalFact {
    pub at: Index,
    pub dir: CageDir,
    pub total: u8,
}

/// A puzzle definition: the cage totals plus the ordered list of fillable
/// cells. The fill order is fixed for the puzzle's lifetime and doubles as
/// the MRV tie-break order.
///
/// Any cell that is neither fillable nor a totals carrier is a plain
/// boundary marker, so runs always terminate without extra declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PuzzleDef {
    pub totals: Vec<TotalFact>,
    pub fills: Vec<Index>,
}

// Cage totals are sums of distinct digits 1..=9, so 45 is the most any cage
// can ask for.
pub const MAX_TOTAL: u8 = 45;

impl PuzzleDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn across(mut self, at: Index, total: u8) -> Self {
        self.totals.push(TotalFact { at, dir: CageDir::Across, total });
        self
    }

    pub fn down(mut self, at: Index, total: u8) -> Self {
        self.totals.push(TotalFact { at, dir: CageDir::Down, total });
        self
    }

    pub fn fill(mut self, at: Index) -> Self {
        self.fills.push(at);
        self
    }

    pub fn fill_across(mut self, left: Index, len: usize) -> Self {
        for i in 0..len {
            self.fills.push([left[0], left[1] + i]);
        }
        self
    }

    pub fn fill_down(mut self, top: Index, len: usize) -> Self {
        for i in 0..len {
            self.fills.push([top[0] + i, top[1]]);
        }
        self
    }

    pub fn from_json(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s)
            .map_err(|e| Error::new(format!("Invalid puzzle JSON: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::new(format!("Puzzle not serializable: {}", e)))
    }

    /// Materializes the board: boundary markers everywhere, totals merged
    /// into their carriers, fillable cells carved out as empty. All faults
    /// in the totals/fills declarations surface here; geometry faults
    /// surface from the cage map build that follows.
    pub fn build_board(&self) -> Result<Board, Error> {
        let mut board = Board::new();
        for r in 0..GRID {
            for c in 0..GRID {
                board.set([r, c], Cell::Boundary { across: None, down: None });
            }
        }
        let mut declared = HashSet::new();
        for fact in &self.totals {
            if fact.at[0] >= GRID || fact.at[1] >= GRID {
                return Err(Error::new(format!("Total out of bounds: {:?}", fact)));
            }
            if fact.total == 0 || fact.total > MAX_TOTAL {
                return Err(Error::new(format!(
                    "Total out of range: {:?} (1-{})", fact, MAX_TOTAL,
                )));
            }
            if !declared.insert((fact.at, fact.dir)) {
                return Err(Error::new(format!(
                    "Duplicate {} total at {:?}", fact.dir, fact.at,
                )));
            }
            let (mut across, mut down) = match board.get(fact.at) {
                Cell::Boundary { across, down } => (across, down),
                _ => (None, None),
            };
            match fact.dir {
                CageDir::Across => across = Some(fact.total),
                CageDir::Down => down = Some(fact.total),
            }
            board.set(fact.at, Cell::Boundary { across, down });
        }
        for &f in &self.fills {
            if f[0] >= GRID || f[1] >= GRID {
                return Err(Error::new(format!("Fillable cell out of bounds: {:?}", f)));
            }
            if board.get(f).total(CageDir::Across).is_some()
                || board.get(f).total(CageDir::Down).is_some()
            {
                return Err(Error::new(format!(
                    "Fillable cell {:?} collides with a cage total", f,
                )));
            }
            board.set(f, Cell::Empty);
        }
        Ok(board)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn two_by_two() -> PuzzleDef {
        PuzzleDef::new()
            .across([1, 0], 3)
            .across([2, 0], 7)
            .down([0, 1], 4)
            .down([0, 2], 6)
            .fill_across([1, 1], 2)
            .fill_across([2, 1], 2)
    }

    #[test]
    fn test_builder() {
        let def = two_by_two();
        assert_eq!(def.totals.len(), 4);
        assert_eq!(def.fills, vec![[1, 1], [1, 2], [2, 1], [2, 2]]);
        assert_eq!(
            def.totals[0],
            TotalFact { at: [1, 0], dir: CageDir::Across, total: 3 },
        );
    }

    #[test]
    fn test_build_board() {
        let board = two_by_two().build_board().unwrap();
        assert_eq!(board.get([1, 1]), Cell::Empty);
        assert_eq!(board.get([1, 0]).total(CageDir::Across), Some(3));
        assert_eq!(board.get([0, 2]).total(CageDir::Down), Some(6));
        // Undeclared cells are plain boundary markers.
        assert_eq!(board.get([5, 5]), Cell::Boundary { across: None, down: None });
        assert!(board.get([1, 3]).is_boundary());
    }

    #[test]
    fn test_shared_carrier_keeps_both_totals() {
        let board = PuzzleDef::new()
            .across([3, 3], 10)
            .down([3, 3], 12)
            .fill_across([3, 4], 2)
            .fill_down([4, 3], 2)
            .build_board()
            .unwrap();
        assert_eq!(board.get([3, 3]).total(CageDir::Across), Some(10));
        assert_eq!(board.get([3, 3]).total(CageDir::Down), Some(12));
    }

    #[test]
    fn test_total_out_of_range_is_fault() {
        assert!(PuzzleDef::new().across([1, 0], 0).fill([1, 1]).build_board().is_err());
        assert!(PuzzleDef::new().across([1, 0], 46).fill([1, 1]).build_board().is_err());
    }

    #[test]
    fn test_duplicate_total_is_fault() {
        let def = PuzzleDef::new().across([1, 0], 3).across([1, 0], 4);
        assert!(def.build_board().is_err());
    }

    #[test]
    fn test_fill_on_total_carrier_is_fault() {
        let def = PuzzleDef::new().across([1, 0], 3).fill([1, 0]);
        assert!(def.build_board().is_err());
    }

    #[test]
    fn test_out_of_bounds_is_fault() {
        assert!(PuzzleDef::new().across([1, 9], 3).build_board().is_err());
        assert!(PuzzleDef::new().fill([9, 1]).build_board().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let def = two_by_two();
        let json = def.to_json().unwrap();
        assert_eq!(PuzzleDef::from_json(&json).unwrap(), def);
    }

    #[test]
    fn test_json_format() {
        let def = PuzzleDef::from_json(
            r#"{"totals": [{"at": [1, 0], "dir": "across", "total": 3}],
                "fills": [[1, 1], [1, 2]]}"#,
        ).unwrap();
        assert_eq!(def.totals[0].dir, CageDir::Across);
        assert_eq!(def.fills, vec![[1, 1], [1, 2]]);
    }

    #[test]
    fn test_bad_json_is_fault() {
        assert!(PuzzleDef::from_json("{").is_err());
        assert!(PuzzleDef::from_json(r#"{"totals": [], "fills": [[1]]}"#).is_err());
    }
}
