use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Mutex;
use bit_set::BitSet;
use serde_derive::{Deserialize, Serialize};

/// Error type. This is used to indicate something wrong with the puzzle
/// definition or with the algorithm itself. Cage-sum violations or exhaustion
/// of the search space are not errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Error(Cow<'static, str>);
impl Error {
    pub const fn new_const(s: &'static str) -> Self {
        Error(Cow::Borrowed(s))
    }

    pub fn new<S: Into<String>>(s: S) -> Self {
        Error(Cow::Owned(s.into()))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The board is always a 9x9 grid of cells, indexed by (row, col).
pub const GRID: usize = 9;

pub type Index = [usize; 2];

pub const MIN_DIGIT: u8 = 1;
pub const MAX_DIGIT: u8 = 9;

/// A digit 1..=9, the only values a fillable cell can take on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Digit(u8);

impl Digit {
    pub fn new(value: u8) -> Self {
        assert!(
            (MIN_DIGIT..=MAX_DIGIT).contains(&value),
            "Digit out of bounds: {}", value,
        );
        Digit(value)
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let value = s.parse::<u8>()
            .map_err(|_| Error::new(format!("Invalid digit: {:?}", s)))?;
        if !(MIN_DIGIT..=MAX_DIGIT).contains(&value) {
            return Err(Error::new(format!(
                "Digit out of bounds: {} ({}-{})", value, MIN_DIGIT, MAX_DIGIT,
            )));
        }
        Ok(Digit(value))
    }

    pub fn val(self) -> u8 {
        self.0
    }

    /// Zero-based position for container indexing.
    pub fn ordinal(self) -> usize {
        (self.0 - MIN_DIGIT) as usize
    }

    pub fn from_ordinal(ord: usize) -> Self {
        Self::new(ord as u8 + MIN_DIGIT)
    }

    pub fn all() -> impl Iterator<Item = Digit> {
        (MIN_DIGIT..=MAX_DIGIT).map(Digit)
    }
}

impl Display for Digit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two directions a cage can run in: rightward along a row from its
/// boundary marker, or downward along a column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize,
    strum_macros::Display, strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CageDir {
    Across,
    Down,
}

/// One cell of the board. Boundary cells are not fillable; they terminate the
/// cage scans and carry the target totals for the cages that start at them
/// (either total may be absent if no cage runs in that direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Filled(Digit),
    Boundary { across: Option<u8>, down: Option<u8> },
}

impl Cell {
    pub fn is_boundary(&self) -> bool {
        matches!(self, Cell::Boundary { .. })
    }

    pub fn digit(&self) -> Option<Digit> {
        match self {
            Cell::Filled(d) => Some(*d),
            _ => None,
        }
    }

    pub fn total(&self, dir: CageDir) -> Option<u8> {
        match (self, dir) {
            (Cell::Boundary { across, .. }, CageDir::Across) => *across,
            (Cell::Boundary { down, .. }, CageDir::Down) => *down,
            _ => None,
        }
    }
}

/// The underlying grid structure for a puzzle: a flat arena of cells, fixed
/// at 9x9 for the lifetime of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    cells: Box<[Cell]>,
}

impl Board {
    pub fn new() -> Self {
        Self { cells: vec![Cell::Empty; GRID * GRID].into_boxed_slice() }
    }

    pub fn get(&self, index: Index) -> Cell {
        self.cells[index[0] * GRID + index[1]]
    }

    pub fn set(&mut self, index: Index, cell: Cell) {
        self.cells[index[0] * GRID + index[1]] = cell;
    }

    /// Resets every filled cell to empty, leaving boundaries in place.
    pub fn clear_filled(&mut self) {
        for cell in self.cells.iter_mut() {
            if matches!(cell, Cell::Filled(_)) {
                *cell = Cell::Empty;
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for r in 0..GRID {
            for c in 0..GRID {
                match self.get([r, c]) {
                    Cell::Empty => write!(f, ".")?,
                    Cell::Filled(d) => write!(f, "{}", d)?,
                    Cell::Boundary { .. } => write!(f, "#")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A set of digits (e.g., that are still possible, that have been seen).
/// Represented as a bitset over the digit ordinals, so iteration is always in
/// ascending numeric order.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitSet {
    s: BitSet,
}

impl DigitSet {
    pub fn empty() -> Self {
        Self { s: BitSet::with_capacity(MAX_DIGIT as usize) }
    }

    pub fn full() -> Self {
        let mut set = Self::empty();
        for d in Digit::all() {
            set.insert(d);
        }
        set
    }

    pub fn insert(&mut self, d: Digit) {
        self.s.insert(d.ordinal());
    }

    pub fn remove(&mut self, d: Digit) {
        self.s.remove(d.ordinal());
    }

    pub fn contains(&self, d: Digit) -> bool {
        self.s.contains(d.ordinal())
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    pub fn clear(&mut self) {
        self.s.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Digit> + '_ {
        self.s.iter().map(Digit::from_ordinal)
    }

    /// The raw digit values, ascending. Mostly useful in tests and debug
    /// output.
    pub fn vals(&self) -> Vec<u8> {
        self.iter().map(Digit::val).collect()
    }
}

struct ConstStringRegistry {
    mapping: HashMap<&'static str, usize>,
    next_id: usize,
}

impl ConstStringRegistry {
    fn new() -> Self {
        Self { mapping: HashMap::new(), next_id: 0 }
    }

    fn register(&mut self, name: &'static str) -> usize {
        if let Some(id) = self.mapping.get(name) {
            *id
        } else {
            let id = self.next_id;
            self.mapping.insert(name, id);
            self.next_id += 1;
            id
        }
    }

    fn name(&self, id: usize) -> Option<&'static str> {
        for (name, attr_id) in self.mapping.iter() {
            if *attr_id == id {
                return Some(name);
            }
        }
        None
    }
}

lazy_static::lazy_static! {
    static ref ATTRIBUTION_REGISTRY: Mutex<ConstStringRegistry> = {
        Mutex::new(ConstStringRegistry::new())
    };
}

/// An interned compile-time string naming the cause of a conflict or
/// backtrack. The id is stable for the life of the process, so observers can
/// aggregate counts by id and only resolve names when reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution {
    name: &'static str,
    id: usize,
}

impl Attribution {
    pub fn new(name: &'static str) -> Self {
        let id = ATTRIBUTION_REGISTRY.lock().unwrap().register(name);
        Attribution { name, id }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

// NOTE: This is a linear scan over the registry, so only use it for
// human-interface purposes (e.g., reporting at the end of a solve) and not
// during the solving process.
pub fn readable_attribution(id: usize) -> Option<&'static str> {
    ATTRIBUTION_REGISTRY.lock().unwrap().name(id)
}
