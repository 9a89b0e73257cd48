use serde::{Deserialize, Serialize};

/// Heading of a moving token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    // Up -> Right -> Down -> Left -> Up
    pub fn clockwise(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    // Up -> Left -> Down -> Right -> Up
    pub fn counter_clockwise(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Applies `clockwise` `turns` times.
    pub fn clockwise_by(self, turns: usize) -> Self {
        (0..turns % 4).fold(self, |d, _| d.clockwise())
    }

    /// (dcol, drow) of one step; rows grow downwards.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Index 0..4 in the Up, Right, Down, Left order shared by files and urls.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Direction::ALL.get(index as usize).copied()
    }
}

/// Flat state of a cell. The discriminants are the codes written to board files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
    Merged = 4,
    Dead = 5,
    Wall = 6,
    SoundWall = 7,
    RotateClockwise = 8,
    RotateCounterClockwise = 9,
}

impl CellState {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        let state = match code {
            0 => CellState::Up,
            1 => CellState::Right,
            2 => CellState::Down,
            3 => CellState::Left,
            4 => CellState::Merged,
            5 => CellState::Dead,
            6 => CellState::Wall,
            7 => CellState::SoundWall,
            8 => CellState::RotateClockwise,
            9 => CellState::RotateCounterClockwise,
            _ => return None,
        };
        Some(state)
    }
}

/// States a cell palette may offer, in display order.
pub const PALETTE_STATES: [CellState; 9] = [
    CellState::Dead,
    CellState::Up,
    CellState::Right,
    CellState::Down,
    CellState::Left,
    CellState::Wall,
    CellState::SoundWall,
    CellState::RotateClockwise,
    CellState::RotateCounterClockwise,
];

/// One board cell. Fixtures never move; tokens move every tick and merge when
/// they land on the same cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Dead,
    Wall,
    SoundWall,
    RotateClockwise,
    RotateCounterClockwise,
    Token(Direction),
    // insertion order kept, duplicates allowed
    Merged(Vec<Direction>),
}

impl Cell {
    pub fn state(&self) -> CellState {
        match self {
            Cell::Dead => CellState::Dead,
            Cell::Wall => CellState::Wall,
            Cell::SoundWall => CellState::SoundWall,
            Cell::RotateClockwise => CellState::RotateClockwise,
            Cell::RotateCounterClockwise => CellState::RotateCounterClockwise,
            Cell::Token(d) => match d {
                Direction::Up => CellState::Up,
                Direction::Right => CellState::Right,
                Direction::Down => CellState::Down,
                Direction::Left => CellState::Left,
            },
            Cell::Merged(_) => CellState::Merged,
        }
    }

    /// Builds a cell from a flat state. `Merged` has no payload here, so it yields `None`.
    pub fn from_state(state: CellState) -> Option<Self> {
        let cell = match state {
            CellState::Up => Cell::Token(Direction::Up),
            CellState::Right => Cell::Token(Direction::Right),
            CellState::Down => Cell::Token(Direction::Down),
            CellState::Left => Cell::Token(Direction::Left),
            CellState::Merged => return None,
            CellState::Dead => Cell::Dead,
            CellState::Wall => Cell::Wall,
            CellState::SoundWall => Cell::SoundWall,
            CellState::RotateClockwise => Cell::RotateClockwise,
            CellState::RotateCounterClockwise => Cell::RotateCounterClockwise,
        };
        Some(cell)
    }

    /// Directions carried by the cell: itself for a token, the members of a merge.
    /// Dead cells and fixtures carry none, so summing the lengths over a board
    /// counts its tokens.
    pub fn merged_states(&self) -> &[Direction] {
        match self {
            Cell::Token(d) => std::slice::from_ref(d),
            Cell::Merged(ds) => ds,
            _ => &[],
        }
    }

    /// A merge must hold at least one token; an empty one has no file encoding.
    pub fn is_empty_merge(&self) -> bool {
        matches!(self, Cell::Merged(ds) if ds.is_empty())
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Cell::Dead)
    }

    /// Wall or SoundWall; tokens bounce off these.
    pub fn is_wall(&self) -> bool {
        matches!(self, Cell::Wall | Cell::SoundWall)
    }

    /// Any fixture a token can't be pushed into.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            Cell::Wall | Cell::SoundWall | Cell::RotateClockwise | Cell::RotateCounterClockwise
        )
    }

    /// True for a single token heading `dir`, or a merge holding `dir` rotated once
    /// clockwise (the merge pass already turned the stored members).
    pub fn is_heading(&self, dir: Direction) -> bool {
        match self {
            Cell::Token(d) => *d == dir,
            Cell::Merged(ds) => ds.contains(&dir.clockwise()),
            _ => false,
        }
    }

    /// Writes a token heading `dir` into this (next-tick) cell, merging with whatever
    /// already landed here this tick.
    pub(crate) fn absorb(&mut self, dir: Direction) {
        match self {
            Cell::Dead => *self = Cell::Token(dir),
            Cell::Token(prev) => {
                let prev = *prev;
                *self = Cell::Merged(vec![prev, dir]);
            }
            Cell::Merged(ds) => ds.push(dir),
            // destinations are always checked against fixtures first
            fixture => unreachable!("token {dir:?} written onto fixture {fixture:?}"),
        }
    }
}
