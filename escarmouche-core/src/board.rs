//! Square board geometry on a fixed 8x8 grid

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board side length
pub const BOARD_SIZE: i8 = 8;

/// Number of cells on the board
pub const CELL_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Grid coordinates, origin in the top-left corner
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Check if this position is on the board
    pub fn is_valid(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.x) && (0..BOARD_SIZE).contains(&self.y)
    }

    /// Row-major cell index. Only meaningful for valid positions.
    pub fn index(&self) -> usize {
        self.y as usize * BOARD_SIZE as usize + self.x as usize
    }

    /// Inverse of [`Position::index`]
    pub fn from_index(index: usize) -> Self {
        let size = BOARD_SIZE as usize;
        Self::new((index % size) as i8, (index / size) as i8)
    }

    /// Squared Euclidean distance, exact in integers
    pub fn distance_squared(&self, other: Position) -> i32 {
        let dx = (self.x - other.x) as i32;
        let dy = (self.y - other.y) as i32;
        dx * dx + dy * dy
    }

    /// Euclidean distance between two cells
    pub fn distance_to(&self, other: Position) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// True if `other` lies within Euclidean distance `reach`
    pub fn within_reach(&self, other: Position, reach: i32) -> bool {
        let reach = i64::from(reach);
        reach >= 0 && i64::from(self.distance_squared(other)) <= reach * reach
    }

    /// Get neighbor in direction (0-7)
    pub fn neighbor(&self, direction: usize) -> Position {
        let (dx, dy) = DIRECTIONS[direction % 8];
        Position::new(self.x + dx, self.y + dy)
    }

    /// Iterate over every cell of the board in row-major order
    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELL_COUNT).map(Position::from_index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected \"x,y\", got {s:?}"))?;
        let x = x.trim().parse::<i8>().map_err(|e| format!("bad x in {s:?}: {e}"))?;
        let y = y.trim().parse::<i8>().map_err(|e| format!("bad y in {s:?}: {e}"))?;
        Ok(Position::new(x, y))
    }
}

/// Direction vectors (dx, dy)
/// Index: 0=N, 1=NE, 2=E, 3=SE, 4=S, 5=SW, 6=W, 7=NW
pub const DIRECTIONS: [(i8, i8); 8] = [
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];

/// Cells strictly between `a` and `b` on the rasterized segment joining them.
///
/// The segment is always drawn from the smaller endpoint, so the result is
/// the same set of cells whichever way round the endpoints are given.
pub fn cells_between(a: Position, b: Position) -> Vec<Position> {
    let (from, to) = if a <= b { (a, b) } else { (b, a) };

    let dx = (to.x - from.x).abs() as i32;
    let dy = -((to.y - from.y).abs() as i32);
    let sx: i8 = if from.x < to.x { 1 } else { -1 };
    let sy: i8 = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::new();
    let mut current = from;
    while current != to {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            current.x += sx;
        }
        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
        if current != to {
            cells.push(current);
        }
    }
    cells
}
