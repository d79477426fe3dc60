//! Block positions, faces and horizontal directions.

use std::fmt;

/// An integer block cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The position one block away through `face`.
    pub fn side(self, face: Face) -> Self {
        let (dx, dy, dz) = face.delta();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn add(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl From<[i32; 3]> for Pos {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One of the six faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

/// All faces: down, up, north, south, west, east.
pub const FACES: [Face; 6] = [
    Face::Down,
    Face::Up,
    Face::North,
    Face::South,
    Face::West,
    Face::East,
];

/// Horizontal faces only.
pub const HORIZONTAL_FACES: [Face; 4] = [Face::North, Face::South, Face::West, Face::East];

impl Face {
    /// Offset of the neighbouring cell through this face.
    /// North is `-z`, south `+z`, west `-x`, east `+x`.
    pub const fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::Down => (0, -1, 0),
            Face::Up => (0, 1, 0),
            Face::North => (0, 0, -1),
            Face::South => (0, 0, 1),
            Face::West => (-1, 0, 0),
            Face::East => (1, 0, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Face::Down => Face::Up,
            Face::Up => Face::Down,
            Face::North => Face::South,
            Face::South => Face::North,
            Face::West => Face::East,
            Face::East => Face::West,
        }
    }

    pub const fn axis(self) -> Axis {
        match self {
            Face::Down | Face::Up => Axis::Y,
            Face::North | Face::South => Axis::Z,
            Face::West | Face::East => Axis::X,
        }
    }

    /// The horizontal direction of this face, `None` for up and down.
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Face::North => Some(Direction::North),
            Face::South => Some(Direction::South),
            Face::West => Some(Direction::West),
            Face::East => Some(Direction::East),
            Face::Down | Face::Up => None,
        }
    }

    /// Rotate a horizontal face 90° counter-clockwise seen from above.
    /// Vertical faces are returned unchanged.
    pub fn rotate_left(self) -> Self {
        self.direction().map_or(self, |d| d.rotate_left().face())
    }

    /// Rotate a horizontal face 90° clockwise seen from above.
    /// Vertical faces are returned unchanged.
    pub fn rotate_right(self) -> Self {
        self.direction().map_or(self, |d| d.rotate_right().face())
    }
}

/// A horizontal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const fn face(self) -> Face {
        match self {
            Direction::North => Face::North,
            Direction::East => Face::East,
            Direction::South => Face::South,
            Direction::West => Face::West,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub const fn rotate_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub const fn rotate_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }
}
