//! Road tile classification from 8-directional adjacency.
//!
//! North is -Z and east is +X, matching [`Rotation::Clockwise90`] turning
//! north into east.

use serde::{Deserialize, Serialize};

use crate::math::Rotation;

/// One of the eight compass neighbours
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    N,
    E,
    S,
    W,
    NE,
    SE,
    SW,
    NW,
}

impl Direction {
    /// Probe order: cardinals clockwise from north, then diagonals
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::E,
        Direction::S,
        Direction::W,
        Direction::NE,
        Direction::SE,
        Direction::SW,
        Direction::NW,
    ];
    pub const CARDINALS: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];
    pub const DIAGONALS: [Direction; 4] = [Direction::NE, Direction::SE, Direction::SW, Direction::NW];

    /// Unit step as `(dx, dz)`
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::E => (1, 0),
            Direction::S => (0, 1),
            Direction::W => (-1, 0),
            Direction::NE => (1, -1),
            Direction::SE => (1, 1),
            Direction::SW => (-1, 1),
            Direction::NW => (-1, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::E => Direction::W,
            Direction::S => Direction::N,
            Direction::W => Direction::E,
            Direction::NE => Direction::SW,
            Direction::SE => Direction::NW,
            Direction::SW => Direction::NE,
            Direction::NW => Direction::SE,
        }
    }

    pub fn is_cardinal(self) -> bool {
        matches!(self, Direction::N | Direction::E | Direction::S | Direction::W)
    }

    /// The cardinal at or counter-clockwise before this direction
    pub fn preceding_cardinal(self) -> Direction {
        match self {
            Direction::N | Direction::NE => Direction::N,
            Direction::E | Direction::SE => Direction::E,
            Direction::S | Direction::SW => Direction::S,
            Direction::W | Direction::NW => Direction::W,
        }
    }

    /// Rotation that turns a north-facing piece to face this cardinal
    pub fn facing_rotation(self) -> Rotation {
        match self.preceding_cardinal() {
            Direction::E => Rotation::Clockwise90,
            Direction::S => Rotation::Clockwise180,
            Direction::W => Rotation::CounterClockwise90,
            _ => Rotation::None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of neighbour directions, one bit each
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    pub fn with(mut self, dir: Direction) -> Self {
        self.insert(dir);
        self
    }

    pub fn contains(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Neighbours of `(x, z)` for which `is_road` holds
    pub fn around(x: i32, z: i32, is_road: impl Fn(i32, i32) -> bool) -> Self {
        let mut set = Self::EMPTY;
        for dir in Direction::ALL {
            let (dx, dz) = dir.offset();
            if is_road(x + dx, z + dz) {
                set.insert(dir);
            }
        }
        set
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

/// Shape of a road tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    StraightNS,
    StraightEW,
    CornerNE,
    CornerSE,
    CornerSW,
    CornerNW,
    DiagonalCornerNE,
    DiagonalCornerSE,
    DiagonalCornerSW,
    DiagonalCornerNW,
    TJunctionN,
    TJunctionE,
    TJunctionS,
    TJunctionW,
    TJunctionNE,
    TJunctionSE,
    TJunctionSW,
    TJunctionNW,
    Cross,
    CrossDiagonal,
    DeadEndN,
    DeadEndE,
    DeadEndS,
    DeadEndW,
    DeadEndNE,
    DeadEndSE,
    DeadEndSW,
    DeadEndNW,
    Plaza,
}

impl RoadType {
    pub const ALL: [RoadType; 29] = [
        RoadType::StraightNS,
        RoadType::StraightEW,
        RoadType::CornerNE,
        RoadType::CornerSE,
        RoadType::CornerSW,
        RoadType::CornerNW,
        RoadType::DiagonalCornerNE,
        RoadType::DiagonalCornerSE,
        RoadType::DiagonalCornerSW,
        RoadType::DiagonalCornerNW,
        RoadType::TJunctionN,
        RoadType::TJunctionE,
        RoadType::TJunctionS,
        RoadType::TJunctionW,
        RoadType::TJunctionNE,
        RoadType::TJunctionSE,
        RoadType::TJunctionSW,
        RoadType::TJunctionNW,
        RoadType::Cross,
        RoadType::CrossDiagonal,
        RoadType::DeadEndN,
        RoadType::DeadEndE,
        RoadType::DeadEndS,
        RoadType::DeadEndW,
        RoadType::DeadEndNE,
        RoadType::DeadEndSE,
        RoadType::DeadEndSW,
        RoadType::DeadEndNW,
        RoadType::Plaza,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoadType::StraightNS => "straight_ns",
            RoadType::StraightEW => "straight_ew",
            RoadType::CornerNE => "corner_ne",
            RoadType::CornerSE => "corner_se",
            RoadType::CornerSW => "corner_sw",
            RoadType::CornerNW => "corner_nw",
            RoadType::DiagonalCornerNE => "diagonal_corner_ne",
            RoadType::DiagonalCornerSE => "diagonal_corner_se",
            RoadType::DiagonalCornerSW => "diagonal_corner_sw",
            RoadType::DiagonalCornerNW => "diagonal_corner_nw",
            RoadType::TJunctionN => "t_junction_n",
            RoadType::TJunctionE => "t_junction_e",
            RoadType::TJunctionS => "t_junction_s",
            RoadType::TJunctionW => "t_junction_w",
            RoadType::TJunctionNE => "t_junction_ne",
            RoadType::TJunctionSE => "t_junction_se",
            RoadType::TJunctionSW => "t_junction_sw",
            RoadType::TJunctionNW => "t_junction_nw",
            RoadType::Cross => "cross",
            RoadType::CrossDiagonal => "cross_diagonal",
            RoadType::DeadEndN => "dead_end_n",
            RoadType::DeadEndE => "dead_end_e",
            RoadType::DeadEndS => "dead_end_s",
            RoadType::DeadEndW => "dead_end_w",
            RoadType::DeadEndNE => "dead_end_ne",
            RoadType::DeadEndSE => "dead_end_se",
            RoadType::DeadEndSW => "dead_end_sw",
            RoadType::DeadEndNW => "dead_end_nw",
            RoadType::Plaza => "plaza",
        }
    }

    /// Piece family used when no exact piece exists
    pub fn family(self) -> &'static str {
        match self {
            RoadType::StraightNS | RoadType::StraightEW => "straight",
            RoadType::CornerNE | RoadType::CornerSE | RoadType::CornerSW | RoadType::CornerNW => "corner",
            RoadType::DiagonalCornerNE
            | RoadType::DiagonalCornerSE
            | RoadType::DiagonalCornerSW
            | RoadType::DiagonalCornerNW => "corner",
            RoadType::TJunctionN
            | RoadType::TJunctionE
            | RoadType::TJunctionS
            | RoadType::TJunctionW
            | RoadType::TJunctionNE
            | RoadType::TJunctionSE
            | RoadType::TJunctionSW
            | RoadType::TJunctionNW => "t_junction",
            RoadType::Cross | RoadType::CrossDiagonal | RoadType::Plaza => "cross",
            RoadType::DeadEndN
            | RoadType::DeadEndE
            | RoadType::DeadEndS
            | RoadType::DeadEndW
            | RoadType::DeadEndNE
            | RoadType::DeadEndSE
            | RoadType::DeadEndSW
            | RoadType::DeadEndNW => "dead_end",
        }
    }

    /// Template ids to try for this tile, most specific first
    pub fn piece_candidates(self) -> [String; 3] {
        [format!("road/{}", self.as_str()), format!("road/{}", self.family()), "road/straight".to_string()]
    }

    pub fn is_cross(self) -> bool {
        matches!(self, RoadType::Cross | RoadType::CrossDiagonal)
    }

    pub fn is_straight(self) -> bool {
        matches!(self, RoadType::StraightNS | RoadType::StraightEW)
    }

    /// The single connection of a dead end
    pub fn dead_end_direction(self) -> Option<Direction> {
        match self {
            RoadType::DeadEndN => Some(Direction::N),
            RoadType::DeadEndE => Some(Direction::E),
            RoadType::DeadEndS => Some(Direction::S),
            RoadType::DeadEndW => Some(Direction::W),
            RoadType::DeadEndNE => Some(Direction::NE),
            RoadType::DeadEndSE => Some(Direction::SE),
            RoadType::DeadEndSW => Some(Direction::SW),
            RoadType::DeadEndNW => Some(Direction::NW),
            _ => None,
        }
    }

    /// Placement rotation of the canonical north-facing piece
    pub fn rotation(self) -> Rotation {
        use RoadType::*;
        match self {
            StraightNS | CornerNE | DiagonalCornerNE | TJunctionN | DeadEndN => Rotation::None,
            StraightEW | CornerSE | DiagonalCornerSE | TJunctionE | DeadEndE => Rotation::Clockwise90,
            CornerSW | DiagonalCornerSW | TJunctionS | DeadEndS => Rotation::Clockwise180,
            CornerNW | DiagonalCornerNW | TJunctionW | DeadEndW => Rotation::CounterClockwise90,
            _ => Rotation::None,
        }
    }

    fn t_junction(arm: Direction) -> RoadType {
        match arm {
            Direction::N => RoadType::TJunctionN,
            Direction::E => RoadType::TJunctionE,
            Direction::S => RoadType::TJunctionS,
            Direction::W => RoadType::TJunctionW,
            Direction::NE => RoadType::TJunctionNE,
            Direction::SE => RoadType::TJunctionSE,
            Direction::SW => RoadType::TJunctionSW,
            Direction::NW => RoadType::TJunctionNW,
        }
    }

    fn dead_end(dir: Direction) -> RoadType {
        match dir {
            Direction::N => RoadType::DeadEndN,
            Direction::E => RoadType::DeadEndE,
            Direction::S => RoadType::DeadEndS,
            Direction::W => RoadType::DeadEndW,
            Direction::NE => RoadType::DeadEndNE,
            Direction::SE => RoadType::DeadEndSE,
            Direction::SW => RoadType::DeadEndSW,
            Direction::NW => RoadType::DeadEndNW,
        }
    }

    /// Corner between two adjacent cardinals, diagonal when the inner diagonal is road
    fn corner(a: Direction, b: Direction, inner_filled: bool) -> RoadType {
        let pair = |x: Direction, y: Direction| (a == x && b == y) || (a == y && b == x);
        match (pair(Direction::N, Direction::E), pair(Direction::E, Direction::S), pair(Direction::S, Direction::W)) {
            (true, _, _) if inner_filled => RoadType::DiagonalCornerNE,
            (true, _, _) => RoadType::CornerNE,
            (_, true, _) if inner_filled => RoadType::DiagonalCornerSE,
            (_, true, _) => RoadType::CornerSE,
            (_, _, true) if inner_filled => RoadType::DiagonalCornerSW,
            (_, _, true) => RoadType::CornerSW,
            _ if inner_filled => RoadType::DiagonalCornerNW,
            _ => RoadType::CornerNW,
        }
    }
}

fn inner_diagonal(a: Direction, b: Direction) -> Direction {
    let (ax, az) = a.offset();
    let (bx, bz) = b.offset();
    match (ax + bx, az + bz) {
        (1, -1) => Direction::NE,
        (1, 1) => Direction::SE,
        (-1, 1) => Direction::SW,
        _ => Direction::NW,
    }
}

/// Pick the tile shape for a neighbour set. Total over all 256 sets.
pub fn classify_road_type(dirs: DirectionSet) -> RoadType {
    let cardinals: Vec<Direction> = Direction::CARDINALS.into_iter().filter(|d| dirs.contains(*d)).collect();
    let diagonals: Vec<Direction> = Direction::DIAGONALS.into_iter().filter(|d| dirs.contains(*d)).collect();

    match cardinals.as_slice() {
        [_, _, _, _] if diagonals.len() == 4 => RoadType::Plaza,
        [_, _, _, _] => RoadType::Cross,
        [_, _, _] => {
            let missing = Direction::CARDINALS.into_iter().find(|d| !dirs.contains(*d)).unwrap_or(Direction::S);
            RoadType::t_junction(missing.opposite())
        }
        [a, b] if a.opposite() == *b => {
            if *a == Direction::N || *a == Direction::S { RoadType::StraightNS } else { RoadType::StraightEW }
        }
        [a, b] => RoadType::corner(*a, *b, dirs.contains(inner_diagonal(*a, *b))),
        [a] => RoadType::dead_end(*a),
        _ => match diagonals.as_slice() {
            [_, _, _, _] => RoadType::CrossDiagonal,
            [_, _, _] => {
                let missing = Direction::DIAGONALS.into_iter().find(|d| !dirs.contains(*d)).unwrap_or(Direction::SW);
                RoadType::t_junction(missing.opposite())
            }
            [d] => RoadType::dead_end(*d),
            _ => {
                log::warn!("Unmatched road connectivity {:#010b}, using dead_end_n", dirs.bits());
                RoadType::DeadEndN
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(dirs: &[Direction]) -> DirectionSet {
        dirs.iter().copied().collect()
    }

    #[test]
    fn test_classification_is_total() {
        let mut seen = std::collections::HashSet::new();
        for bits in 0..=255u8 {
            seen.insert(classify_road_type(DirectionSet::from_bits(bits)));
        }
        for road_type in RoadType::ALL {
            assert!(seen.contains(&road_type), "{road_type:?} is unreachable");
        }
    }

    #[test]
    fn test_basic_shapes() {
        use Direction::*;
        assert_eq!(classify_road_type(set(&[N, S])), RoadType::StraightNS);
        assert_eq!(classify_road_type(set(&[E, W, NE])), RoadType::StraightEW);
        assert_eq!(classify_road_type(set(&[N, E])), RoadType::CornerNE);
        assert_eq!(classify_road_type(set(&[N, E, NE])), RoadType::DiagonalCornerNE);
        assert_eq!(classify_road_type(set(&[W, S])), RoadType::CornerSW);
        assert_eq!(classify_road_type(set(&[N, E, W])), RoadType::TJunctionN);
        assert_eq!(classify_road_type(set(&[N, S, W])), RoadType::TJunctionW);
        assert_eq!(classify_road_type(set(&[N, E, S, W])), RoadType::Cross);
        assert_eq!(classify_road_type(DirectionSet::from_bits(0xFF)), RoadType::Plaza);
        assert_eq!(classify_road_type(set(&[NE, SE, SW, NW])), RoadType::CrossDiagonal);
        assert_eq!(classify_road_type(set(&[NE, SE, NW])), RoadType::TJunctionNE);
        assert_eq!(classify_road_type(set(&[S])), RoadType::DeadEndS);
        assert_eq!(classify_road_type(set(&[SW])), RoadType::DeadEndSW);
    }

    #[test]
    fn test_fallbacks() {
        use Direction::*;
        assert_eq!(classify_road_type(DirectionSet::EMPTY), RoadType::DeadEndN);
        assert_eq!(classify_road_type(set(&[NE, SW])), RoadType::DeadEndN);
    }

    #[test]
    fn test_rotation_table() {
        assert_eq!(RoadType::StraightEW.rotation(), Rotation::Clockwise90);
        assert_eq!(RoadType::TJunctionS.rotation(), Rotation::Clockwise180);
        assert_eq!(RoadType::DeadEndW.rotation(), Rotation::CounterClockwise90);
        assert_eq!(RoadType::Plaza.rotation(), Rotation::None);
        assert_eq!(RoadType::TJunctionNE.rotation(), Rotation::None);
    }

    #[test]
    fn test_facing_rotation_matches_block_rotation() {
        use crate::math::BlockPos;
        for dir in Direction::CARDINALS {
            let (dx, dz) = dir.offset();
            let north = BlockPos::new(0, 0, -1);
            assert_eq!(north.rotate(dir.facing_rotation()), BlockPos::new(dx, 0, dz), "{dir:?}");
        }
        assert_eq!(Direction::SE.facing_rotation(), Rotation::Clockwise90);
    }

    #[test]
    fn test_piece_candidates() {
        let c = RoadType::TJunctionNE.piece_candidates();
        assert_eq!(c[0], "road/t_junction_ne");
        assert_eq!(c[1], "road/t_junction");
        assert_eq!(c[2], "road/straight");
    }
}
