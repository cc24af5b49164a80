use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::ChessError;

/// Side of a piece or of a result. `Empty` is the "no winner" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
    Empty,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
            Color::Empty => Color::Empty,
        }
    }

    /// Row the side's king and rooks start on.
    pub fn back_row(self) -> i32 {
        match self {
            Color::Black => 7,
            _ => 0,
        }
    }

    /// Row a pawn of this side promotes on.
    pub fn promotion_row(self) -> i32 {
        match self {
            Color::Black => 0,
            _ => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::White => "white",
            Color::Black => "black",
            Color::Empty => "empty",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceType {
    pub fn name(self) -> &'static str {
        match self {
            PieceType::King => "king",
            PieceType::Queen => "queen",
            PieceType::Rook => "rook",
            PieceType::Bishop => "bishop",
            PieceType::Knight => "knight",
            PieceType::Pawn => "pawn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(&self) -> bool {
        (0..8).contains(&self.row) && (0..8).contains(&self.col)
    }

    /// Rejects coordinates outside `[0, 8) x [0, 8)`.
    pub fn validate(&self) -> Result<(), ChessError> {
        if self.is_on_board() {
            Ok(())
        } else {
            Err(ChessError::OutOfBoardMove)
        }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Location {
        Location::new(self.row + d_row, self.col + d_col)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Location,
    pub to: Location,
}

impl Move {
    pub const fn new(from: Location, to: Location) -> Self {
        Self { from, to }
    }

    pub fn validate(&self) -> Result<(), ChessError> {
        self.from.validate()?;
        self.to.validate()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Stable handle of a piece inside a board's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) usize);

/// A piece keeps its identity for the whole game; capture only flags it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    pub location: Location,
    pub captured: bool,
}

impl Piece {
    pub fn new(kind: PieceType, color: Color, location: Location) -> Self {
        Self {
            kind,
            color,
            location,
            captured: false,
        }
    }

    pub fn glyph(&self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceType::King) => '♚',
            (Color::White, PieceType::Queen) => '♛',
            (Color::White, PieceType::Rook) => '♜',
            (Color::White, PieceType::Bishop) => '♝',
            (Color::White, PieceType::Knight) => '♞',
            (Color::White, PieceType::Pawn) => '♟',
            (_, PieceType::King) => '♔',
            (_, PieceType::Queen) => '♕',
            (_, PieceType::Rook) => '♖',
            (_, PieceType::Bishop) => '♗',
            (_, PieceType::Knight) => '♘',
            (_, PieceType::Pawn) => '♙',
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// One value per playing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides<T> {
    pub white: T,
    pub black: T,
}

impl<T> Sides<T> {
    pub fn new(white: T, black: T) -> Self {
        Self { white, black }
    }
}

impl<T> Index<Color> for Sides<T> {
    type Output = T;

    fn index(&self, color: Color) -> &T {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
            Color::Empty => unreachable!("no side for the empty color"),
        }
    }
}

impl<T> IndexMut<Color> for Sides<T> {
    fn index_mut(&mut self, color: Color) -> &mut T {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
            Color::Empty => unreachable!("no side for the empty color"),
        }
    }
}

/// Castling permissions of one side. `left` is the column-0 rook, `right` the column-7 rook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleRights {
    pub left: bool,
    pub right: bool,
}

impl CastleRights {
    pub const ALL: CastleRights = CastleRights {
        left: true,
        right: true,
    };
    pub const NONE: CastleRights = CastleRights {
        left: false,
        right: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_guarded_for_empty() {
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Black.opposite(), Color::White);
        assert_eq!(Color::Empty.opposite(), Color::Empty);
    }

    #[test]
    fn validate_rejects_out_of_board_locations() {
        assert!(Location::new(0, 7).validate().is_ok());
        assert_eq!(Location::new(8, 0).validate(), Err(ChessError::OutOfBoardMove));
        assert_eq!(Location::new(3, -1).validate(), Err(ChessError::OutOfBoardMove));

        let mv = Move::new(Location::new(1, 4), Location::new(9, 4));
        assert_eq!(mv.validate(), Err(ChessError::OutOfBoardMove));
    }

    #[test]
    fn colors_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Color::Empty).unwrap(), "\"empty\"");
        let mv: Move =
            serde_json::from_str(r#"{"from":{"row":1,"col":4},"to":{"row":3,"col":4}}"#).unwrap();
        assert_eq!(mv, Move::new(Location::new(1, 4), Location::new(3, 4)));
    }

    #[test]
    fn sides_index_by_color() {
        let mut sides = Sides::new(1, 2);
        sides[Color::Black] += 10;
        assert_eq!(sides[Color::White], 1);
        assert_eq!(sides[Color::Black], 12);
    }
}
