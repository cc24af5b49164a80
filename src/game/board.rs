use std::fmt;

use crate::error::ChessError;
use crate::game::piece::{Color, Location, Piece, PieceId, PieceType, Sides};

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// 8x8 grid over an arena of pieces. Cells hold arena ids, never pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: Vec<Piece>,
    cells: [[Option<PieceId>; 8]; 8],
    kings: Sides<PieceId>,
    by_color: Sides<Vec<PieceId>>,
}

impl Board {
    /// Standard opening setup, white on rows 0 and 1.
    pub fn standard() -> Self {
        let mut pieces = Vec::with_capacity(32);
        for (color, back, pawns) in [(Color::White, 0, 1), (Color::Black, 7, 6)] {
            for (col, kind) in BACK_RANK.iter().enumerate() {
                pieces.push(Piece::new(*kind, color, Location::new(back, col as i32)));
            }
            for col in 0..8 {
                pieces.push(Piece::new(PieceType::Pawn, color, Location::new(pawns, col)));
            }
        }
        match Self::from_pieces(pieces) {
            Ok(board) => board,
            Err(e) => unreachable!("standard setup is valid: {e}"),
        }
    }

    pub fn from_pieces(pieces: Vec<Piece>) -> Result<Self, ChessError> {
        let mut cells = [[None; 8]; 8];
        let mut kings: Sides<Option<PieceId>> = Sides::default();
        let mut by_color: Sides<Vec<PieceId>> = Sides::default();

        for (index, piece) in pieces.iter().enumerate() {
            let id = PieceId(index);
            let loc = piece.location;
            if !loc.is_on_board() {
                return Err(ChessError::InvalidPosition(format!(
                    "{} off the board at {}",
                    piece.kind.name(),
                    loc
                )));
            }
            if piece.color == Color::Empty {
                return Err(ChessError::InvalidPosition(format!(
                    "{} at {} has no color",
                    piece.kind.name(),
                    loc
                )));
            }
            if piece.captured {
                return Err(ChessError::InvalidPosition(format!(
                    "{} at {} is already captured",
                    piece.kind.name(),
                    loc
                )));
            }
            let cell = &mut cells[loc.row as usize][loc.col as usize];
            if cell.is_some() {
                return Err(ChessError::InvalidPosition(format!("two pieces on {loc}")));
            }
            *cell = Some(id);
            by_color[piece.color].push(id);

            if piece.kind == PieceType::King {
                if kings[piece.color].is_some() {
                    return Err(ChessError::InvalidPosition(format!(
                        "{} has more than one king",
                        piece.color
                    )));
                }
                kings[piece.color] = Some(id);
            }
        }

        let (Some(white), Some(black)) = (kings.white, kings.black) else {
            return Err(ChessError::InvalidPosition("each side needs a king".to_string()));
        };

        Ok(Self {
            pieces,
            cells,
            kings: Sides::new(white, black),
            by_color,
        })
    }

    pub fn get(&self, loc: Location) -> Option<PieceId> {
        if !loc.is_on_board() {
            return None;
        }
        self.cells[loc.row as usize][loc.col as usize]
    }

    /// The piece standing on `loc`, if any.
    pub fn at(&self, loc: Location) -> Option<&Piece> {
        self.get(loc).map(|id| self.piece(id))
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.0]
    }

    pub(crate) fn set(&mut self, loc: Location, occupant: Option<PieceId>) {
        self.cells[loc.row as usize][loc.col as usize] = occupant;
    }

    pub fn is_empty(&self, loc: Location) -> bool {
        self.get(loc).is_none()
    }

    pub fn king(&self, color: Color) -> PieceId {
        self.kings[color]
    }

    /// Every piece of `color`, captured ones included.
    #[cfg(test)]
    pub fn pieces_of(&self, color: Color) -> &[PieceId] {
        &self.by_color[color]
    }

    /// Pieces of `color` still on the board.
    pub fn active_pieces(&self, color: Color) -> impl Iterator<Item = PieceId> + '_ {
        self.by_color[color]
            .iter()
            .copied()
            .filter(move |id| !self.piece(*id).captured)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "########")?;
        for row in (0..8).rev() {
            for col in 0..8 {
                match self.at(Location::new(row, col)) {
                    Some(piece) => write!(f, "{} ", piece)?,
                    None => write!(f, "  ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "########")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_board_layout() {
        let board = Board::standard();
        let king = board.piece(board.king(Color::White));
        assert_eq!(king.location, Location::new(0, 4));
        assert_eq!(board.at(Location::new(7, 3)).map(|p| p.kind), Some(PieceType::Queen));
        assert_eq!(board.at(Location::new(6, 0)).map(|p| p.color), Some(Color::Black));
        assert!(board.is_empty(Location::new(4, 4)));
        assert_eq!(board.pieces_of(Color::Black).len(), 16);
    }

    #[test]
    fn from_pieces_requires_one_king_each() {
        let pieces = vec![Piece::new(PieceType::King, Color::White, Location::new(0, 0))];
        assert!(matches!(
            Board::from_pieces(pieces),
            Err(ChessError::InvalidPosition(_))
        ));
    }

    #[test]
    fn from_pieces_rejects_overlap() {
        let pieces = vec![
            Piece::new(PieceType::King, Color::White, Location::new(0, 0)),
            Piece::new(PieceType::King, Color::Black, Location::new(7, 7)),
            Piece::new(PieceType::Rook, Color::Black, Location::new(0, 0)),
        ];
        assert!(Board::from_pieces(pieces).is_err());
    }

    #[test]
    fn display_puts_black_on_top() {
        let rendered = Board::standard().to_string();
        let first_rank = rendered.lines().nth(1).unwrap();
        assert!(first_rank.starts_with('♖'));
    }
}
