use crate::error::ChessError;
use crate::game::board::Board;
use crate::game::piece::{CastleRights, Color, Location, Move, PieceId, PieceType, Sides};

/// Everything a single move can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub castle_rights: Sides<CastleRights>,
}

impl Position {
    pub fn new(board: Board, castle_rights: Sides<CastleRights>) -> Self {
        Self {
            board,
            castle_rights,
        }
    }
}

/// Rook squares moved by a castle: `(from, to)`.
fn castle_rook_squares(king_to: Location) -> Option<(Location, Location)> {
    match king_to.col {
        6 => Some((Location::new(king_to.row, 7), Location::new(king_to.row, 5))),
        2 => Some((Location::new(king_to.row, 0), Location::new(king_to.row, 3))),
        _ => None,
    }
}

/// Clears the castling right tied to a rook standing on its home corner.
fn drop_rook_right(rights: &mut Sides<CastleRights>, color: Color, corner: Location) {
    if corner.row != color.back_row() {
        return;
    }
    match corner.col {
        0 => rights[color].left = false,
        7 => rights[color].right = false,
        _ => {}
    }
}

/// A move applied to a [`Position`] together with what is needed to undo it.
///
/// The same record serves committed moves and the what-if simulations run while
/// generating legal moves, so `revert` must restore the position exactly.
#[derive(Debug)]
pub struct Rollback {
    mv: Move,
    moved: PieceId,
    captured: Option<PieceId>,
    castled_rook: Option<(PieceId, Location, Location)>,
    promoted: bool,
    rights_backup: Sides<CastleRights>,
    rolled_back: bool,
}

impl Rollback {
    /// Applies `mv` without any legality check beyond an occupied source square.
    pub fn apply(position: &mut Position, mv: Move) -> Result<Self, ChessError> {
        mv.validate()?;
        let moved = position
            .board
            .get(mv.from)
            .ok_or(ChessError::InvalidPieceMove)?;
        let rights_backup = position.castle_rights;
        let (kind, color) = {
            let piece = position.board.piece(moved);
            (piece.kind, piece.color)
        };

        let mut castled_rook = None;
        if kind == PieceType::King {
            position.castle_rights[color] = CastleRights::NONE;
            if (mv.to.col - mv.from.col).abs() == 2 {
                if let Some((rook_from, rook_to)) = castle_rook_squares(mv.to) {
                    if let Some(rook) = position.board.get(rook_from) {
                        position.board.set(rook_from, None);
                        position.board.set(rook_to, Some(rook));
                        position.board.piece_mut(rook).location = rook_to;
                        castled_rook = Some((rook, rook_from, rook_to));
                    }
                }
            }
        } else if kind == PieceType::Rook {
            drop_rook_right(&mut position.castle_rights, color, mv.from);
        }

        let captured = position.board.get(mv.to);
        if let Some(victim) = captured {
            let victim_piece = position.board.piece_mut(victim);
            victim_piece.captured = true;
            if victim_piece.kind == PieceType::Rook {
                let victim_color = victim_piece.color;
                drop_rook_right(&mut position.castle_rights, victim_color, mv.to);
            }
        }

        let promoted = kind == PieceType::Pawn && mv.to.row == color.promotion_row();

        position.board.set(mv.from, None);
        position.board.set(mv.to, Some(moved));
        let piece = position.board.piece_mut(moved);
        piece.location = mv.to;
        if promoted {
            piece.kind = PieceType::Queen;
        }

        Ok(Self {
            mv,
            moved,
            captured,
            castled_rook,
            promoted,
            rights_backup,
            rolled_back: false,
        })
    }

    #[cfg(test)]
    pub fn is_castle(&self) -> bool {
        self.castled_rook.is_some()
    }

    #[cfg(test)]
    pub fn is_promotion(&self) -> bool {
        self.promoted
    }

    #[cfg(test)]
    pub fn captured(&self) -> Option<PieceId> {
        self.captured
    }

    /// Undoes the move. Calling it again is a no-op.
    pub fn revert(&mut self, position: &mut Position) {
        if self.rolled_back {
            return;
        }

        position.board.set(self.mv.from, Some(self.moved));
        position.board.set(self.mv.to, self.captured);
        let piece = position.board.piece_mut(self.moved);
        piece.location = self.mv.from;
        if self.promoted {
            piece.kind = PieceType::Pawn;
        }

        if let Some(victim) = self.captured {
            position.board.piece_mut(victim).captured = false;
        }

        if let Some((rook, rook_from, rook_to)) = self.castled_rook {
            position.board.set(rook_to, None);
            position.board.set(rook_from, Some(rook));
            position.board.piece_mut(rook).location = rook_from;
        }

        position.castle_rights = self.rights_backup;
        self.rolled_back = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::piece::Piece;

    fn loc(row: i32, col: i32) -> Location {
        Location::new(row, col)
    }

    fn position(pieces: Vec<Piece>) -> Position {
        Position::new(
            Board::from_pieces(pieces).unwrap(),
            Sides::new(CastleRights::ALL, CastleRights::ALL),
        )
    }

    fn castle_setup() -> Position {
        position(vec![
            Piece::new(PieceType::King, Color::White, loc(0, 4)),
            Piece::new(PieceType::Rook, Color::White, loc(0, 0)),
            Piece::new(PieceType::Rook, Color::White, loc(0, 7)),
            Piece::new(PieceType::King, Color::Black, loc(7, 4)),
            Piece::new(PieceType::Rook, Color::Black, loc(7, 7)),
        ])
    }

    #[test]
    fn plain_move_round_trips() {
        let mut pos = Position::new(Board::standard(), Sides::new(CastleRights::ALL, CastleRights::ALL));
        let before = pos.clone();

        let mut rb = Rollback::apply(&mut pos, Move::new(loc(1, 4), loc(3, 4))).unwrap();
        assert!(pos.board.is_empty(loc(1, 4)));
        assert_eq!(pos.board.at(loc(3, 4)).unwrap().location, loc(3, 4));

        rb.revert(&mut pos);
        assert_eq!(pos, before);
    }

    #[test]
    fn capture_is_flagged_then_resurrected() {
        let mut pos = position(vec![
            Piece::new(PieceType::King, Color::White, loc(0, 0)),
            Piece::new(PieceType::Queen, Color::White, loc(3, 3)),
            Piece::new(PieceType::King, Color::Black, loc(7, 7)),
            Piece::new(PieceType::Knight, Color::Black, loc(5, 5)),
        ]);
        let before = pos.clone();

        let mut rb = Rollback::apply(&mut pos, Move::new(loc(3, 3), loc(5, 5))).unwrap();
        let victim = rb.captured().unwrap();
        assert!(pos.board.piece(victim).captured);
        assert_eq!(pos.board.active_pieces(Color::Black).count(), 1);

        rb.revert(&mut pos);
        assert_eq!(pos, before);
    }

    #[test]
    fn promotion_is_undone() {
        let mut pos = position(vec![
            Piece::new(PieceType::King, Color::White, loc(0, 0)),
            Piece::new(PieceType::Pawn, Color::White, loc(6, 1)),
            Piece::new(PieceType::King, Color::Black, loc(7, 5)),
        ]);
        let before = pos.clone();

        let mut rb = Rollback::apply(&mut pos, Move::new(loc(6, 1), loc(7, 1))).unwrap();
        assert!(rb.is_promotion());
        assert_eq!(pos.board.at(loc(7, 1)).unwrap().kind, PieceType::Queen);

        rb.revert(&mut pos);
        assert_eq!(pos.board.at(loc(6, 1)).unwrap().kind, PieceType::Pawn);
        assert_eq!(pos, before);
    }

    #[test]
    fn black_pawn_promotes_on_row_zero() {
        let mut pos = position(vec![
            Piece::new(PieceType::King, Color::White, loc(0, 7)),
            Piece::new(PieceType::Pawn, Color::Black, loc(1, 2)),
            Piece::new(PieceType::King, Color::Black, loc(7, 5)),
        ]);
        let rb = Rollback::apply(&mut pos, Move::new(loc(1, 2), loc(0, 2))).unwrap();
        assert!(rb.is_promotion());
        assert_eq!(pos.board.at(loc(0, 2)).unwrap().kind, PieceType::Queen);
    }

    #[test]
    fn king_side_castle_moves_both_pieces_and_reverts() {
        let mut pos = castle_setup();
        let before = pos.clone();

        let mut rb = Rollback::apply(&mut pos, Move::new(loc(0, 4), loc(0, 6))).unwrap();
        assert!(rb.is_castle());
        assert_eq!(pos.board.at(loc(0, 6)).unwrap().kind, PieceType::King);
        assert_eq!(pos.board.at(loc(0, 5)).unwrap().kind, PieceType::Rook);
        assert!(pos.board.is_empty(loc(0, 7)));
        assert_eq!(pos.castle_rights.white, CastleRights::NONE);

        rb.revert(&mut pos);
        assert_eq!(pos, before);
    }

    #[test]
    fn queen_side_castle_reverts() {
        let mut pos = castle_setup();
        let before = pos.clone();

        let mut rb = Rollback::apply(&mut pos, Move::new(loc(0, 4), loc(0, 2))).unwrap();
        assert_eq!(pos.board.at(loc(0, 3)).unwrap().kind, PieceType::Rook);
        assert!(pos.board.is_empty(loc(0, 0)));

        rb.revert(&mut pos);
        assert_eq!(pos, before);
    }

    #[test]
    fn rook_moves_clear_only_their_side() {
        let mut pos = castle_setup();
        let mut rb = Rollback::apply(&mut pos, Move::new(loc(0, 0), loc(4, 0))).unwrap();
        assert_eq!(
            pos.castle_rights.white,
            CastleRights {
                left: false,
                right: true
            }
        );
        rb.revert(&mut pos);
        assert_eq!(pos.castle_rights.white, CastleRights::ALL);
    }

    #[test]
    fn capturing_a_home_rook_clears_the_victims_right() {
        let mut pos = castle_setup();
        let mut rb = Rollback::apply(&mut pos, Move::new(loc(0, 7), loc(7, 7))).unwrap();
        assert!(!pos.castle_rights.black.right);
        assert!(!pos.castle_rights.white.right);
        rb.revert(&mut pos);
        assert_eq!(pos.castle_rights.black, CastleRights::ALL);
    }

    #[test]
    fn revert_twice_is_a_no_op() {
        let mut pos = castle_setup();
        let before = pos.clone();
        let mut rb = Rollback::apply(&mut pos, Move::new(loc(7, 4), loc(6, 4))).unwrap();
        rb.revert(&mut pos);
        rb.revert(&mut pos);
        assert_eq!(pos, before);
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut pos = castle_setup();
        let before = pos.clone();
        let err = Rollback::apply(&mut pos, Move::new(loc(3, 3), loc(4, 3))).unwrap_err();
        assert_eq!(err, ChessError::InvalidPieceMove);
        assert_eq!(pos, before);
    }
}
