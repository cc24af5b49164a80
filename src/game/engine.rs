use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::ChessError;
use crate::game::board::Board;
use crate::game::piece::{CastleRights, Color, Location, Move, PieceId, PieceType, Sides};
use crate::game::rollback::{Position, Rollback};

const KING_STEPS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const ROOK_RAYS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_RAYS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    Checkmate,
    Stalemate,
    Timeout,
    Abandoned,
    Resign,
    Draw,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reason::Checkmate => "checkmate",
            Reason::Stalemate => "stalemate",
            Reason::Timeout => "timeout",
            Reason::Abandoned => "abandoned",
            Reason::Resign => "resign",
            Reason::Draw => "draw",
        };
        f.write_str(name)
    }
}

/// How a game ended. `winner` is [`Color::Empty`] for drawn games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub reason: Reason,
    pub winner: Color,
}

impl GameResult {
    pub fn new(reason: Reason, winner: Color) -> Self {
        Self { reason, winner }
    }
}

/// Rules engine for a single game.
///
/// Legal moves for the side to move are regenerated after every accepted move
/// by simulating each pseudo-legal destination with a [`Rollback`].
#[derive(Debug, Clone)]
pub struct ChessEngine {
    position: Position,
    turn: Color,
    possible_moves: HashMap<PieceId, Vec<Location>>,
    result: Option<GameResult>,
}

impl Default for ChessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessEngine {
    pub fn new() -> Self {
        let position = Position::new(
            Board::standard(),
            Sides::new(CastleRights::ALL, CastleRights::ALL),
        );
        Self::with_position(position, Color::White)
    }

    /// Builds an engine from an arbitrary set of pieces with `turn` to move.
    ///
    /// A side keeps a castling right only while its king and the matching rook
    /// stand on their home squares.
    #[cfg(test)]
    pub fn from_pieces(
        pieces: Vec<crate::game::piece::Piece>,
        turn: Color,
    ) -> Result<Self, ChessError> {
        if turn == Color::Empty {
            return Err(ChessError::InvalidPosition("nobody to move".to_string()));
        }
        let board = Board::from_pieces(pieces)?;
        let rights = Sides::new(
            home_rights(&board, Color::White),
            home_rights(&board, Color::Black),
        );
        Ok(Self::with_position(Position::new(board, rights), turn))
    }

    fn with_position(position: Position, turn: Color) -> Self {
        let mut engine = Self {
            position,
            turn,
            possible_moves: HashMap::new(),
            result: None,
        };
        engine.generate_possible_moves();
        engine.detect_game_end();
        engine
    }

    pub fn board(&self) -> &Board {
        &self.position.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    #[cfg(test)]
    pub fn castle_rights(&self, color: Color) -> CastleRights {
        self.position.castle_rights[color]
    }

    /// `None` while the game is still running.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// Legal destinations of the piece on `from`. Empty unless it belongs to the side to move.
    pub fn possible_moves(&self, from: Location) -> &[Location] {
        self.position
            .board
            .get(from)
            .and_then(|id| self.possible_moves.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_in_possible_moves(&self, from: Location, to: Location) -> bool {
        self.possible_moves(from).contains(&to)
    }

    /// Every legal move of the side to move.
    #[cfg(test)]
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = self
            .possible_moves
            .iter()
            .flat_map(|(id, targets)| {
                let from = self.position.board.piece(*id).location;
                targets.iter().map(move |to| Move::new(from, *to))
            })
            .collect();
        moves.sort_by_key(|m| (m.from.row, m.from.col, m.to.row, m.to.col));
        moves
    }

    pub fn play(&mut self, color: Color, mv: Move) -> Result<(), ChessError> {
        if self.result.is_some() {
            return Err(ChessError::GameEnd);
        }
        mv.validate()?;
        if color != self.turn {
            return Err(ChessError::NotPlayersTurn);
        }

        let id = match self.position.board.get(mv.from) {
            Some(id) if self.position.board.piece(id).color == color => id,
            _ => return Err(ChessError::InvalidPieceMove),
        };
        if !self.pseudo_legal_moves(id).contains(&mv.to) {
            return Err(ChessError::InvalidPieceMove);
        }

        // the legal set was filtered by simulating every candidate
        if !self.is_in_possible_moves(mv.from, mv.to) {
            return Err(ChessError::Checked);
        }

        Rollback::apply(&mut self.position, mv)?;
        self.switch_turn();
        self.detect_game_end();
        Ok(())
    }

    /// Ends the game when the side to move has no legal move left.
    fn detect_game_end(&mut self) {
        if !self.possible_moves.values().all(Vec::is_empty) {
            return;
        }
        self.result = Some(if self.is_checked(self.turn) {
            GameResult::new(Reason::Checkmate, self.turn.opposite())
        } else {
            GameResult::new(Reason::Stalemate, Color::Empty)
        });
    }

    /// Whether the king of `color` is attacked right now.
    pub fn is_checked(&self, color: Color) -> bool {
        let king = self.position.board.piece(self.position.board.king(color));
        self.is_attacked(king.location, color.opposite())
    }

    fn switch_turn(&mut self) {
        self.turn = self.turn.opposite();
        self.generate_possible_moves();
    }

    fn generate_possible_moves(&mut self) {
        self.possible_moves.clear();
        let color = self.turn;
        let ids: Vec<PieceId> = self.position.board.active_pieces(color).collect();

        for id in ids {
            let from = self.position.board.piece(id).location;
            let mut legal = Vec::new();
            for to in self.pseudo_legal_moves(id) {
                if self.occupiable(color, Move::new(from, to)) {
                    legal.push(to);
                }
            }
            self.possible_moves.insert(id, legal);
        }
    }

    /// Simulates `mv` and reports whether it keeps the king of `color` safe.
    fn occupiable(&mut self, color: Color, mv: Move) -> bool {
        match Rollback::apply(&mut self.position, mv) {
            Ok(mut rollback) => {
                let checked = self.is_checked(color);
                rollback.revert(&mut self.position);
                !checked
            }
            Err(_) => false,
        }
    }

    fn can_land(&self, color: Color, loc: Location) -> bool {
        loc.is_on_board()
            && self
                .position
                .board
                .at(loc)
                .map_or(true, |piece| piece.color != color)
    }

    /// Destinations matching the piece's geometry, ignoring king safety.
    fn pseudo_legal_moves(&self, id: PieceId) -> Vec<Location> {
        let piece = self.position.board.piece(id);
        let (from, color) = (piece.location, piece.color);

        match piece.kind {
            PieceType::King => {
                let mut moves = self.steps(color, from, &KING_STEPS);
                moves.extend(self.castling_moves(color, from));
                moves
            }
            PieceType::Knight => self.steps(color, from, &KNIGHT_JUMPS),
            PieceType::Rook => self.rays(color, from, &ROOK_RAYS),
            PieceType::Bishop => self.rays(color, from, &BISHOP_RAYS),
            PieceType::Queen => {
                let mut moves = self.rays(color, from, &ROOK_RAYS);
                moves.extend(self.rays(color, from, &BISHOP_RAYS));
                moves
            }
            PieceType::Pawn => self.pawn_moves(color, from),
        }
    }

    fn steps(&self, color: Color, from: Location, offsets: &[(i32, i32)]) -> Vec<Location> {
        offsets
            .iter()
            .map(|(dr, dc)| from.offset(*dr, *dc))
            .filter(|loc| self.can_land(color, *loc))
            .collect()
    }

    /// Slides stop on the first occupied square, which is kept only if it holds an enemy.
    fn rays(&self, color: Color, from: Location, directions: &[(i32, i32)]) -> Vec<Location> {
        let mut moves = Vec::new();
        for (dr, dc) in directions {
            let mut loc = from.offset(*dr, *dc);
            while loc.is_on_board() {
                match self.position.board.at(loc) {
                    None => moves.push(loc),
                    Some(other) => {
                        if other.color != color {
                            moves.push(loc);
                        }
                        break;
                    }
                }
                loc = loc.offset(*dr, *dc);
            }
        }
        moves
    }

    fn pawn_moves(&self, color: Color, from: Location) -> Vec<Location> {
        let dir = pawn_direction(color);
        let start_row = if color == Color::White { 1 } else { 6 };
        let board = &self.position.board;
        let mut moves = Vec::new();

        let one = from.offset(dir, 0);
        if one.is_on_board() && board.is_empty(one) {
            moves.push(one);
            let two = from.offset(2 * dir, 0);
            if from.row == start_row && board.is_empty(two) {
                moves.push(two);
            }
        }

        for dc in [1, -1] {
            let target = from.offset(dir, dc);
            if let Some(other) = board.at(target) {
                if other.color != color {
                    moves.push(target);
                }
            }
        }
        moves
    }

    fn castling_moves(&self, color: Color, king_at: Location) -> Vec<Location> {
        let row = color.back_row();
        let mut moves = Vec::new();
        if king_at != Location::new(row, 4) {
            return moves;
        }
        let rights = self.position.castle_rights[color];
        if !rights.left && !rights.right {
            return moves;
        }
        let enemy = color.opposite();
        if self.is_attacked(king_at, enemy) {
            return moves;
        }

        let board = &self.position.board;
        let has_rook = |col: i32| {
            board
                .at(Location::new(row, col))
                .is_some_and(|p| p.kind == PieceType::Rook && p.color == color)
        };
        let clear = |cols: &[i32]| cols.iter().all(|c| board.is_empty(Location::new(row, *c)));

        if rights.left
            && has_rook(0)
            && clear(&[1, 2, 3])
            && !self.is_attacked(Location::new(row, 3), enemy)
        {
            moves.push(Location::new(row, 2));
        }
        if rights.right
            && has_rook(7)
            && clear(&[5, 6])
            && !self.is_attacked(Location::new(row, 5), enemy)
        {
            moves.push(Location::new(row, 6));
        }
        moves
    }

    fn is_attacked(&self, target: Location, by: Color) -> bool {
        self.position
            .board
            .active_pieces(by)
            .any(|id| self.attacks(id, target))
    }

    /// Whether the piece could capture on `target`, reusing the movement shapes.
    fn attacks(&self, id: PieceId, target: Location) -> bool {
        let piece = self.position.board.piece(id);
        let src = piece.location;
        if src == target {
            return false;
        }
        let (dr, dc) = (target.row - src.row, target.col - src.col);

        match piece.kind {
            PieceType::King => dr.abs().max(dc.abs()) == 1,
            PieceType::Knight => matches!((dr.abs(), dc.abs()), (1, 2) | (2, 1)),
            PieceType::Rook => self.is_valid_rook_move(src, target),
            PieceType::Bishop => self.is_valid_bishop_move(src, target),
            PieceType::Queen => {
                self.is_valid_rook_move(src, target) || self.is_valid_bishop_move(src, target)
            }
            PieceType::Pawn => dr == pawn_direction(piece.color) && dc.abs() == 1,
        }
    }

    fn is_valid_rook_move(&self, src: Location, dst: Location) -> bool {
        (src.row == dst.row || src.col == dst.col) && self.path_clear(src, dst)
    }

    fn is_valid_bishop_move(&self, src: Location, dst: Location) -> bool {
        let (dr, dc) = (dst.row - src.row, dst.col - src.col);
        dr != 0 && dr.abs() == dc.abs() && self.path_clear(src, dst)
    }

    /// Squares strictly between `src` and `dst` on a straight line are empty.
    fn path_clear(&self, src: Location, dst: Location) -> bool {
        let (step_r, step_c) = ((dst.row - src.row).signum(), (dst.col - src.col).signum());
        let mut loc = src.offset(step_r, step_c);
        while loc != dst {
            if !self.position.board.is_empty(loc) {
                return false;
            }
            loc = loc.offset(step_r, step_c);
        }
        true
    }
}

fn pawn_direction(color: Color) -> i32 {
    if color == Color::White {
        1
    } else {
        -1
    }
}

#[cfg(test)]
fn home_rights(board: &Board, color: Color) -> CastleRights {
    let row = color.back_row();
    let king_home = board.piece(board.king(color)).location == Location::new(row, 4);
    let rook_home = |col: i32| {
        board
            .at(Location::new(row, col))
            .is_some_and(|p| p.kind == PieceType::Rook && p.color == color)
    };
    CastleRights {
        left: king_home && rook_home(0),
        right: king_home && rook_home(7),
    }
}
