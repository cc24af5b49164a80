use serde::Serialize;
use std::time::{Duration, Instant};

use crate::error::ChessError;
use crate::game::engine::{ChessEngine, GameResult, Reason};
use crate::game::piece::{Color, Move, Sides};

/// Remaining time of both sides in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockSnapshot {
    pub white_ms: u64,
    pub black_ms: u64,
}

/// A rules engine with a chess clock per side.
///
/// Only the side to move has a running clock. Time is charged when that side
/// moves, and `flag` turns an expired clock into a `Timeout` loss. All entry
/// points take `now` explicitly so the caller decides when time is read.
#[derive(Debug, Clone)]
pub struct Session {
    engine: ChessEngine,
    remaining: Sides<Duration>,
    turn_started: Instant,
    forced: Option<GameResult>,
}

impl Session {
    /// White's clock starts running at `now`.
    pub fn new(duration: Duration, now: Instant) -> Self {
        Self::with_engine(ChessEngine::new(), duration, now)
    }

    pub fn with_engine(engine: ChessEngine, duration: Duration, now: Instant) -> Self {
        Self {
            engine,
            remaining: Sides::new(duration, duration),
            turn_started: now,
            forced: None,
        }
    }

    pub fn engine(&self) -> &ChessEngine {
        &self.engine
    }

    pub fn turn(&self) -> Color {
        self.engine.turn()
    }

    /// Results forced from outside the board take precedence over the engine's own.
    pub fn result(&self) -> Option<GameResult> {
        self.forced.or_else(|| self.engine.result())
    }

    pub fn is_finished(&self) -> bool {
        self.forced.is_some() || self.engine.is_finished()
    }

    pub fn play(&mut self, color: Color, mv: Move, now: Instant) -> Result<(), ChessError> {
        if self.is_finished() || self.flag(now).is_some() {
            return Err(ChessError::GameEnd);
        }

        let elapsed = now.saturating_duration_since(self.turn_started);
        self.engine.play(color, mv)?;

        let left = &mut self.remaining[color];
        *left = left.saturating_sub(elapsed);
        self.turn_started = now;
        Ok(())
    }

    /// Finishes the game on time if the running clock has run out.
    ///
    /// Returns the result only on the call that performed the transition.
    pub fn flag(&mut self, now: Instant) -> Option<GameResult> {
        let (side, left) = self.deadline(now)?;
        if !left.is_zero() {
            return None;
        }
        self.remaining[side] = Duration::ZERO;
        self.turn_started = now;
        let result = GameResult::new(Reason::Timeout, side.opposite());
        self.forced = Some(result);
        Some(result)
    }

    /// The side whose clock is running and the time until it falls.
    pub fn deadline(&self, now: Instant) -> Option<(Color, Duration)> {
        if self.is_finished() {
            return None;
        }
        let side = self.engine.turn();
        Some((side, self.remaining(side, now)))
    }

    pub fn remaining(&self, color: Color, now: Instant) -> Duration {
        let stored = self.remaining[color];
        if color == self.engine.turn() && !self.is_finished() {
            stored.saturating_sub(now.saturating_duration_since(self.turn_started))
        } else {
            stored
        }
    }

    pub fn clock(&self, now: Instant) -> ClockSnapshot {
        let millis = |color| self.remaining(color, now).as_millis() as u64;
        ClockSnapshot {
            white_ms: millis(Color::White),
            black_ms: millis(Color::Black),
        }
    }

    /// `color` leaves the game and forfeits it.
    pub fn exit(&mut self, color: Color) -> Result<GameResult, ChessError> {
        self.force(Reason::Abandoned, color.opposite())
    }

    pub fn resign(&mut self, color: Color) -> Result<GameResult, ChessError> {
        self.force(Reason::Resign, color.opposite())
    }

    /// Both players agreed on a draw.
    pub fn draw(&mut self) -> Result<GameResult, ChessError> {
        self.force(Reason::Draw, Color::Empty)
    }

    fn force(&mut self, reason: Reason, winner: Color) -> Result<GameResult, ChessError> {
        if self.is_finished() {
            return Err(ChessError::GameEnd);
        }
        let result = GameResult::new(reason, winner);
        self.forced = Some(result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::piece::Location;

    fn mv(from: (i32, i32), to: (i32, i32)) -> Move {
        Move::new(Location::new(from.0, from.1), Location::new(to.0, to.1))
    }

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn moving_charges_only_the_mover() {
        let start = Instant::now();
        let mut session = Session::new(MINUTE, start);

        let t1 = start + Duration::from_secs(10);
        session.play(Color::White, mv((1, 4), (3, 4)), t1).unwrap();
        assert_eq!(session.remaining(Color::White, t1), Duration::from_secs(50));
        assert_eq!(session.remaining(Color::Black, t1), MINUTE);

        let t2 = t1 + Duration::from_secs(5);
        assert_eq!(session.remaining(Color::Black, t2), Duration::from_secs(55));
        assert_eq!(session.remaining(Color::White, t2), Duration::from_secs(50));
        assert_eq!(
            session.clock(t2),
            ClockSnapshot {
                white_ms: 50_000,
                black_ms: 55_000
            }
        );
    }

    #[test]
    fn rejected_moves_do_not_touch_the_clock() {
        let start = Instant::now();
        let mut session = Session::new(MINUTE, start);
        let later = start + Duration::from_secs(20);

        assert_eq!(
            session.play(Color::Black, mv((6, 4), (4, 4)), later),
            Err(ChessError::NotPlayersTurn)
        );
        assert_eq!(session.turn(), Color::White);
        assert_eq!(session.deadline(later), Some((Color::White, Duration::from_secs(40))));
    }

    #[test]
    fn flag_fires_exactly_once() {
        let start = Instant::now();
        let mut session = Session::new(MINUTE, start);
        assert!(session.flag(start + Duration::from_secs(59)).is_none());

        let expired = start + MINUTE;
        assert_eq!(
            session.flag(expired),
            Some(GameResult::new(Reason::Timeout, Color::Black))
        );
        assert!(session.flag(expired + MINUTE).is_none());
        assert!(session.deadline(expired).is_none());
        assert_eq!(session.remaining(Color::White, expired + MINUTE), Duration::ZERO);
    }

    #[test]
    fn late_move_loses_on_time() {
        let start = Instant::now();
        let mut session = Session::new(MINUTE, start);
        let late = start + Duration::from_secs(61);

        assert_eq!(
            session.play(Color::White, mv((1, 4), (3, 4)), late),
            Err(ChessError::GameEnd)
        );
        assert_eq!(
            session.result(),
            Some(GameResult::new(Reason::Timeout, Color::Black))
        );
        assert!(session.engine().board().is_empty(Location::new(3, 4)));
    }

    #[test]
    fn exit_resign_and_draw_are_terminal() {
        let now = Instant::now();

        let mut session = Session::new(MINUTE, now);
        assert_eq!(
            session.exit(Color::White),
            Ok(GameResult::new(Reason::Abandoned, Color::Black))
        );
        assert_eq!(session.draw(), Err(ChessError::GameEnd));
        assert_eq!(
            session.play(Color::White, mv((1, 4), (3, 4)), now),
            Err(ChessError::GameEnd)
        );

        let mut session = Session::new(MINUTE, now);
        assert_eq!(
            session.resign(Color::Black),
            Ok(GameResult::new(Reason::Resign, Color::White))
        );

        let mut session = Session::new(MINUTE, now);
        assert_eq!(
            session.draw(),
            Ok(GameResult::new(Reason::Draw, Color::Empty))
        );
        assert_eq!(session.exit(Color::Black), Err(ChessError::GameEnd));
        assert!(session.flag(now + MINUTE * 2).is_none());
    }

    #[test]
    fn checkmate_finishes_the_session() {
        let now = Instant::now();
        let mut session = Session::new(MINUTE, now);
        for (color, m) in [
            (Color::White, mv((1, 5), (2, 5))),
            (Color::Black, mv((6, 4), (4, 4))),
            (Color::White, mv((1, 6), (3, 6))),
            (Color::Black, mv((7, 3), (3, 7))),
        ] {
            session.play(color, m, now).unwrap();
        }
        assert_eq!(
            session.result(),
            Some(GameResult::new(Reason::Checkmate, Color::Black))
        );
        assert!(session.deadline(now).is_none());
    }
}
