use crate::game::engine::Reason;
use crate::game::piece::Color;
use crate::game::session::Session;

/// Get the game status as a string
pub fn game_status(session: &Session) -> &'static str {
    if let Some(result) = session.result() {
        return match result.reason {
            Reason::Checkmate => "checkmate",
            Reason::Stalemate => "stalemate",
            Reason::Timeout => "timeout",
            Reason::Abandoned => "abandoned",
            Reason::Resign => "resign",
            Reason::Draw => "draw",
        };
    }

    let turn = session.turn();
    if session.engine().is_checked(turn) {
        "check"
    } else if turn == Color::White {
        "white_turn"
    } else {
        "black_turn"
    }
}

/// Score reported with every finished game.
pub const GAME_SCORE: u32 = 10;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::piece::{Location, Move};
    use std::time::{Duration, Instant};

    #[test]
    fn status_follows_the_game() {
        let now = Instant::now();
        let mut session = Session::new(Duration::from_secs(60), now);
        assert_eq!(game_status(&session), "white_turn");

        let mv = Move::new(Location::new(1, 5), Location::new(2, 5));
        session.play(Color::White, mv, now).unwrap();
        assert_eq!(game_status(&session), "black_turn");

        let mv = Move::new(Location::new(6, 4), Location::new(4, 4));
        session.play(Color::Black, mv, now).unwrap();
        let mv = Move::new(Location::new(1, 6), Location::new(3, 6));
        session.play(Color::White, mv, now).unwrap();
        let mv = Move::new(Location::new(7, 3), Location::new(3, 7));
        session.play(Color::Black, mv, now).unwrap();
        assert_eq!(game_status(&session), "checkmate");
    }

    #[test]
    fn forced_endings_have_their_own_status() {
        let now = Instant::now();
        let mut session = Session::new(Duration::from_secs(60), now);
        session.resign(Color::White).unwrap();
        assert_eq!(game_status(&session), "resign");

        let mut session = Session::new(Duration::from_secs(1), now);
        session.flag(now + Duration::from_secs(2));
        assert_eq!(game_status(&session), "timeout");
    }
}
