pub mod board;
pub mod engine;
pub mod piece;
pub mod rollback;
pub mod session;
pub mod utils;

pub use engine::{GameResult, Reason};
pub use piece::{Color, Location, Move, Sides};
pub use session::{ClockSnapshot, Session};
