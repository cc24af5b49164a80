use thiserror::Error;

/// Errors returned by the rules engine and the clocked session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("game ended")]
    GameEnd,

    #[error("move should be between [0, 8)")]
    OutOfBoardMove,

    #[error("checked, can't move there")]
    Checked,

    #[error("piece can't move like that")]
    InvalidPieceMove,

    #[error("it's not your turn")]
    NotPlayersTurn,

    /// The pieces handed to `from_pieces` do not form a playable board.
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Errors raised while decoding an inbound websocket frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid type")]
    InvalidType,

    #[error("invalid payload")]
    InvalidPayload,
}

/// Errors reported by the hub to the requesting client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("you're not in any game")]
    NotInGame,

    #[error("already in a waiting list")]
    AlreadyWaiting,

    #[error("already in a game")]
    AlreadyPlaying,

    #[error("you don't have a game")]
    NothingToExit,

    #[error("player not found")]
    PlayerNotFound,

    #[error("no draw offer to respond to")]
    NoDrawOffer,

    #[error(transparent)]
    Chess(#[from] ChessError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("invalid number of players")]
    InvalidPlayers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chess_errors_surface_through_hub_errors() {
        let err: HubError = ChessError::NotPlayersTurn.into();
        assert_eq!(err.to_string(), "it's not your turn");
    }

    #[test]
    fn protocol_messages_match_the_wire() {
        assert_eq!(ProtocolError::InvalidType.to_string(), "invalid type");
        assert_eq!(ProtocolError::InvalidPayload.to_string(), "invalid payload");
    }
}
