use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::ProtocolError;
use crate::game::{ClockSnapshot, Color, Location, Move, Reason};

/// Time controls a player may ask for, in minutes.
pub const ALLOWED_DURATIONS: [u64; 4] = [1, 3, 5, 10];

/// Inbound envelope: `{"type": ..., "payload": ...}`.
#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Deserialize, Debug)]
struct StartPayload {
    #[serde(default)]
    name: String,
    #[serde(alias = "duration")]
    duration_minutes: u64,
}

#[derive(Deserialize, Debug)]
struct PlayPayload {
    #[serde(rename = "move")]
    mv: Move,
}

#[derive(Deserialize, Debug)]
struct RespondDrawPayload {
    result: DrawAnswer,
}

#[derive(Deserialize, Debug)]
struct MovesPayload {
    from: Location,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DrawAnswer {
    Accepted,
    Rejected,
}

/// A decoded request from a client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    Start { name: String, duration: Duration },
    Play { mv: Move },
    Exit,
    OfferDraw,
    RespondDraw { accepted: bool },
    Resign,
    Moves { from: Location },
}

impl ClientRequest {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|_| ProtocolError::InvalidPayload)?;

        match envelope.kind.as_str() {
            "start" => {
                let payload: StartPayload = decode(envelope.payload)?;
                if !ALLOWED_DURATIONS.contains(&payload.duration_minutes) {
                    return Err(ProtocolError::InvalidPayload);
                }
                Ok(ClientRequest::Start {
                    name: payload.name,
                    duration: Duration::from_secs(payload.duration_minutes * 60),
                })
            }
            "play" => {
                let payload: PlayPayload = decode(envelope.payload)?;
                Ok(ClientRequest::Play { mv: payload.mv })
            }
            "exit" => Ok(ClientRequest::Exit),
            "offerDraw" => Ok(ClientRequest::OfferDraw),
            "respondDraw" => {
                let payload: RespondDrawPayload = decode(envelope.payload)?;
                Ok(ClientRequest::RespondDraw {
                    accepted: payload.result == DrawAnswer::Accepted,
                })
            }
            "resign" => Ok(ClientRequest::Resign),
            "moves" => {
                let payload: MovesPayload = decode(envelope.payload)?;
                Ok(ClientRequest::Moves { from: payload.from })
            }
            _ => Err(ProtocolError::InvalidType),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(payload: serde_json::Value) -> Result<T, ProtocolError> {
    serde_json::from_value(payload).map_err(|_| ProtocolError::InvalidPayload)
}

/// Events the hub pushes to a client, serialized as `{"type": ..., "payload": ...}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Started { opponent_name: String, color: Color },

    #[serde(rename_all = "camelCase")]
    Played {
        player_id: String,
        #[serde(rename = "move")]
        mv: Move,
        clock: ClockSnapshot,
        status: String,
    },

    #[serde(rename_all = "camelCase")]
    Ended {
        winner_color: Color,
        score: u32,
        reason: Reason,
    },

    DrawOffered {},

    RespondDraw { result: DrawAnswer },

    Moves {
        from: Location,
        destinations: Vec<Location>,
    },
}

/// Message delivered to a connection actor.
#[derive(Message, Serialize, Debug, Clone, PartialEq)]
#[rtype(result = "()")]
#[serde(untagged)]
pub enum Outbound {
    Event(ServerEvent),
    Error { error: String },
}

impl Outbound {
    pub fn error(err: impl fmt::Display) -> Self {
        Outbound::Error {
            error: err.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<ServerEvent> for Outbound {
    fn from(event: ServerEvent) -> Self {
        Outbound::Event(event)
    }
}
