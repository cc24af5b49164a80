pub mod handlers;
pub mod wait_list;

use actix::prelude::*;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::HubError;
use crate::game::utils::{game_status, GAME_SCORE};
use crate::game::{Color, GameResult, Location, Move, Session, Sides};
use crate::identity::Identity;
use crate::models::{DrawAnswer, GameRecord, Outbound, PlayerRecord, ServerEvent};
use crate::storage::GameStore;

pub use wait_list::GameSetting;
use wait_list::{wait_list_key, WaitList};

/// Identifies one live connection, not a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub type GameId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Connected,
    Waiting,
    Playing(GameId),
}

struct Client {
    recipient: Recipient<Outbound>,
    identity: Identity,
    name: String,
    status: ClientStatus,
}

struct LiveGame {
    session: Session,
    players: Sides<ClientId>,
    timer: Option<SpawnHandle>,
    draw_offered_by: Option<Color>,
}

impl LiveGame {
    fn color_of(&self, id: ClientId) -> Color {
        if self.players.white == id {
            Color::White
        } else {
            Color::Black
        }
    }
}

/// A connection announces itself before sending anything else.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Register {
    pub id: ClientId,
    pub identity: Identity,
    pub recipient: Recipient<Outbound>,
}

/// The connection is gone. Leaves any wait list and forfeits any game.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Unregister {
    pub id: ClientId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinWaitList {
    pub id: ClientId,
    pub name: String,
    pub setting: GameSetting,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct LeaveWaitList {
    pub id: ClientId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Play {
    pub id: ClientId,
    pub mv: Move,
}

/// Leave the wait list, or forfeit the current game.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Exit {
    pub id: ClientId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct OfferDraw {
    pub id: ClientId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct RespondDraw {
    pub id: ClientId,
    pub accepted: bool,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Resign {
    pub id: ClientId,
}

/// Legal destinations from a square in the requester's game.
#[derive(Message)]
#[rtype(result = "()")]
pub struct PossibleMoves {
    pub id: ClientId,
    pub from: Location,
}

#[derive(Message)]
#[rtype(result = "HubStats")]
pub struct GetStats;

/// Counts served on `/stats`.
#[derive(MessageResponse, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStats {
    pub clients: usize,
    pub waiting: usize,
    pub games: usize,
}

/// Owns every client, the wait list and all live games.
///
/// Runs as a single actor, so its mailbox is the one ordered stream of events
/// that mutates this state. Clock expiry is scheduled on the same context.
pub struct Hub {
    clients: HashMap<ClientId, Client>,
    wait_list: WaitList,
    games: HashMap<GameId, LiveGame>,
    store: Arc<dyn GameStore>,
}

impl Actor for Hub {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("Session hub started");
    }
}

impl Hub {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self {
            clients: HashMap::new(),
            wait_list: WaitList::new(),
            games: HashMap::new(),
            store,
        }
    }

    fn stats(&self) -> HubStats {
        HubStats {
            clients: self.clients.len(),
            waiting: self.wait_list.len(),
            games: self.games.len(),
        }
    }

    fn send(&self, id: ClientId, msg: impl Into<Outbound>) {
        if let Some(client) = self.clients.get(&id) {
            client.recipient.do_send(msg.into());
        }
    }

    /// Reports a failed request to the requester only.
    fn reply(&self, id: ClientId, result: Result<(), HubError>) {
        if let Err(err) = result {
            warn!("Request from {} rejected: {}", id, err);
            self.send(id, Outbound::error(err));
        }
    }

    fn set_status(&mut self, id: ClientId, status: ClientStatus) {
        if let Some(client) = self.clients.get_mut(&id) {
            client.status = status;
        }
    }

    /// The requester's game and the color they play in it.
    fn locate(&self, id: ClientId) -> Result<(GameId, Color), HubError> {
        let client = self.clients.get(&id).ok_or(HubError::PlayerNotFound)?;
        let ClientStatus::Playing(game_id) = client.status else {
            return Err(HubError::NotInGame);
        };
        let game = self.games.get(&game_id).ok_or(HubError::NotInGame)?;
        Ok((game_id, game.color_of(id)))
    }

    fn join_wait_list(
        &mut self,
        id: ClientId,
        name: String,
        setting: GameSetting,
        ctx: &mut Context<Self>,
    ) -> Result<(), HubError> {
        let client = self.clients.get_mut(&id).ok_or(HubError::PlayerNotFound)?;
        match client.status {
            ClientStatus::Waiting => return Err(HubError::AlreadyWaiting),
            ClientStatus::Playing(_) => return Err(HubError::AlreadyPlaying),
            ClientStatus::Connected => {}
        }
        if !name.is_empty() {
            client.name = name;
        }

        let key = wait_list_key(&setting);
        match self.wait_list.pop(&key) {
            Some(opponent) if self.clients.contains_key(&opponent) => {
                self.start_game(opponent, id, setting, ctx);
            }
            _ => {
                self.wait_list.add(key.clone(), id)?;
                self.set_status(id, ClientStatus::Waiting);
                info!("Client {} waiting for a {} game", id, key);
            }
        }
        Ok(())
    }

    fn leave_wait_list(&mut self, id: ClientId) -> Result<(), HubError> {
        self.wait_list.remove(id)?;
        self.set_status(id, ClientStatus::Connected);
        info!("Client {} left the wait list", id);
        Ok(())
    }

    fn start_game(
        &mut self,
        white: ClientId,
        black: ClientId,
        setting: GameSetting,
        ctx: &mut Context<Self>,
    ) {
        let game_id = Uuid::new_v4();
        self.games.insert(
            game_id,
            LiveGame {
                session: Session::new(setting.duration, Instant::now()),
                players: Sides::new(white, black),
                timer: None,
                draw_offered_by: None,
            },
        );

        for (id, color, opponent) in [(white, Color::White, black), (black, Color::Black, white)] {
            self.set_status(id, ClientStatus::Playing(game_id));
            let opponent_name = self
                .clients
                .get(&opponent)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            self.send(
                id,
                ServerEvent::Started {
                    opponent_name,
                    color,
                },
            );
        }

        info!(
            "Game {} started: {} (white) vs {} (black), {}s each",
            game_id,
            white,
            black,
            setting.duration.as_secs()
        );
        self.arm_clock(game_id, ctx);
    }

    /// Schedules a wake-up for when the running clock falls, replacing any previous one.
    fn arm_clock(&mut self, game_id: GameId, ctx: &mut Context<Self>) {
        let Some(game) = self.games.get_mut(&game_id) else {
            return;
        };
        if let Some(handle) = game.timer.take() {
            ctx.cancel_future(handle);
        }
        if let Some((_, left)) = game.session.deadline(Instant::now()) {
            game.timer = Some(ctx.run_later(left, move |hub, ctx| hub.clock_fired(game_id, ctx)));
        }
    }

    fn clock_fired(&mut self, game_id: GameId, ctx: &mut Context<Self>) {
        let Some(game) = self.games.get_mut(&game_id) else {
            return;
        };
        game.timer = None;
        match game.session.flag(Instant::now()) {
            Some(result) => {
                info!("Game {} flagged", game_id);
                self.finish_game(game_id, result, ctx);
            }
            None => self.arm_clock(game_id, ctx),
        }
    }

    fn play(&mut self, id: ClientId, mv: Move, ctx: &mut Context<Self>) -> Result<(), HubError> {
        let (game_id, color) = self.locate(id)?;
        let game = self.games.get_mut(&game_id).ok_or(HubError::NotInGame)?;
        let now = Instant::now();

        if let Err(err) = game.session.play(color, mv, now) {
            // a late move may have just flagged the mover
            if let Some(result) = game.session.result() {
                self.finish_game(game_id, result, ctx);
            }
            return Err(err.into());
        }

        game.draw_offered_by = None;
        debug!("Game {} after {}:\n{}", game_id, mv, game.session.engine().board());
        let players = game.players;
        let result = game.session.result();
        let event = ServerEvent::Played {
            player_id: self
                .clients
                .get(&id)
                .map(|c| c.identity.id.clone())
                .unwrap_or_default(),
            mv,
            clock: game.session.clock(now),
            status: game_status(&game.session).to_string(),
        };

        self.send(players.white, event.clone());
        self.send(players.black, event);

        match result {
            Some(result) => self.finish_game(game_id, result, ctx),
            None => self.arm_clock(game_id, ctx),
        }
        Ok(())
    }

    fn exit(&mut self, id: ClientId, ctx: &mut Context<Self>) -> Result<(), HubError> {
        let status = self.clients.get(&id).ok_or(HubError::PlayerNotFound)?.status;
        match status {
            ClientStatus::Waiting => self.leave_wait_list(id),
            ClientStatus::Playing(_) => {
                let (game_id, color) = self.locate(id)?;
                let game = self.games.get_mut(&game_id).ok_or(HubError::NotInGame)?;
                let result = game.session.exit(color)?;
                info!("Client {} abandoned game {}", id, game_id);
                self.finish_game(game_id, result, ctx);
                Ok(())
            }
            ClientStatus::Connected => Err(HubError::NothingToExit),
        }
    }

    fn offer_draw(&mut self, id: ClientId) -> Result<(), HubError> {
        let (game_id, color) = self.locate(id)?;
        let game = self.games.get_mut(&game_id).ok_or(HubError::NotInGame)?;
        game.draw_offered_by = Some(color);
        let opponent = game.players[color.opposite()];
        self.send(opponent, ServerEvent::DrawOffered {});
        Ok(())
    }

    fn respond_draw(
        &mut self,
        id: ClientId,
        accepted: bool,
        ctx: &mut Context<Self>,
    ) -> Result<(), HubError> {
        let (game_id, color) = self.locate(id)?;
        let game = self.games.get_mut(&game_id).ok_or(HubError::NotInGame)?;
        if game.draw_offered_by != Some(color.opposite()) {
            return Err(HubError::NoDrawOffer);
        }
        game.draw_offered_by = None;
        let offerer = game.players[color.opposite()];

        if !accepted {
            self.send(offerer, ServerEvent::RespondDraw { result: DrawAnswer::Rejected });
            return Ok(());
        }
        let result = game.session.draw()?;
        self.send(offerer, ServerEvent::RespondDraw { result: DrawAnswer::Accepted });
        self.finish_game(game_id, result, ctx);
        Ok(())
    }

    fn resign(&mut self, id: ClientId, ctx: &mut Context<Self>) -> Result<(), HubError> {
        let (game_id, color) = self.locate(id)?;
        let game = self.games.get_mut(&game_id).ok_or(HubError::NotInGame)?;
        let result = game.session.resign(color)?;
        self.finish_game(game_id, result, ctx);
        Ok(())
    }

    fn possible_moves(&self, id: ClientId, from: Location) -> Result<(), HubError> {
        from.validate()?;
        let (game_id, _) = self.locate(id)?;
        let game = self.games.get(&game_id).ok_or(HubError::NotInGame)?;
        let destinations = game.session.engine().possible_moves(from).to_vec();
        self.send(id, ServerEvent::Moves { from, destinations });
        Ok(())
    }

    /// Tells both players, frees them and the clock, and records the game.
    fn finish_game(&mut self, game_id: GameId, result: GameResult, ctx: &mut Context<Self>) {
        let Some(mut game) = self.games.remove(&game_id) else {
            return;
        };
        if let Some(handle) = game.timer.take() {
            ctx.cancel_future(handle);
        }

        let event = ServerEvent::Ended {
            winner_color: result.winner,
            score: GAME_SCORE,
            reason: result.reason,
        };
        for id in [game.players.white, game.players.black] {
            self.send(id, event.clone());
            self.set_status(id, ClientStatus::Connected);
        }
        info!(
            "Game {} ended by {}, winner {}",
            game_id, result.reason, result.winner
        );
        self.persist(game_id, &game, result);
    }

    /// Only games between two authenticated users are kept.
    fn persist(&self, game_id: GameId, game: &LiveGame, result: GameResult) {
        let mut players = Vec::with_capacity(2);
        for color in [Color::White, Color::Black] {
            match self.clients.get(&game.players[color]) {
                Some(client) if client.identity.authenticated => players.push(PlayerRecord {
                    id: client.identity.id.clone(),
                    name: client.name.clone(),
                    color,
                }),
                _ => return,
            }
        }

        let record = GameRecord {
            game_id,
            players,
            winner: result.winner,
            reason: result.reason,
        };
        if let Err(err) = self.store.insert_game(record) {
            warn!("Failed to store game {}: {}", game_id, err);
        }
    }
}
