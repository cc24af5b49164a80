use actix_web_actors::ws;
use log::info;

use crate::hub::{
    Exit, GameSetting, JoinWaitList, OfferDraw, Play, PossibleMoves, RespondDraw, Resign,
};
use crate::models::ClientRequest;
use crate::websocket::handler::ChessWebSocket;

impl ChessWebSocket {
    /// Forwards a decoded request to the hub. Replies arrive later as `Outbound` messages.
    pub fn handle_request(&mut self, request: ClientRequest, _ctx: &mut ws::WebsocketContext<Self>) {
        let id = self.id;
        match request {
            ClientRequest::Start { name, duration } => {
                info!(
                    "Client {} looking for a {}s game",
                    id,
                    duration.as_secs()
                );
                self.hub.do_send(JoinWaitList {
                    id,
                    name,
                    setting: GameSetting { duration },
                });
            }
            ClientRequest::Play { mv } => {
                info!("Client {} plays {}", id, mv);
                self.hub.do_send(Play { id, mv });
            }
            ClientRequest::Exit => self.hub.do_send(Exit { id }),
            ClientRequest::OfferDraw => self.hub.do_send(OfferDraw { id }),
            ClientRequest::RespondDraw { accepted } => {
                self.hub.do_send(RespondDraw { id, accepted })
            }
            ClientRequest::Resign => self.hub.do_send(Resign { id }),
            ClientRequest::Moves { from } => self.hub.do_send(PossibleMoves { id, from }),
        }
    }
}
