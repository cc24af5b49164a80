use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, info, warn};
use std::fmt;

use crate::hub::{ClientId, Hub, Register, Unregister};
use crate::identity::Identity;
use crate::models::{AppState, ClientRequest, Outbound};

/// WebSocket connection of one player
pub struct ChessWebSocket {
    pub id: ClientId,
    pub identity: Identity,
    pub hub: Addr<Hub>,
}

impl ChessWebSocket {
    pub fn new(identity: Identity, hub: Addr<Hub>) -> Self {
        Self {
            id: ClientId::new(),
            identity,
            hub,
        }
    }

    pub(crate) fn send_error(&self, err: impl fmt::Display, ctx: &mut ws::WebsocketContext<Self>) {
        match Outbound::error(err).to_json() {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Error serializing error frame: {}", e),
        }
    }
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hub.do_send(Register {
            id: self.id,
            identity: self.identity.clone(),
            recipient: ctx.address().recipient(),
        });
        info!(
            "WebSocket connection started: {} ({})",
            self.id, self.identity.name
        );
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.hub.do_send(Unregister { id: self.id });
        info!("WebSocket connection closed: {}", self.id);
        Running::Stop
    }
}

impl Handler<Outbound> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        match msg.to_json() {
            Ok(text) => {
                debug!("Forwarding message to client {}: {}", self.id, text);
                ctx.text(text);
            }
            Err(e) => warn!("Error serializing message for {}: {}", self.id, e),
        }
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                debug!("Received text message from {}: {}", self.id, text);
                match ClientRequest::parse(&text) {
                    Ok(request) => self.handle_request(request, ctx),
                    Err(e) => {
                        warn!("Error parsing client message from {}: {}", self.id, e);
                        self.send_error(e, ctx);
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                self.send_error("binary messages are not supported", ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection {} closed: {:?}", self.id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!("WebSocket protocol error on {}: {}", self.id, e);
                ctx.stop();
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let identity = state.identity.identify(&req);
    let ws = ChessWebSocket::new(identity, state.hub.clone());
    info!("New WebSocket connection: {}", ws.id);
    ws::start(ws, &req, stream)
}
