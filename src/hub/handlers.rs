use actix::prelude::*;
use log::{info, warn};

use super::{
    Client, ClientStatus, Exit, GetStats, Hub, HubStats, JoinWaitList, LeaveWaitList, OfferDraw,
    Play, PossibleMoves, Register, RespondDraw, Resign, Unregister,
};

impl Handler<Register> for Hub {
    type Result = ();

    fn handle(&mut self, msg: Register, _ctx: &mut Self::Context) {
        let name = msg.identity.name.clone();
        self.clients.insert(
            msg.id,
            Client {
                recipient: msg.recipient,
                identity: msg.identity,
                name,
                status: ClientStatus::Connected,
            },
        );
        info!("Client {} registered", msg.id);
        info!("Total connected clients: {}", self.clients.len());
    }
}

impl Handler<Unregister> for Hub {
    type Result = ();

    fn handle(&mut self, msg: Unregister, ctx: &mut Self::Context) {
        let Some(status) = self.clients.get(&msg.id).map(|c| c.status) else {
            return;
        };
        if status != ClientStatus::Connected {
            if let Err(err) = self.exit(msg.id, ctx) {
                warn!("Cleanup for client {} failed: {}", msg.id, err);
            }
        }
        self.clients.remove(&msg.id);
        info!("Client {} unregistered", msg.id);
        info!("Total connected clients: {}", self.clients.len());
    }
}

impl Handler<JoinWaitList> for Hub {
    type Result = ();

    fn handle(&mut self, msg: JoinWaitList, ctx: &mut Self::Context) {
        let result = self.join_wait_list(msg.id, msg.name, msg.setting, ctx);
        self.reply(msg.id, result);
    }
}

impl Handler<LeaveWaitList> for Hub {
    type Result = ();

    fn handle(&mut self, msg: LeaveWaitList, _ctx: &mut Self::Context) {
        let result = self.leave_wait_list(msg.id);
        self.reply(msg.id, result);
    }
}

impl Handler<Play> for Hub {
    type Result = ();

    fn handle(&mut self, msg: Play, ctx: &mut Self::Context) {
        let result = self.play(msg.id, msg.mv, ctx);
        self.reply(msg.id, result);
    }
}

impl Handler<Exit> for Hub {
    type Result = ();

    fn handle(&mut self, msg: Exit, ctx: &mut Self::Context) {
        let result = self.exit(msg.id, ctx);
        self.reply(msg.id, result);
    }
}

impl Handler<OfferDraw> for Hub {
    type Result = ();

    fn handle(&mut self, msg: OfferDraw, _ctx: &mut Self::Context) {
        let result = self.offer_draw(msg.id);
        self.reply(msg.id, result);
    }
}

impl Handler<RespondDraw> for Hub {
    type Result = ();

    fn handle(&mut self, msg: RespondDraw, ctx: &mut Self::Context) {
        let result = self.respond_draw(msg.id, msg.accepted, ctx);
        self.reply(msg.id, result);
    }
}

impl Handler<Resign> for Hub {
    type Result = ();

    fn handle(&mut self, msg: Resign, ctx: &mut Self::Context) {
        let result = self.resign(msg.id, ctx);
        self.reply(msg.id, result);
    }
}

impl Handler<PossibleMoves> for Hub {
    type Result = ();

    fn handle(&mut self, msg: PossibleMoves, _ctx: &mut Self::Context) {
        let result = self.possible_moves(msg.id, msg.from);
        self.reply(msg.id, result);
    }
}

impl Handler<GetStats> for Hub {
    type Result = HubStats;

    fn handle(&mut self, _msg: GetStats, _ctx: &mut Self::Context) -> HubStats {
        self.stats()
    }
}
