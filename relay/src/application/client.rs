use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web_actors::ws;
use signaling::message::{ClientEvent, UserId};
use tracing::{debug, error, info, warn};

pub use ws::start;

use super::relay::{self, Connection, ConnectionId, Relay};
use crate::settings::RelaySettings;

/// One WebSocket connection to the relay.
#[derive(Debug)]
pub struct WsClient {
    id: ConnectionId,
    user_id: Option<UserId>,
    heartbeat: Instant,
    heartbeat_interval: Duration,
    client_timeout: Duration,
    relay: Addr<Relay>,
}

impl WsClient {
    pub fn new(user_id: Option<UserId>, relay: Addr<Relay>, settings: &RelaySettings) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            heartbeat: Instant::now(),
            heartbeat_interval: settings.heartbeat_interval,
            client_timeout: settings.client_timeout,
            relay,
        }
    }

    /// helper method that sends ping to client every `heartbeat_interval`.
    ///
    /// also this method checks heartbeats from client
    fn heartbeat(&self, ctx: &mut <Self as Actor>::Context) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            // check client heartbeats
            if Instant::now().duration_since(act.heartbeat) > act.client_timeout {
                // heartbeat timed out
                error!("Websocket Client {} heartbeat failed, disconnecting!", act.id);

                // stop actor
                ctx.stop();

                return;
            }

            ctx.ping(b"");
        });
    }
}

impl Handler<relay::Deliver> for WsClient {
    type Result = ();

    fn handle(&mut self, msg: relay::Deliver, ctx: &mut Self::Context) -> Self::Result {
        match msg.0.to_json() {
            Ok(text) => ctx.text(text),
            Err(e) => error!(?e, "Could not encode event for {}", self.id),
        }
    }
}

impl Actor for WsClient {
    type Context = ws::WebsocketContext<Self>;

    /// Method is called on actor start. We start the heartbeat process here.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);

        info!("WsClient {} started as {:?}", self.id, self.user_id);
        self.relay.do_send(relay::Connect {
            connection: Connection::new(self.id, ctx.address().recipient()),
            user_id: self.user_id.clone(),
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        // notify relay
        self.relay.do_send(relay::Disconnect {
            id: self.id,
            user_id: self.user_id.clone(),
        });
        Running::Stop
    }
}

/// Handler for ws::Message message
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsClient {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        debug!(?msg);
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match ClientEvent::from_json(text.as_bytes()) {
                Ok(event) => self.relay.do_send(relay::Signal {
                    id: self.id,
                    user_id: self.user_id.clone(),
                    event,
                }),
                Err(e) => warn!("Ignoring frame from {}: {e}", self.id),
            },
            Ok(ws::Message::Binary(_)) => warn!("Ignoring binary frame from {}", self.id),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!(?e, "Protocol error on {}", self.id);
                ctx.stop();
            }
        }
    }
}
