use std::{collections::HashMap, fmt, time::Duration};

use actix::prelude::*;
use signaling::message::{ClientEvent, ServerEvent, UserId};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    calls::{CallTracker, Ring},
    dispatch::{self, Route},
    presence::PresenceRegistry,
};
use crate::settings::RelaySettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An event on its way out to one connection.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Deliver(pub ServerEvent);

/// Handle to a live connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    recipient: Recipient<Deliver>,
}

impl Connection {
    pub fn new(id: ConnectionId, recipient: Recipient<Deliver>) -> Self {
        Self { id, recipient }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues the event on the connection without waiting for it.
    pub fn deliver(&self, event: ServerEvent) {
        if !self.recipient.connected() {
            warn!("Connection {} is gone, dropping event", self.id);
            return;
        }
        self.recipient.do_send(Deliver(event));
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub connection: Connection,
    pub user_id: Option<UserId>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: ConnectionId,
    pub user_id: Option<UserId>,
}

/// A signaling event received from a connection.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Signal {
    pub id: ConnectionId,
    pub user_id: Option<UserId>,
    pub event: ClientEvent,
}

/// Owns the presence registry and relays signaling events between
/// connections. All state changes go through this actor's mailbox, one
/// message at a time.
pub struct Relay {
    registry: PresenceRegistry<Connection>,
    sessions: HashMap<ConnectionId, Connection>,
    call_tracking: bool,
    calls: CallTracker<SpawnHandle>,
    ring_timeout: Duration,
}

impl Relay {
    pub fn new(settings: &RelaySettings) -> Self {
        Self {
            registry: PresenceRegistry::new(),
            sessions: HashMap::new(),
            call_tracking: settings.call_tracking,
            calls: CallTracker::new(),
            ring_timeout: settings.ring_timeout,
        }
    }

    /// Sends the online users to every connection, named or not.
    fn broadcast_online_users(&self) {
        let users = self.registry.snapshot();
        info!("Online users: {:?}", users);
        for connection in self.sessions.values() {
            connection.deliver(ServerEvent::OnlineUsersChanged(users.clone()));
        }
    }

    fn reply(&self, id: ConnectionId, event: ServerEvent) {
        if let Some(connection) = self.sessions.get(&id) {
            connection.deliver(event);
        }
    }

    /// Forwards the event to its target. Returns whether the target was online.
    fn relay(&self, sender: Option<&UserId>, event: ClientEvent) -> bool {
        let name = event.name();
        match dispatch::route(sender, event, &self.registry) {
            Route::Forward { to, target, event } => {
                to.deliver(event);
                info!(event = name, from = ?sender, to = %target, "Relayed");
                true
            }
            Route::Drop { target } => {
                info!(event = name, from = ?sender, to = %target, "Target not found, dropped");
                false
            }
        }
    }

    fn track(
        &mut self,
        id: ConnectionId,
        sender: UserId,
        event: ClientEvent,
        ctx: &mut Context<Self>,
    ) {
        match &event {
            ClientEvent::CallInitiate { receiver_id, .. } => {
                let receiver_id = receiver_id.clone();
                let Some(callee) = self.registry.resolve(&receiver_id) else {
                    info!("Call initiation failed: {receiver_id} not online");
                    self.reply(id, ServerEvent::UserNotOnline { receiver_id });
                    return;
                };
                if self.calls.is_in_call(&receiver_id) {
                    info!("Call initiation failed: {receiver_id} already in call");
                    callee.deliver(ServerEvent::IncomingCallWhileBusy {
                        from: sender.clone(),
                    });
                    self.reply(id, ServerEvent::UserInCall { receiver_id });
                    return;
                }
                self.relay(Some(&sender), event);

                let ring = Ring::new(sender, receiver_id);
                let timer = ctx.run_later(self.ring_timeout, {
                    let ring = ring.clone();
                    move |act, _ctx| act.ring_expired(ring)
                });
                if let Some(previous) = self.calls.ring(ring, timer) {
                    ctx.cancel_future(previous);
                }
            }
            ClientEvent::CallAnswer { to, .. } => {
                let ring = Ring::new(to.clone(), sender.clone());
                if let Some(timer) = self.calls.answer(&ring) {
                    ctx.cancel_future(timer);
                }
                self.relay(Some(&sender), event);
            }
            ClientEvent::CallReject { to } => {
                let ring = Ring::new(to.clone(), sender.clone());
                if let Some(timer) = self.calls.reject(&ring) {
                    ctx.cancel_future(timer);
                }
                self.relay(Some(&sender), event);
            }
            ClientEvent::CallEnd { to } => {
                for timer in self.calls.end(&sender, to) {
                    ctx.cancel_future(timer);
                }
                self.relay(Some(&sender), event);
            }
            ClientEvent::IceCandidate { .. } => {
                self.relay(Some(&sender), event);
            }
        }
    }

    fn ring_expired(&mut self, ring: Ring) {
        if !self.calls.expire(&ring) {
            return;
        }
        info!("Call from {} to {} timed out", ring.caller, ring.callee);
        if let Some(caller) = self.registry.resolve(&ring.caller) {
            caller.deliver(ServerEvent::CallTimeout {
                receiver_id: ring.callee.clone(),
            });
        }
        if let Some(callee) = self.registry.resolve(&ring.callee) {
            callee.deliver(ServerEvent::MissedCall { from: ring.caller });
        }
    }
}

impl Actor for Relay {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(call_tracking = self.call_tracking, "Relay started");
    }
}

impl Handler<Connect> for Relay {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        let Connect {
            connection,
            user_id,
        } = msg;
        let id = connection.id();
        self.sessions.insert(id, connection.clone());

        match user_id {
            Some(user_id) => {
                info!("User connected: {user_id}, connection {id}");
                if let Some(previous) = self.registry.register(user_id.clone(), connection) {
                    warn!(
                        "{user_id} connected again, connection {} is no longer reachable",
                        previous.id()
                    );
                }
            }
            None => info!("User connected without userId, connection {id}"),
        }

        self.broadcast_online_users();
    }
}

impl Handler<Disconnect> for Relay {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, ctx: &mut Self::Context) -> Self::Result {
        self.sessions.remove(&msg.id);

        let Some(user_id) = msg.user_id else {
            debug!("Anonymous connection {} disconnected", msg.id);
            return;
        };

        // A superseded connection closing must not evict its successor.
        let current = self.registry.resolve(&user_id).map(Connection::id);
        if current == Some(msg.id) {
            self.registry.unregister(&user_id);
            for timer in self.calls.forget(&user_id) {
                ctx.cancel_future(timer);
            }
        }
        info!("User disconnected: {user_id}");

        self.broadcast_online_users();
    }
}

impl Handler<Signal> for Relay {
    type Result = ();

    fn handle(&mut self, msg: Signal, ctx: &mut Self::Context) -> Self::Result {
        let Signal { id, user_id, event } = msg;
        debug!(connection = %id, ?event);
        match user_id {
            Some(sender) if self.call_tracking => self.track(id, sender, event, ctx),
            sender => {
                self.relay(sender.as_ref(), event);
            }
        }
    }
}
