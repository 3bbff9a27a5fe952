//! Maps each inbound signaling event to the event its target receives.
//!
//! Routing is stateless: every event is resolved against the registry on its
//! own, and events for users who are not online are dropped.

use signaling::message::{ClientEvent, ServerEvent, UserId};

use super::presence::PresenceRegistry;

#[derive(Debug, PartialEq)]
pub enum Route<'a, C> {
    Forward {
        to: &'a C,
        target: UserId,
        event: ServerEvent,
    },
    Drop {
        target: UserId,
    },
}

/// `sender` is `None` for connections that did not supply a user id.
pub fn route<'a, C>(
    sender: Option<&UserId>,
    event: ClientEvent,
    registry: &'a PresenceRegistry<C>,
) -> Route<'a, C> {
    let target = event.target().clone();
    let event = outbound(sender, event);
    match registry.resolve(&target) {
        Some(to) => Route::Forward { to, target, event },
        None => Route::Drop { target },
    }
}

fn outbound(sender: Option<&UserId>, event: ClientEvent) -> ServerEvent {
    match event {
        ClientEvent::CallInitiate {
            signal_data,
            call_type,
            ..
        } => ServerEvent::IncomingCall {
            signal_data,
            from: sender.cloned(),
            call_type,
        },
        ClientEvent::CallAnswer { signal_data, .. } => ServerEvent::CallAccepted { signal_data },
        ClientEvent::CallReject { .. } => ServerEvent::CallRejected,
        ClientEvent::IceCandidate { candidate, .. } => ServerEvent::IceCandidate { candidate },
        ClientEvent::CallEnd { .. } => ServerEvent::CallEnded,
    }
}
