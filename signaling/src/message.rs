use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Identity a client claims when it connects. Never validated.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed signaling frame: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode signaling frame: {0}")]
    Encode(#[source] serde_json::Error),
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(bytes).map_err(Error::Decode)
}

fn encode<T: Serialize>(msg: &T) -> Result<String, Error> {
    serde_json::to_string(msg).map_err(Error::Encode)
}

/// Events a client sends to the relay.
///
/// On the wire every frame is `{"event": <name>, "data": {...}}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "callUser", rename_all = "camelCase")]
    CallInitiate {
        receiver_id: UserId,
        signal_data: Value,
        call_type: String,
    },
    #[serde(rename = "answerCall", rename_all = "camelCase")]
    CallAnswer { to: UserId, signal_data: Value },
    #[serde(rename = "rejectCall")]
    CallReject { to: UserId },
    #[serde(rename = "iceCandidate")]
    IceCandidate { to: UserId, candidate: Value },
    #[serde(rename = "endCall")]
    CallEnd { to: UserId },
}

impl ClientEvent {
    pub fn from_json<B: AsRef<[u8]>>(bytes: B) -> Result<Self, Error> {
        decode(bytes.as_ref())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        encode(self)
    }

    /// The user this event is addressed to.
    pub fn target(&self) -> &UserId {
        match self {
            ClientEvent::CallInitiate { receiver_id, .. } => receiver_id,
            ClientEvent::CallAnswer { to, .. }
            | ClientEvent::CallReject { to }
            | ClientEvent::IceCandidate { to, .. }
            | ClientEvent::CallEnd { to } => to,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CallInitiate { .. } => "callUser",
            ClientEvent::CallAnswer { .. } => "answerCall",
            ClientEvent::CallReject { .. } => "rejectCall",
            ClientEvent::IceCandidate { .. } => "iceCandidate",
            ClientEvent::CallEnd { .. } => "endCall",
        }
    }
}

/// Events the relay sends to a client.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "getOnlineUsers")]
    OnlineUsersChanged(Vec<UserId>),
    /// `from` is `None` when the caller connected without a user id.
    #[serde(rename = "incomingCall", rename_all = "camelCase")]
    IncomingCall {
        signal_data: Value,
        from: Option<UserId>,
        call_type: String,
    },
    #[serde(rename = "callAccepted", rename_all = "camelCase")]
    CallAccepted { signal_data: Value },
    #[serde(rename = "callRejected")]
    CallRejected,
    #[serde(rename = "iceCandidate")]
    IceCandidate { candidate: Value },
    #[serde(rename = "callEnded")]
    CallEnded,

    // Only sent when the relay tracks call state.
    #[serde(rename = "userNotOnline", rename_all = "camelCase")]
    UserNotOnline { receiver_id: UserId },
    #[serde(rename = "userInCall", rename_all = "camelCase")]
    UserInCall { receiver_id: UserId },
    #[serde(rename = "incomingCallWhileBusy")]
    IncomingCallWhileBusy { from: UserId },
    #[serde(rename = "callTimeout", rename_all = "camelCase")]
    CallTimeout { receiver_id: UserId },
    #[serde(rename = "missedCall")]
    MissedCall { from: UserId },
}

impl ServerEvent {
    pub fn from_json<B: AsRef<[u8]>>(bytes: B) -> Result<Self, Error> {
        decode(bytes.as_ref())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        encode(self)
    }
}
