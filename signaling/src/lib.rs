pub use awc::ws;
use awc::{ws::Codec, BoxedSocket, ClientResponse};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::message::{ClientEvent, ServerEvent};

pub mod config;
pub mod message;

pub use config::{SocketConfig, SocketConfigBuilder};

/// Client side of a relay connection.
pub struct SignalingSocket {
    user: Option<String>,
    ws: actix_codec::Framed<BoxedSocket, Codec>,
}

impl std::fmt::Debug for SignalingSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalingSocket")
            .field("user", &self.user)
            .finish()
    }
}

impl SignalingSocket {
    pub async fn connect(config: &SocketConfig) -> anyhow::Result<Self> {
        let (res, ws) = SignalingSocket::open(config).await?;
        debug!(status = ?res.status());
        info!("Connected to relay as {:?}", config.user);
        Ok(Self {
            user: config.user.clone(),
            ws,
        })
    }

    pub async fn open(
        config: &SocketConfig,
    ) -> Result<(ClientResponse, actix_codec::Framed<BoxedSocket, Codec>), anyhow::Error> {
        let url = config.url()?;
        awc::Client::new()
            .ws(url.as_str())
            .connect()
            .await
            .map_err(|e| anyhow::anyhow!("Client error: {}", e))
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub async fn send(&mut self, event: &ClientEvent) -> anyhow::Result<()> {
        self.send_text(event.to_json()?).await
    }

    pub async fn send_text(&mut self, msg: String) -> anyhow::Result<()> {
        Ok(self.ws.send(ws::Message::Text(msg.into())).await?)
    }

    /// Waits for the next relay event, answering pings on the way.
    ///
    /// Returns `Ok(None)` once the relay closes the connection.
    pub async fn next_event(&mut self) -> anyhow::Result<Option<ServerEvent>> {
        while let Some(frame) = self.ws.next().await {
            match frame? {
                ws::Frame::Text(msg) => return Ok(Some(ServerEvent::from_json(&msg)?)),
                ws::Frame::Ping(msg) => self.ws.send(ws::Message::Pong(msg)).await?,
                ws::Frame::Pong(_) => {}
                ws::Frame::Close(reason) => {
                    debug!(?reason, "Relay closed the connection");
                    return Ok(None);
                }
                ws::Frame::Binary(_) | ws::Frame::Continuation(_) => {
                    warn!("Ignoring non-text frame from relay")
                }
            }
        }
        Ok(None)
    }

    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.send(ws::Message::Close(None)).await?;
        Ok(())
    }
}
