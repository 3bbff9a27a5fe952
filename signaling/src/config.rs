use url::Url;

/// Where a [`SignalingSocket`](crate::SignalingSocket) connects to and as whom.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    pub address: String,
    pub port: u16,
    pub user: Option<String>,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            user: None,
        }
    }
}

impl SocketConfig {
    pub fn base_url(&self) -> String {
        format!("ws://{}:{}/ws", self.address, self.port)
    }

    /// WebSocket url with the user id in the `userId` query parameter.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        match &self.user {
            Some(user) => Url::parse_with_params(&self.base_url(), &[("userId", user)]),
            None => Url::parse(&self.base_url()),
        }
    }
}

#[derive(Default)]
pub struct SocketConfigBuilder {
    config: SocketConfig,
}

impl SocketConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> SocketConfig {
        self.config
    }

    pub fn address<S: AsRef<str>>(mut self, address: S) -> Self {
        self.config.address = address.as_ref().to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn user<S: AsRef<str>>(mut self, user: S) -> Self {
        self.config.user = Some(user.as_ref().to_string());
        self
    }
}
