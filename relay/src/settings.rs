use std::{env, str::FromStr, time::Duration};

use dotenv::dotenv;

#[derive(Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub relay: RelaySettings,
}

#[derive(Debug, serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// How often heartbeat pings are sent
    pub heartbeat_interval: Duration,
    /// How long before lack of client response causes a timeout
    pub client_timeout: Duration,
    /// Track who is in a call and time out unanswered calls.
    pub call_tracking: bool,
    pub ring_timeout: Duration,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(10),
            call_tracking: false,
            ring_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl Settings {
    /// Reads settings from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let application = ApplicationSettings::default();
        let relay = RelaySettings::default();
        Ok(Self {
            application: ApplicationSettings {
                host: lookup("HOST").unwrap_or(application.host),
                port: parse(&lookup, "PORT", application.port)?,
            },
            relay: RelaySettings {
                heartbeat_interval: seconds(
                    &lookup,
                    "RELAY_HEARTBEAT_INTERVAL_SECS",
                    relay.heartbeat_interval,
                )?,
                client_timeout: seconds(
                    &lookup,
                    "RELAY_CLIENT_TIMEOUT_SECS",
                    relay.client_timeout,
                )?,
                call_tracking: parse(&lookup, "RELAY_CALL_TRACKING", relay.call_tracking)?,
                ring_timeout: seconds(&lookup, "RELAY_RING_TIMEOUT_SECS", relay.ring_timeout)?,
            },
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(SettingsError::Invalid { key, value }),
    }
}

fn seconds<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    parse(lookup, key, default.as_secs()).map(Duration::from_secs)
}
