use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::http::DEFAULT_TIMEOUT_SECS;

/// One bot: where it connects, who it is, and where posts go.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub use_tls: bool,

    pub nick: String,
    pub realname: Option<String>,
    pub username: Option<String>,

    #[serde(default)]
    pub channels: Vec<String>,
    /// Channels where the bot only reacts to lines starting with `nick:`.
    #[serde(default)]
    pub address_required_channels: Vec<String>,

    pub active_sender: Option<String>,
    pub senders: Option<HashMap<String, Value>>,

    /// Per filter options, keyed by filter name.
    #[serde(default)]
    pub filters: HashMap<String, Value>,

    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,
}

fn default_port() -> u16 {
    6667
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// The active sender's sub-tree, `destination` included.
#[derive(Clone, Debug, PartialEq)]
pub struct SenderConfig {
    pub destination: String,
    pub fields: Value,
}

impl Config {
    /// Reads YAML for `.yml`/`.yaml` files and TOML for anything else.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );
        if yaml {
            Self::from_yaml(&text)
        } else {
            Self::from_toml(&text)
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<Self>(text)?.normalized())
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str::<Self>(text)?.normalized())
    }

    fn normalized(mut self) -> Self {
        self.realname.get_or_insert_with(|| self.nick.clone());
        self.username.get_or_insert_with(|| self.nick.clone());
        self.channels = self.channels.iter().map(|c| channel_name(c)).collect();
        self.address_required_channels = self
            .address_required_channels
            .iter()
            .map(|c| channel_name(c))
            .collect();
        self
    }

    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nick)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn sender_configuration(&self) -> Result<SenderConfig, ConfigError> {
        let active = self.active_sender.as_ref().ok_or(ConfigError::MissingActiveSender)?;
        let senders = self.senders.as_ref().ok_or(ConfigError::MissingSenders)?;
        let fields = senders
            .get(active)
            .filter(|fields| !fields.is_null())
            .ok_or_else(|| ConfigError::UnknownActiveSender(active.clone()))?;
        let destination = fields
            .get("destination")
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigError::MissingDestination(active.clone()))?;

        Ok(SenderConfig {
            destination: destination.to_string(),
            fields: fields.clone(),
        })
    }
}

/// `foo` and `#foo` both name `#foo`.
pub fn channel_name(name: &str) -> String {
    if name.starts_with('#') {
        name.to_string()
    } else {
        format!("#{}", name)
    }
}
