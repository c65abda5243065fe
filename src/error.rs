//! Error types shared across the bot.
//!
//! Configuration problems fail fast when things are built. Delivery and
//! fetch failures never show up here as panics or propagated errors past
//! the boundary where they happen; they become status strings or fallbacks.

use std::io;

use thiserror::Error;

use crate::post::PostKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("bot configuration should include an active_sender option")]
    MissingActiveSender,

    #[error("bot configuration should include a list of senders")]
    MissingSenders,

    #[error("bot configuration doesn't have a senders entry for active_sender [{0}]")]
    UnknownActiveSender(String),

    #[error("bot configuration doesn't have a destination type for active_sender [{0}]")]
    MissingDestination(String),

    #[error("unknown destination type [{0}]")]
    UnknownDestination(String),

    #[error("invalid {destination} sender configuration: {source}")]
    InvalidSender {
        destination: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid options for filter {filter}: {source}")]
    InvalidFilterOptions {
        filter: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pattern {pattern:?} for filter {filter}: {source}")]
    InvalidPattern {
        filter: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Dispatch time misconfiguration, reported to whoever called `deliver`.
#[derive(Debug, Error)]
pub enum SenderError {
    #[error("destination {destination} cannot post {kind} posts")]
    UnsupportedKind {
        destination: &'static str,
        kind: PostKind,
    },
}

/// A post that didn't make it. Always rendered into a status string.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

/// A page that could not be read.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("reading body: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum IrcError {
    #[error("irc client error: {0}")]
    Client(#[from] irc::error::Error),

    #[error("connection closed by server")]
    Closed,

    #[error("timed out waiting for registration")]
    RegistrationTimeout,
}
