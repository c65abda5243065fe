//! Delivery of filtered posts to a publishing destination.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::SenderConfig;
use crate::error::{ConfigError, DeliveryError, SenderError};
use crate::post::{Post, PostKind};

mod tumblr;

pub use tumblr::Tumblr;

/// What a destination answered, before it gets turned into a status line.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

pub trait Destination: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `post` below has a handler for this kind.
    fn supports(&self, kind: PostKind) -> bool;

    /// Publishes one post. Only called for supported kinds.
    fn post(&self, post: &Post) -> Result<RawResponse, DeliveryError>;

    /// Public url of a created post, from the success response body.
    fn permalink(&self, body: &str) -> String;
}

pub type DestinationFactory =
    Box<dyn Fn(&SenderConfig, &Client) -> Result<Box<dyn Destination>, ConfigError> + Send + Sync>;

#[derive(Default)]
pub struct SenderRegistry {
    destinations: Vec<(String, DestinationFactory)>,
}

impl SenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, destination: &str, factory: F) -> &mut Self
    where
        F: Fn(&SenderConfig, &Client) -> Result<Box<dyn Destination>, ConfigError> + Send + Sync + 'static,
    {
        self.destinations.push((destination.to_string(), Box::new(factory)));
        self
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.destinations.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("tumblr", |config, http| {
            Ok(Box::new(Tumblr::from_config(config, http.clone())?))
        });
        registry
    }
}

pub struct BotSender {
    destination: Box<dyn Destination>,
}

impl BotSender {
    /// Fails right away on an unknown destination or missing destination fields.
    pub fn new(config: &SenderConfig, registry: &SenderRegistry, http: &Client) -> Result<Self, ConfigError> {
        let factory = registry
            .destinations
            .iter()
            .find(|(name, _)| *name == config.destination)
            .map(|(_, factory)| factory)
            .ok_or_else(|| ConfigError::UnknownDestination(config.destination.clone()))?;

        Ok(Self::with_destination(factory(config, http)?))
    }

    pub fn with_destination(destination: Box<dyn Destination>) -> Self {
        Self { destination }
    }

    /// Destination type name.
    pub fn kind(&self) -> &'static str {
        self.destination.name()
    }

    /// Posts and describes the outcome. Post failures end up in the returned
    /// text; only a kind the destination can't handle is an `Err`.
    pub fn deliver(&self, post: Option<&Post>) -> Result<Option<String>, SenderError> {
        let post = match post {
            Some(post) => post,
            None => return Ok(None),
        };

        let kind = post.kind();
        if !self.destination.supports(kind) {
            return Err(SenderError::UnsupportedKind { destination: self.destination.name(), kind });
        }

        let response = self.destination.post(post);
        Ok(Some(self.handle_response(response, post)))
    }

    pub fn handle_response(&self, response: Result<RawResponse, DeliveryError>, post: &Post) -> String {
        let kind = post.kind().in_words();
        let detail = match response {
            Ok(response) if response.status.is_success() => {
                let permalink = self.destination.permalink(&response.body);
                info!(poster = %post.poster, kind = %kind, url = %permalink, "post created");
                return format!("created {} for {} at {}", kind, post.poster, permalink);
            }
            Ok(response) => response.status.to_string(),
            Err(e) => e.to_string(),
        };
        warn!(poster = %post.poster, kind = %kind, error = %detail, "post failed");
        format!("encountered error: [{}] when trying to post {} for {}", detail, kind, post.poster)
    }
}
