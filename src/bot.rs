//! Glues parser, filters and sender together for one IRC identity.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::ConfigError;
use crate::filters::{FilterChain, FilterRegistry};
use crate::formats::FormatRegistry;
use crate::parser::Parser;
use crate::post::Post;
use crate::senders::{BotSender, SenderRegistry};

lazy_static! {
    static ref HELP: Regex = Regex::new(r"^\s*!help(?:\s+(\S+))?\s*$").unwrap();
}

pub struct Bot {
    nick: String,
    address_required_channels: Vec<String>,
    parser: Parser,
    filters: FilterChain,
    sender: BotSender,
}

impl Bot {
    pub fn new(
        nick: &str,
        address_required_channels: &[String],
        parser: Parser,
        filters: FilterChain,
        sender: BotSender,
    ) -> Self {
        Self {
            nick: nick.to_string(),
            address_required_channels: address_required_channels.to_vec(),
            parser,
            filters,
            sender,
        }
    }

    /// Builds the whole pipeline from the standard registries.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::with_registries(
            config,
            Arc::new(FormatRegistry::standard()),
            &FilterRegistry::standard(),
            &SenderRegistry::standard(),
        )
    }

    pub fn with_registries(
        config: &Config,
        formats: Arc<FormatRegistry>,
        filters: &FilterRegistry,
        senders: &SenderRegistry,
    ) -> Result<Self, ConfigError> {
        let http = crate::http::client(config.http_timeout())?;
        let sender = BotSender::new(&config.sender_configuration()?, senders, &http)?;
        let filters = FilterChain::new(filters, &config.filters, &http)?;

        Ok(Self::new(
            &config.nick,
            &config.address_required_channels,
            Parser::new(formats),
            filters,
            sender,
        ))
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn sender(&self) -> &BotSender {
        &self.sender
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// The rest of `text` after a leading `nick:`, any case, any spacing.
    fn strip_address<'a>(&self, text: &'a str) -> Option<&'a str> {
        let head = text.get(..self.nick.len())?;
        if !head.eq_ignore_ascii_case(&self.nick) {
            return None;
        }
        text[self.nick.len()..]
            .trim_start()
            .strip_prefix(':')
            .map(str::trim_start)
    }

    fn requires_address(&self, channel: &str) -> bool {
        self.address_required_channels
            .iter()
            .any(|c| c.eq_ignore_ascii_case(channel))
    }

    /// Parses and filters a line without delivering it.
    pub fn prepare(&self, nick: &str, channel: &str, text: &str) -> Option<Post> {
        let post = self.parser.parse(nick, channel, text)?;
        debug!(%nick, %channel, kind = %post.kind(), "parsed post");
        self.filters.process(post)
    }

    /// Handles one channel line and returns what should be said back to
    /// the channel, if anything.
    pub fn did_receive_channel_message(&self, nick: &str, channel: &str, text: &str) -> Vec<String> {
        let text = if self.requires_address(channel) {
            match self.strip_address(text) {
                Some(rest) => rest,
                None if HELP.is_match(text) => text,
                None => return Vec::new(),
            }
        } else {
            text
        };

        if let Some(c) = HELP.captures(text) {
            return self.help(c.get(1).map(|m| m.as_str()));
        }

        let post = match self.prepare(nick, channel, text) {
            Some(post) => post,
            None => {
                debug!(%nick, %channel, "nothing to post");
                return Vec::new();
            }
        };

        match self.sender.deliver(Some(&post)) {
            Ok(reply) => reply.into_iter().collect(),
            Err(e) => {
                error!(%nick, %channel, "{}", e);
                Vec::new()
            }
        }
    }

    /// Format list, or the description of one format.
    pub fn help(&self, topic: Option<&str>) -> Vec<String> {
        let formats = self.parser.formats();
        let topic = match topic {
            Some(topic) => topic,
            None => return vec![format!("Known formats: {}", formats.names().join(", "))],
        };

        match formats.find(topic) {
            Some(format) => match format.description() {
                Some(description) => description
                    .lines()
                    .map(|line| format!("{}: {}", format.name(), line))
                    .collect(),
                None => vec![format!("{}: no description available", format.name())],
            },
            None => vec![format!("Format '{}' unknown", topic)],
        }
    }
}
