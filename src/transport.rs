//! IRC side of the bot: an `irc` crate client feeding channel messages to a
//! [`Bot`] and sending its answers back.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use irc::client::prelude::{Client, Command, Config as ClientConfig, Message, Response};
use irc::client::ClientStream;
use tokio::task;
use tracing::{error, info};

use crate::bot::Bot;
use crate::config::Config;
use crate::error::IrcError;

pub const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Leaves room for `:nick!user@host PRIVMSG #channel :` in a 512 byte line.
pub const MAX_REPLY_BYTES: usize = 400;

pub fn client_config(config: &Config) -> ClientConfig {
    ClientConfig {
        nickname: Some(config.nick.clone()),
        username: Some(config.username().to_string()),
        realname: Some(config.realname().to_string()),
        server: Some(config.server.clone()),
        port: Some(config.port),
        use_tls: Some(config.use_tls),
        channels: config.channels.clone(),
        ..ClientConfig::default()
    }
}

/// Someone talking in a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMessage {
    pub nick: String,
    pub channel: String,
    pub text: String,
}

impl ChannelMessage {
    /// `None` for anything but a PRIVMSG to a channel.
    pub fn from_message(message: &Message) -> Option<Self> {
        match &message.command {
            Command::PRIVMSG(target, text) if target.starts_with(['#', '&']) => Some(Self {
                nick: message.source_nickname()?.to_string(),
                channel: target.clone(),
                text: text.clone(),
            }),
            _ => None,
        }
    }
}

/// Splits a reply into lines that are safe to send as PRIVMSG text: no
/// CR, LF or NUL inside, nothing blank, nothing over [`MAX_REPLY_BYTES`].
pub fn reply_lines(text: &str) -> Vec<String> {
    text.split(['\r', '\n', '\0'])
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .flat_map(|line| split_long(line, MAX_REPLY_BYTES))
        .collect()
}

/// Cuts at the last space that fits, or mid-word when there is none.
fn split_long(line: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = line;
    while rest.len() > max {
        let mut cut = max;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if let Some(space) = rest[..cut].rfind(' ').filter(|&at| at > 0) {
            cut = space;
        }
        let piece = rest[..cut].trim_end();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        rest = rest[cut..].trim_start();
    }
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

async fn await_welcome(stream: &mut ClientStream) -> Result<(), IrcError> {
    while let Some(message) = stream.next().await.transpose()? {
        if let Command::Response(Response::RPL_WELCOME, _) = message.command {
            return Ok(());
        }
    }
    Err(IrcError::Closed)
}

/// Connects, registers and then feeds channel messages to the bot one at a
/// time until the connection goes away. Channels are joined by the client
/// once the server is done greeting.
pub async fn run(bot: Arc<Bot>, config: &Config) -> Result<(), IrcError> {
    let mut client = Client::from_config(client_config(config)).await?;
    info!(server = %config.server, port = config.port, "connected");
    client.identify()?;

    let mut stream = client.stream()?;
    tokio::time::timeout(REGISTRATION_TIMEOUT, await_welcome(&mut stream))
        .await
        .map_err(|_| IrcError::RegistrationTimeout)??;
    info!(nick = %config.nick, "registered");

    while let Some(message) = stream.next().await.transpose()? {
        let message = match ChannelMessage::from_message(&message) {
            Some(message) => message,
            None => continue,
        };
        let channel = message.channel.clone();

        let handler = bot.clone();
        let replies = task::spawn_blocking(move || {
            handler.did_receive_channel_message(&message.nick, &message.channel, &message.text)
        })
        .await;

        match replies {
            Ok(replies) => {
                for line in replies.iter().flat_map(|reply| reply_lines(reply)) {
                    client.send_privmsg(&channel, line)?;
                }
            }
            Err(e) => error!(%channel, "message handler failed: {}", e),
        }
    }

    Err(IrcError::Closed)
}
