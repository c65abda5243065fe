use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::bot::Bot;
use crate::config::Config;
use crate::filters::{FilterChain, FilterRegistry};
use crate::formats::FormatRegistry;

mod bot;
mod config;
mod error;
mod filters;
mod formats;
mod http;
mod parser;
mod post;
mod senders;
mod transport;

const DEFAULT_CONFIG: &str = "autumn.toml";

#[derive(Parser)]
#[clap(version, about)]
struct Args {
    /// Log filter such as `debug` or `autumn_leaves=trace`. Overrides RUST_LOG.
    #[clap(long, value_parser, global = true)]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Connect and start reposting. One bot per config file.
    Run {
        /// Toml or yaml configuration. May be given several times.
        #[clap(short, long, value_parser)]
        config: Vec<String>,
    },

    /// Load a configuration and build its pipeline without connecting.
    Check {
        #[clap(short, long, value_parser, default_value = DEFAULT_CONFIG)]
        config: String,
    },

    /// Show what a channel line would be posted as. Nothing gets posted.
    Parse {
        #[clap(short, long, value_parser, default_value = DEFAULT_CONFIG)]
        config: String,

        /// Also run the configured filters. May fetch the linked page.
        #[clap(long, value_parser, default_value_t = false)]
        filter: bool,

        #[clap(value_parser)]
        nick: String,
        #[clap(value_parser)]
        channel: String,
        #[clap(value_parser)]
        text: String,
    },
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    match args.command.unwrap_or(Command::Run { config: Vec::new() }) {
        Command::Run { config } => run(config),
        Command::Check { config } => check(&config),
        Command::Parse { config, filter, nick, channel, text } => {
            parse(&config, filter, &nick, &channel, &text)
        }
    }
}

fn load(path: &str) -> anyhow::Result<(Config, Bot)> {
    let config = Config::load(path).with_context(|| format!("failed to load {}", path))?;
    let bot = Bot::from_config(&config).with_context(|| format!("failed to set up bot from {}", path))?;
    Ok((config, bot))
}

fn run(paths: Vec<String>) -> anyhow::Result<()> {
    let paths = if paths.is_empty() { vec![DEFAULT_CONFIG.to_string()] } else { paths };

    let mut bots = Vec::new();
    for path in &paths {
        let (config, bot) = load(path)?;
        info!(%path, server = %config.server, nick = %config.nick, "bot configured");
        bots.push((config, Arc::new(bot)));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let results = runtime.block_on(join_all(bots.iter().map(|(config, bot)| async move {
        let result = transport::run(bot.clone(), config).await;
        if let Err(e) = &result {
            error!(server = %config.server, nick = %config.nick, "bot stopped: {}", e);
        }
        result
    })));

    // The bots hold blocking http clients, which must not be dropped inside the runtime.
    drop(runtime);
    drop(bots);

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        bail!("{} of {} bots stopped with an error", failed, results.len());
    }
    Ok(())
}

fn check(path: &str) -> anyhow::Result<()> {
    let (config, bot) = load(path)?;

    println!("{} on {}:{} as {}", path, config.server, config.port, bot.nick());
    println!("channels: {}", config.channels.join(", "));
    if !config.address_required_channels.is_empty() {
        println!("address required in: {}", config.address_required_channels.join(", "));
    }
    println!("sender: {}", bot.sender().kind());
    println!("filters: {}", bot.filters().names().join(", "));
    println!("{}", bot.help(None).concat());
    Ok(())
}

fn parse(path: &str, filter: bool, nick: &str, channel: &str, text: &str) -> anyhow::Result<()> {
    let parser = parser::Parser::new(Arc::new(FormatRegistry::standard()));
    let mut post = parser.parse(nick, channel, text);

    if filter {
        let config = Config::load(path).with_context(|| format!("failed to load {}", path))?;
        let http = http::client(config.http_timeout()).context("failed to build http client")?;
        let chain = FilterChain::new(&FilterRegistry::standard(), &config.filters, &http)?;
        post = post.and_then(|post| chain.process(post));
    }

    match post {
        Some(post) => println!("{}", serde_json::to_string_pretty(&post)?),
        None => println!("no post"),
    }
    Ok(())
}
