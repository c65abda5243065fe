//! Ordered post filters.
//!
//! Every filter gets the whole post and hands back a possibly changed post,
//! or `None` to veto it. A veto stops the chain on the spot.

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::ConfigError;
use crate::post::Post;

mod ignore_nicks;
mod ignore_patterns;
mod link_entity_cleanup;
mod link_image;
mod link_name_cleanup;
mod link_title;
mod poster_info;
mod youtube_domain_fix;
mod youtube_param_fix;

pub use ignore_nicks::IgnoreNicks;
pub use ignore_patterns::IgnorePatterns;
pub use link_entity_cleanup::LinkEntityCleanup;
pub use link_image::LinkImage;
pub use link_name_cleanup::LinkNameCleanup;
pub use link_title::LinkTitle;
pub use poster_info::PosterInfo;
pub use youtube_domain_fix::YoutubeDomainFix;
pub use youtube_param_fix::YoutubeParamFix;

pub trait Filter: Send + Sync {
    /// `None` vetoes the post.
    fn process(&self, post: Post) -> Option<Post>;
}

/// What a filter gets to see while being built.
pub struct FilterContext<'a> {
    name: &'a str,
    options: Option<&'a Value>,
    http: &'a Client,
}

impl<'a> FilterContext<'a> {
    pub fn new(name: &'a str, options: Option<&'a Value>, http: &'a Client) -> Self {
        Self { name, options, http }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// This filter's own options sub-tree. Missing options give the default.
    pub fn options<T: DeserializeOwned + Default>(&self) -> Result<T, ConfigError> {
        match self.options {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|source| {
                ConfigError::InvalidFilterOptions {
                    filter: self.name.to_string(),
                    source,
                }
            }),
        }
    }

    pub fn http(&self) -> Client {
        self.http.clone()
    }
}

/// The one option every filter understands: `enabled = false` leaves it out.
#[derive(Debug, Deserialize)]
struct Toggle {
    #[serde(default = "enabled_by_default")]
    enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for Toggle {
    fn default() -> Self {
        Self { enabled: true }
    }
}

pub type FilterFactory =
    Box<dyn Fn(&FilterContext) -> Result<Box<dyn Filter>, ConfigError> + Send + Sync>;

/// Named filter factories in execution order.
#[derive(Default)]
pub struct FilterRegistry {
    descriptors: Vec<(String, FilterFactory)>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&FilterContext) -> Result<Box<dyn Filter>, ConfigError> + Send + Sync + 'static,
    {
        self.descriptors.push((name.to_string(), Box::new(factory)));
        self
    }

    /// Vetoes run first so dropped posts never cost a fetch, and the poster
    /// annotation runs last so a promoted image still gets it.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register("ignore_nicks", |ctx| Ok(Box::new(IgnoreNicks::from_context(ctx)?)))
            .register("ignore_patterns", |ctx| Ok(Box::new(IgnorePatterns::from_context(ctx)?)))
            .register("link_image", |ctx| Ok(Box::new(LinkImage::new(ctx.http()))))
            .register("link_name_cleanup", |_| Ok(Box::new(LinkNameCleanup)))
            .register("link_title", |ctx| Ok(Box::new(LinkTitle::new(ctx.http()))))
            .register("link_entity_cleanup", |_| Ok(Box::new(LinkEntityCleanup)))
            .register("youtube_domain_fix", |_| Ok(Box::new(YoutubeDomainFix)))
            .register("youtube_param_fix", |_| Ok(Box::new(YoutubeParamFix)))
            .register("poster_info", |_| Ok(Box::new(PosterInfo)));
        registry
    }
}

pub struct FilterChain {
    filters: Vec<(String, Box<dyn Filter>)>,
}

impl FilterChain {
    /// Builds every registered filter that isn't disabled, each from
    /// `options[its name]`.
    pub fn new(
        registry: &FilterRegistry,
        options: &HashMap<String, Value>,
        http: &Client,
    ) -> Result<Self, ConfigError> {
        let mut filters = Vec::with_capacity(registry.descriptors.len());
        for (name, factory) in &registry.descriptors {
            let ctx = FilterContext::new(name, options.get(name), http);
            if !ctx.options::<Toggle>()?.enabled {
                debug!(filter = %name, "filter disabled");
                continue;
            }
            filters.push((name.clone(), factory(&ctx)?));
        }

        Ok(Self { filters })
    }

    pub fn from_filters(filters: Vec<(String, Box<dyn Filter>)>) -> Self {
        Self { filters }
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn process(&self, post: Post) -> Option<Post> {
        let mut post = post;
        for (name, filter) in &self.filters {
            let kind = post.kind();
            post = match filter.process(post) {
                Some(next) => next,
                None => {
                    debug!(filter = %name, "post vetoed");
                    return None;
                }
            };
            if !kind.may_become(post.kind()) {
                error!(filter = %name, from = %kind, to = %post.kind(), "filter changed post kind, dropping post");
                return None;
            }
        }
        Some(post)
    }
}
