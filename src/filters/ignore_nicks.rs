use serde::Deserialize;

use super::{Filter, FilterContext};
use crate::error::ConfigError;
use crate::post::Post;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Options {
    nicks: Vec<String>,
}

/// Drops posts from listed nicks. Nicks compare exactly, case included.
pub struct IgnoreNicks {
    nicks: Vec<String>,
}

impl IgnoreNicks {
    pub fn new(nicks: Vec<String>) -> Self {
        Self { nicks }
    }

    pub fn from_context(ctx: &FilterContext) -> Result<Self, ConfigError> {
        let options: Options = ctx.options()?;
        Ok(Self::new(options.nicks))
    }
}

impl Filter for IgnoreNicks {
    fn process(&self, post: Post) -> Option<Post> {
        if self.nicks.iter().any(|nick| *nick == post.poster) {
            None
        } else {
            Some(post)
        }
    }
}
