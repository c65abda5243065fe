use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::formats::FormatRegistry;
use crate::post::Post;

lazy_static! {
    /// `!` right before a url means "don't post this".
    static ref IGNORE_MARKER: Regex = Regex::new(r"(?i)!https?://").unwrap();
}

pub struct Parser {
    formats: Arc<FormatRegistry>,
}

impl Parser {
    pub fn new(formats: Arc<FormatRegistry>) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Classifies a channel line. `None` means ordinary chatter.
    pub fn parse(&self, poster: &str, channel: &str, text: &str) -> Option<Post> {
        if text.trim().is_empty() || IGNORE_MARKER.is_match(text) {
            return None;
        }

        self.formats
            .formats()
            .iter()
            .find_map(|format| format.extract(text))
            .map(|content| Post::new(poster, channel, content))
    }
}
