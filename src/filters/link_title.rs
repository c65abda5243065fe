use std::io::Read;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::Client;
use tracing::debug;

use super::Filter;
use crate::error::FetchError;
use crate::http;
use crate::post::{Post, PostContent};

/// Titles further into a page than this are not looked for.
pub const MAX_PAGE_BYTES: u64 = 64 * 1024;

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Names unnamed links after the page title. A failed fetch names them `""`.
pub struct LinkTitle {
    http: Client,
}

impl LinkTitle {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    fn fetch_title(&self, url: &str) -> Result<String, FetchError> {
        let response = http::browser_request(self.http.get(url), url)
            .send()?
            .error_for_status()?;
        let mut html = Vec::new();
        response.take(MAX_PAGE_BYTES).read_to_end(&mut html)?;
        Ok(page_title(&String::from_utf8_lossy(&html)).unwrap_or_default())
    }
}

/// Contents of the `<title>` tag with whitespace runs collapsed.
pub fn page_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .map(|c| WHITESPACE.replace_all(&c[1], " ").trim().to_string())
}

impl Filter for LinkTitle {
    fn process(&self, mut post: Post) -> Option<Post> {
        if let PostContent::Link { url, name, .. } = &mut post.content {
            if name.as_deref().map_or(true, str::is_empty) {
                let title = self.fetch_title(url).unwrap_or_else(|e| {
                    debug!(url = %url, error = %e, "cannot fetch link title");
                    String::new()
                });
                *name = Some(title);
            }
        }
        Some(post)
    }
}
