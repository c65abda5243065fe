use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, RANGE};
use tracing::debug;

use super::Filter;
use crate::http;
use crate::post::{Post, PostContent};

/// Turns links that point straight at an image into image posts.
///
/// Asks with `HEAD` first. Servers that don't answer `HEAD` properly get a
/// one byte ranged `GET`. Anything failing leaves the link alone.
pub struct LinkImage {
    http: Client,
}

impl LinkImage {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    fn content_type(&self, url: &str) -> Option<String> {
        let head = http::browser_request(self.http.head(url), url).send();
        let response = match head {
            Ok(response) if response.status().is_success() => response,
            _ => http::browser_request(self.http.get(url), url)
                .header(RANGE, "bytes=0-0")
                .send()
                .map_err(|e| debug!(url = %url, error = %e, "cannot sniff link content type"))
                .ok()?,
        };
        header_content_type(&response)
    }
}

fn header_content_type(response: &Response) -> Option<String> {
    if !response.status().is_success() {
        return None;
    }
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_ascii_lowercase)
}

impl Filter for LinkImage {
    fn process(&self, post: Post) -> Option<Post> {
        let is_image = match post.link_url() {
            Some(url) => self
                .content_type(url)
                .map_or(false, |kind| kind.starts_with("image/")),
            None => false,
        };
        if !is_image {
            return Some(post);
        }

        let Post { poster, channel, content } = post;
        match content {
            PostContent::Link { url, name, description } => Some(Post {
                poster,
                channel,
                content: PostContent::Image { source: url, title: name, caption: description },
            }),
            content => Some(Post { poster, channel, content }),
        }
    }
}
