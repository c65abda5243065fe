use lazy_static::lazy_static;
use regex::Regex;

use super::Filter;
use crate::post::{Post, PostContent};

lazy_static! {
    static ref COUNTRY_DOMAIN: Regex =
        Regex::new(r"(?i)^(https?://(?:[a-z0-9-]+\.)*)youtube\.[a-z.]+").unwrap();
}

/// `youtube.co.uk` and friends become `youtube.com`.
pub struct YoutubeDomainFix;

impl Filter for YoutubeDomainFix {
    fn process(&self, mut post: Post) -> Option<Post> {
        if let PostContent::Video { embed, .. } = &mut post.content {
            *embed = COUNTRY_DOMAIN.replace(embed.as_str(), "${1}youtube.com").into_owned();
        }
        Some(post)
    }
}
