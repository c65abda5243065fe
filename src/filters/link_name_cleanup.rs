use super::Filter;
use crate::post::{Post, PostContent};

/// Trims a link name and drops the `:` or `---` people type before a url.
pub struct LinkNameCleanup;

fn clean(name: &str) -> String {
    name.trim_end_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
        .trim_start()
        .to_string()
}

impl Filter for LinkNameCleanup {
    fn process(&self, mut post: Post) -> Option<Post> {
        if let PostContent::Link { name: Some(name), .. } = &mut post.content {
            *name = clean(name);
        }
        Some(post)
    }
}
