use super::Filter;
use crate::post::{Post, PostContent};

/// Credits the poster: `(posted by nick)` goes after the caption, quote
/// source or link description. Text posts get it as their whole body.
pub struct PosterInfo;

fn append(field: &mut String, info: &str) {
    if field.is_empty() {
        field.push_str(info);
    } else {
        field.push(' ');
        field.push_str(info);
    }
}

impl Filter for PosterInfo {
    fn process(&self, mut post: Post) -> Option<Post> {
        let info = format!("(posted by {})", post.poster);
        match &mut post.content {
            PostContent::Image { caption, .. } | PostContent::Video { caption, .. } => {
                append(caption, &info)
            }
            PostContent::Quote { source, .. } => append(source, &info),
            PostContent::Link { description, .. } => append(description, &info),
            PostContent::Fact { body, .. }
            | PostContent::TrueOrFalse { body, .. }
            | PostContent::Definition { body, .. } => *body = info,
        }
        Some(post)
    }
}
