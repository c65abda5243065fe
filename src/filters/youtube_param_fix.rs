use super::Filter;
use crate::post::{Post, PostContent};

/// Moves the `v=` parameter to the front of a youtube query string.
pub struct YoutubeParamFix;

/// `None` when the url needs no change.
fn video_id_first(url: &str) -> Option<String> {
    let (rest, fragment) = match url.find('#') {
        Some(at) => url.split_at(at),
        None => (url, ""),
    };
    let (base, query) = rest.split_once('?')?;

    let params: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    let at = params.iter().position(|p| p.starts_with("v="))?;
    if at == 0 {
        return None;
    }

    let mut ordered = Vec::with_capacity(params.len());
    ordered.push(params[at]);
    ordered.extend(params.iter().enumerate().filter(|(i, _)| *i != at).map(|(_, p)| *p));

    Some(format!("{}?{}{}", base, ordered.join("&"), fragment))
}

impl Filter for YoutubeParamFix {
    fn process(&self, mut post: Post) -> Option<Post> {
        if let PostContent::Video { embed, .. } = &mut post.content {
            if let Some(fixed) = video_id_first(embed) {
                *embed = fixed;
            }
        }
        Some(post)
    }
}
