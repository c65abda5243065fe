use super::Filter;
use crate::post::{Post, PostContent};

/// Decodes html entities in link names, fetched titles are full of them.
pub struct LinkEntityCleanup;

impl Filter for LinkEntityCleanup {
    fn process(&self, mut post: Post) -> Option<Post> {
        if let PostContent::Link { name: Some(name), .. } = &mut post.content {
            *name = html_escape::decode_html_entities(name.as_str()).into_owned();
        }
        Some(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::tests::link;

    #[test]
    fn decodes_entities_in_name() {
        let post = LinkEntityCleanup
            .process(link("http://a.com/", Some("Tom &amp; Jerry &#8212; &quot;cartoon&quot; &lt;3")))
            .unwrap();
        match post.content {
            PostContent::Link { name, .. } => {
                assert_eq!(name.as_deref(), Some("Tom & Jerry \u{2014} \"cartoon\" <3"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn leaves_other_fields_and_kinds() {
        let post = Post::new(
            "rick",
            "#chan",
            PostContent::Fact { title: "FACT: &amp;".into(), body: String::new() },
        );
        assert_eq!(LinkEntityCleanup.process(post.clone()), Some(post));
    }
}
