use regex::Regex;
use serde::Deserialize;

use super::{Filter, FilterContext};
use crate::error::ConfigError;
use crate::post::Post;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Options {
    patterns: Vec<String>,
}

/// Drops links whose url matches any configured regex. Other kinds pass.
pub struct IgnorePatterns {
    patterns: Vec<Regex>,
}

impl IgnorePatterns {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn from_context(ctx: &FilterContext) -> Result<Self, ConfigError> {
        let options: Options = ctx.options()?;
        let patterns = options
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    filter: ctx.name().to_string(),
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns))
    }
}

impl Filter for IgnorePatterns {
    fn process(&self, post: Post) -> Option<Post> {
        let ignored = post
            .link_url()
            .map_or(false, |url| self.patterns.iter().any(|re| re.is_match(url)));
        if ignored {
            None
        } else {
            Some(post)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::filters::tests::link;
    use crate::post::PostContent;

    fn filter() -> IgnorePatterns {
        IgnorePatterns::new(vec![Regex::new("fred").unwrap(), Regex::new("thomas").unwrap()])
    }

    #[test]
    fn vetoes_matching_link() {
        assert!(filter().process(link("http://www.fred.com/", None)).is_none());
    }

    #[test]
    fn passes_other_links() {
        let post = link("http://www.yahoo.com/", None);
        assert_eq!(filter().process(post.clone()), Some(post));
    }

    #[test]
    fn ignores_non_links() {
        let post = Post::new(
            "rick",
            "#chan",
            PostContent::Image { source: "http://www.fred.com/a.jpg".into(), title: None, caption: String::new() },
        );
        assert_eq!(filter().process(post.clone()), Some(post));
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let http = crate::http::client(Duration::from_secs(1)).unwrap();
        let options = HashMap::from([("ignore_patterns".to_string(), json!({ "patterns": ["(unclosed"] }))]);
        let ctx = FilterContext::new("ignore_patterns", options.get("ignore_patterns"), &http);
        assert!(matches!(
            IgnorePatterns::from_context(&ctx),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
