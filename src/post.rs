use std::fmt;

use serde::Serialize;

/// A parsed channel message on its way to a destination.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Post {
    /// Nick of whoever said it.
    pub poster: String,
    /// Channel it was said in.
    pub channel: String,
    /// Kind specific fields.
    #[serde(flatten)]
    pub content: PostContent,
}

/// Kind specific part of a post. The variant is the post kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostContent {
    Image {
        /// Image url
        source: String,
        title: Option<String>,
        /// May be empty
        caption: String,
    },
    Video {
        /// Video page url, used as embed source
        embed: String,
        title: Option<String>,
        caption: String,
    },
    Quote {
        quote: String,
        /// Who said it. May be empty
        source: String,
        url: Option<String>,
    },
    Link {
        url: String,
        /// `None` when nothing preceded the url
        name: Option<String>,
        description: String,
    },
    Fact { title: String, body: String },
    TrueOrFalse { title: String, body: String },
    Definition { title: String, body: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostKind {
    Image,
    Video,
    Quote,
    Link,
    Fact,
    TrueOrFalse,
    Definition,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Image => "image",
            PostKind::Video => "video",
            PostKind::Quote => "quote",
            PostKind::Link => "link",
            PostKind::Fact => "fact",
            PostKind::TrueOrFalse => "true_or_false",
            PostKind::Definition => "definition",
        }
    }

    /// Kind name with underscores turned into spaces, `true_or_false` -> `true or false`.
    pub fn in_words(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Whether a filter may turn a post of this kind into one of `other`.
    /// Only a link may become something else, and only an image.
    pub fn may_become(&self, other: PostKind) -> bool {
        *self == other || (*self == PostKind::Link && other == PostKind::Image)
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PostContent {
    pub fn kind(&self) -> PostKind {
        match self {
            PostContent::Image { .. } => PostKind::Image,
            PostContent::Video { .. } => PostKind::Video,
            PostContent::Quote { .. } => PostKind::Quote,
            PostContent::Link { .. } => PostKind::Link,
            PostContent::Fact { .. } => PostKind::Fact,
            PostContent::TrueOrFalse { .. } => PostKind::TrueOrFalse,
            PostContent::Definition { .. } => PostKind::Definition,
        }
    }
}

impl Post {
    pub fn new(poster: impl Into<String>, channel: impl Into<String>, content: PostContent) -> Self {
        Self {
            poster: poster.into(),
            channel: channel.into(),
            content,
        }
    }

    pub fn kind(&self) -> PostKind {
        self.content.kind()
    }

    /// Url of a link post.
    pub fn link_url(&self) -> Option<&str> {
        match &self.content {
            PostContent::Link { url, .. } => Some(url),
            _ => None,
        }
    }
}
