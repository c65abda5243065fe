use regex::{Captures, Regex};

use crate::post::PostContent;

/// Builds the kind specific fields of a post from a successful match.
pub type Extractor = Box<dyn Fn(&Captures) -> PostContent + Send + Sync>;

/// One recognisable message shape.
pub struct Format {
    name: String,
    pattern: Regex,
    description: Option<String>,
    extractor: Extractor,
}

impl Format {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Help text, possibly several lines.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the extracted fields if `text` has this format.
    pub fn extract(&self, text: &str) -> Option<PostContent> {
        self.pattern.captures(text).map(|c| (self.extractor)(&c))
    }
}

/// Formats in registration order. The first one to match a line wins.
#[derive(Default)]
pub struct FormatRegistry {
    formats: Vec<Format>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_format<F>(
        &mut self,
        name: &str,
        pattern: Regex,
        description: Option<&str>,
        extractor: F,
    ) -> &mut Self
    where
        F: Fn(&Captures) -> PostContent + Send + Sync + 'static,
    {
        self.formats.push(Format {
            name: name.to_string(),
            pattern,
            description: description.map(str::to_string),
            extractor: Box::new(extractor),
        });
        self
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn names(&self) -> Vec<&str> {
        self.formats.iter().map(Format::name).collect()
    }

    pub fn find(&self, name: &str) -> Option<&Format> {
        self.formats.iter().find(|f| f.name == name)
    }

    /// Registry with every built-in format. Images and videos come before
    /// links since their urls would match the generic link format too.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register_format(
                "image",
                builtin(r"(?i)^\s*(?:(.*?)\s+)?(https?://\S+\.(?:jpe?g|png|gif))(?:\s+(\S.*?))?\s*$"),
                Some("[title] <url of a jpg, png or gif image> [caption]"),
                |c| PostContent::Image {
                    source: group(c, 2).unwrap_or_default(),
                    title: group(c, 1),
                    caption: group(c, 3).unwrap_or_default(),
                },
            )
            .register_format(
                "video",
                builtin(r"(?i)^\s*(?:(.*?)\s+)?(https?://(?:[a-z0-9-]+\.)*youtube\.[a-z]{2,3}(?:\.[a-z]{2})?/\S*)(?:\s+(\S.*?))?\s*$"),
                Some("[title] <youtube url> [caption]"),
                |c| PostContent::Video {
                    embed: group(c, 2).unwrap_or_default(),
                    title: group(c, 1),
                    caption: group(c, 3).unwrap_or_default(),
                },
            )
            .register_format(
                "quote",
                builtin(r#"^\s*"([^"]+)"\s+--\s*(.*?)(?:\s+\((https?://\S*)\))?\s*$"#),
                Some("\"<quote>\" --<source> [(<url>)]"),
                |c| PostContent::Quote {
                    quote: group(c, 1).unwrap_or_default(),
                    source: group(c, 2).unwrap_or_default(),
                    url: group(c, 3),
                },
            )
            .register_format(
                "link",
                builtin(r"(?i)^\s*(?:(.*?)\s+)?(https?://\S+)(?:\s+(\S.*?))?\s*$"),
                Some("[name] <url> [description]\nput a ! right before the url to keep it from being posted"),
                |c| PostContent::Link {
                    url: group(c, 2).unwrap_or_default(),
                    name: group(c, 1),
                    description: group(c, 3).unwrap_or_default(),
                },
            )
            .register_format(
                "fact",
                builtin(r"(?i)^\s*fact:\s*(\S.*?)\s*$"),
                Some("fact: <fact>"),
                |c| PostContent::Fact {
                    title: format!("FACT: {}", group(c, 1).unwrap_or_default()),
                    body: String::new(),
                },
            )
            .register_format(
                "true_or_false",
                builtin(r"(?i)^\s*(?:true\s+or\s+false|t\s+or\s+f)\s*:\s*(\S.*?)\s*$"),
                Some("true or false: <statement>\nt or f: <statement>"),
                |c| PostContent::TrueOrFalse {
                    title: format!("T or F: {}", group(c, 1).unwrap_or_default()),
                    body: String::new(),
                },
            )
            .register_format(
                "definition",
                builtin(r"(?i)^\s*(?:define\s+(.+?)\s+as\s+(\S.*?)|definition:\s*(.+?)\s*[:=]\s*(\S.*?))\s*$"),
                Some("define <term> as <meaning>\ndefinition: <term>: <meaning>\ndefinition: <term> = <meaning>"),
                |c| {
                    let term = group(c, 1).or_else(|| group(c, 3)).unwrap_or_default();
                    let meaning = group(c, 2).or_else(|| group(c, 4)).unwrap_or_default();
                    PostContent::Definition {
                        title: format!("Definition: {}: {}", term, meaning),
                        body: String::new(),
                    }
                },
            );
        registry
    }
}

fn builtin(re: &str) -> Regex {
    Regex::new(re).expect("built-in format pattern")
}

/// Non-empty capture group as an owned string.
fn group(c: &Captures, i: usize) -> Option<String> {
    c.get(i)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
