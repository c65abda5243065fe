use html_escape::{encode_double_quoted_attribute, encode_text};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{Destination, RawResponse};
use crate::config::SenderConfig;
use crate::error::{ConfigError, DeliveryError};
use crate::post::{Post, PostContent, PostKind};

/// Account settings, every field but `group` is required.
#[derive(Clone, Debug, Deserialize)]
pub struct TumblrConfig {
    pub post_url: String,
    pub site_url: String,
    pub email: String,
    pub password: String,
    /// Blog to post to when the account has several.
    pub group: Option<String>,
}

/// Posts through the tumblr write api, one form per post kind.
pub struct Tumblr {
    config: TumblrConfig,
    http: Client,
}

impl Tumblr {
    pub fn new(config: TumblrConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn from_config(sender: &SenderConfig, http: Client) -> Result<Self, ConfigError> {
        let config = serde_json::from_value(sender.fields.clone()).map_err(|source| {
            ConfigError::InvalidSender { destination: sender.destination.clone(), source }
        })?;
        Ok(Self::new(config, http))
    }

    fn form(&self, post: &Post) -> Vec<(&'static str, String)> {
        let mut form = match &post.content {
            PostContent::Quote { quote, source, url } => {
                let source = encode_text(source).into_owned();
                let source = match url {
                    Some(url) => format!(r#"<a href="{}">{}</a>"#, encode_double_quoted_attribute(url), source),
                    None => source,
                };
                vec![
                    ("type", "quote".to_string()),
                    ("quote", encode_text(quote).into_owned()),
                    ("source", source),
                ]
            }
            PostContent::Image { source, caption, .. } => vec![
                ("type", "photo".to_string()),
                ("source", source.clone()),
                ("caption", zoom_caption(caption, source)),
            ],
            PostContent::Video { embed, caption, .. } => vec![
                ("type", "video".to_string()),
                ("embed", embed.clone()),
                ("caption", encode_text(caption).into_owned()),
            ],
            PostContent::Link { url, name, description } => vec![
                ("type", "link".to_string()),
                ("url", url.clone()),
                ("name", encode_text(name.as_deref().unwrap_or_default()).into_owned()),
                ("description", encode_text(description).into_owned()),
            ],
            PostContent::Fact { title, body }
            | PostContent::TrueOrFalse { title, body }
            | PostContent::Definition { title, body } => vec![
                ("type", "regular".to_string()),
                ("title", encode_text(title).into_owned()),
                ("body", encode_text(body).into_owned()),
            ],
        };

        form.push(("email", self.config.email.clone()));
        form.push(("password", self.config.password.clone()));
        if let Some(group) = &self.config.group {
            form.push(("group", group.clone()));
        }
        form
    }
}

/// Caption followed by a link to the full size image.
fn zoom_caption(caption: &str, source: &str) -> String {
    let zoom = format!(r#"<a href="{}">zoom</a>"#, encode_double_quoted_attribute(source));
    if caption.is_empty() {
        zoom
    } else {
        format!("{} {}", encode_text(caption), zoom)
    }
}

impl Destination for Tumblr {
    fn name(&self) -> &'static str {
        "tumblr"
    }

    fn supports(&self, kind: PostKind) -> bool {
        matches!(
            kind,
            PostKind::Image
                | PostKind::Video
                | PostKind::Quote
                | PostKind::Link
                | PostKind::Fact
                | PostKind::TrueOrFalse
                | PostKind::Definition
        )
    }

    fn post(&self, post: &Post) -> Result<RawResponse, DeliveryError> {
        let response = self
            .http
            .post(&self.config.post_url)
            .form(&self.form(post))
            .send()?;
        let status = response.status();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }

    fn permalink(&self, body: &str) -> String {
        format!("{}/post/{}", self.config.site_url.trim_end_matches('/'), body.trim())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::senders::BotSender;

    fn tumblr(server: &MockServer, group: Option<&str>) -> Tumblr {
        Tumblr::new(
            TumblrConfig {
                post_url: server.url("/api/write"),
                site_url: "http://www.domain.com/".into(),
                email: "example@domain.com".into(),
                password: "s3kr17".into(),
                group: group.map(str::to_string),
            },
            crate::http::client(Duration::from_secs(2)).unwrap(),
        )
    }

    fn post(content: PostContent) -> Post {
        Post::new("ymendel", "#chan", content)
    }

    fn sender_config(fields: serde_json::Value) -> SenderConfig {
        SenderConfig { destination: "tumblr".into(), fields }
    }

    #[test]
    fn requires_every_account_field() {
        let http = crate::http::client(Duration::from_secs(1)).unwrap();
        let complete = json!({
            "post_url": "http://www.domain.com/example/post/",
            "site_url": "http://www.domain.com/",
            "email": "example@domain.com",
            "password": "s3kr17",
        });
        assert!(Tumblr::from_config(&sender_config(complete.clone()), http.clone()).is_ok());

        for field in ["post_url", "site_url", "email", "password"] {
            let mut fields = complete.clone();
            fields.as_object_mut().unwrap().remove(field);
            let result = Tumblr::from_config(&sender_config(fields), http.clone());
            assert!(matches!(result, Err(ConfigError::InvalidSender { .. })), "{}", field);
        }
    }

    #[test]
    fn group_is_optional() {
        let http = crate::http::client(Duration::from_secs(1)).unwrap();
        let fields = json!({
            "post_url": "http://www.domain.com/example/post/",
            "site_url": "http://www.domain.com/",
            "email": "example@domain.com",
            "password": "s3kr17",
            "group": "other.tumblr.com",
        });
        assert!(Tumblr::from_config(&sender_config(fields), http).is_ok());
    }

    #[test]
    fn posts_escaped_quote_with_linked_source() {
        let server = MockServer::start();
        let write = server.mock(|when, then| {
            when.method(POST)
                .path("/api/write")
                .x_www_form_urlencoded_tuple("type", "quote")
                .x_www_form_urlencoded_tuple("quote", "xmlrpc = &lt;win&gt;&lt;/win&gt;")
                .x_www_form_urlencoded_tuple("source", r#"<a href="http://www.link.net/">ymendel</a>"#)
                .x_www_form_urlencoded_tuple("email", "example@domain.com")
                .x_www_form_urlencoded_tuple("password", "s3kr17");
            then.status(201).body("12345");
        });

        let response = tumblr(&server, None)
            .post(&post(PostContent::Quote {
                quote: "xmlrpc = <win></win>".into(),
                source: "ymendel".into(),
                url: Some("http://www.link.net/".into()),
            }))
            .unwrap();

        write.assert();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, "12345");
    }

    #[test]
    fn posts_image_with_zoom_link() {
        let server = MockServer::start();
        let write = server.mock(|when, then| {
            when.method(POST)
                .path("/api/write")
                .x_www_form_urlencoded_tuple("type", "photo")
                .x_www_form_urlencoded_tuple("source", "http://www.upscaleaudio.com/rare/rickjames.jpg")
                .x_www_form_urlencoded_tuple(
                    "caption",
                    r#"I'm Rick James <a href="http://www.upscaleaudio.com/rare/rickjames.jpg">zoom</a>"#,
                );
            then.status(201).body("1");
        });

        tumblr(&server, None)
            .post(&post(PostContent::Image {
                source: "http://www.upscaleaudio.com/rare/rickjames.jpg".into(),
                title: None,
                caption: "I'm Rick James".into(),
            }))
            .unwrap();

        write.assert();
    }

    #[test]
    fn posts_video_link_and_text_kinds() {
        let server = MockServer::start();
        let video = server.mock(|when, then| {
            when.method(POST)
                .x_www_form_urlencoded_tuple("type", "video")
                .x_www_form_urlencoded_tuple("embed", "http://www.youtube.com/watch?v=Rd8OGmZtAws")
                .x_www_form_urlencoded_tuple("caption", "yoyoyo!");
            then.status(201).body("1");
        });
        let link = server.mock(|when, then| {
            when.method(POST)
                .x_www_form_urlencoded_tuple("type", "link")
                .x_www_form_urlencoded_tuple("url", "http://www.thewvsr.com/alli.htm")
                .x_www_form_urlencoded_tuple("name", "Alli Side Effects In Layman's Terms")
                .x_www_form_urlencoded_tuple("description", "gross");
            then.status(201).body("2");
        });
        let regular = server.mock(|when, then| {
            when.method(POST)
                .x_www_form_urlencoded_tuple("type", "regular")
                .x_www_form_urlencoded_tuple("title", "T or F: cardioid is still a turd nugget")
                .x_www_form_urlencoded_tuple("body", "word");
            then.status(201).body("3");
        });
        let tumblr = tumblr(&server, None);

        tumblr
            .post(&post(PostContent::Video {
                embed: "http://www.youtube.com/watch?v=Rd8OGmZtAws".into(),
                title: None,
                caption: "yoyoyo!".into(),
            }))
            .unwrap();
        tumblr
            .post(&post(PostContent::Link {
                url: "http://www.thewvsr.com/alli.htm".into(),
                name: Some("Alli Side Effects In Layman's Terms".into()),
                description: "gross".into(),
            }))
            .unwrap();
        tumblr
            .post(&post(PostContent::TrueOrFalse {
                title: "T or F: cardioid is still a turd nugget".into(),
                body: "word".into(),
            }))
            .unwrap();

        video.assert();
        link.assert();
        regular.assert();
    }

    fn field<'a>(form: &'a [(&'static str, String)], name: &str) -> &'a str {
        form.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str()).unwrap()
    }

    #[test]
    fn quotes_in_urls_stay_inside_href() {
        let server = MockServer::start();
        let tumblr = tumblr(&server, None);
        let sneaky = r#"http://a.com/"><script>alert(1)</script>.jpg"#;

        let image = tumblr.form(&post(PostContent::Image {
            source: sneaky.into(),
            title: None,
            caption: "look".into(),
        }));
        let caption = field(&image, "caption");
        assert!(!caption.contains("<script>"), "{}", caption);
        assert!(!caption.contains(r#"/">"#), "{}", caption);
        assert!(caption.starts_with(r#"look <a href="http://a.com/&quot;&gt;&lt;script&gt;"#), "{}", caption);
        assert!(caption.ends_with(">zoom</a>"), "{}", caption);
        assert_eq!(field(&image, "source"), sneaky);

        let quote = tumblr.form(&post(PostContent::Quote {
            quote: "q".into(),
            source: "me".into(),
            url: Some(r#"http://a.com/"onmouseover="x"#.into()),
        }));
        assert_eq!(
            field(&quote, "source"),
            r#"<a href="http://a.com/&quot;onmouseover=&quot;x">me</a>"#
        );
    }

    #[test]
    fn link_and_text_fields_are_escaped() {
        let server = MockServer::start();
        let tumblr = tumblr(&server, None);

        let link = tumblr.form(&post(PostContent::Link {
            url: "http://a.com/?a=1&b=2".into(),
            name: Some("<b>bold</b>".into()),
            description: "fish & chips".into(),
        }));
        assert_eq!(field(&link, "url"), "http://a.com/?a=1&b=2");
        assert_eq!(field(&link, "name"), "&lt;b&gt;bold&lt;/b&gt;");
        assert_eq!(field(&link, "description"), "fish &amp; chips");

        let unnamed = tumblr.form(&post(PostContent::Link {
            url: "http://a.com/".into(),
            name: None,
            description: String::new(),
        }));
        assert_eq!(field(&unnamed, "name"), "");

        let fact = tumblr.form(&post(PostContent::Definition {
            title: "DEFINITION: <3".into(),
            body: "a & b".into(),
        }));
        assert_eq!(field(&fact, "title"), "DEFINITION: &lt;3");
        assert_eq!(field(&fact, "body"), "a &amp; b");
    }

    #[test]
    fn sends_group_when_configured() {
        let server = MockServer::start();
        let write = server.mock(|when, then| {
            when.method(POST).x_www_form_urlencoded_tuple("group", "elsewards.tumblr.com");
            then.status(201).body("1");
        });

        tumblr(&server, Some("elsewards.tumblr.com"))
            .post(&post(PostContent::Fact { title: "FACT: x".into(), body: String::new() }))
            .unwrap();

        write.assert();
    }

    #[test]
    fn delivery_reports_permalink() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/write");
            then.status(201).body("12345\n");
        });
        let sender = BotSender::with_destination(Box::new(tumblr(&server, None)));

        let result = sender
            .deliver(Some(&post(PostContent::TrueOrFalse { title: "T or F: x".into(), body: String::new() })))
            .unwrap();

        assert_eq!(
            result.as_deref(),
            Some("created true or false for ymendel at http://www.domain.com/post/12345")
        );
    }

    #[test]
    fn delivery_reports_rejection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/write");
            then.status(403).body("Invalid credentials.");
        });
        let sender = BotSender::with_destination(Box::new(tumblr(&server, None)));

        let result = sender
            .deliver(Some(&post(PostContent::Quote { quote: "q".into(), source: "s".into(), url: None })))
            .unwrap()
            .unwrap();

        assert_eq!(result, "encountered error: [403 Forbidden] when trying to post quote for ymendel");
    }

    #[test]
    fn delivery_reports_unreachable_api() {
        let http = crate::http::client(Duration::from_secs(1)).unwrap();
        let tumblr = Tumblr::new(
            TumblrConfig {
                post_url: "http://127.0.0.1:1/api/write".into(),
                site_url: "http://www.domain.com/".into(),
                email: "e".into(),
                password: "p".into(),
                group: None,
            },
            http,
        );
        let sender = BotSender::with_destination(Box::new(tumblr));

        let result = sender
            .deliver(Some(&post(PostContent::Fact { title: "FACT: x".into(), body: String::new() })))
            .unwrap()
            .unwrap();

        assert!(result.starts_with("encountered error: ["));
        assert!(result.ends_with("when trying to post fact for ymendel"));
    }

    #[test]
    fn nothing_delivered_for_nothing() {
        let server = MockServer::start();
        let sender = BotSender::with_destination(Box::new(tumblr(&server, None)));
        assert!(sender.deliver(None).unwrap().is_none());
    }
}
