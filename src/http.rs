use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{REFERER, USER_AGENT};

/// Some sites refuse anything that doesn't look like a browser.
pub const BROWSER_AGENT: &str = "Mozilla/4.0 (compatible; MSIE 7.0; Windows NT 5.1)";

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

lazy_static! {
    static ref SITE_ROOT: Regex = Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*:/+[^/]+)").unwrap();
}

/// Blocking client shared by the fetching filters and the senders.
pub fn client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// `http://host/` for any url on `host`.
pub fn referer_for(url: &str) -> Option<String> {
    SITE_ROOT.captures(url).map(|c| format!("{}/", &c[1]))
}

/// Adds the browser user agent and a referer pointing at the link's own site.
pub fn browser_request(request: RequestBuilder, url: &str) -> RequestBuilder {
    let request = request.header(USER_AGENT, BROWSER_AGENT);
    match referer_for(url) {
        Some(referer) => request.header(REFERER, referer),
        None => request,
    }
}
