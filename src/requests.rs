use std::sync::Arc;

use reqwest::{
    Client, ClientBuilder, Response, Url,
    cookie::{CookieStore, Jar},
    header,
};
use serde::Serialize;

// The IdP serves a browser-only flow; a bare client UA gets bounced.
const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/116.0";

/// HTTP client for one SSO handshake plus the page fetch that follows it.
/// The cookie jar accumulates the IdP/portal cookies the handshake depends
/// on, so a fresh `RequestClient` is built per pipeline run and never
/// shared across requests.
pub struct RequestClient {
    client: Client,
    jar: Arc<Jar>,
}

impl RequestClient {
    pub fn new() -> anyhow::Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = ClientBuilder::new()
            .user_agent(BROWSER_UA)
            .cookie_provider(jar.clone())
            .build()?;
        Ok(Self { client, jar })
    }

    pub async fn fetch_url_response(&self, url: &str) -> Result<Response, reqwest::Error> {
        self.client.get(url).send().await
    }

    pub async fn post_form<T: Serialize + ?Sized>(
        &self,
        url: &str,
        form: &T,
    ) -> Result<Response, reqwest::Error> {
        self.client.post(url).form(form).send().await
    }

    /// Name/value pairs the jar currently holds for `url`. The jar sees the
    /// Set-Cookie headers of every redirect hop, unlike the final response.
    pub fn cookies_for(&self, url: &str) -> Vec<(String, String)> {
        let Ok(url) = Url::parse(url) else {
            return Vec::new();
        };
        let Some(header) = self.jar.cookies(&url) else {
            return Vec::new();
        };
        let Ok(joined) = header.to_str() else {
            return Vec::new();
        };
        joined
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// GET with an explicit session cookie attached, bypassing the jar.
    pub async fn fetch_url_body_with_cookie(
        &self,
        url: &str,
        cookie: &str,
    ) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(header::COOKIE, cookie)
            .send()
            .await?;
        let body = response.text().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_lookup_returns_pairs_for_matching_url_only() {
        let client = RequestClient::new().unwrap();
        let url = Url::parse("https://portal.example.ac.jp/ct/home").unwrap();
        client.jar.add_cookie_str("_shibsession_64=_tok; Path=/", &url);
        client.jar.add_cookie_str("locale=ja; Path=/", &url);

        let cookies = client.cookies_for("https://portal.example.ac.jp");
        assert!(cookies.contains(&("_shibsession_64".to_string(), "_tok".to_string())));
        assert!(cookies.contains(&("locale".to_string(), "ja".to_string())));

        assert!(client.cookies_for("https://other.example.com").is_empty());
        assert!(client.cookies_for("not a url").is_empty());
    }
}
