use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::error::{ChroniclerError, Result};
use crate::token::Token;

pub const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
pub const API_VERSION_HEADER: &str = "x-github-api-version";
pub const API_VERSION: &str = "2022-11-28";

const DESCRIBE_BODY_LIMIT: usize = 512;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub token: Token,
    pub user_agent: String,
    /// `None` leaves the request without a deadline.
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).map_err(ChroniclerError::Decode)
    }

    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// One-line rendering for diagnostics, body cut at a fixed length.
    pub fn describe(&self) -> String {
        let text = self.text_lossy().replace('\n', " ");
        let body = match text.char_indices().nth(DESCRIBE_BODY_LIMIT) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text,
        };
        format!("{} {}: {}", self.status, self.reason, body)
    }
}

/// Issues a single GET and hands back the untouched response.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<RawResponse>;
}

pub struct GitHubClient {
    client: Client,
}

impl GitHubClient {
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));
        let bearer = format!("Bearer {}", cfg.token.as_str());
        let mut auth = HeaderValue::from_str(&bearer)
            .map_err(|_| ChroniclerError::InvalidHeader("Authorization"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent)
                .map_err(|_| ChroniclerError::InvalidHeader("User-Agent"))?,
        );

        // the blocking client would otherwise default to a 30s deadline
        let client = Client::builder()
            .default_headers(headers)
            .timeout(cfg.timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for GitHubClient {
    fn get(&self, url: &str) -> Result<RawResponse> {
        debug!(url, "sending request");
        let resp = self.client.get(url).send()?;

        let status = resp.status();
        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp.bytes()?.to_vec();
        debug!(url, status = status.as_u16(), bytes = body.len(), "received response");

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}
