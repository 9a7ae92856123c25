//! Configuration and execution phases of a test request.
//!
//! A request moves through [`Given`] (name, timeout, headers, body), [`When`]
//! (method and URL) and finally [`Prepared::execute`], which performs the one
//! HTTP call and hands back a [`Then`] holding the captured response.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;
use url::Url;

use crate::assertion::Then;
use crate::error::{Error, Result};
use crate::response::Response;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header entries in insertion order. Keys compare case-insensitively and a
/// second write to the same key replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(entry) => *entry = (key, value),
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn to_header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.0 {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::InvalidRequest(format!("invalid header name `{key}`: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                Error::InvalidRequest(format!("invalid header value for `{key}`: {e}"))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

/// Everything needed to issue one request. Frozen once built by [`When`].
#[derive(Debug, Clone)]
pub struct RequestSpec {
    name: String,
    method: Method,
    url: String,
    host: Option<String>,
    headers: Headers,
    body: Option<String>,
    timeout: Duration,
}

impl RequestSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The absolute URL to call. Relative URLs are joined onto `host` when one
    /// was given.
    pub fn resolve_url(&self) -> Result<Url> {
        match (Url::parse(&self.url), &self.host) {
            (Ok(url), _) => Ok(url),
            (Err(url::ParseError::RelativeUrlWithoutBase), Some(host)) => {
                let joined = format!(
                    "{}/{}",
                    host.trim_end_matches('/'),
                    self.url.trim_start_matches('/')
                );
                Url::parse(&joined).map_err(|e| {
                    Error::InvalidRequest(format!("`{joined}` is not a valid URL: {e}"))
                })
            }
            (Err(e), _) => Err(Error::InvalidRequest(format!(
                "`{}` is not a valid URL: {e}",
                self.url
            ))),
        }
    }

    pub(crate) fn render(&self) -> String {
        let mut out = format!("{} {}\n", self.method, self.url);
        for (key, value) in self.headers.iter() {
            let _ = writeln!(out, "{key}: {value}");
        }
        if let Some(body) = &self.body {
            out.push('\n');
            out.push_str(body);
        }
        out
    }
}

/// First phase: request configuration. Every setting is optional.
#[derive(Debug, Clone, Default)]
pub struct Given {
    name: Option<String>,
    host: Option<String>,
    headers: Headers,
    body: Option<String>,
    timeout: Option<Duration>,
}

impl Given {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name used in logs and failure reports.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the body and sets `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_string(value)?;
        Ok(self.header("Content-Type", "application/json").body(body))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn when(self) -> When {
        When { given: self }
    }
}

/// Second phase: pick the method and URL.
#[derive(Debug, Clone)]
pub struct When {
    given: Given,
}

impl When {
    pub fn get(self, url: impl Into<String>) -> Prepared {
        self.method(Method::GET, url)
    }

    pub fn post(self, url: impl Into<String>) -> Prepared {
        self.method(Method::POST, url)
    }

    pub fn put(self, url: impl Into<String>) -> Prepared {
        self.method(Method::PUT, url)
    }

    pub fn delete(self, url: impl Into<String>) -> Prepared {
        self.method(Method::DELETE, url)
    }

    pub fn method(self, method: Method, url: impl Into<String>) -> Prepared {
        let url = url.into();
        let Given {
            name,
            host,
            headers,
            body,
            timeout,
        } = self.given;

        Prepared {
            spec: RequestSpec {
                name: name.unwrap_or_else(|| format!("{method} {url}")),
                method,
                url,
                host,
                headers,
                body,
                timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
            },
        }
    }
}

/// A fully specified request that has not been sent yet.
#[derive(Debug, Clone)]
pub struct Prepared {
    spec: RequestSpec,
}

impl Prepared {
    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// Performs the single HTTP call and captures the response.
    ///
    /// Connection failures and timeouts surface as [`Error::Transport`];
    /// nothing is retried.
    pub async fn execute(self) -> Result<Then> {
        let spec = self.spec;
        let url = spec.resolve_url()?;
        let headers = spec.headers.to_header_map()?;

        let transport = |source: reqwest::Error| Error::Transport {
            name: spec.name.clone(),
            source,
        };

        let client = reqwest::Client::builder()
            .timeout(spec.timeout)
            .build()
            .map_err(transport)?;

        let mut request = client.request(spec.method.clone(), url).headers(headers);
        if let Some(body) = &spec.body {
            request = request.body(body.clone());
        }

        log::debug!("`{}`: {} {}", spec.name, spec.method, spec.url);
        let started = Instant::now();

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("`{}`: transport failure: {err}", spec.name);
                return Err(transport(err));
            }
        };
        let status = response.status();
        let response_headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(transport)?;
        let elapsed = started.elapsed();

        log::debug!(
            "`{}`: {} in {} ms",
            spec.name,
            status,
            elapsed.as_millis()
        );

        let response = Response::new(status, response_headers, &bytes, elapsed);
        Ok(Then::new(spec, response))
    }
}
