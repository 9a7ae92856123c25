use std::fmt::Write as _;
use std::time::Duration;

use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// What came back from a single executed request.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    raw: String,
    body: Value,
    elapsed: Duration,
}

impl Response {
    /// Captures a response. The body is parsed as JSON once; anything that is
    /// not JSON (an HTML error page, an empty body) is kept as raw text and
    /// presented to body predicates as `Value::Null`.
    pub fn new(status: StatusCode, headers: HeaderMap, raw: &[u8], elapsed: Duration) -> Self {
        let body = match serde_json::from_slice(raw) {
            Ok(body) => body,
            Err(err) => {
                if !raw.is_empty() {
                    log::debug!("response body is not JSON ({err}), body predicates see null");
                }
                Value::Null
            }
        };

        Self {
            status,
            headers,
            raw: String::from_utf8_lossy(raw).into_owned(),
            body,
            elapsed,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub(crate) fn render(&self) -> String {
        let mut out = format!("{} ({} ms)\n", self.status, self.elapsed.as_millis());
        for (name, value) in &self.headers {
            let value = value.to_str().unwrap_or("<binary>");
            let _ = writeln!(out, "{name}: {value}");
        }
        out.push('\n');
        match serde_json::to_string_pretty(&self.body) {
            Ok(pretty) if !self.body.is_null() => out.push_str(&pretty),
            _ => out.push_str(&self.raw),
        }
        out
    }

    /// Short form of the raw body for failure messages.
    pub(crate) fn preview(&self) -> String {
        const LIMIT: usize = 200;
        let mut preview: String = self.raw.chars().take(LIMIT).collect();
        if self.raw.chars().count() > LIMIT {
            preview.push_str("...");
        }
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_bodies_are_parsed() {
        let raw = br#"{"status":"success","data":[{"id":5}]}"#;
        let response = Response::new(StatusCode::CREATED, HeaderMap::new(), raw, Duration::ZERO);

        assert_eq!(response.status_code(), 201);
        assert_eq!(response.body()["data"][0]["id"], json!(5));
        assert_eq!(response.raw(), r#"{"status":"success","data":[{"id":5}]}"#);
    }

    #[test]
    fn non_json_bodies_become_null() {
        let raw = b"<html>Error Occured! Page Not found</html>";
        let response = Response::new(StatusCode::NOT_FOUND, HeaderMap::new(), raw, Duration::ZERO);

        assert!(response.body().is_null());
        assert!(response.raw().contains("Page Not found"));
        assert!(response.render().contains("Page Not found"));
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let raw = "x".repeat(500);
        let response = Response::new(StatusCode::OK, HeaderMap::new(), raw.as_bytes(), Duration::ZERO);

        let preview = response.preview();
        assert_eq!(preview.len(), 203);
        assert!(preview.ends_with("..."));
    }
}
