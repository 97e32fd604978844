/// HTTP client for the call-analysis API.
///
/// Synchronous, built on `ureq`. One client is created per CLI invocation
/// (or per dashboard server) from the resolved `[api]` config and reused for
/// every request.
///
/// Every request is recorded in the JSONL request log, whether it succeeds or
/// fails, so `callscope activity` can report latency and failure rates.
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::models::{
    AnalyticsSummary, AnalyticsTrends, ChatQuery, ChatReply, QuerySuggestion, Report, ReportList,
    SuggestionList,
};
use super::Backend;
use crate::activity::logger;
use crate::config::schema::ApiConfig;

/// Timeout used by [`ApiClient::is_healthy`].
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Synchronous API client.
#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        Self {
            base_url: normalize_base_url(&config.base_url),
            timeout,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether the service answers the summary endpoint.
    ///
    /// Uses a short timeout so `callscope health` doesn't stall.
    pub fn is_healthy(&self) -> bool {
        let url = self.url("/api/analytics/summary");
        self.agent
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .call()
            .is_ok()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<T, ApiError> {
        let start = Instant::now();
        let mut status = None;
        let result = self
            .agent
            .get(&self.url(path))
            .timeout(self.timeout)
            .call()
            .map_err(|e| ApiError::from_ureq(resource, e))
            .and_then(|resp| {
                status = Some(resp.status());
                resp.into_json::<T>()
                    .map_err(|e| ApiError::Decode(e.to_string()))
            });
        record("GET", path, start, status, &result);
        result
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let start = Instant::now();
        let mut status = None;
        let result = self
            .agent
            .post(&self.url(path))
            .timeout(self.timeout)
            .send_json(body)
            .map_err(|e| ApiError::from_ureq(resource, e))
            .and_then(|resp| {
                status = Some(resp.status());
                resp.into_json::<T>()
                    .map_err(|e| ApiError::Decode(e.to_string()))
            });
        record("POST", path, start, status, &result);
        result
    }

    fn get_text(&self, path: &str, resource: &str) -> Result<String, ApiError> {
        let start = Instant::now();
        let mut status = None;
        let result = self
            .agent
            .get(&self.url(path))
            .timeout(self.timeout)
            .call()
            .map_err(|e| ApiError::from_ureq(resource, e))
            .and_then(|resp| {
                status = Some(resp.status());
                resp.into_string()
                    .map_err(|e| ApiError::Decode(e.to_string()))
            });
        record("GET", path, start, status, &result);
        result
    }
}

impl Backend for ApiClient {
    fn summary(&self) -> Result<Option<AnalyticsSummary>, ApiError> {
        self.get_json("/api/analytics/summary", "analytics summary")
    }

    fn trends(&self) -> Result<AnalyticsTrends, ApiError> {
        self.get_json("/api/analytics/trends", "analytics trends")
    }

    fn reports(&self) -> Result<Vec<Report>, ApiError> {
        self.get_json::<ReportList>("/api/reports", "report list")
            .map(ReportList::into_vec)
    }

    fn report(&self, id: &str) -> Result<Option<Report>, ApiError> {
        let path = format!("/api/reports/{}", encode_segment(id));
        self.get_json(&path, &format!("report {id}"))
    }

    fn caller_history(&self, caller_id: &str) -> Result<Vec<Report>, ApiError> {
        let path = format!("/api/callers/{}/reports", encode_segment(caller_id));
        self.get_json::<ReportList>(&path, &format!("caller {caller_id}"))
            .map(ReportList::into_vec)
    }

    fn chat(&self, query: &str, session_id: &str) -> Result<ChatReply, ApiError> {
        let body = ChatQuery { query, session_id };
        let reply: ChatReply = self.post_json("/api/chat/query", "chat query", &body)?;
        if reply.answer.trim().is_empty() {
            return Err(ApiError::Decode("empty chat answer".to_string()));
        }
        Ok(reply)
    }

    fn suggestions(&self) -> Result<Vec<QuerySuggestion>, ApiError> {
        self.get_json::<SuggestionList>("/api/chat/suggestions", "chat suggestions")
            .map(SuggestionList::into_vec)
    }

    fn export_csv(&self) -> Result<String, ApiError> {
        self.get_text("/api/export/csv", "csv export")
    }
}

/// Append one request record to the request log.
fn record<T>(
    method: &str,
    path: &str,
    start: Instant,
    status: Option<u16>,
    result: &Result<T, ApiError>,
) {
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = logged_status(status, result);
    match result {
        Ok(_) => {
            logger::log_request(method, path, status, true, latency_ms, None);
            logger::debug(&format!("{method} {path} ok in {latency_ms}ms"));
        }
        Err(e) => {
            logger::log_request(method, path, status, false, latency_ms, Some(&e.to_string()));
            logger::warn(&format!("{method} {path} failed: {e}"));
        }
    }
}

/// The status the server actually sent, else the one carried by the error.
fn logged_status<T>(received: Option<u16>, result: &Result<T, ApiError>) -> Option<u16> {
    received.or_else(|| result.as_ref().err().and_then(ApiError::status))
}

/// Trim the trailing slash and pin `localhost` to IPv4.
///
/// On Windows, "localhost" may try IPv6 (::1) first, causing delays when the
/// service only binds to IPv4.
fn normalize_base_url(raw: &str) -> String {
    raw.trim()
        .trim_end_matches('/')
        .replace("://localhost", "://127.0.0.1")
}

/// Percent-encode a single path segment.
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_status_prefers_the_received_code() {
        let ok: Result<(), ApiError> = Ok(());
        assert_eq!(logged_status(Some(204), &ok), Some(204));
        let undecodable: Result<(), ApiError> = Err(ApiError::Decode("bad json".into()));
        assert_eq!(logged_status(Some(200), &undecodable), Some(200));
        let rejected: Result<(), ApiError> = Err(ApiError::Status { status: 502 });
        assert_eq!(logged_status(None, &rejected), Some(502));
        let unreachable: Result<(), ApiError> = Err(ApiError::Transport("refused".into()));
        assert_eq!(logged_status(None, &unreachable), None);
    }

    #[test]
    fn client_from_default_config() {
        let client = ApiClient::from_config(&ApiConfig::default());
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.timeout, Duration::from_millis(30_000));
    }

    #[test]
    fn client_strips_trailing_slash() {
        let config = ApiConfig {
            base_url: "https://calls.example.com/".to_string(),
            ..ApiConfig::default()
        };
        let client = ApiClient::from_config(&config);
        assert_eq!(client.base_url(), "https://calls.example.com");
        assert_eq!(
            client.url("/api/reports"),
            "https://calls.example.com/api/reports"
        );
    }

    #[test]
    fn encode_segment_escapes_reserved() {
        assert_eq!(encode_segment("abc-123_x.y"), "abc-123_x.y");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_segment("+7(900)"), "%2B7%28900%29");
    }
}
