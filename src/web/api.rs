//! JSON API handlers for the web dashboard.
//!
//! Page endpoints always answer 200 with a serialized [`ViewState`]; the
//! page's own error and not-found states travel inside it. Only malformed
//! requests and unknown chat sessions get 4xx.

use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ChatEntry, Dashboard, OpenReport, Reply};
use crate::activity::reporter;
use crate::api::Backend;
use crate::chat::ChatSession;
use crate::export::{self, NoticeKind};
use crate::view::format::RiskLevel;
use crate::view::{self, HistoryPanel, ReportDetail, ReportFilter, SortOrder, ViewState};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportPageResponse<'a> {
    detail: &'a ViewState<ReportDetail>,
    history: &'a HistoryPanel,
}

#[derive(Serialize)]
struct ChatTurnResponse<'a> {
    accepted: bool,
    session: &'a ChatSession,
}

#[derive(Deserialize)]
struct ChatTurnRequest {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct NoticeResponse {
    kind: NoticeKind,
    message: String,
    generation: u64,
    expires_in_ms: u64,
}

#[derive(Serialize)]
struct ExportResponse {
    path: Option<String>,
    notice: Option<NoticeResponse>,
}

/// Activity API response, mirrors `reporter::ActivityStats`.
#[derive(Serialize)]
struct ActivityResponse {
    total_requests: usize,
    failures: usize,
    failure_pct: f64,
    avg_latency_ms: u64,
    top_error: Option<String>,
    endpoints: Vec<EndpointResponse>,
}

#[derive(Serialize)]
struct EndpointResponse {
    endpoint: String,
    count: usize,
    failures: usize,
    avg_latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Value of query parameter `name`, percent-decoded.
fn query_param(url: &str, name: &str) -> Option<String> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        (k == name).then(|| decode_component(v))
    })
}

/// Decode `+` and `%XX` escapes. Malformed escapes pass through as-is.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
                i += 3;
                continue;
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

fn parse_days_param(url: &str) -> Option<u32> {
    query_param(url, "days")?.parse().ok()
}

/// Build the reports filter from `?risk=&search=&sort=`.
fn parse_filter(url: &str) -> Result<ReportFilter, String> {
    let risk = match query_param(url, "risk").filter(|r| !r.is_empty() && r != "all") {
        Some(raw) => Some(RiskLevel::parse(&raw).ok_or_else(|| format!("unknown risk level: {raw}"))?),
        None => None,
    };
    let sort = match query_param(url, "sort").filter(|s| !s.is_empty()) {
        Some(raw) => SortOrder::parse(&raw).ok_or_else(|| format!("unknown sort order: {raw}"))?,
        None => SortOrder::default(),
    };
    Ok(ReportFilter {
        risk,
        search: query_param(url, "search").unwrap_or_default(),
        sort,
    })
}

fn notice_response<B>(dashboard: &Dashboard<B>, now: Instant) -> Option<NoticeResponse> {
    let notice = dashboard.notice.visible_at(now)?;
    let remaining = dashboard.notice.remaining_at(now).unwrap_or_default();
    Some(NoticeResponse {
        kind: notice.kind,
        message: notice.message.clone(),
        generation: notice.generation,
        expires_in_ms: remaining.as_millis() as u64,
    })
}

fn unknown_session(id: &str) -> Reply {
    Reply::json_status(
        404,
        &serde_json::json!({ "error": format!("unknown chat session: {id}") }),
    )
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// `GET /api/view/home`
pub fn get_home<B: Backend>(d: &mut Dashboard<B>) -> Result<Reply> {
    Reply::json(&view::home::load(&d.backend, d.config.display.recent_reports))
}

/// `GET /api/view/analytics`
pub fn get_analytics<B: Backend>(d: &mut Dashboard<B>) -> Result<Reply> {
    Reply::json(&view::analytics::load(&d.backend, d.config.display.trend_points))
}

/// `GET /api/view/reports?risk=&search=&sort=`
pub fn get_reports<B: Backend>(d: &mut Dashboard<B>, url: &str) -> Result<Reply> {
    match parse_filter(url) {
        Ok(filter) => Reply::json(&view::reports::load(&d.backend, &filter)),
        Err(message) => Ok(Reply::bad_request(&message)),
    }
}

/// `GET /api/view/reports/{id}`: opening a report starts with the history
/// panel hidden.
pub fn get_report<B: Backend>(d: &mut Dashboard<B>, id: &str) -> Result<Reply> {
    let id = decode_component(id);
    let detail = view::detail::load(&d.backend, &id);
    let page = OpenReport {
        caller_id: detail.ready().and_then(|r| r.caller_id.clone()),
        history: HistoryPanel::new(),
        id,
    };
    let reply = Reply::json(&ReportPageResponse {
        detail: &detail,
        history: &page.history,
    });
    d.report = Some(page);
    reply
}

/// `POST /api/view/reports/{id}/history`: show or hide the caller history.
pub fn post_history_toggle<B: Backend>(d: &mut Dashboard<B>, id: &str) -> Result<Reply> {
    let id = decode_component(id);
    let Dashboard {
        backend, report, ..
    } = d;
    // Another report was opened since; this one starts over.
    if report.as_ref().is_none_or(|page| page.id != id) {
        let caller_id = view::detail::load(&*backend, &id)
            .into_ready()
            .and_then(|r| r.caller_id);
        *report = Some(OpenReport {
            id,
            caller_id,
            history: HistoryPanel::new(),
        });
    }
    let Some(page) = report.as_mut() else {
        return Ok(Reply::not_found());
    };
    page.history.toggle(&*backend, page.caller_id.as_deref(), &page.id);
    Reply::json(&page.history)
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// `POST /api/chat/sessions`: start a conversation.
pub fn post_chat_session<B: Backend>(d: &mut Dashboard<B>) -> Result<Reply> {
    let entry = ChatEntry::default();
    let reply = Reply::json(&entry.session);
    d.insert_chat(entry);
    reply
}

/// `GET /api/chat/sessions/{id}`
pub fn get_chat_session<B: Backend>(d: &mut Dashboard<B>, id: &str) -> Result<Reply> {
    match d.chats.get(id) {
        Some(entry) => Reply::json(&entry.session),
        None => Ok(unknown_session(id)),
    }
}

/// `POST /api/chat/sessions/{id}/messages` with `{"query": "..."}`.
///
/// Blank input is answered with `accepted: false` and the unchanged session.
pub fn post_chat_message<B: Backend>(d: &mut Dashboard<B>, id: &str, body: &str) -> Result<Reply> {
    let req: ChatTurnRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => return Ok(Reply::bad_request(&format!("invalid chat request: {e}"))),
    };

    let Dashboard { backend, chats, .. } = d;
    let Some(entry) = chats.get_mut(id) else {
        return Ok(unknown_session(id));
    };
    let accepted = entry.session.submit(&*backend, &req.query).is_some();
    Reply::json(&ChatTurnResponse {
        accepted,
        session: &entry.session,
    })
}

/// `GET /api/chat/sessions/{id}/suggestions`
pub fn get_suggestions<B: Backend>(d: &mut Dashboard<B>, id: &str) -> Result<Reply> {
    let Dashboard { backend, chats, .. } = d;
    match chats.get_mut(id) {
        Some(entry) => Reply::json(&entry.suggestions.get(&*backend)),
        None => Ok(unknown_session(id)),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// `POST /api/export`: write the CSV and post a notice.
pub fn post_export<B: Backend>(d: &mut Dashboard<B>) -> Result<Reply> {
    let dir = export::export_dir(&d.config.export);
    let path = export::export_with_notice(&d.backend, &dir, &mut d.notice).ok();
    Reply::json(&ExportResponse {
        path: path.map(|p| p.display().to_string()),
        notice: notice_response(d, Instant::now()),
    })
}

/// `GET /api/notice`: the visible notice, or `null`.
pub fn get_notice<B: Backend>(d: &mut Dashboard<B>) -> Result<Reply> {
    let now = Instant::now();
    d.notice.expire(now);
    Reply::json(&notice_response(d, now))
}

/// `POST /api/notice/{generation}/dismiss`
pub fn post_notice_dismiss<B: Backend>(d: &mut Dashboard<B>, generation: &str) -> Result<Reply> {
    let Ok(generation) = generation.parse::<u64>() else {
        return Ok(Reply::bad_request("generation must be a number"));
    };
    let dismissed = d.notice.dismiss(generation);
    Reply::json(&serde_json::json!({ "dismissed": dismissed }))
}

// ---------------------------------------------------------------------------
// Local
// ---------------------------------------------------------------------------

/// `GET /api/activity?days=N`: request log statistics.
pub fn get_activity(url: &str) -> Result<Reply> {
    let stats = reporter::compute_stats(parse_days_param(url));

    let resp = ActivityResponse {
        total_requests: stats.total_requests,
        failures: stats.failures,
        failure_pct: stats.failure_pct(),
        avg_latency_ms: stats.avg_latency_ms,
        top_error: stats.top_error,
        endpoints: stats
            .endpoints
            .into_iter()
            .map(|e| EndpointResponse {
                endpoint: e.endpoint,
                count: e.count,
                failures: e.failures,
                avg_latency_ms: e.avg_latency_ms,
            })
            .collect(),
    };

    Reply::json(&resp)
}

/// `GET /api/config`: the configuration the dashboard runs with.
pub fn get_config<B: Backend>(d: &mut Dashboard<B>) -> Result<Reply> {
    Reply::json(&d.config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_extracts_and_decodes() {
        let url = "/api/view/reports?risk=high&search=john+smith&sort=risk_desc";
        assert_eq!(query_param(url, "risk").as_deref(), Some("high"));
        assert_eq!(query_param(url, "search").as_deref(), Some("john smith"));
        assert_eq!(query_param("/x?q=a%2Fb%20c", "q").as_deref(), Some("a/b c"));
        assert_eq!(query_param("/x?q=a", "missing"), None);
        assert_eq!(query_param("/x", "q"), None);
    }

    #[test]
    fn malformed_escape_passes_through() {
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
    }

    #[test]
    fn parse_days_param_handles_invalid() {
        assert_eq!(parse_days_param("/api/activity?days=7"), Some(7));
        assert_eq!(parse_days_param("/api/activity?days=abc"), None);
        assert_eq!(parse_days_param("/api/activity"), None);
    }

    #[test]
    fn filter_defaults_and_errors() {
        let filter = parse_filter("/api/view/reports").unwrap();
        assert_eq!(filter, ReportFilter::default());

        let filter = parse_filter("/api/view/reports?risk=all&sort=oldest").unwrap();
        assert_eq!(filter.risk, None);
        assert_eq!(filter.sort, SortOrder::Oldest);

        assert!(parse_filter("/api/view/reports?risk=extreme").is_err());
        assert!(parse_filter("/api/view/reports?sort=sideways").is_err());
    }

    #[test]
    fn chat_request_tolerates_missing_query() {
        let req: ChatTurnRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query.is_empty());
    }
}
