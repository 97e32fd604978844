//! Embedded web dashboard for callscope.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard with hash routes for every page
//! - JSON view-model endpoints, chat sessions and export notices
//!
//! Launched via `callscope web` (default: `http://127.0.0.1:9750`).

mod api;
mod frontend;

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::activity::logger;
use crate::api::Backend;
use crate::chat::{ChatSession, SuggestionCache};
use crate::config::schema::CallscopeConfig;
use crate::export::NoticeBoard;
use crate::view::HistoryPanel;

// ---------------------------------------------------------------------------
// Server state
// ---------------------------------------------------------------------------

/// One browser chat: the transcript plus its suggestion catalog.
#[derive(Debug, Default)]
pub(crate) struct ChatEntry {
    pub session: ChatSession,
    pub suggestions: SuggestionCache,
}

/// Live chat sessions kept before the oldest is dropped.
pub const MAX_CHAT_SESSIONS: usize = 32;

/// The currently open report page and its history panel.
#[derive(Debug, Default)]
pub(crate) struct OpenReport {
    pub id: String,
    pub caller_id: Option<String>,
    pub history: HistoryPanel,
}

/// Everything the dashboard keeps between requests.
///
/// Requests are handled one at a time, so plain maps suffice. Only the
/// report page last opened is remembered.
pub struct Dashboard<B> {
    backend: B,
    config: CallscopeConfig,
    chats: HashMap<String, ChatEntry>,
    chat_order: VecDeque<String>,
    report: Option<OpenReport>,
    notice: NoticeBoard,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: B, config: CallscopeConfig) -> Self {
        let notice = NoticeBoard::new(Duration::from_millis(config.export.notice_ms));
        Self {
            backend,
            config,
            chats: HashMap::new(),
            chat_order: VecDeque::new(),
            report: None,
            notice,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store a new chat, evicting the oldest past [`MAX_CHAT_SESSIONS`].
    pub(crate) fn insert_chat(&mut self, entry: ChatEntry) {
        let id = entry.session.session_id().to_string();
        while self.chat_order.len() >= MAX_CHAT_SESSIONS {
            let Some(oldest) = self.chat_order.pop_front() else {
                break;
            };
            self.chats.remove(&oldest);
        }
        self.chat_order.push_back(id.clone());
        self.chats.insert(id, entry);
    }

    /// Route one request. `url` includes the query string.
    pub fn handle(&mut self, method: &Method, url: &str, body: Option<&str>) -> Result<Reply> {
        let path = url.split('?').next().unwrap_or(url);
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (method, segments.as_slice()) {
            // Frontend
            (&Method::Get, [""]) | (&Method::Get, ["index.html"]) => Ok(Reply::html(frontend::INDEX_HTML)),

            // Pages
            (&Method::Get, ["api", "view", "home"]) => api::get_home(self),
            (&Method::Get, ["api", "view", "analytics"]) => api::get_analytics(self),
            (&Method::Get, ["api", "view", "reports"]) => api::get_reports(self, url),
            (&Method::Get, ["api", "view", "reports", id]) => api::get_report(self, id),
            (&Method::Post, ["api", "view", "reports", id, "history"]) => {
                api::post_history_toggle(self, id)
            }

            // Chat
            (&Method::Post, ["api", "chat", "sessions"]) => api::post_chat_session(self),
            (&Method::Get, ["api", "chat", "sessions", id]) => api::get_chat_session(self, id),
            (&Method::Post, ["api", "chat", "sessions", id, "messages"]) => {
                api::post_chat_message(self, id, body.unwrap_or("{}"))
            }
            (&Method::Get, ["api", "chat", "sessions", id, "suggestions"]) => {
                api::get_suggestions(self, id)
            }

            // Export
            (&Method::Post, ["api", "export"]) => api::post_export(self),
            (&Method::Get, ["api", "notice"]) => api::get_notice(self),
            (&Method::Post, ["api", "notice", generation, "dismiss"]) => {
                api::post_notice_dismiss(self, generation)
            }

            // Local
            (&Method::Get, ["api", "activity"]) => api::get_activity(url),
            (&Method::Get, ["api", "config"]) => api::get_config(self),

            _ => Ok(Reply::not_found()),
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Handles requests sequentially, which is enough
/// for a local single-user dashboard. A failed request gets a 500 and the
/// server keeps going.
pub fn serve<B: Backend>(backend: B, config: CallscopeConfig, addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("callscope dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if config.web.open_browser {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            logger::warn(&format!("{e:#}"));
        }
    }

    let mut dashboard = Dashboard::new(backend, config);

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let reply = dashboard
            .handle(&method, &url, body.as_deref())
            .unwrap_or_else(|e| {
                logger::error(&format!("{method} {url}: {e:#}"));
                Reply::json_status(500, &serde_json::json!({ "error": e.to_string() }))
            });
        let status = reply.status;
        let _ = request.respond(reply.into_response());

        // Brief access log
        let line = format!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
        if status >= 400 {
            println!("{}", line.yellow());
        } else {
            println!("{}", line.dimmed());
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// A finished response, kept inspectable until it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(html: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: html.as_bytes().to_vec(),
        }
    }

    pub(crate) fn json_status(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: value.to_string().into_bytes(),
        }
    }

    pub(crate) fn json<T: serde::Serialize>(data: &T) -> Result<Self> {
        let body = serde_json::to_vec(data).context("failed to serialize JSON response")?;
        Ok(Self {
            status: 200,
            content_type: "application/json; charset=utf-8",
            body,
        })
    }

    pub(crate) fn not_found() -> Self {
        Self::json_status(404, &serde_json::json!({ "error": "not found" }))
    }

    pub(crate) fn bad_request(message: &str) -> Self {
        Self::json_status(400, &serde_json::json!({ "error": message }))
    }

    /// Body as text, for tests and logging.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        Response::from_data(self.body)
            .with_header(content_type(self.content_type))
            .with_status_code(StatusCode(self.status))
    }
}

fn content_type(value: &str) -> Header {
    Header::from_bytes("Content-Type", value).expect("content type header is valid ASCII")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
