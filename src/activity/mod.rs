//! Request logging and activity reporting.
//!
//! Every API request is appended to `~/.callscope/requests.jsonl`; the
//! reporter aggregates that log for `callscope activity`.

pub mod logger;
pub mod reporter;
