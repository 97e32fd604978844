//! callscope: terminal and browser client for a call-analysis service.
//!
//! The remote service stores analyzed call recordings (risk, compliance,
//! violations, transcripts). This crate fetches them through
//! [`api::Backend`], turns them into page view-models in [`view`], and renders
//! those from the CLI ([`cli`]) or the embedded dashboard ([`web`]).

pub mod activity;
pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod export;
pub mod scan;
pub mod view;
pub mod web;
