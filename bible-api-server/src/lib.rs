//! bible-api-server: HTTP API for Bible text and devotional journaling
//!
//! Serves books, chapters and verses, ranked verse search, cookie-based
//! accounts, and per-user devotionals with tagged favorite verses.
//! All persistence and full-text ranking lives in PostgreSQL.

pub mod auth;
pub mod db;
pub mod http;
pub mod models;

pub use http::{run_server, ServerConfig};
