//! Integration tests for Marquee
//!
//! A fake movie database is served over real HTTP on an ephemeral port and
//! the provider, session and web server are pointed at it.

#[path = "integration/fake_tmdb.rs"]
mod fake_tmdb;
#[path = "integration/search_session.rs"]
mod search_session;
#[path = "integration/tmdb_provider.rs"]
mod tmdb_provider;
#[path = "integration/web_server.rs"]
mod web_server;
