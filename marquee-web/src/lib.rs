//! Marquee Web - Search page and JSON API server

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Server-rendered HTMX page that forwards keystrokes to a debounced search
//! session of its own, plus JSON endpoints for scripts and external clients.

pub mod components;
pub mod handlers;
pub mod pages;
pub mod server;
pub mod sessions;

// Re-export main types
pub use server::{AppState, build_router, run_server};
pub use sessions::SessionRegistry;
