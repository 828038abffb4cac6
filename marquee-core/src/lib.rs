//! Marquee Core - Shared building blocks
//!
//! Configuration, runtime mode selection, the keystroke debouncer and tracing
//! setup used by the search, web and CLI crates.

pub mod config;
pub mod debounce;
pub mod mode;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{MarqueeConfig, SearchConfig, ServerConfig, TmdbConfig};
pub use debounce::Debouncer;
pub use mode::RuntimeMode;

/// Core errors that can bubble up from any Marquee subsystem.
#[derive(Debug, thiserror::Error)]
pub enum MarqueeError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarqueeError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            MarqueeError::Configuration { reason } => format!("Configuration error: {reason}"),
            MarqueeError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(self, MarqueeError::Configuration { .. })
    }
}

pub type Result<T> = std::result::Result<T, MarqueeError>;
