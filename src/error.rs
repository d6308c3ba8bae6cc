//! Error types for bookset operations.
//!
//! Rendering itself never fails: malformed markers and missing assets are
//! recovered from. Errors only come from loading inputs and from the
//! compositor handoff.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while loading a book or handing it to the compositor.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chapter not found: {0}")]
    ChapterNotFound(String),

    #[error("compositor exited with {status}:\n{log}")]
    Compositor { status: String, log: String },

    #[error("compositor timed out after {timeout:?}:\n{log}")]
    CompositorTimeout { timeout: Duration, log: String },
}

pub type Result<T> = std::result::Result<T, Error>;
