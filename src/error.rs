// Error types for perlnav
//
// The core never fails on malformed source text. These errors cover caller
// contract violations (an unknown parse mode), bad configuration, and file I/O
// at the edges.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("invalid parse mode '{0}' (expected outline, self_navigation or refinement)")]
    InvalidParseMode(String),

    #[error("invalid navigator configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, NavigatorError>;
