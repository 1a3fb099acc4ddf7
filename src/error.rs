use thiserror::Error;

/// Top-level error type for the HUD.
#[derive(Debug, Error)]
pub enum HudError {
    #[error("config error: {0}")]
    Config(String),

    #[error("vehicle connection failed: {0}")]
    Connection(String),

    #[error("adapter I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = HudError> = std::result::Result<T, E>;
