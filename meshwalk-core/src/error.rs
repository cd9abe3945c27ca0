use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scanner setup failed: {0}")]
    Scan(#[from] meshwalk_scanner::ScanError),

    #[error("Walk interrupted before completion")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, CoreError>;
