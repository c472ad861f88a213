// In crates/notifier/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Notification request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Notification rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, Error>;
