use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {0:?} waiting for {1}")]
    Timeout(Duration, &'static str),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Page {0} is closed")]
    PageClosed(usize),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Caller mistakes rejected by the prober before any page is touched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProbeError {
    #[error("selector list is empty")]
    NoSelectors,

    #[error("selector at position {0} is blank")]
    BlankSelector(usize),
}
