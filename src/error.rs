//! Error types shared by the daemon client, the scraper and the i18n loader

use thiserror::Error;

/// Every way a call to the local package daemon can fail
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("daemon unreachable ({endpoint}): {source}")]
    Unreachable {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("daemon returned HTTP {status} for {endpoint}")]
    Status {
        endpoint: &'static str,
        status: u16,
    },

    #[error("daemon rejected {endpoint} with status code {code}")]
    Rejected { endpoint: &'static str, code: i64 },

    #[error("daemon could not open {pkg}")]
    OpenFailed { pkg: String },

    #[error("malformed daemon response for {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}

impl DaemonError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            DaemonError::Unreachable { endpoint, .. }
            | DaemonError::Status { endpoint, .. }
            | DaemonError::Rejected { endpoint, .. }
            | DaemonError::Decode { endpoint, .. } => endpoint,
            DaemonError::OpenFailed { .. } => "/open",
        }
    }
}

/// Failures while scraping the remote package index
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no usable text found on {url}")]
    Empty { url: String },
}

/// Failures while loading a translation bundle
#[derive(Error, Debug)]
pub enum I18nError {
    #[error("cannot read bundle {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid bundle {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type DaemonResult<T> = std::result::Result<T, DaemonError>;
