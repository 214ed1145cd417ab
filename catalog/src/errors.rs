use thiserror::Error;

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

/// Errors surfaced by the aggregation layer and its query surface.
///
/// `Clone` because a failed fetch shared through the response cache is handed
/// to every waiter of that key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("the catalog index is not loaded yet")]
    NotReady,
}

/// Transport level failures reported by an `UpstreamClient`.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {status} for {path}")]
    Status { status: u16, path: String },

    #[error("upstream retries exceeded for {0}")]
    RetriesExceeded(String),

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("malformed payload for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("fixture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UpstreamError> for CatalogError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotFound(path) => CatalogError::NotFound(path),
            UpstreamError::Decode { .. } => CatalogError::DataIntegrity(err.to_string()),
            other => CatalogError::UpstreamUnavailable(other.to_string()),
        }
    }
}
