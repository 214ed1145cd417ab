use catalog::CatalogError;

#[derive(thiserror::Error, Debug)]
pub enum ExplorerError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),

    #[error("catalog service returned unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("no query context is active")]
    NoActiveContext,
}
