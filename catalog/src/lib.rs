pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod index;
pub mod metrics_defs;
pub mod normalize;
pub mod types;
pub mod upstream;

#[cfg(test)]
mod testutils;

pub use aggregator::{Catalog, Dimension, Filter, SpecialTag};
pub use errors::CatalogError;

use config::Config;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum CatalogServiceError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ValidationError),
    #[error("upstream error: {0}")]
    Upstream(#[from] errors::UpstreamError),
    #[error("catalog index could not be loaded: {0}")]
    IndexLoad(#[source] CatalogError),
    #[error("API error: {0}")]
    Api(#[from] api::CatalogApiError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the catalog, loads the index and serves the query and admin
/// listeners. The admin listener comes up first so `/health` answers while the
/// index is loading; `/ready` flips once the load has succeeded. A failed
/// load is fatal.
pub async fn run(config: Config) -> Result<(), CatalogServiceError> {
    config.validate()?;

    let upstream = upstream::get_upstream(&config.upstream)?;
    let catalog = Catalog::new(upstream, &config);

    let admin_listener = config.admin_listener.clone();
    let admin_task = run_http_service::<_, CatalogServiceError>(
        &admin_listener.host,
        admin_listener.port,
        AdminService::new(Arc::new(catalog.clone())),
    );

    let api_task = async {
        catalog
            .load_index()
            .await
            .map_err(CatalogServiceError::IndexLoad)?;
        api::serve(&config.listener, catalog.clone()).await?;
        Ok::<(), CatalogServiceError>(())
    };

    tokio::try_join!(admin_task, api_task)?;
    Ok(())
}
