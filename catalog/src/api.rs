use crate::aggregator::Catalog;
use crate::config::Listener as ListenerConfig;
use crate::errors::CatalogError;
use crate::types::{Ability, PageRequest, PageResult, Pokemon};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum CatalogApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub fn router(catalog: Catalog) -> Router {
    Router::new()
        .route("/pokemon", get(search))
        .route("/pokemon/{id}", get(by_id))
        .route("/type/{name}", get(by_type))
        .route("/pokedex/{name}", get(by_pokedex))
        .route("/region/{name}", get(by_region))
        .route("/special/{tag}", get(by_special))
        .route("/ability/{id}", get(ability))
        .with_state(catalog)
}

pub async fn serve(listener: &ListenerConfig, catalog: Catalog) -> Result<(), CatalogApiError> {
    let app = router(catalog);

    let addr = format!("{}:{}", listener.host, listener.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Catalog API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Deserialize, Debug)]
struct SearchParams {
    #[serde(default)]
    search: String,
    #[serde(default)]
    offset: i64,
    #[serde(default)]
    limit: i64,
}

type PageResponse = Result<Json<PageResult<Pokemon>>, CatalogError>;

async fn search(State(catalog): State<Catalog>, Query(params): Query<SearchParams>) -> PageResponse {
    let page = PageRequest::new(params.offset, params.limit);
    Ok(Json(catalog.search(&params.search, page).await?))
}

async fn by_type(
    State(catalog): State<Catalog>,
    Path(name): Path<String>,
    Query(page): Query<PageRequest>,
) -> PageResponse {
    Ok(Json(catalog.by_type(&name, page).await?))
}

async fn by_pokedex(
    State(catalog): State<Catalog>,
    Path(name): Path<String>,
    Query(page): Query<PageRequest>,
) -> PageResponse {
    Ok(Json(catalog.by_pokedex(&name, page).await?))
}

async fn by_region(
    State(catalog): State<Catalog>,
    Path(name): Path<String>,
    Query(page): Query<PageRequest>,
) -> PageResponse {
    Ok(Json(catalog.by_region(&name, page).await?))
}

async fn by_special(
    State(catalog): State<Catalog>,
    Path(tag): Path<String>,
    Query(page): Query<PageRequest>,
) -> PageResponse {
    Ok(Json(catalog.by_special(&tag, page).await?))
}

async fn by_id(
    State(catalog): State<Catalog>,
    Path(id): Path<u32>,
) -> Result<Json<Pokemon>, CatalogError> {
    Ok(Json(catalog.by_id(id).await?))
}

async fn ability(
    State(catalog): State<Catalog>,
    Path(id): Path<u32>,
) -> Result<Json<Ability>, CatalogError> {
    Ok(Json(catalog.ability(id).await?))
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            CatalogError::DataIntegrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Catalog request failed");
        }

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}
