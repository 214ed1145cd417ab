use crate::context::QueryContext;
use crate::errors::ExplorerError;
use async_trait::async_trait;
use catalog::types::{Ability, PageRequest, PageResult, Pokemon};
use catalog::{Catalog, CatalogError};
use http::StatusCode;
use reqwest::Url;
use serde::de::DeserializeOwned;

/// Anything that can serve one page for a query context.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        context: &QueryContext,
        page: PageRequest,
    ) -> Result<PageResult<Pokemon>, ExplorerError>;
}

/// A unified catalog client that can work with either an in-process catalog
/// or a remote catalog service via HTTP.
#[derive(Clone)]
pub struct CatalogClient(ClientInner);

#[derive(Clone)]
enum ClientInner {
    InProcess(Catalog),
    Url(HttpClient),
}

impl CatalogClient {
    pub fn in_process(catalog: Catalog) -> Self {
        CatalogClient(ClientInner::InProcess(catalog))
    }

    pub fn url(base_url: String) -> Self {
        CatalogClient(ClientInner::Url(HttpClient::new(base_url)))
    }

    pub async fn by_id(&self, id: u32) -> Result<Pokemon, ExplorerError> {
        match &self.0 {
            ClientInner::InProcess(catalog) => Ok(catalog.by_id(id).await?),
            ClientInner::Url(client) => client.get(&["pokemon", &id.to_string()], None).await,
        }
    }

    pub async fn ability(&self, id: u32) -> Result<Ability, ExplorerError> {
        match &self.0 {
            ClientInner::InProcess(catalog) => Ok(catalog.ability(id).await?),
            ClientInner::Url(client) => client.get(&["ability", &id.to_string()], None).await,
        }
    }
}

#[async_trait]
impl PageSource for CatalogClient {
    async fn fetch_page(
        &self,
        context: &QueryContext,
        page: PageRequest,
    ) -> Result<PageResult<Pokemon>, ExplorerError> {
        match &self.0 {
            ClientInner::InProcess(catalog) => {
                let result = match context {
                    QueryContext::Search(term) => catalog.search(term, page).await,
                    QueryContext::Special(tag) => catalog.by_special(tag, page).await,
                    QueryContext::Type(name) => catalog.by_type(name, page).await,
                    QueryContext::Pokedex(name) => catalog.by_pokedex(name, page).await,
                    QueryContext::Region(name) => catalog.by_region(name, page).await,
                    QueryContext::Empty => return Err(ExplorerError::NoActiveContext),
                };
                Ok(result?)
            }
            ClientInner::Url(client) => client.fetch_page(context, page).await,
        }
    }
}

#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    error_message: String,
}

#[derive(Clone)]
struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    fn new(base_url: String) -> Self {
        HttpClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_page(
        &self,
        context: &QueryContext,
        page: PageRequest,
    ) -> Result<PageResult<Pokemon>, ExplorerError> {
        let (segments, search): (Vec<&str>, _) = match context {
            QueryContext::Search(term) => (vec!["pokemon"], Some(term.as_str())),
            QueryContext::Special(tag) => (vec!["special", tag.as_str()], None),
            QueryContext::Type(name) => (vec!["type", name.as_str()], None),
            QueryContext::Pokedex(name) => (vec!["pokedex", name.as_str()], None),
            QueryContext::Region(name) => (vec!["region", name.as_str()], None),
            QueryContext::Empty => return Err(ExplorerError::NoActiveContext),
        };

        let mut query = vec![
            ("offset", page.offset.to_string()),
            ("limit", page.limit.to_string()),
        ];
        if let Some(term) = search {
            query.push(("search", term.to_string()));
        }

        self.get(&segments, Some(query.as_slice())).await
    }

    /// Appends each of `segments` to the base URL as one percent-encoded
    /// path segment.
    fn url_for(&self, segments: &[&str]) -> Result<Url, ExplorerError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ExplorerError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ExplorerError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Option<&[(&str, String)]>,
    ) -> Result<T, ExplorerError> {
        let url = self.url_for(segments)?;
        let path = segments.join("/");
        let mut request = self.client.get(url);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ApiErrorResponse>()
            .await
            .map(|body| body.error_message)
            .unwrap_or_else(|_| path.clone());

        let err = match status {
            StatusCode::NOT_FOUND => CatalogError::NotFound(message),
            StatusCode::SERVICE_UNAVAILABLE => CatalogError::NotReady,
            StatusCode::BAD_GATEWAY => CatalogError::UpstreamUnavailable(message),
            StatusCode::INTERNAL_SERVER_ERROR => CatalogError::DataIntegrity(message),
            other => return Err(ExplorerError::UnexpectedStatus(other.as_u16())),
        };
        Err(err.into())
    }
}
