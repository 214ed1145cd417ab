const BASE_DELAY: u64 = 500;

use super::UpstreamClient;
use crate::errors::UpstreamError;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tokio::time::{Duration, sleep};

const RETRIABLE_STATUS_CODES: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,     // 429
    StatusCode::INTERNAL_SERVER_ERROR, // 500
    StatusCode::BAD_GATEWAY,           // 502
    StatusCode::SERVICE_UNAVAILABLE,   // 503
    StatusCode::GATEWAY_TIMEOUT,       // 504
];

/// Live upstream reached over HTTP, e.g. `https://pokeapi.co/api/v2/`.
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: Url,
    retries: u32,
}

impl HttpUpstream {
    pub fn new(base_url: Url, retries: u32, timeout_secs: u64) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        // Url::join drops the last segment unless the base ends with a slash.
        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(HttpUpstream {
            client,
            base_url,
            retries,
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| UpstreamError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, UpstreamError> {
        let url = self.url_for(path)?;
        let mut attempt = 0;

        loop {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.json::<serde_json::Value>().await?);
            }

            if status == StatusCode::NOT_FOUND {
                return Err(UpstreamError::NotFound(path.to_string()));
            }

            if !RETRIABLE_STATUS_CODES.contains(&status) {
                return Err(UpstreamError::Status {
                    status: status.as_u16(),
                    path: path.to_string(),
                });
            }

            if attempt >= self.retries {
                return Err(UpstreamError::RetriesExceeded(path.to_string()));
            }

            // Backoff between retries
            let retry_millis = BASE_DELAY * 2_u64.pow(attempt);
            tracing::warn!(path, %status, attempt, retry_millis, "Retrying upstream request");
            sleep(Duration::from_millis(retry_millis)).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upstream(server: &MockServer, retries: u32) -> HttpUpstream {
        let base = Url::parse(&format!("{}/api/v2", server.uri())).unwrap();
        HttpUpstream::new(base, retries, 5).unwrap()
    }

    #[tokio::test]
    async fn test_list_pokemon_success() {
        let mock_server = MockServer::start().await;

        let response_body = r#"{
            "count": 2,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
            ]
        }"#;

        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon"))
            .and(query_param("limit", "2000"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(response_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let listing = upstream(&mock_server, 0).list_pokemon(2000).await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[1].name, "ivysaur");
    }

    #[tokio::test]
    async fn test_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon/99999"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = upstream(&mock_server, 3).pokemon(99999).await;
        assert!(matches!(result, Err(UpstreamError::NotFound(p)) if p == "pokemon/99999"));
    }

    #[tokio::test]
    async fn test_retries_then_gives_up() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/type/fire"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&mock_server)
            .await;

        let result = upstream(&mock_server, 1).list_by_type("fire").await;
        assert!(matches!(result, Err(UpstreamError::RetriesExceeded(_))));
    }

    #[tokio::test]
    async fn test_non_retriable_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/ability/1"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = upstream(&mock_server, 3).ability(1).await;
        assert!(matches!(
            result,
            Err(UpstreamError::Status { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_listing_name_cannot_leave_its_collection() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"pokemon": []})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let upstream = upstream(&mock_server, 0);
        let result = upstream.list_by_type("../pokemon/1").await;
        assert!(matches!(result, Err(UpstreamError::NotFound(p)) if p == "type/../pokemon/1"));

        let result = upstream.list_by_pokedex("kanto?limit=1").await;
        assert!(matches!(result, Err(UpstreamError::NotFound(_))));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_region_follows_main_generation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/region/kanto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main_generation": {"name": "generation-i", "url": "https://pokeapi.co/api/v2/generation/1/"}
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v2/generation/generation-i"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pokemon_species": [
                    {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon-species/2/"},
                    {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon-species/1/"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let species = upstream(&mock_server, 0).list_by_region("kanto").await.unwrap();
        let names: Vec<_> = species.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["bulbasaur", "ivysaur"]);
    }
}
