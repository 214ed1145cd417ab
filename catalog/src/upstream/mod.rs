//! The upstream creature catalog. A single transport operation (`get_json`)
//! is all an implementation provides; the typed listing and detail calls are
//! layered on top of it so every variant reads the same wire contract.

mod fixture;
mod http;
pub mod payload;

pub use fixture::FixtureUpstream;
pub use http::HttpUpstream;

use crate::config::UpstreamType;
use crate::errors::UpstreamError;
use crate::types::resource_id;
use async_trait::async_trait;
use payload::{
    GenerationPayload, ListingPage, NamedResource, PokedexPayload, RawAbility, RawPokemon,
    RegionPayload, TypePayload,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetches the JSON document at `path`, relative to the catalog root
    /// (e.g. `pokemon/25`). A missing document is `UpstreamError::NotFound`.
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, UpstreamError>;

    /// Full listing in upstream order, sized to `limit` entries.
    async fn list_pokemon(&self, limit: usize) -> Result<Vec<NamedResource>, UpstreamError> {
        let page: ListingPage = fetch(self, &format!("pokemon?limit={limit}&offset=0")).await?;
        Ok(page.results)
    }

    async fn list_by_type(&self, name: &str) -> Result<Vec<NamedResource>, UpstreamError> {
        let payload: TypePayload = fetch(self, &named_path("type", name)?).await?;
        Ok(payload.pokemon.into_iter().map(|m| m.pokemon).collect())
    }

    /// Species of a pokedex, in entry-number order.
    async fn list_by_pokedex(&self, name: &str) -> Result<Vec<NamedResource>, UpstreamError> {
        let mut payload: PokedexPayload = fetch(self, &named_path("pokedex", name)?).await?;
        payload.pokemon_entries.sort_by_key(|entry| entry.entry_number);
        Ok(payload
            .pokemon_entries
            .into_iter()
            .map(|entry| entry.pokemon_species)
            .collect())
    }

    /// Species introduced by the region's main generation, in id order.
    async fn list_by_region(&self, name: &str) -> Result<Vec<NamedResource>, UpstreamError> {
        let region: RegionPayload = fetch(self, &named_path("region", name)?).await?;
        let Some(generation) = region.main_generation else {
            return Ok(Vec::new());
        };

        let payload: GenerationPayload =
            fetch(self, &named_path("generation", &generation.name)?).await?;
        let mut species = payload.pokemon_species;
        // Unparseable links sort last; the aggregator rejects them when resolving ids.
        species.sort_by_key(|s| resource_id(&s.url).unwrap_or(u32::MAX));
        Ok(species)
    }

    async fn pokemon(&self, id: u32) -> Result<RawPokemon, UpstreamError> {
        fetch(self, &format!("pokemon/{id}")).await
    }

    async fn ability(&self, id: u32) -> Result<RawAbility, UpstreamError> {
        fetch(self, &format!("ability/{id}")).await
    }
}

/// `{collection}/{name}`, where `name` must be a single plain path segment.
/// Anything that could address another document is `NotFound`.
fn named_path(collection: &str, name: &str) -> Result<String, UpstreamError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '?', '#', '%']);
    if !plain {
        return Err(UpstreamError::NotFound(format!("{collection}/{name}")));
    }
    Ok(format!("{collection}/{name}"))
}

async fn fetch<T, C>(client: &C, path: &str) -> Result<T, UpstreamError>
where
    T: DeserializeOwned,
    C: UpstreamClient + ?Sized,
{
    let value = client.get_json(path).await?;
    serde_json::from_value(value).map_err(|source| UpstreamError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Builds the upstream variant named by the configuration.
pub fn get_upstream(
    upstream_type: &UpstreamType,
) -> Result<Arc<dyn UpstreamClient>, UpstreamError> {
    match upstream_type {
        UpstreamType::Http {
            base_url,
            retries,
            timeout_secs,
        } => {
            tracing::info!(%base_url, "Using HTTP upstream");
            Ok(Arc::new(HttpUpstream::new(
                base_url.clone(),
                *retries,
                *timeout_secs,
            )?))
        }
        UpstreamType::Fixture { dir } => {
            tracing::warn!(dir, "Using fixture upstream; data is served from disk");
            Ok(Arc::new(FixtureUpstream::from_dir(dir)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_path() {
        assert_eq!(named_path("type", "fire").unwrap(), "type/fire");
        assert_eq!(
            named_path("pokedex", "original-johto").unwrap(),
            "pokedex/original-johto"
        );

        for name in ["", ".", "..", "../pokemon/1", "fire?limit=1", "fire#x", "%2e%2e", "a\\b"] {
            assert!(
                matches!(named_path("type", name), Err(UpstreamError::NotFound(_))),
                "{name:?} accepted"
            );
        }
    }
}
