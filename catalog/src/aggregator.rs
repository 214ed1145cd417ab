//! Query surface of the catalog: filter -> candidate ids -> page slice ->
//! detail expansion.
//!
//! Pagination happens before any detail fetch, so a page never costs more
//! than `limit` detail round-trips however large the candidate list is.

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::errors::{CatalogError, Result};
use crate::index::CatalogIndex;
use crate::metrics_defs::{DETAIL_FETCHES, PAGE_DURATION};
use crate::normalize::{normalize_ability, normalize_pokemon};
use crate::types::{Ability, AbilityLite, PageRequest, PageResult, Pokemon, paginate, resource_id};
use crate::upstream::UpstreamClient;
use crate::upstream::payload::{RawAbility, RawPokemon};
use shared::admin_service::ReadinessProbe;
use shared::{counter, histogram};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Upstream listings that select candidates by a named group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Type,
    Pokedex,
    Region,
}

impl Dimension {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dimension::Type => "type",
            Dimension::Pokedex => "pokedex",
            Dimension::Region => "region",
        }
    }
}

/// Form families, selected from the catalog index by name suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialTag {
    Mega,
    Gigantamax,
    Alola,
    Galar,
    Hisui,
    Paldea,
}

impl SpecialTag {
    pub const ALL: [SpecialTag; 6] = [
        SpecialTag::Mega,
        SpecialTag::Gigantamax,
        SpecialTag::Alola,
        SpecialTag::Galar,
        SpecialTag::Hisui,
        SpecialTag::Paldea,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SpecialTag::Mega => "mega",
            SpecialTag::Gigantamax => "gmax",
            SpecialTag::Alola => "alola",
            SpecialTag::Galar => "galar",
            SpecialTag::Hisui => "hisui",
            SpecialTag::Paldea => "paldea",
        }
    }

    /// Whether a catalog name belongs to this family, e.g. `charizard-mega-x`.
    pub fn matches(&self, name: &str) -> bool {
        let marker = self.as_str();
        name.split('-').skip(1).any(|part| part == marker)
    }
}

impl fmt::Display for SpecialTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecialTag {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        SpecialTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == wanted)
            .ok_or_else(|| CatalogError::NotFound(format!("special/{s}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    Search(String),
    Special(SpecialTag),
    Listing(Dimension, String),
}

impl Filter {
    fn label(&self) -> &'static str {
        match self {
            Filter::Search(_) => "search",
            Filter::Special(_) => "special",
            Filter::Listing(dimension, _) => dimension.as_str(),
        }
    }
}

type ListingKey = (Dimension, String);

struct CatalogInner {
    upstream: Arc<dyn UpstreamClient>,
    index: CatalogIndex,
    pokemon: ResponseCache<u32, Arc<RawPokemon>>,
    abilities: ResponseCache<u32, Arc<RawAbility>>,
    listings: ResponseCache<ListingKey, Arc<Vec<u32>>>,
    detail_permits: Semaphore,
}

/// Process-wide catalog context. Built once at startup and shared by
/// cloning; all clones see the same index and caches.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

impl Catalog {
    pub fn new(upstream: Arc<dyn UpstreamClient>, config: &Config) -> Self {
        Catalog::with_limits(
            upstream,
            config.index.catalog_upper_bound,
            config.cache.max_capacity,
            config.aggregation.detail_concurrency,
        )
    }

    pub fn with_limits(
        upstream: Arc<dyn UpstreamClient>,
        catalog_upper_bound: usize,
        cache_capacity: u64,
        detail_concurrency: usize,
    ) -> Self {
        Catalog {
            inner: Arc::new(CatalogInner {
                upstream,
                index: CatalogIndex::new(catalog_upper_bound),
                pokemon: ResponseCache::new("pokemon", cache_capacity),
                abilities: ResponseCache::new("ability", cache_capacity),
                listings: ResponseCache::new("listing", cache_capacity),
                detail_permits: Semaphore::new(detail_concurrency),
            }),
        }
    }

    /// Loads the name index. Must complete before search or special
    /// queries are served.
    pub async fn load_index(&self) -> Result<()> {
        self.inner.index.load(self.inner.upstream.as_ref()).await
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.inner.index
    }

    pub async fn search(&self, term: &str, page: PageRequest) -> Result<PageResult<Pokemon>> {
        self.page(&Filter::Search(term.to_string()), page).await
    }

    pub async fn by_special(&self, tag: &str, page: PageRequest) -> Result<PageResult<Pokemon>> {
        self.page(&Filter::Special(tag.parse()?), page).await
    }

    pub async fn by_type(&self, name: &str, page: PageRequest) -> Result<PageResult<Pokemon>> {
        self.page(&Filter::Listing(Dimension::Type, name.to_string()), page)
            .await
    }

    pub async fn by_pokedex(&self, name: &str, page: PageRequest) -> Result<PageResult<Pokemon>> {
        self.page(&Filter::Listing(Dimension::Pokedex, name.to_string()), page)
            .await
    }

    pub async fn by_region(&self, name: &str, page: PageRequest) -> Result<PageResult<Pokemon>> {
        self.page(&Filter::Listing(Dimension::Region, name.to_string()), page)
            .await
    }

    /// One creature with its abilities enriched from their detail payloads.
    pub async fn by_id(&self, id: u32) -> Result<Pokemon> {
        let raw = self.raw_pokemon(id).await?;
        let mut pokemon = normalize_pokemon(&raw)?;
        pokemon.abilities = Some(self.enrich_abilities(&pokemon.abilities_lite).await?);
        Ok(pokemon)
    }

    pub async fn ability(&self, id: u32) -> Result<Ability> {
        let raw = self.raw_ability(id).await?;
        Ok(normalize_ability(&raw, None))
    }

    pub async fn enrich_abilities(&self, relations: &[AbilityLite]) -> Result<Vec<Ability>> {
        let mut abilities = Vec::with_capacity(relations.len());
        for relation in relations {
            let raw = self.raw_ability(relation.id).await?;
            abilities.push(normalize_ability(&raw, Some(relation)));
        }
        Ok(abilities)
    }

    /// Resolves `filter` to its candidates, slices them to `page` and expands
    /// only the slice. Any failure fails the whole page.
    pub async fn page(&self, filter: &Filter, page: PageRequest) -> Result<PageResult<Pokemon>> {
        let start = Instant::now();

        let candidates = self.candidates(filter).await?;
        let slice = paginate(&candidates, page);
        let items = self.expand(&slice.items).await?;

        histogram!(PAGE_DURATION, "dimension" => filter.label())
            .record(start.elapsed().as_secs_f64());
        tracing::debug!(
            dimension = filter.label(),
            total = slice.total,
            returned = items.len(),
            "Served catalog page"
        );

        Ok(PageResult {
            items,
            total: slice.total,
        })
    }

    /// Ordered detail ids matching `filter`.
    async fn candidates(&self, filter: &Filter) -> Result<Vec<u32>> {
        match filter {
            Filter::Search(term) => Ok(self
                .inner
                .index
                .search_by_name(term, PageRequest::new(0, 0))?
                .items
                .into_iter()
                .map(|entry| entry.ordinal)
                .collect()),
            Filter::Special(tag) => Ok(self
                .inner
                .index
                .matching(|entry| tag.matches(&entry.name))?
                .into_iter()
                .map(|entry| entry.ordinal)
                .collect()),
            Filter::Listing(dimension, name) => {
                let key = (*dimension, name.trim().to_lowercase());
                let ids = self
                    .inner
                    .listings
                    .get_or_fetch(key.clone(), || self.fetch_listing(key))
                    .await?;
                Ok(ids.as_ref().clone())
            }
        }
    }

    async fn fetch_listing(&self, (dimension, name): ListingKey) -> Result<Arc<Vec<u32>>> {
        let upstream = self.inner.upstream.as_ref();
        let listing = match dimension {
            Dimension::Type => upstream.list_by_type(&name).await?,
            Dimension::Pokedex => upstream.list_by_pokedex(&name).await?,
            Dimension::Region => upstream.list_by_region(&name).await?,
        };

        let ids = listing
            .iter()
            .map(|resource| resource_id(&resource.url))
            .collect::<Result<Vec<_>>>()?;
        Ok(Arc::new(ids))
    }

    /// Fetches and normalizes `ids` concurrently, returning them in input
    /// order regardless of completion order.
    async fn expand(&self, ids: &[u32]) -> Result<Vec<Pokemon>> {
        counter!(DETAIL_FETCHES).increment(ids.len() as u64);

        let mut join_set = JoinSet::new();
        for (position, id) in ids.iter().copied().enumerate() {
            let catalog = self.clone();
            join_set.spawn(async move { (position, catalog.detail(id).await) });
        }

        let mut slots: Vec<Option<Pokemon>> = vec![None; ids.len()];
        while let Some(joined) = join_set.join_next().await {
            let (position, result) = joined.map_err(|e| {
                tracing::error!("Detail task failed: {e}");
                CatalogError::UpstreamUnavailable(format!("detail task failed: {e}"))
            })?;
            // Returning early drops the join set, which aborts the remaining fetches.
            slots[position] = Some(result?);
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| CatalogError::UpstreamUnavailable("missing detail".into()))
            })
            .collect()
    }

    async fn detail(&self, id: u32) -> Result<Pokemon> {
        let _permit = self
            .inner
            .detail_permits
            .acquire()
            .await
            .map_err(|e| CatalogError::UpstreamUnavailable(e.to_string()))?;
        let raw = self.raw_pokemon(id).await?;
        normalize_pokemon(&raw)
    }

    async fn raw_pokemon(&self, id: u32) -> Result<Arc<RawPokemon>> {
        self.inner
            .pokemon
            .get_or_fetch(id, || async move {
                Ok::<_, CatalogError>(Arc::new(self.inner.upstream.pokemon(id).await?))
            })
            .await
    }

    async fn raw_ability(&self, id: u32) -> Result<Arc<RawAbility>> {
        self.inner
            .abilities
            .get_or_fetch(id, || async move {
                Ok::<_, CatalogError>(Arc::new(self.inner.upstream.ability(id).await?))
            })
            .await
    }
}

impl ReadinessProbe for Catalog {
    fn is_ready(&self) -> bool {
        self.inner.index.is_loaded()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("entries: {}", self.inner.index.len()))
    }
}
