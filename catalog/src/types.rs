use crate::errors::{CatalogError, Result};
use serde::{Deserialize, Serialize};

/// One row of the catalog index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Position in upstream listing order.
    pub id: usize,
    pub name: String,
    /// Numeric key parsed from the entry's self-link, used for detail fetches.
    pub ordinal: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityLite {
    pub id: u32,
    pub name: String,
    pub slot: u8,
    pub is_hidden: bool,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub id: u32,
    pub name: String,
    pub effect: String,
    pub short_effect: String,
    pub flavor_text: String,
    pub generation: String,
    /// Slot and hidden flag of the relation this ability was enriched from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub stats: Stats,
    pub abilities_lite: Vec<AbilityLite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abilities: Option<Vec<Ability>>,
    pub image: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
}

impl PageRequest {
    pub fn new(offset: i64, limit: i64) -> Self {
        PageRequest { offset, limit }
    }

    /// Resolves the request against a list of `len` items into a `start..end` range.
    /// Negative offsets clamp to 0 and a non-positive limit runs to the end.
    pub fn bounds(&self, len: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.offset.max(0)).unwrap_or(usize::MAX).min(len);
        let end = if self.limit <= 0 {
            len
        } else {
            let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
            start.saturating_add(limit).min(len)
        };
        start..end
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> PageResult<T> {
    pub fn empty() -> Self {
        PageResult {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Slices `items` to the page selected by `page`; `total` is the unsliced length.
pub fn paginate<T: Clone>(items: &[T], page: PageRequest) -> PageResult<T> {
    PageResult {
        items: items[page.bounds(items.len())].to_vec(),
        total: items.len(),
    }
}

/// Parses the numeric id out of the final non-empty segment of a resource URL,
/// e.g. `https://pokeapi.co/api/v2/ability/65/` -> 65.
pub fn resource_id(url: &str) -> Result<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| CatalogError::DataIntegrity(format!("no numeric id in resource URL {url:?}")))
}
