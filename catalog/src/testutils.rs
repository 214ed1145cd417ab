use crate::errors::UpstreamError;
use crate::upstream::{FixtureUpstream, UpstreamClient};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashSet;

/// Listing document whose entries get ordinals 1..=n in the given order.
pub fn listing_document(names: &[&str]) -> Value {
    json!({
        "count": names.len(),
        "results": names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({
                "name": name,
                "url": format!("https://pokeapi.co/api/v2/pokemon/{}/", i + 1),
            }))
            .collect::<Vec<_>>(),
    })
}

pub fn pokemon_document(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "types": [
            {"slot": 1, "type": {"name": "fire", "url": "https://pokeapi.co/api/v2/type/10/"}}
        ],
        "stats": [
            {"base_stat": 78, "stat": {"name": "hp"}},
            {"base_stat": 84, "stat": {"name": "attack"}},
            {"base_stat": 100, "stat": {"name": "speed"}}
        ],
        "abilities": [
            {"ability": {"name": "blaze", "url": "https://pokeapi.co/api/v2/ability/66/"}, "is_hidden": false, "slot": 1},
            {"ability": {"name": "solar-power", "url": "https://pokeapi.co/api/v2/ability/94/"}, "is_hidden": true, "slot": 3}
        ],
        "sprites": {
            "front_default": format!("https://img/{id}.png")
        }
    })
}

pub fn ability_document(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "effect_entries": [
            {"effect": format!("{name} effect"), "short_effect": format!("{name} short"), "language": {"name": "en"}}
        ],
        "flavor_text_entries": [
            {"flavor_text": format!("{name} flavor"), "language": {"name": "en"}}
        ],
        "generation": {"name": "generation-iii", "url": "https://pokeapi.co/api/v2/generation/3/"}
    })
}

fn member(id: u32, name: &str, kind: &str) -> Value {
    json!({"name": name, "url": format!("https://pokeapi.co/api/v2/{kind}/{id}/")})
}

/// Small catalog of `size` creatures named `mon-1..mon-size` plus a few
/// form entries, with type, pokedex and region listings.
pub fn sample_fixture(size: u32) -> FixtureUpstream {
    let mut names: Vec<String> = (1..=size).map(|i| format!("mon-{i}")).collect();
    names.push("mon-1-mega".into());
    names.push("mon-2-alola".into());
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let mut documents = vec![("pokemon".to_string(), listing_document(&name_refs))];
    for (i, name) in names.iter().enumerate() {
        let id = i as u32 + 1;
        documents.push((format!("pokemon/{id}"), pokemon_document(id, name)));
    }
    documents.push(("ability/66".into(), ability_document(66, "blaze")));
    documents.push(("ability/94".into(), ability_document(94, "solar-power")));

    // Odd ids are fire type, listed in id order.
    documents.push((
        "type/fire".into(),
        json!({
            "pokemon": (1..=size)
                .filter(|i| i % 2 == 1)
                .map(|i| json!({"slot": 1, "pokemon": member(i, &format!("mon-{i}"), "pokemon")}))
                .collect::<Vec<_>>()
        }),
    ));

    // The pokedex lists every creature in reverse entry order.
    documents.push((
        "pokedex/kanto".into(),
        json!({
            "pokemon_entries": (1..=size)
                .rev()
                .map(|i| json!({
                    "entry_number": i,
                    "pokemon_species": member(i, &format!("mon-{i}"), "pokemon-species")
                }))
                .collect::<Vec<_>>()
        }),
    ));

    documents.push((
        "region/kanto".into(),
        json!({"main_generation": {"name": "generation-i", "url": "https://pokeapi.co/api/v2/generation/1/"}}),
    ));
    documents.push((
        "generation/generation-i".into(),
        json!({
            "pokemon_species": (1..=size.min(3))
                .rev()
                .map(|i| member(i, &format!("mon-{i}"), "pokemon-species"))
                .collect::<Vec<_>>()
        }),
    ));

    FixtureUpstream::from_documents(documents)
}

/// Wraps an upstream and records every requested path. Paths listed in
/// `failing` answer with a transport error instead.
pub struct CountingUpstream<U> {
    inner: U,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl<U: UpstreamClient> CountingUpstream<U> {
    pub fn new(inner: U) -> Self {
        CountingUpstream {
            inner,
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().insert(path.to_string());
    }

    pub fn heal(&self, path: &str) {
        self.failing.lock().remove(path);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_with_prefix(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|p| p.starts_with(prefix)).count()
    }
}

#[async_trait]
impl<U: UpstreamClient> UpstreamClient for CountingUpstream<U> {
    async fn get_json(&self, path: &str) -> Result<Value, UpstreamError> {
        self.calls.lock().push(path.to_string());
        if self.failing.lock().contains(path) {
            return Err(UpstreamError::RetriesExceeded(path.to_string()));
        }
        self.inner.get_json(path).await
    }
}
