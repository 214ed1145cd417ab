//! Fixture-backed upstream. Serves the same documents as the live catalog from
//! a directory tree (`pokemon.json`, `pokemon/25.json`, `type/fire.json`, ...)
//! so the service can run without network access.

use super::UpstreamClient;
use crate::errors::UpstreamError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct FixtureUpstream {
    documents: HashMap<String, Value>,
}

impl FixtureUpstream {
    /// Builds a fixture from `(path, document)` pairs, e.g. `("pokemon/25", json!({..}))`.
    pub fn from_documents<I, P>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, Value)>,
        P: Into<String>,
    {
        FixtureUpstream {
            documents: documents
                .into_iter()
                .map(|(path, doc)| (path.into(), doc))
                .collect(),
        }
    }

    /// Loads every `*.json` file below `dir`. The document path is the file's
    /// relative path without the extension.
    pub fn from_dir(dir: &str) -> Result<Self, UpstreamError> {
        let root = Path::new(dir);
        let mut documents = HashMap::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(current) = pending.pop() {
            for entry in fs::read_dir(&current)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }

                let key = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .with_extension("")
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");

                let raw = fs::read(&path)?;
                let document =
                    serde_json::from_slice(&raw).map_err(|source| UpstreamError::Decode {
                        path: key.clone(),
                        source,
                    })?;
                documents.insert(key, document);
            }
        }

        tracing::info!(dir, documents = documents.len(), "Loaded fixture upstream");
        Ok(FixtureUpstream { documents })
    }
}

#[async_trait]
impl UpstreamClient for FixtureUpstream {
    async fn get_json(&self, path: &str) -> Result<Value, UpstreamError> {
        // Query strings are ignored: the fixture listing is the complete catalog.
        let key = path.split('?').next().unwrap_or(path).trim_matches('/');
        self.documents
            .get(key)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(key.to_string()))
    }
}
