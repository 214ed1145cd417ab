use crate::errors::{CatalogError, Result};
use crate::metrics_defs::{INDEX_ENTRIES, INDEX_LOAD_DURATION};
use crate::types::{CatalogEntry, PageRequest, PageResult, paginate, resource_id};
use crate::upstream::UpstreamClient;
use parking_lot::RwLock;
use shared::{gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Searchable name table over the full upstream listing.
///
/// Loaded once at startup. Readers take a snapshot of the installed entries,
/// so a reload swaps the whole table and never exposes a partial one.
pub struct CatalogIndex {
    entries: RwLock<Arc<Vec<CatalogEntry>>>,
    // Used by the readiness probe. Initially false and set to true once any
    // listing has been installed.
    ready: AtomicBool,
    upper_bound: usize,
}

impl CatalogIndex {
    pub fn new(upper_bound: usize) -> Self {
        CatalogIndex {
            entries: RwLock::new(Arc::new(Vec::new())),
            ready: AtomicBool::new(false),
            upper_bound,
        }
    }

    /// Fetches the complete listing in a single call and installs it,
    /// replacing any previously loaded index.
    pub async fn load(&self, upstream: &dyn UpstreamClient) -> Result<()> {
        let start = Instant::now();

        let listing = upstream
            .list_pokemon(self.upper_bound)
            .await
            .map_err(|e| match CatalogError::from(e) {
                CatalogError::DataIntegrity(message) => CatalogError::DataIntegrity(message),
                other => CatalogError::UpstreamUnavailable(other.to_string()),
            })?;

        let entries = listing
            .into_iter()
            .enumerate()
            .map(|(id, resource)| {
                Ok(CatalogEntry {
                    id,
                    ordinal: resource_id(&resource.url)?,
                    name: resource.name,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let count = entries.len();
        *self.entries.write() = Arc::new(entries);
        self.ready.store(true, Ordering::Release);

        gauge!(INDEX_ENTRIES).set(count as f64);
        histogram!(INDEX_LOAD_DURATION).record(start.elapsed().as_secs_f64());
        tracing::info!(entries = count, "Catalog index loaded");

        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Result<Arc<Vec<CatalogEntry>>> {
        if !self.is_loaded() {
            return Err(CatalogError::NotReady);
        }
        Ok(self.entries.read().clone())
    }

    /// Entries satisfying `predicate`, in catalog order.
    pub fn matching<P>(&self, predicate: P) -> Result<Vec<CatalogEntry>>
    where
        P: Fn(&CatalogEntry) -> bool,
    {
        Ok(self
            .snapshot()?
            .iter()
            .filter(|entry| predicate(entry))
            .cloned()
            .collect())
    }

    /// Case-insensitive substring match on the name, with the term taken
    /// verbatim. Matches keep catalog order; an empty term matches everything.
    pub fn search_by_name(&self, term: &str, page: PageRequest) -> Result<PageResult<CatalogEntry>> {
        let needle = term.to_lowercase();
        let matches = self.matching(|entry| entry.name.to_lowercase().contains(&needle))?;
        Ok(paginate(&matches, page))
    }
}
