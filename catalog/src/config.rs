use serde::Deserialize;
use url::Url;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("catalog_upper_bound must be greater than 0")]
    EmptyCatalog,

    #[error("detail_concurrency must be greater than 0")]
    NoConcurrency,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum UpstreamType {
    Http {
        base_url: Url,
        #[serde(default = "default_retries")]
        retries: u32,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Fixture {
        dir: String,
    },
}

fn default_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

fn default_listener() -> Listener {
    Listener {
        host: "127.0.0.1".into(),
        port: 3000,
    }
}

fn default_admin_listener() -> Listener {
    Listener {
        host: "127.0.0.1".into(),
        port: 3001,
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Known upper bound of the catalog size; the full listing is fetched in
    /// one call of this size.
    pub catalog_upper_bound: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            catalog_upper_bound: 2000,
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_capacity: 10_000,
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct AggregationConfig {
    /// Maximum number of detail fetches in flight for a single page.
    pub detail_concurrency: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig {
            detail_concurrency: 16,
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    #[serde(default = "default_listener")]
    pub listener: Listener,
    #[serde(default = "default_admin_listener")]
    pub admin_listener: Listener,
    pub upstream: UpstreamType,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.index.catalog_upper_bound == 0 {
            return Err(ValidationError::EmptyCatalog);
        }
        if self.aggregation.detail_concurrency == 0 {
            return Err(ValidationError::NoConcurrency);
        }
        Ok(())
    }
}
