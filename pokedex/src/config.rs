use catalog::config::Config as CatalogConfig;
use serde::Deserialize;
use std::fs::File;

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "pokedex".into()
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub catalog: Option<CatalogConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::config::UpstreamType;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn catalog_config() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://key@sentry.example.com/1
            catalog:
                listener:
                    host: 0.0.0.0
                    port: 8080
                upstream:
                    type: http
                    base_url: https://pokeapi.co/api/v2/
                    retries: 5
                cache:
                    max_capacity: 500
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);
        assert_eq!(metrics.prefix, "pokedex");

        let logging = config.common.logging.expect("logging config");
        assert_eq!(logging.level, "info");
        assert!(logging.sentry_dsn.is_some());

        let catalog = config.catalog.expect("catalog config");
        assert_eq!(catalog.listener.port, 8080);
        assert_eq!(catalog.admin_listener.port, 3001);
        assert_eq!(catalog.cache.max_capacity, 500);
        assert!(matches!(
            catalog.upstream,
            UpstreamType::Http { retries: 5, timeout_secs: 10, .. }
        ));
    }

    #[test]
    fn minimal_config() {
        let tmp = write_tmp_file("{}");
        let config = Config::from_file(tmp.path()).expect("load config");
        assert_eq!(config.common, CommonConfig::default());
        assert!(config.catalog.is_none());
    }

    #[test]
    fn missing_file() {
        let err = Config::from_file(std::path::Path::new("/nonexistent/pokedex.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
