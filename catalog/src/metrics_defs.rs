//! Metrics definitions for the catalog.

use shared::metrics_defs::{MetricDef, MetricType};

pub const CACHE_HIT: MetricDef = MetricDef {
    name: "response_cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of lookups answered from the response cache. Tagged with cache.",
};

pub const CACHE_MISS: MetricDef = MetricDef {
    name: "response_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of lookups that ran the fetcher. Tagged with cache.",
};

pub const INDEX_LOAD_DURATION: MetricDef = MetricDef {
    name: "catalog_index.load.duration",
    metric_type: MetricType::Histogram,
    description: "Time to fetch and build the catalog index in seconds",
};

pub const INDEX_ENTRIES: MetricDef = MetricDef {
    name: "catalog_index.entries",
    metric_type: MetricType::Gauge,
    description: "Number of entries in the installed catalog index",
};

pub const DETAIL_FETCHES: MetricDef = MetricDef {
    name: "aggregator.detail_fetches",
    metric_type: MetricType::Counter,
    description: "Number of detail expansions requested for page slices",
};

pub const PAGE_DURATION: MetricDef = MetricDef {
    name: "aggregator.page.duration",
    metric_type: MetricType::Histogram,
    description: "Time to produce one page in seconds. Tagged with dimension.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    CACHE_HIT,
    CACHE_MISS,
    INDEX_LOAD_DURATION,
    INDEX_ENTRIES,
    DETAIL_FETCHES,
    PAGE_DURATION,
];
