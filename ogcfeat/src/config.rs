//! Per-source loader configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use url::Url;

use crate::error::{LoadError, LoadResult};

/// Default features per page request.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Default maximum simultaneous in-flight page requests (offset strategy).
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Default bound on the next-link chain length.
///
/// Guards against servers emitting a perpetual `next` chain; raise it for
/// genuinely enormous collections.
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

/// Hook rewriting each base request URL before it is used.
///
/// Receives a fresh URL and must return a (possibly modified) URL; it must
/// not remove the CRS or format parameters the loader depends on. Typical
/// use is appending gateway-specific parameters.
pub type UrlRewrite = Arc<dyn Fn(Url) -> Url + Send + Sync>;

/// Explicit strategy selection, overriding capability detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyOverride {
    /// Trust the capability probe (default).
    #[default]
    Auto,

    /// Always follow next links, even when offset paging is supported.
    Next,

    /// Always use offset paging, even when the probe said unsupported.
    Offset,
}

impl FromStr for StrategyOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "next" => Ok(Self::Next),
            "offset" => Ok(Self::Offset),
            other => Err(format!(
                "unknown strategy '{}' (expected auto, next or offset)",
                other
            )),
        }
    }
}

impl fmt::Display for StrategyOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Next => "next",
            Self::Offset => "offset",
        };
        write!(f, "{}", name)
    }
}

/// Configuration for one feature source.
#[derive(Clone)]
pub struct SourceConfig {
    /// Landing-page URL of the OGC API Features service.
    ///
    /// Query parameters present here (auth tokens and the like) are
    /// preserved on every request the loader builds.
    pub base_url: Url,

    /// Collection identifier.
    pub collection: String,

    /// Request CRS override; when set it always wins over negotiation.
    pub crs_override: Option<String>,

    /// Features per page request.
    pub page_size: u64,

    /// Maximum simultaneous in-flight page requests (offset strategy).
    pub concurrency: usize,

    /// Bound on next-link chain length.
    pub max_pages: u32,

    /// Explicit strategy selection.
    pub strategy: StrategyOverride,

    /// Optional request URL rewrite hook.
    pub url_rewrite: Option<UrlRewrite>,
}

impl SourceConfig {
    /// Configuration with defaults for the given service and collection.
    pub fn new(base_url: Url, collection: impl Into<String>) -> Self {
        Self {
            base_url,
            collection: collection.into(),
            crs_override: None,
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            max_pages: DEFAULT_MAX_PAGES,
            strategy: StrategyOverride::default(),
            url_rewrite: None,
        }
    }

    /// Validate the configuration.
    ///
    /// Performed eagerly at source construction so misconfiguration fails
    /// the first load call site, not some later page fetch.
    pub fn validate(&self) -> LoadResult<()> {
        if self.collection.is_empty() {
            return Err(LoadError::InvalidConfiguration(
                "collection id must not be empty".to_string(),
            ));
        }
        if self.page_size < 1 {
            return Err(LoadError::InvalidConfiguration(
                "page size must be at least 1".to_string(),
            ));
        }
        if self.concurrency < 1 {
            return Err(LoadError::InvalidConfiguration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_pages < 1 {
            return Err(LoadError::InvalidConfiguration(
                "max pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url.as_str())
            .field("collection", &self.collection)
            .field("crs_override", &self.crs_override)
            .field("page_size", &self.page_size)
            .field("concurrency", &self.concurrency)
            .field("max_pages", &self.max_pages)
            .field("strategy", &self.strategy)
            .field("url_rewrite", &self.url_rewrite.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SourceConfig {
        SourceConfig::new(Url::parse("https://demo.org/api").unwrap(), "lakes")
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = config();
        config.concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(LoadError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_empty_collection_rejected() {
        let mut config = config();
        config.collection = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strategy_override_round_trip() {
        for strategy in [
            StrategyOverride::Auto,
            StrategyOverride::Next,
            StrategyOverride::Offset,
        ] {
            let parsed: StrategyOverride = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
        assert!("bogus".parse::<StrategyOverride>().is_err());
    }
}
