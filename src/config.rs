use std::env;

/// Default location of the Flexible Query API.
pub const DEFAULT_BASE_URL: &str = "https://di.unfccc.int/api/";
/// Variable ids sent per flexible query.
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Selections above this many variables tend to fail on the service side.
pub const DEFAULT_LARGE_SELECTION: usize = 3000;
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

const BASE_URL_ENV: &str = "UNFCCC_DI_API_BASE_URL";
const TIMEOUT_ENV: &str = "UNFCCC_DI_API_TIMEOUT_MS";
const BATCH_SIZE_ENV: &str = "UNFCCC_DI_API_BATCH_SIZE";

/// Settings shared by the readers and the HTTP transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// Service root; endpoint paths are appended verbatim.
    pub base_url: String,
    /// Batch size used by the unified reader.
    pub batch_size: usize,
    /// Selection size above which a warning is logged.
    pub large_selection: usize,
    /// Connect / read / write timeout of the HTTP transport.
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            large_selection: DEFAULT_LARGE_SELECTION,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: concat!("unfccc-di-api/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ReaderConfig {
    /// Defaults, overridden by `UNFCCC_DI_API_*` environment variables when set and valid.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = env::var(BASE_URL_ENV).ok().filter(|v| !v.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(timeout) = parse_env::<u64>(TIMEOUT_ENV).filter(|v| *v > 0) {
            config.timeout_ms = timeout;
        }
        if let Some(batch) = parse_env::<usize>(BATCH_SIZE_ENV).filter(|v| *v > 0) {
            config.batch_size = batch;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL of an endpoint path.
    pub fn url(&self, path: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_public_service() {
        let config = ReaderConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.large_selection, 3000);
    }

    #[test]
    fn url_joins_with_single_slash() {
        let config = ReaderConfig::default();
        assert_eq!(config.url("years/single"), "https://di.unfccc.int/api/years/single");
        let config = config.with_base_url("http://localhost:8080/api");
        assert_eq!(config.url("conversion/fq"), "http://localhost:8080/api/conversion/fq");
    }
}
