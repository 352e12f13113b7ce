use std::time::Duration;

use smp_core::pagination::DEFAULT_PER_PAGE;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root including the `/api` prefix, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    /// Quiet window before a search candidate is dispatched.
    pub search_debounce: Duration,
    /// Quiet window before an entity lookup is dispatched.
    pub lookup_debounce: Duration,
    /// Lookup terms shorter than this (after trimming) issue no request.
    pub lookup_min_chars: usize,
    /// Page size of the first search.
    pub default_per_page: i64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Read `SMP_API_URL`, falling back to the local development server.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("SMP_API_URL").unwrap_or_else(|_| "http://localhost:3000/api".into()),
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".into(),
            search_debounce: Duration::from_millis(300),
            lookup_debounce: Duration::from_millis(500),
            lookup_min_chars: 2,
            default_per_page: DEFAULT_PER_PAGE,
        }
    }
}
