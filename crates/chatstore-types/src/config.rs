//! Configuration types for chatstore.
//!
//! `StoreConfig` represents the `config.toml` read at startup. Every field
//! has a default so an empty or missing file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Page size defaults and ceiling for cursor pagination.
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Page size policy for cursor pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the caller supplies neither `first` nor `last`.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Requested page sizes are clamped to this value.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_page_size() -> usize {
    50
}

fn default_max_page_size() -> usize {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}
