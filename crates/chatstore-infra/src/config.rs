//! Store configuration loader.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`StoreConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::Path;

use chatstore_types::config::{PaginationConfig, StoreConfig};

/// Load store configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`StoreConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
/// - Otherwise returns the parsed config with its page sizes normalized.
pub async fn load_store_config(data_dir: &Path) -> StoreConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return StoreConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return StoreConfig::default();
        }
    };

    match toml::from_str::<StoreConfig>(&content) {
        Ok(config) => StoreConfig {
            pagination: normalize_pagination(config.pagination),
        },
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            StoreConfig::default()
        }
    }
}

/// Enforce a usable page size policy.
///
/// The ceiling is at least 1 and the default never exceeds the ceiling.
pub fn normalize_pagination(config: PaginationConfig) -> PaginationConfig {
    let max_page_size = config.max_page_size.max(1);
    let default_page_size = config.default_page_size.clamp(1, max_page_size);
    if default_page_size != config.default_page_size || max_page_size != config.max_page_size {
        tracing::warn!(
            default_page_size,
            max_page_size,
            "adjusted pagination config to a usable range"
        );
    }
    PaginationConfig {
        default_page_size,
        max_page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_store_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_store_config(tmp.path()).await;
        assert_eq!(config, StoreConfig::default());
    }

    #[tokio::test]
    async fn load_store_config_valid_toml_returns_parsed() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[pagination]
default_page_size = 20
max_page_size = 200
"#,
        )
        .await?;

        let config = load_store_config(tmp.path()).await;
        assert_eq!(config.pagination.default_page_size, 20);
        assert_eq!(config.pagination.max_page_size, 200);
        Ok(())
    }

    #[tokio::test]
    async fn load_store_config_partial_section_keeps_defaults() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        tokio::fs::write(tmp.path().join("config.toml"), "[pagination]\nmax_page_size = 75\n")
            .await?;

        let config = load_store_config(tmp.path()).await;
        assert_eq!(config.pagination.default_page_size, 50);
        assert_eq!(config.pagination.max_page_size, 75);
        Ok(())
    }

    #[tokio::test]
    async fn load_store_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_store_config(tmp.path()).await;
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn normalize_pagination_clamps_default_to_ceiling() {
        let config = normalize_pagination(PaginationConfig {
            default_page_size: 500,
            max_page_size: 100,
        });
        assert_eq!(config.default_page_size, 100);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn normalize_pagination_rejects_zero_sizes() {
        let config = normalize_pagination(PaginationConfig {
            default_page_size: 0,
            max_page_size: 0,
        });
        assert_eq!(config.default_page_size, 1);
        assert_eq!(config.max_page_size, 1);
    }
}
