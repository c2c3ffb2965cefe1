// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(path, &contents)?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Load the file at `path`, or fall back to defaults when it does not exist.
pub async fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        load_config(path).await
    } else {
        tracing::warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        Ok(Config::default())
    }
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    let extension = path.extension().and_then(|s| s.to_str());

    let config: Config = if extension == Some("yaml") || extension == Some("yml") {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_selects_format() {
        let yaml = parse_config(
            Path::new("config.yml"),
            "server:\n  listen_addr: 127.0.0.1:9000\n",
        )
        .unwrap();
        assert_eq!(yaml.server.listen_addr.port(), 9000);

        let json = parse_config(
            Path::new("config.json"),
            r#"{"upstream": {"timeout_secs": 3}}"#,
        )
        .unwrap();
        assert_eq!(json.upstream.timeout_secs, 3);
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let config = load_config_or_default("/definitely/not/here.yaml")
            .await
            .unwrap();
        assert_eq!(config.ping.timeout_ms, 1000);
    }

    #[tokio::test]
    async fn invalid_file_is_reported() {
        let dir = std::env::temp_dir().join(format!("proxy-info-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("config.yaml");
        tokio::fs::write(&path, "ping:\n  timeout_ms: 0\n").await.unwrap();

        assert!(load_config(&path).await.is_err());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
