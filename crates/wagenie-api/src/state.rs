//! Application state wiring configuration and infrastructure together.
//!
//! `AppState` pins the generic engine to the concrete adapters: the file
//! credential store, the OpenAI services, and the console transport.

use std::path::{Path, PathBuf};

use anyhow::Context;

use wagenie_infra::credstore::{resolve_data_dir, FileCredentialStore};
use wagenie_types::config::BotConfig;

/// Shared state behind every CLI command.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: BotConfig,
    pub data_dir: PathBuf,
    pub store: FileCredentialStore,
}

impl AppState {
    /// Initialize from the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::init_at(resolve_data_dir()).await
    }

    /// Initialize against an explicit data directory.
    pub async fn init_at(data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("creating data dir {}", data_dir.display()))?;

        let config = load_config(&data_dir).await?;
        let store = FileCredentialStore::new(&data_dir);

        Ok(Self {
            config,
            data_dir,
            store,
        })
    }
}

/// Load `{data_dir}/config.toml`. A missing file yields the defaults; an
/// unparseable file is an error rather than a silent fallback.
async fn load_config(data_dir: &Path) -> anyhow::Result<BotConfig> {
    let path = data_dir.join("config.toml");
    match tokio::fs::read_to_string(&path).await {
        Ok(raw) => {
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(BotConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}
