// SPDX-License-Identifier: Apache-2.0

use pawhaven_store::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

/// Which `PetStore` backend the process wires in at startup.
#[derive(Debug, Clone)]
pub enum StoreBackendConfig {
    Memory,
    Document {
        base_url: String,
        bearer: Option<String>,
        retry: RetryPolicy,
        allow_private_hosts: bool,
    },
}

/// Which media host the process wires in at startup. `None` still serves
/// retain-only gallery commits; only new uploads need a host.
#[derive(Debug, Clone)]
pub enum MediaHostConfig {
    None,
    Cdn {
        endpoint: String,
        upload_preset: String,
        allow_private_hosts: bool,
    },
    LocalDir {
        root: PathBuf,
        public_base: String,
    },
}

/// Process configuration, assembled from the environment by `main` and
/// injected into the app state. An empty `admin_tokens` list leaves the
/// admin surface open, which is the dev/test default; deployments set
/// `PAWHAVEN_ADMIN_TOKENS`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub store: StoreBackendConfig,
    pub media: MediaHostConfig,
    pub admin_tokens: Vec<String>,
    pub max_body_bytes: usize,
    pub cache_enabled: bool,
    pub similar_limit: usize,
    pub shutdown_drain: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            store: StoreBackendConfig::Memory,
            media: MediaHostConfig::None,
            admin_tokens: Vec::new(),
            max_body_bytes: 8 * 1024 * 1024,
            cache_enabled: true,
            similar_limit: 4,
            shutdown_drain: Duration::from_millis(5000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_dev_profile() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert!(matches!(cfg.store, StoreBackendConfig::Memory));
        assert!(matches!(cfg.media, MediaHostConfig::None));
        assert!(cfg.admin_tokens.is_empty());
        assert!(cfg.cache_enabled);
        assert_eq!(cfg.similar_limit, 4);
    }
}
