#![forbid(unsafe_code)]

use pawhaven_media::{CdnUploader, LocalDirHost, MediaHost};
use pawhaven_server::{
    build_router, AppState, MediaHostConfig, ServerConfig, StoreBackendConfig,
};
use pawhaven_store::{HttpDocStore, MemoryPetStore, PetStore, RetryPolicy};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn env_token_list(name: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn init_tracing() {
    let filter = env::var("PAWHAVEN_LOG")
        .ok()
        .map_or_else(|| EnvFilter::new("info"), EnvFilter::new);
    let json = env::var("PAWHAVEN_LOG_FORMAT").as_deref() == Ok("json");
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn config_from_env() -> Result<ServerConfig, String> {
    let store = match env::var("PAWHAVEN_STORE").as_deref() {
        Ok("document") => StoreBackendConfig::Document {
            base_url: env::var("PAWHAVEN_STORE_URL")
                .map_err(|_| "PAWHAVEN_STORE_URL is required for the document store".to_string())?,
            bearer: env::var("PAWHAVEN_STORE_BEARER").ok(),
            retry: RetryPolicy {
                max_attempts: env_usize("PAWHAVEN_STORE_RETRY_ATTEMPTS", 4),
                base_backoff_ms: env_u64("PAWHAVEN_STORE_RETRY_BASE_MS", 120),
            },
            allow_private_hosts: env_bool("PAWHAVEN_STORE_ALLOW_PRIVATE_HOSTS", false),
        },
        Ok("memory") | Err(_) => StoreBackendConfig::Memory,
        Ok(other) => return Err(format!("unknown PAWHAVEN_STORE backend: {other}")),
    };
    let media = match env::var("PAWHAVEN_MEDIA").as_deref() {
        Ok("cdn") => MediaHostConfig::Cdn {
            endpoint: env::var("PAWHAVEN_MEDIA_ENDPOINT")
                .map_err(|_| "PAWHAVEN_MEDIA_ENDPOINT is required for the cdn host".to_string())?,
            upload_preset: env::var("PAWHAVEN_MEDIA_PRESET")
                .unwrap_or_else(|_| "pawhaven".to_string()),
            allow_private_hosts: env_bool("PAWHAVEN_MEDIA_ALLOW_PRIVATE_HOSTS", false),
        },
        Ok("local") => MediaHostConfig::LocalDir {
            root: PathBuf::from(
                env::var("PAWHAVEN_MEDIA_DIR").unwrap_or_else(|_| "artifacts/media".to_string()),
            ),
            public_base: env::var("PAWHAVEN_MEDIA_PUBLIC_BASE")
                .unwrap_or_else(|_| "http://localhost:8080/media".to_string()),
        },
        Ok("none") | Err(_) => MediaHostConfig::None,
        Ok(other) => return Err(format!("unknown PAWHAVEN_MEDIA host: {other}")),
    };
    Ok(ServerConfig {
        bind_addr: env::var("PAWHAVEN_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        store,
        media,
        admin_tokens: env_token_list("PAWHAVEN_ADMIN_TOKENS"),
        max_body_bytes: env_usize("PAWHAVEN_MAX_BODY_BYTES", 8 * 1024 * 1024),
        cache_enabled: env_bool("PAWHAVEN_CACHE_ENABLED", true),
        similar_limit: env_usize("PAWHAVEN_SIMILAR_LIMIT", 4),
        shutdown_drain: env_duration_ms("PAWHAVEN_SHUTDOWN_DRAIN_MS", 5000),
    })
}

fn build_store(config: &ServerConfig) -> Arc<dyn PetStore> {
    match &config.store {
        StoreBackendConfig::Memory => Arc::new(MemoryPetStore::new()),
        StoreBackendConfig::Document {
            base_url,
            bearer,
            retry,
            allow_private_hosts,
        } => Arc::new(HttpDocStore::new(
            base_url.clone(),
            bearer.clone(),
            retry.clone(),
            *allow_private_hosts,
        )),
    }
}

fn build_media_host(config: &ServerConfig) -> Option<Arc<dyn MediaHost>> {
    match &config.media {
        MediaHostConfig::None => None,
        MediaHostConfig::Cdn {
            endpoint,
            upload_preset,
            allow_private_hosts,
        } => Some(Arc::new(CdnUploader::new(
            endpoint.clone(),
            upload_preset.clone(),
            *allow_private_hosts,
        ))),
        MediaHostConfig::LocalDir { root, public_base } => Some(Arc::new(LocalDirHost::new(
            root.clone(),
            public_base.clone(),
        ))),
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let config = config_from_env()?;
    let store = build_store(&config);
    let media = build_media_host(&config);
    let store_tag = store.backend_tag();
    let media_tag = media.as_ref().map_or("none", |m| m.host_tag());
    let bind_addr = config.bind_addr.clone();
    let drain = config.shutdown_drain;
    if config.admin_tokens.is_empty() {
        tracing::warn!("no admin tokens configured; admin surface is open");
    }

    let state = AppState::new(store, media, config);
    let app = build_router(state);

    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .map_err(|e| format!("invalid bind addr {bind_addr}: {e}"))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("pawhaven-server listening on {bind_addr} store={store_tag} media={media_tag}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            info!("shutdown signal received, draining requests");
            tokio::time::sleep(drain).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
