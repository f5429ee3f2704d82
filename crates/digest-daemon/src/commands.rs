//! Command implementations for the digest daemon.
//!
//! Handles:
//! - start: load config, wire the engine together, serve HTTP
//! - stop: signal the running daemon via its PID file
//! - status: check whether a daemon is running
//! - check-config: validate and print the resolved configuration

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use digest_embeddings::{
    EmbeddingProvider, HashEmbedder, HttpEmbeddingProvider, HttpProviderConfig,
};
use digest_ingest::IngestPipeline;
use digest_params::TuningStore;
use digest_ranking::RankingEngine;
use digest_service::{serve_with_shutdown, AppState};
use digest_types::Settings;
use digest_vector::{InMemoryVectorStore, VectorStore};

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| {
            #[cfg(unix)]
            {
                dirs.runtime_dir()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| dirs.cache_dir().to_path_buf())
            }
            #[cfg(not(unix))]
            {
                dirs.cache_dir().to_path_buf()
            }
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("chat-digest")
        .join("daemon.pid")
}

/// Write PID to file
fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, std::process::id().to_string())?;
    info!("wrote PID file: {:?}", pid_path);
    Ok(())
}

/// Remove PID file
fn remove_pid_file() {
    let pid_path = pid_file_path();
    if pid_path.exists() {
        if let Err(e) = fs::remove_file(&pid_path) {
            warn!("failed to remove PID file: {}", e);
        } else {
            info!("removed PID file");
        }
    }
}

/// Read PID from file
fn read_pid_file() -> Option<u32> {
    let pid_path = pid_file_path();
    fs::read_to_string(&pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Check if a process is running
#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // On Unix, sending signal 0 checks if process exists
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    // Without signal 0, assume running if the PID file exists
    true
}

/// Build the configured embedding provider.
///
/// "openai" talks to any OpenAI-compatible embeddings API; "hash" is the
/// deterministic local embedder for development and tests.
fn build_provider(settings: &Settings) -> Result<Arc<dyn EmbeddingProvider>> {
    match settings.provider.backend.as_str() {
        "hash" => {
            warn!("using the deterministic hash embedder; intended for development only");
            Ok(Arc::new(HashEmbedder::new(settings.provider.dimensions)))
        }
        _ => {
            let config = HttpProviderConfig::from_settings(&settings.provider)
                .context("invalid provider configuration")?;
            let provider =
                HttpEmbeddingProvider::new(config).context("failed to build embedding provider")?;
            Ok(Arc::new(provider))
        }
    }
}

/// Start the digest daemon.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Wire provider, vector store, tuning scopes, pipeline, engine
/// 3. Serve HTTP
/// 4. Handle graceful shutdown on SIGINT/SIGTERM
pub async fn start_daemon(
    config_path: Option<&str>,
    foreground: bool,
    port_override: Option<u16>,
    state_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("failed to load configuration")?;

    // CLI overrides take highest precedence
    if let Some(port) = port_override {
        settings.http_port = port;
    }
    if let Some(state_dir) = state_dir_override {
        settings.state_dir = state_dir.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("digest daemon starting");
    info!("  http address: {}", settings.http_addr());
    info!("  state dir: {}", settings.state_dir);
    info!("  provider backend: {}", settings.provider.backend);
    info!("  log level: {}", settings.log_level);

    if !foreground {
        warn!("background mode not implemented, running in foreground");
        warn!("use a process manager (systemd, launchd) for background operation");
    }

    let state_dir = settings.state_path();
    fs::create_dir_all(&state_dir).context("failed to create state directory")?;

    let provider = build_provider(&settings)?;
    // Vectors live in process memory; re-ingest after a restart.
    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    let tuning = Arc::new(
        TuningStore::load_or_init(&state_dir, settings.tuning.to_params())
            .context("failed to load tuning scopes")?,
    );
    let pipeline = Arc::new(IngestPipeline::with_settings(
        store.clone(),
        provider.clone(),
        &settings.ingest,
    ));
    let engine = Arc::new(
        RankingEngine::new(store, provider, tuning.clone()).with_settings(settings.ranking.clone()),
    );
    let state = AppState::new(pipeline, engine, tuning);

    write_pid_file()?;

    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("invalid http address")?;

    let shutdown = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("received Ctrl+C, shutting down");
            }
            _ = terminate => {
                info!("received SIGTERM, shutting down");
            }
        }
    };

    let result = serve_with_shutdown(addr, state, shutdown).await;

    remove_pid_file();

    result.map_err(|e| anyhow::anyhow!("server error: {e}"))
}

/// Stop the running daemon by sending SIGTERM.
pub fn stop_daemon() -> Result<()> {
    let pid = read_pid_file().context("no PID file found - daemon may not be running")?;

    if !is_process_running(pid) {
        remove_pid_file();
        anyhow::bail!("daemon not running (stale PID file removed)");
    }

    info!("stopping daemon (PID {})", pid);

    #[cfg(unix)]
    {
        unsafe {
            if libc::kill(pid as i32, libc::SIGTERM) != 0 {
                anyhow::bail!("failed to send SIGTERM to daemon");
            }
        }
        println!("Sent SIGTERM to daemon (PID {})", pid);
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("stop command not yet implemented on this platform");
    }

    Ok(())
}

/// Show daemon status.
pub fn show_status() -> Result<()> {
    let pid_path = pid_file_path();

    match read_pid_file() {
        Some(pid) if is_process_running(pid) => {
            println!("Digest daemon is running (PID {})", pid);
            println!("PID file: {:?}", pid_path);
            Ok(())
        }
        Some(pid) => {
            println!(
                "Digest daemon is NOT running (stale PID {} in {:?})",
                pid, pid_path
            );
            Ok(())
        }
        None => {
            println!("Digest daemon is NOT running (no PID file)");
            Ok(())
        }
    }
}

/// Validate configuration and print the resolved values.
///
/// Loading already runs every section's validate pass, so reaching the
/// print means the daemon would start with these settings.
pub fn check_config(config_path: Option<&str>) -> Result<()> {
    let settings = Settings::load(config_path).context("configuration is invalid")?;

    println!("Configuration OK");
    println!("  http address:      {}", settings.http_addr());
    println!("  state dir:         {}", settings.state_dir);
    println!("  log level:         {}", settings.log_level);
    println!("  provider backend:  {}", settings.provider.backend);
    println!("  provider model:    {}", settings.provider.model);
    println!(
        "  provider api key:  {}",
        if settings.provider.api_key.is_some() {
            "set"
        } else {
            "unset (DIGEST_PROVIDER__API_KEY)"
        }
    );
    println!("  embed concurrency: {}", settings.ingest.max_concurrent_embeds);
    println!("  default top_k:     {}", settings.tuning.top_k);
    Ok(())
}
