// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use ring::rand::{SecureRandom, SystemRandom};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use digitalid_server::{
    api::router,
    auth::TokenIssuer,
    config::{Config, DEFAULT_LOG_FILTER},
    crypto::CredentialCipher,
    state::AppState,
    storage::{load_seed_file, CredentialStore, DATABASE_FILE},
};

/// How long in-flight requests may run after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn jwt_secret(config: &Config) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if let Some(secret) = &config.jwt_secret {
        return Ok(secret.clone());
    }
    tracing::warn!("JWT_SECRET not set; generated a random one, tokens will not survive a restart");
    let mut secret = vec![0u8; 32];
    SystemRandom::new()
        .fill(&mut secret)
        .map_err(|_| "system randomness unavailable")?;
    Ok(secret)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_tracing(config.as_ref().map(|c| c.json_logs).unwrap_or(false));
    let config = config.inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;

    // Open database
    let db_path = config.data_dir.join(DATABASE_FILE);
    let store = CredentialStore::open(&db_path)?;
    tracing::info!(path = %db_path.display(), "Credential database opened");

    if let Some(seed_path) = &config.seed_file {
        let report = load_seed_file(&store, seed_path)?;
        tracing::info!(
            path = %seed_path.display(),
            inserted = report.inserted,
            existing = report.existing,
            rejected = report.rejected,
            "Seed file applied"
        );
    }

    let cipher = CredentialCipher::new(config.cipher_mode, config.credential_key.clone());
    let tokens = TokenIssuer::new(
        &jwt_secret(&config)?,
        config.access_token_ttl_secs,
        config.refresh_token_ttl_secs,
    );
    let state = AppState::new(store, cipher, tokens).with_admin_emails(config.admin_emails.clone());
    let app = router(state);

    let addr: SocketAddr = config.bind_address().parse()?;

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "Failed to install rustls crypto provider")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            tracing::info!(%addr, cipher_mode = %config.cipher_mode, "Digital ID server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::warn!("TLS_CERT_PATH/TLS_KEY_PATH not set; serving plain HTTP");
            tracing::info!(%addr, cipher_mode = %config.cipher_mode, "Digital ID server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
