//! Session Lock command-line tool and HTTP gate.
//!
//! Usage:
//!   sessionlock keygen
//!   sessionlock lock <JWT>
//!   sessionlock verify <LOCKED_TOKEN> --window-ms 3000
//!   sessionlock serve --port 4003
//!
//! The device key lives in a SQLite key store (`--keystore`, or the
//! `SESSIONLOCK_KEYSTORE` environment variable), sealed under a key derived
//! from `--passphrase` (or `SESSIONLOCK_PASSPHRASE`).

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sessionlock::{
    split_locked_token, DeviceSession, FreshnessWindow, P256Provider, SqliteKeyStore,
    SystemClock, TokenVerifier, VerifierConfig,
};
use sessionlock_gate::{build_router, AppState, GateConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "sessionlock")]
#[command(about = "Bind JWTs to a device key and verify locked tokens")]
#[command(version)]
struct Args {
    /// Path to the device key store
    #[arg(
        long,
        global = true,
        env = "SESSIONLOCK_KEYSTORE",
        default_value = "sessionlock-keystore.db"
    )]
    keystore: PathBuf,

    /// Passphrase that seals the device key at rest
    #[arg(long, global = true, env = "SESSIONLOCK_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a device key pair and print the public key
    Keygen,

    /// Lock a JWT with the device key
    Lock {
        /// JWT issued by the login server
        jwt: String,
    },

    /// Split a locked token and print its parts as JSON
    Split {
        /// Locked token
        token: String,
    },

    /// Verify a locked token; exits non-zero unless valid
    Verify {
        /// Locked token
        token: String,

        /// Freshness window in milliseconds
        #[arg(long)]
        window_ms: Option<u64>,
    },

    /// Delete the device key
    Clear,

    /// Run the HTTP gate
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "SESSIONLOCK_PORT", default_value = "4003")]
        port: u16,

        /// Default freshness window in milliseconds
        #[arg(long)]
        window_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Keygen => {
            let session = open_session(&args.keystore, args.passphrase.as_deref())?;
            let public_key = session
                .generate_key_pair()
                .await
                .context("Failed to generate device key")?;
            println!("{public_key}");
        }
        Command::Lock { jwt } => {
            let session = open_session(&args.keystore, args.passphrase.as_deref())?;
            let locked = session
                .lock_token(&jwt)
                .await
                .context("Failed to lock token")?;
            println!("{locked}");
        }
        Command::Split { token } => {
            let parsed = split_locked_token(&token)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Verify { token, window_ms } => {
            let verifier = system_verifier(VerifierConfig::default());
            let window = window_ms
                .map(FreshnessWindow::from_millis)
                .unwrap_or(verifier.config().freshness_window);
            let result = verifier.verify_with_window(&token, window).await?;
            println!("{result}");
            if !result.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Clear => {
            let session = open_session(&args.keystore, args.passphrase.as_deref())?;
            session
                .clear_key_store()
                .await
                .context("Failed to clear key store")?;
            println!("Key store cleared");
        }
        Command::Serve {
            host,
            port,
            window_ms,
        } => {
            let mut config = GateConfig {
                host,
                port,
                ..GateConfig::default()
            };
            if let Some(ms) = window_ms {
                config.verifier.freshness_window = FreshnessWindow::from_millis(ms);
            }
            serve(config).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn open_session(path: &Path, passphrase: Option<&str>) -> Result<DeviceSession> {
    let passphrase = passphrase
        .context("A key store passphrase is required (--passphrase or SESSIONLOCK_PASSPHRASE)")?;
    let store = SqliteKeyStore::open(path, passphrase)
        .with_context(|| format!("Failed to open key store at {}", path.display()))?;
    Ok(DeviceSession::new(Arc::new(store)))
}

fn system_verifier(config: VerifierConfig) -> TokenVerifier {
    TokenVerifier::with_config(Arc::new(P256Provider::new()), Arc::new(SystemClock), config)
}

async fn serve(config: GateConfig) -> Result<()> {
    let state = AppState::new(system_verifier(config.verifier.clone()));
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(
        address = %address,
        window_ms = config.verifier.freshness_window.as_millis(),
        "Session lock gate listening"
    );
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
