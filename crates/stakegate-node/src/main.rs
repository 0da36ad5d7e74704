//! stakegate-node — StakeGate devnet node binary.
//!
//! Startup sequence:
//!   1. Open (or initialise) the sled-backed ledger store
//!   2. Resume the ledger from the store, or construct it from config
//!   3. Start the block ticker that drives the height clock
//!   4. Start the JSON-RPC server and serve until stopped

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::RwLock;
use tracing::{info, warn};

use stakegate_core::constants::DEFAULT_BLOCK_INTERVAL_MS;
use stakegate_core::ElectionConfig;
use stakegate_ledger::{BlockClock, LedgerMeta, LedgerStore, SharedClock, StakeLedger};
use stakegate_rpc::{RpcServer, RpcServerState};

#[derive(Parser, Debug)]
#[command(
    name = "stakegate-node",
    version,
    about = "StakeGate node: delay-gated staking ledger over JSON-RPC"
)]
struct Args {
    /// Data directory for the ledger store.
    #[arg(long, default_value = "~/.stakegate/data")]
    data_dir: PathBuf,

    /// JSON-RPC listen address.
    #[arg(long, default_value = "127.0.0.1:9650")]
    rpc_addr: SocketAddr,

    /// Election config JSON file. Only consulted on first start; once the
    /// ledger exists the stored config wins.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Block ticker interval in milliseconds. 0 disables the ticker, in which
    /// case height only moves via stakegate_advanceHeight.
    #[arg(long, default_value_t = DEFAULT_BLOCK_INTERVAL_MS)]
    block_interval_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stakegate=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("StakeGate node starting");

    // ── Ledger store ─────────────────────────────────────────────────────

    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let store =
        Arc::new(LedgerStore::open(&data_dir).context("opening ledger store")?);

    // ── Resume or construct ──────────────────────────────────────────────

    let (ledger, clock) = match store.get_ledger_meta().context("reading ledger meta")? {
        Some(meta) => {
            if args.config.is_some() {
                warn!("--config ignored: ledger already initialised, stored config wins");
            }
            let height = store
                .get_chain_height()
                .context("reading chain height")?
                .unwrap_or(meta.genesis_height);
            let clock = SharedClock::starting_at(height);
            let accounts = store
                .iter_accounts()
                .context("loading accounts")?
                .into_iter()
                .collect();
            let ledger = StakeLedger::from_parts(
                &meta.config,
                meta.genesis_height,
                accounts,
                Arc::new(clock.clone()),
            )
            .context("rebuilding ledger from store")?;
            info!(
                height,
                accounts = ledger.account_count(),
                "ledger resumed from store"
            );
            (ledger, clock)
        }
        None => {
            let config = load_election_config(args.config.as_deref())?;
            let clock = SharedClock::starting_at(0);
            let ledger = StakeLedger::new(&config, Arc::new(clock.clone()))
                .context("constructing ledger")?;
            store
                .put_ledger_meta(&LedgerMeta {
                    config,
                    genesis_height: ledger.genesis_height(),
                })
                .context("persisting ledger meta")?;
            store
                .put_chain_height(clock.current_height())
                .context("persisting chain height")?;
            info!("fresh data dir, ledger initialised at height 0");
            (ledger, clock)
        }
    };

    // ── Block ticker ─────────────────────────────────────────────────────

    if args.block_interval_ms > 0 {
        let ticker_clock = clock.clone();
        let ticker_store = Arc::clone(&store);
        let interval_ms = args.block_interval_ms;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            // The first tick completes immediately; skip it so the first
            // advance lands a full interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let height = ticker_clock.advance(1);
                if let Err(e) = ticker_store.put_chain_height(height) {
                    warn!(error = %e, "failed to persist chain height");
                }
            }
        });
        info!(interval_ms, "block ticker started");
    } else {
        info!("block ticker disabled, height moves via stakegate_advanceHeight");
    }

    // ── RPC server ───────────────────────────────────────────────────────

    let state = Arc::new(RpcServerState {
        ledger: RwLock::new(ledger),
        store: Arc::clone(&store),
        clock,
    });
    let rpc_handle = RpcServer::new(state)
        .start(args.rpc_addr)
        .await
        .context("starting RPC server")?;
    info!(addr = %args.rpc_addr, "node ready");

    rpc_handle.stopped().await;
    Ok(())
}

/// Load the election config from a JSON file, falling back to devnet defaults.
fn load_election_config(path: Option<&Path>) -> anyhow::Result<ElectionConfig> {
    match path {
        Some(p) => {
            let json = std::fs::read_to_string(p)
                .with_context(|| format!("reading election config {}", p.display()))?;
            serde_json::from_str(&json).context("parsing election config JSON")
        }
        None => {
            warn!("no --config given, using devnet election config");
            Ok(ElectionConfig::devnet())
        }
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}
