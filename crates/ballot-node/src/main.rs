use ballot_core::{
    constants::{DEFAULT_DIFFICULTY, HASH_HEX_SIZE},
    Chain, ChainConfig, MiningStrategy,
};
use ballot_node::{router, AppState};
use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, Level};

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Leading hex zeros every block hash must have
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY, value_parser = parse_difficulty)]
    difficulty: usize,

    /// Search nonces on all cores (same result as the sequential miner)
    #[arg(long)]
    parallel_mining: bool,
}

fn parse_difficulty(s: &str) -> Result<usize, String> {
    let difficulty: usize = s.parse().map_err(|e| format!("{e}"))?;
    if difficulty > HASH_HEX_SIZE {
        return Err(format!("difficulty must be at most {HASH_HEX_SIZE}"));
    }
    Ok(difficulty)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = ChainConfig {
        difficulty: args.difficulty,
        mining: if args.parallel_mining {
            MiningStrategy::Parallel
        } else {
            MiningStrategy::Sequential
        },
    };
    let chain = Chain::with_config(config);
    let state = AppState::new(chain);

    let addr: SocketAddr = args.listen.parse()?;
    info!("ballot-node listening on http://{addr} (difficulty {})", config.difficulty);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down; the in-memory chain is discarded");
        })
        .await?;
    Ok(())
}
