use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ballot-cli")]
#[command(about = "CLI client for the ballot ledger node")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct Node {
    /// Node base URL (e.g. http://127.0.0.1:8080)
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    node: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cast a vote; prints the sealed block and receipt
    Vote {
        #[command(flatten)]
        node: Node,
        /// Voter identifier
        #[arg(long)]
        voter_id: String,
        /// Candidate name
        #[arg(long)]
        candidate: String,
    },
    /// Look up the block holding a voter's vote
    Verify {
        #[command(flatten)]
        node: Node,
        #[arg(long)]
        voter_id: String,
    },
    /// Show the most recent block
    Latest {
        #[command(flatten)]
        node: Node,
    },
    /// Dump every block in index order
    Chain {
        #[command(flatten)]
        node: Node,
    },
    /// Re-check every hash and link
    Validate {
        #[command(flatten)]
        node: Node,
    },
    /// Block and vote counts, difficulty, tip hash
    Stats {
        #[command(flatten)]
        node: Node,
    },
}

#[derive(Serialize)]
struct VoteIn {
    voter_id: String,
    candidate: String,
}

async fn print_response(res: reqwest::Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let request = match cli.cmd {
        Command::Vote {
            node,
            voter_id,
            candidate,
        } => client
            .post(format!("{}/votes", node.node))
            .json(&VoteIn { voter_id, candidate }),
        Command::Verify { node, voter_id } => client.get(format!(
            "{}/votes/{}",
            node.node,
            urlencoding::encode(&voter_id)
        )),
        Command::Latest { node } => client.get(format!("{}/chain/latest", node.node)),
        Command::Chain { node } => client.get(format!("{}/chain", node.node)),
        Command::Validate { node } => client.get(format!("{}/chain/validate", node.node)),
        Command::Stats { node } => client.get(format!("{}/chain/stats", node.node)),
    };
    debug!(?request, "sending request");
    print_response(request.send().await?).await
}
