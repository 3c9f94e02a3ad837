// Simulated development node
//
// Usage:
//   cargo run --bin evmctl_simnode -- --bind-address 127.0.0.1:8545 --accounts 10

use anyhow::{Context, Result};
use clap::Parser;
use evmctl_common::{
    config::{
        DEFAULT_ACCOUNT_BALANCE_ETHER, DEFAULT_ACCOUNT_COUNT, DEFAULT_CHAIN_ID,
        DEFAULT_SIMNODE_BIND_ADDRESS,
    },
    units::{from_unit, to_unit},
};
use evmctl_testing_framework::simnode::{server::bind_server, SimulatedNodeBuilder};
use log::info;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "evmctl_simnode")]
#[command(about = "In-memory development node answering evm_* and eth_* control requests")]
struct Args {
    /// Address the JSON-RPC server listens on
    #[arg(short, long, default_value = DEFAULT_SIMNODE_BIND_ADDRESS)]
    bind_address: String,

    /// Number of funded, unlocked accounts
    #[arg(short, long, default_value_t = DEFAULT_ACCOUNT_COUNT)]
    accounts: usize,

    /// Balance of each account, in ether
    #[arg(long, default_value_t = DEFAULT_ACCOUNT_BALANCE_ETHER)]
    balance: u64,

    /// Chain id reported by eth_chainId
    #[arg(long, default_value_t = DEFAULT_CHAIN_ID)]
    chain_id: u64,

    /// Timestamp of block 0 (defaults to now)
    #[arg(long)]
    genesis_timestamp: Option<u64>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut builder = SimulatedNodeBuilder::new()
        .with_funded_accounts(args.accounts)
        .with_default_balance(to_unit(args.balance))
        .with_chain_id(args.chain_id);
    if let Some(timestamp) = args.genesis_timestamp {
        builder = builder.with_genesis_timestamp(timestamp);
    }
    let node = Arc::new(builder.build());

    info!("Chain id: {}", node.chain_id());
    info!("Genesis timestamp: {}", node.latest_block().timestamp);
    for account in node.accounts() {
        info!("  {:?} ({} ETH)", account, from_unit(node.balance(account)));
    }

    let (server, addr) = bind_server(node, &args.bind_address)
        .with_context(|| format!("Failed to bind {}", args.bind_address))?;
    info!("Listening on http://{}", addr);

    server.await.context("Server error")
}
