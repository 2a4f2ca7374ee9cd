//! Concord Ledger node entry point.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::adapters::now_millis;
use node_runtime::{GenesisBuilder, Node, NodeConfig};
use shared_types::Permission;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let config = NodeConfig::default();
    let node = Node::start(&config)?;

    if node.storage.height() == 0 {
        let genesis = GenesisBuilder::new(now_millis())
            .domain("root", "admin")
            .role(
                "admin",
                &[
                    Permission::CreateDomain,
                    Permission::CreateAccount,
                    Permission::CreateAsset,
                    Permission::CreateRole,
                    Permission::AppendRole,
                    Permission::AddAssetQuantity,
                    Permission::SubtractAssetQuantity,
                    Permission::Transfer,
                    Permission::Receive,
                    Permission::AddPeer,
                ],
            )
            .account("root", "root", [0u8; 32])
            .build();
        node.apply_genesis(genesis)?;
    }

    info!(height = node.storage.height(), "node ready");
    tokio::signal::ctrl_c().await.context("signal handler")?;
    info!("shutting down");
    node.shutdown();
    Ok(())
}
