//! # Subsystem Container
//!
//! Builds every subsystem in dependency order, wires the in-process
//! collaborators, and owns the background task handles.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tracing::info;

use cl_gateway::{CommandService, DefaultStatelessValidator};
use cl_processor::TransactionProcessor;
use cl_storage::Storage;
use shared_bus::{StatusBus, StatusCache};
use shared_types::Block;

use crate::adapters::{
    run_mst_loop, run_ordering_loop, DirectOrderingGate, InProcessMstGate,
};
use crate::config::NodeConfig;

/// A fully wired node.
pub struct Node {
    /// Durable ledger.
    pub storage: Arc<Storage>,
    /// Status distribution.
    pub status_bus: Arc<StatusBus>,
    /// Last-known statuses.
    pub cache: Arc<StatusCache>,
    /// Batch routing and event translation.
    pub processor: Arc<TransactionProcessor>,
    /// Client-facing facade.
    pub service: Arc<CommandService>,
    tasks: Vec<JoinHandle<()>>,
}

impl Node {
    /// Validate the configuration and start every subsystem.
    ///
    /// # Errors
    ///
    /// Fails only on configuration errors; everything later in the node's
    /// life is reported through statuses and logs.
    pub fn start(config: &NodeConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|reason| anyhow::anyhow!(reason))
            .context("invalid node configuration")?;

        let storage = Arc::new(Storage::new());
        let status_bus = Arc::new(StatusBus::new());
        let cache = Arc::new(StatusCache::new());

        let (ordering_gate, ordering_rx) = DirectOrderingGate::channel();
        let (mst_gate, mst_rx) = InProcessMstGate::channel();

        let processor = Arc::new(TransactionProcessor::new(
            Arc::new(ordering_gate),
            Arc::new(mst_gate),
            Arc::clone(&status_bus),
        ));

        let service = Arc::new(CommandService::new(
            Arc::clone(&processor),
            Arc::clone(&storage),
            Arc::clone(&status_bus),
            Arc::clone(&cache),
            Arc::new(DefaultStatelessValidator),
            config.gateway_config(),
        ));

        let tasks = vec![
            service.spawn_status_listener(),
            tokio::spawn(run_ordering_loop(
                ordering_rx,
                Arc::clone(&storage),
                Arc::clone(&processor),
            )),
            tokio::spawn(run_mst_loop(
                mst_rx,
                Arc::clone(&processor),
                config.mst.expiry,
                config.mst.sweep_interval,
            )),
        ];

        info!("node subsystems started");
        Ok(Self {
            storage,
            status_bus,
            cache,
            processor,
            service,
            tasks,
        })
    }

    /// Apply and commit the genesis block on a fresh chain.
    ///
    /// Genesis bypasses stateful validation; the prologue only pins the
    /// block to height 1 on the zero parent hash.
    ///
    /// # Errors
    ///
    /// Fails when the chain already has blocks or a genesis command fails.
    pub fn apply_genesis(&self, genesis: Block) -> Result<()> {
        if self.storage.height() != 0 {
            bail!("chain already initialized at height {}", self.storage.height());
        }
        let mut mutable = self.storage.create_mutable_storage();
        let applied = mutable.apply(genesis, |block, _, top| {
            block.height == 1 && block.prev_hash == *top
        });
        if !applied {
            bail!("genesis block failed to apply");
        }
        self.storage.commit(mutable).context("genesis commit")?;
        info!(top = %hex::encode(self.storage.top_hash()), "genesis committed");
        Ok(())
    }

    /// Stop the background loops.
    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}
