//! # Node Configuration
//!
//! Unified configuration for the ledger subsystems and runtime parameters.
//! Every section has sane defaults; validation catches combinations that
//! cannot work rather than letting them surface as timeouts downstream.

use std::time::Duration;

use cl_gateway::GatewayConfig;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Ledger-wide parameters.
    pub ledger: LedgerConfig,
    /// Ordering collaborator parameters.
    pub ordering: OrderingConfig,
    /// Multi-signature collaborator parameters.
    pub mst: MstConfig,
    /// Gateway timing parameters.
    pub gateway: GatewaySection,
}

impl NodeConfig {
    /// Validate cross-section consistency.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.ledger.default_quorum == 0 {
            return Err("ledger.default_quorum must be at least 1".into());
        }
        if self.ordering.round_period.is_zero() {
            return Err("ordering.round_period must be positive".into());
        }
        if self.mst.expiry < self.ordering.round_period {
            return Err("mst.expiry shorter than one ordering round".into());
        }
        Ok(())
    }

    /// The gateway's view of the timing parameters.
    #[must_use]
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            initial_wait: self.gateway.initial_wait,
            round_period: self.ordering.round_period,
        }
    }
}

/// Ledger-wide parameters.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Quorum assigned to accounts that do not specify one.
    pub default_quorum: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { default_quorum: 1 }
    }
}

/// Ordering collaborator parameters.
#[derive(Debug, Clone)]
pub struct OrderingConfig {
    /// One proposal/commit round.
    pub round_period: Duration,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            round_period: Duration::from_secs(3),
        }
    }
}

/// Multi-signature collaborator parameters.
#[derive(Debug, Clone)]
pub struct MstConfig {
    /// How long an incomplete batch may wait for signatures.
    pub expiry: Duration,
    /// How often expired batches are swept.
    pub sweep_interval: Duration,
}

impl Default for MstConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(5),
        }
    }
}

/// Gateway timing parameters.
#[derive(Debug, Clone)]
pub struct GatewaySection {
    /// How long a status stream waits for processing to start.
    pub initial_wait: Duration,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_secs(1),
        }
    }
}
