//! Facility configuration.

use odra::prelude::*;
use crate::errors::EscrowError;
use crate::ratio::INITIAL_CRN;
use crate::types::AssetId;

/// Collateral asset id used when none is configured
pub const DEFAULT_COLLATERAL_ASSET: AssetId = 9;
/// Stable asset id used when none is configured
pub const DEFAULT_STABLE_ASSET: AssetId = 10;

/// How close-out requests are treated
#[odra::odra_type]
#[derive(Copy, Default)]
pub enum CloseOutPolicy {
    /// Every close-out is rejected
    #[default]
    Disallowed,
    /// Close-out succeeds once both account balances are zero
    RequireZeroBalances,
}

/// Escrow facility configuration
#[odra::odra_type]
pub struct EscrowConfig {
    /// Asset accepted as collateral
    pub collateral_asset: AssetId,
    /// Asset issued against collateral
    pub stable_asset: AssetId,
    /// Account holding pooled collateral and the stable supply
    pub reserve: Address,
    /// Ratio numerator written at creation
    pub initial_ratio: u64,
    /// Close-out handling
    pub close_out_policy: CloseOutPolicy,
}

impl EscrowConfig {
    pub fn new(reserve: Address) -> Self {
        Self {
            collateral_asset: DEFAULT_COLLATERAL_ASSET,
            stable_asset: DEFAULT_STABLE_ASSET,
            reserve,
            initial_ratio: INITIAL_CRN,
            close_out_policy: CloseOutPolicy::Disallowed,
        }
    }

    pub fn with_assets(mut self, collateral_asset: AssetId, stable_asset: AssetId) -> Self {
        self.collateral_asset = collateral_asset;
        self.stable_asset = stable_asset;
        self
    }

    pub fn with_initial_ratio(mut self, initial_ratio: u64) -> Self {
        self.initial_ratio = initial_ratio;
        self
    }

    pub fn with_close_out_policy(mut self, policy: CloseOutPolicy) -> Self {
        self.close_out_policy = policy;
        self
    }

    /// Reject configurations the facility cannot operate under.
    pub fn validate(&self) -> Result<(), EscrowError> {
        if self.initial_ratio == 0 {
            return Err(EscrowError::InvalidConfig);
        }
        if self.collateral_asset == self.stable_asset {
            return Err(EscrowError::InvalidConfig);
        }
        Ok(())
    }
}
