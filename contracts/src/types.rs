//! Typed ledger state shared by the core and the on-chain module.

use odra::prelude::*;
use odra::casper_types::bytesrepr::Bytes;

/// Host ledger asset identifier.
pub type AssetId = u64;

/// Facility-wide counters (single instance, owned by the facility)
#[odra::odra_type]
#[derive(Default)]
pub struct GlobalState {
    /// Total collateral currently escrowed
    pub sum_asset: u64,
    /// Total stable asset currently in circulation
    pub sum_stable: u64,
    /// Collateralization ratio numerator over 2^32 (CRN)
    pub ratio_numerator: u64,
    /// Opaque price payload, never interpreted here
    pub price_info: Bytes,
}

impl GlobalState {
    pub fn with_ratio(ratio_numerator: u64) -> Self {
        Self {
            sum_asset: 0,
            sum_stable: 0,
            ratio_numerator,
            price_info: Bytes::new(),
        }
    }
}

/// Per-participant state, created on opt-in
#[odra::odra_type]
#[derive(Default)]
pub struct AccountState {
    /// Collateral this account has escrowed
    pub asset_balance: u64,
    /// Stable asset this account holds against its escrow
    pub stable_balance: u64,
    /// Free-form log slot
    pub history: Bytes,
}

impl AccountState {
    pub fn is_empty(&self) -> bool {
        self.asset_balance == 0 && self.stable_balance == 0
    }
}

/// Asset transferred into the facility alongside a call
#[odra::odra_type]
#[derive(Copy)]
pub struct AttachedAsset {
    pub asset: AssetId,
    pub amount: u64,
}

/// Outbound transfer the facility authorizes from its reserve
#[odra::odra_type]
pub struct TransferDescriptor {
    pub asset: AssetId,
    pub amount: u64,
    pub sender: Address,
    pub receiver: Address,
    pub close_to: Address,
}
