//! Redemption: stable asset in, collateral out.

use odra::prelude::*;
use crate::config::EscrowConfig;
use crate::errors::EscrowError;
use crate::ledger::LedgerState;
use crate::ratio::redeemable;
use crate::token_adapter::{reserve_payout, AssetTransfer};
use crate::types::AttachedAsset;

/// What a redeem call moved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedeemReceipt {
    /// Stable asset returned by the caller
    pub redeemed: u64,
    /// Collateral released to the caller
    pub released: u64,
}

/// Take back `attached` stable asset from `caller` and release the
/// collateral it is worth at the stored ratio.
///
/// The caller may never redeem more stable than its recorded balance.
/// Every subtraction is checked; an underflow fails the call instead of
/// wrapping.
pub fn redeem<T: AssetTransfer>(
    ledger: &mut LedgerState,
    config: &EscrowConfig,
    caller: Address,
    group_size: u32,
    attached: Option<AttachedAsset>,
    transfer: &mut T,
) -> Result<RedeemReceipt, EscrowError> {
    if group_size != 1 {
        return Err(EscrowError::GroupedCall);
    }
    let attached = attached.ok_or(EscrowError::MissingAttachedAsset)?;
    if attached.asset != config.stable_asset {
        return Err(EscrowError::WrongAsset);
    }

    let mut snapshot = ledger.snapshot(caller)?;
    if snapshot.local.stable_balance < attached.amount {
        return Err(EscrowError::InsufficientStableBalance);
    }
    let returning = redeemable(attached.amount, snapshot.global.ratio_numerator)?;

    snapshot.local.asset_balance = snapshot
        .local
        .asset_balance
        .checked_sub(returning)
        .ok_or(EscrowError::Underflow)?;
    snapshot.local.stable_balance = snapshot
        .local
        .stable_balance
        .checked_sub(attached.amount)
        .ok_or(EscrowError::Underflow)?;
    snapshot.global.sum_asset = snapshot
        .global
        .sum_asset
        .checked_sub(returning)
        .ok_or(EscrowError::Underflow)?;
    snapshot.global.sum_stable = snapshot
        .global
        .sum_stable
        .checked_sub(attached.amount)
        .ok_or(EscrowError::Underflow)?;

    transfer.transfer(&reserve_payout(config.collateral_asset, returning, config.reserve, caller))?;
    ledger.commit(snapshot)?;

    Ok(RedeemReceipt {
        redeemed: attached.amount,
        released: returning,
    })
}
