//! Escrow: collateral in, stable asset out.

use odra::prelude::*;
use crate::config::EscrowConfig;
use crate::errors::EscrowError;
use crate::ledger::LedgerState;
use crate::ratio::issuable;
use crate::token_adapter::{reserve_payout, AssetTransfer};
use crate::types::AttachedAsset;

/// What an escrow call moved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscrowReceipt {
    /// Collateral received and credited
    pub collateral: u64,
    /// Stable asset issued and credited
    pub issued: u64,
}

/// Credit `attached` collateral to `caller` and pay out the stable asset it
/// buys at the stored ratio.
///
/// Every new balance is computed before the payout is submitted, and the
/// ledger is committed only after the payout succeeds.
pub fn escrow<T: AssetTransfer>(
    ledger: &mut LedgerState,
    config: &EscrowConfig,
    caller: Address,
    group_size: u32,
    attached: Option<AttachedAsset>,
    transfer: &mut T,
) -> Result<EscrowReceipt, EscrowError> {
    if group_size != 1 {
        return Err(EscrowError::GroupedCall);
    }
    let attached = attached.ok_or(EscrowError::MissingAttachedAsset)?;
    if attached.asset != config.collateral_asset {
        return Err(EscrowError::WrongAsset);
    }
    if attached.amount == 0 {
        return Err(EscrowError::ZeroAmount);
    }

    let mut snapshot = ledger.snapshot(caller)?;
    let issuing = issuable(attached.amount, snapshot.global.ratio_numerator)?;

    snapshot.local.asset_balance = snapshot
        .local
        .asset_balance
        .checked_add(attached.amount)
        .ok_or(EscrowError::Overflow)?;
    snapshot.local.stable_balance = snapshot
        .local
        .stable_balance
        .checked_add(issuing)
        .ok_or(EscrowError::Overflow)?;
    snapshot.global.sum_asset = snapshot
        .global
        .sum_asset
        .checked_add(attached.amount)
        .ok_or(EscrowError::Overflow)?;
    snapshot.global.sum_stable = snapshot
        .global
        .sum_stable
        .checked_add(issuing)
        .ok_or(EscrowError::Overflow)?;

    transfer.transfer(&reserve_payout(config.stable_asset, issuing, config.reserve, caller))?;
    ledger.commit(snapshot)?;

    Ok(EscrowReceipt {
        collateral: attached.amount,
        issued: issuing,
    })
}
