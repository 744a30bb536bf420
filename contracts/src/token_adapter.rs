//! Outbound asset transfers from the facility reserve.
//!
//! The core only ever sees the [`AssetTransfer`] seam: one call per
//! transfer that either fully succeeds or fails the enclosing operation.
//! The on-chain module backs it with CEP-18 token calls; `InMemoryReserve`
//! backs it for host-side simulation and tests and is not built into the
//! contract unless `test-support` is enabled.

#[cfg(any(test, feature = "test-support"))]
use alloc::collections::BTreeMap;
#[cfg(any(test, feature = "test-support"))]
use alloc::vec::Vec;
use odra::prelude::*;
use crate::errors::EscrowError;
use crate::types::{AssetId, TransferDescriptor};

/// Host facility for atomic outbound transfers
pub trait AssetTransfer {
    fn transfer(&mut self, descriptor: &TransferDescriptor) -> Result<(), EscrowError>;
}

/// Build a transfer paid from `reserve` to `receiver`.
///
/// The close-to field names the reserve itself, so nothing beyond `amount`
/// ever leaves it.
pub fn reserve_payout(asset: AssetId, amount: u64, reserve: Address, receiver: Address) -> TransferDescriptor {
    TransferDescriptor {
        asset,
        amount,
        sender: reserve,
        receiver,
        close_to: reserve,
    }
}

/// Balance book keyed by (asset, holder)
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Debug, Default)]
pub struct InMemoryReserve {
    balances: BTreeMap<(AssetId, Address), u64>,
    submitted: Vec<TransferDescriptor>,
    refuse_transfers: bool,
}

#[cfg(any(test, feature = "test-support"))]
impl InMemoryReserve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `holder`.
    pub fn fund(&mut self, asset: AssetId, holder: Address, amount: u64) -> Result<(), EscrowError> {
        let balance = self.balances.entry((asset, holder)).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(EscrowError::Overflow)?;
        Ok(())
    }

    pub fn balance_of(&self, asset: AssetId, holder: &Address) -> u64 {
        self.balances.get(&(asset, *holder)).copied().unwrap_or(0)
    }

    /// Transfers accepted so far, in submission order.
    pub fn submitted(&self) -> &[TransferDescriptor] {
        &self.submitted
    }

    /// Make every later transfer fail, as a host refusing submission would.
    pub fn refuse_transfers(&mut self, refuse: bool) {
        self.refuse_transfers = refuse;
    }
}

#[cfg(any(test, feature = "test-support"))]
impl AssetTransfer for InMemoryReserve {
    fn transfer(&mut self, descriptor: &TransferDescriptor) -> Result<(), EscrowError> {
        if self.refuse_transfers {
            return Err(EscrowError::TransferFailed);
        }

        let sender_balance = self.balance_of(descriptor.asset, &descriptor.sender);
        let remaining = sender_balance
            .checked_sub(descriptor.amount)
            .ok_or(EscrowError::TransferFailed)?;
        let receiver_balance = self
            .balance_of(descriptor.asset, &descriptor.receiver)
            .checked_add(descriptor.amount)
            .ok_or(EscrowError::Overflow)?;

        // Closing out to another holder sweeps what is left.
        let sweep = descriptor.close_to != descriptor.sender && remaining > 0;
        let close_to_balance = if descriptor.close_to == descriptor.receiver {
            receiver_balance
        } else {
            self.balance_of(descriptor.asset, &descriptor.close_to)
        };
        let swept = if sweep {
            close_to_balance.checked_add(remaining).ok_or(EscrowError::Overflow)?
        } else {
            close_to_balance
        };

        // All checks pass before any balance moves.
        if descriptor.sender != descriptor.receiver {
            self.balances.insert((descriptor.asset, descriptor.sender), remaining);
            self.balances.insert((descriptor.asset, descriptor.receiver), receiver_balance);
        }
        if sweep {
            self.balances.insert((descriptor.asset, descriptor.sender), 0);
            self.balances.insert((descriptor.asset, descriptor.close_to), swept);
        }

        self.submitted.push(descriptor.clone());
        Ok(())
    }
}
