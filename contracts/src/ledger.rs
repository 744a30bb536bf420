//! Ledger state: global counters plus per-account balances.
//!
//! Operations never touch state through ambient lookups. They take a
//! [`Snapshot`] of the global counters and one account, compute new values
//! on the copy, and hand it back to [`LedgerState::commit`]. The commit is
//! a compare-and-swap on the ledger version, so a snapshot taken before any
//! other commit can never overwrite it.

use alloc::collections::BTreeMap;
use odra::prelude::*;
use crate::errors::EscrowError;
use crate::types::{AccountState, GlobalState};

/// Consistent copy of the state one operation works on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Ledger version the copy was taken at
    pub version: u64,
    /// Account the local state belongs to
    pub account: Address,
    /// Global counters
    pub global: GlobalState,
    /// The account's balances
    pub local: AccountState,
}

/// Persistent facility state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerState {
    creator: Option<Address>,
    global: Option<GlobalState>,
    accounts: BTreeMap<Address, AccountState>,
    version: u64,
    program_version: u32,
    retired: bool,
}

impl LedgerState {
    /// Empty ledger, before creation
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted parts.
    pub fn from_parts(
        creator: Option<Address>,
        global: Option<GlobalState>,
        version: u64,
        program_version: u32,
        retired: bool,
    ) -> Self {
        Self {
            creator,
            global,
            accounts: BTreeMap::new(),
            version,
            program_version,
            retired,
        }
    }

    /// Load one persisted account into the ledger.
    pub fn insert_account(&mut self, account: Address, state: AccountState) {
        self.accounts.insert(account, state);
    }

    pub fn creator(&self) -> Option<Address> {
        self.creator
    }

    pub fn global(&self) -> Option<&GlobalState> {
        self.global.as_ref()
    }

    pub fn account(&self, account: &Address) -> Option<&AccountState> {
        self.accounts.get(account)
    }

    pub fn is_opted_in(&self, account: &Address) -> bool {
        self.accounts.contains_key(account)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn program_version(&self) -> u32 {
        self.program_version
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Install the global counters. Succeeds once.
    pub fn create(&mut self, creator: Address, global: GlobalState) -> Result<(), EscrowError> {
        if self.global.is_some() || self.retired {
            return Err(EscrowError::AlreadyCreated);
        }
        self.creator = Some(creator);
        self.global = Some(global);
        self.version += 1;
        Ok(())
    }

    /// Fail unless the facility exists and is still live.
    pub fn require_live(&self) -> Result<&GlobalState, EscrowError> {
        if self.retired {
            return Err(EscrowError::Retired);
        }
        self.global.as_ref().ok_or(EscrowError::NotCreated)
    }

    /// Allocate zeroed local state for `account`.
    pub fn opt_in(&mut self, account: Address) -> Result<(), EscrowError> {
        self.require_live()?;
        if self.accounts.contains_key(&account) {
            return Err(EscrowError::AlreadyOptedIn);
        }
        self.accounts.insert(account, AccountState::default());
        self.version += 1;
        Ok(())
    }

    /// Drop the local state of `account`, returning what it held.
    pub fn close_account(&mut self, account: &Address) -> Result<AccountState, EscrowError> {
        self.require_live()?;
        let state = self.accounts.remove(account).ok_or(EscrowError::NotOptedIn)?;
        self.version += 1;
        Ok(state)
    }

    /// Copy the global counters and `account`'s balances.
    pub fn snapshot(&self, account: Address) -> Result<Snapshot, EscrowError> {
        let global = self.require_live()?.clone();
        let local = self
            .accounts
            .get(&account)
            .cloned()
            .ok_or(EscrowError::NotOptedIn)?;
        Ok(Snapshot {
            version: self.version,
            account,
            global,
            local,
        })
    }

    /// Write back every field of `snapshot` as one unit.
    pub fn commit(&mut self, snapshot: Snapshot) -> Result<(), EscrowError> {
        self.require_live()?;
        if snapshot.version != self.version {
            return Err(EscrowError::StaleSnapshot);
        }
        if !self.accounts.contains_key(&snapshot.account) {
            return Err(EscrowError::NotOptedIn);
        }
        self.global = Some(snapshot.global);
        self.accounts.insert(snapshot.account, snapshot.local);
        self.version += 1;
        Ok(())
    }

    pub fn bump_program_version(&mut self) -> Result<u32, EscrowError> {
        self.require_live()?;
        self.program_version = self
            .program_version
            .checked_add(1)
            .ok_or(EscrowError::Overflow)?;
        self.version += 1;
        Ok(self.program_version)
    }

    pub fn retire(&mut self) -> Result<(), EscrowError> {
        self.require_live()?;
        self.retired = true;
        self.version += 1;
        Ok(())
    }

    /// Sum of every account's escrowed collateral and issued stable.
    #[cfg(any(test, feature = "test-support"))]
    pub fn account_totals(&self) -> (u128, u128) {
        self.accounts.values().fold((0u128, 0u128), |(asset, stable), state| {
            (
                asset + u128::from(state.asset_balance),
                stable + u128::from(state.stable_balance),
            )
        })
    }
}
