//! Lifecycle transitions: creation, opt-in, close-out, update and delete.
//!
//! | Trigger    | Result                                              |
//! |------------|-----------------------------------------------------|
//! | Create     | global counters zeroed, ratio from config           |
//! | Opt-in     | zeroed local state for the caller                   |
//! | Close-out  | rejected (or zero-balance check, if configured)     |
//! | Update     | creator + valid signature, bumps program version    |
//! | Delete     | creator + valid signature, retires the facility     |

use alloc::vec::Vec;
use odra::prelude::*;
use crate::config::{CloseOutPolicy, EscrowConfig};
use crate::errors::EscrowError;
use crate::ledger::LedgerState;
use crate::signature::SignatureVerifier;
use crate::types::{AccountState, GlobalState};

/// Arguments of an update or delete request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminRequest {
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
    pub public_key: Vec<u8>,
}

impl AdminRequest {
    pub fn new(payload: &[u8], signature: &[u8], public_key: &[u8]) -> Self {
        Self {
            payload: payload.to_vec(),
            signature: signature.to_vec(),
            public_key: public_key.to_vec(),
        }
    }

    /// Read `[payload, signature, public_key]` from the argument list.
    pub fn from_args(args: &[Vec<u8>]) -> Result<Self, EscrowError> {
        match args {
            [payload, signature, public_key, ..] => Ok(Self {
                payload: payload.clone(),
                signature: signature.clone(),
                public_key: public_key.clone(),
            }),
            _ => Err(EscrowError::MalformedArguments),
        }
    }
}

/// Initialize the global counters.
pub fn create(ledger: &mut LedgerState, creator: Address, config: &EscrowConfig) -> Result<(), EscrowError> {
    config.validate()?;
    ledger.create(creator, GlobalState::with_ratio(config.initial_ratio))
}

pub fn opt_in(ledger: &mut LedgerState, account: Address) -> Result<(), EscrowError> {
    ledger.opt_in(account)
}

/// Release the caller's local state, subject to `policy`.
pub fn close_out(
    ledger: &mut LedgerState,
    account: Address,
    policy: CloseOutPolicy,
) -> Result<AccountState, EscrowError> {
    match policy {
        CloseOutPolicy::Disallowed => Err(EscrowError::CloseOutDisallowed),
        CloseOutPolicy::RequireZeroBalances => {
            let state = ledger.account(&account).ok_or(EscrowError::NotOptedIn)?;
            if !state.is_empty() {
                return Err(EscrowError::CloseOutWithBalance);
            }
            ledger.close_account(&account)
        }
    }
}

/// Creator-only gate shared by update and delete.
pub fn authorize_admin<V: SignatureVerifier>(
    ledger: &LedgerState,
    caller: Address,
    request: &AdminRequest,
    verifier: &V,
) -> Result<(), EscrowError> {
    ledger.require_live()?;
    if ledger.creator() != Some(caller) {
        return Err(EscrowError::NotCreator);
    }
    if !verifier.verify(&request.payload, &request.signature, &request.public_key) {
        return Err(EscrowError::InvalidSignature);
    }
    Ok(())
}

/// Authorize a program update; returns the new program version.
pub fn update<V: SignatureVerifier>(
    ledger: &mut LedgerState,
    caller: Address,
    request: &AdminRequest,
    verifier: &V,
) -> Result<u32, EscrowError> {
    authorize_admin(ledger, caller, request, verifier)?;
    ledger.bump_program_version()
}

/// Authorize deletion; the facility rejects everything afterwards.
pub fn delete<V: SignatureVerifier>(
    ledger: &mut LedgerState,
    caller: Address,
    request: &AdminRequest,
    verifier: &V,
) -> Result<(), EscrowError> {
    authorize_admin(ledger, caller, request, verifier)?;
    ledger.retire()
}
