//! Top-level routing of invocations.
//!
//! An [`Invocation`] is first decoded into a closed [`Request`]; the
//! dispatcher then matches it exhaustively. Anything that does not decode
//! is rejected before any state is read.

use alloc::vec::Vec;
use odra::prelude::*;
use crate::config::EscrowConfig;
use crate::errors::EscrowError;
use crate::escrow::{escrow, EscrowReceipt};
use crate::ledger::LedgerState;
use crate::lifecycle::{self, AdminRequest};
use crate::redemption::{redeem, RedeemReceipt};
use crate::signature::SignatureVerifier;
use crate::token_adapter::AssetTransfer;
use crate::types::{AccountState, AttachedAsset};

/// Argument tag selecting the escrow operation
pub const ESCROW_TAG: &[u8] = b"escrow";
/// Argument tag selecting the redeem operation
pub const REDEEM_TAG: &[u8] = b"redeem";

/// Completion type carried by every invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Create,
    OptIn,
    CloseOut,
    Update,
    Delete,
    Call,
}

/// Plain-call operation selected by argument 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallTag {
    Escrow,
    Redeem,
}

impl CallTag {
    pub fn parse(arg: &[u8]) -> Option<Self> {
        match arg {
            ESCROW_TAG => Some(CallTag::Escrow),
            REDEEM_TAG => Some(CallTag::Redeem),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            CallTag::Escrow => ESCROW_TAG,
            CallTag::Redeem => REDEEM_TAG,
        }
    }
}

/// One call against the facility
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub sender: Address,
    pub completion: Completion,
    pub args: Vec<Vec<u8>>,
    /// Number of calls grouped with this one, itself included
    pub group_size: u32,
    pub attached: Option<AttachedAsset>,
}

impl Invocation {
    fn bare(sender: Address, completion: Completion) -> Self {
        Self {
            sender,
            completion,
            args: Vec::new(),
            group_size: 1,
            attached: None,
        }
    }

    pub fn create(sender: Address) -> Self {
        Self::bare(sender, Completion::Create)
    }

    pub fn opt_in(sender: Address) -> Self {
        Self::bare(sender, Completion::OptIn)
    }

    pub fn close_out(sender: Address) -> Self {
        Self::bare(sender, Completion::CloseOut)
    }

    pub fn update(sender: Address, request: AdminRequest) -> Self {
        let mut invocation = Self::bare(sender, Completion::Update);
        invocation.args = request_args(request);
        invocation
    }

    pub fn delete(sender: Address, request: AdminRequest) -> Self {
        let mut invocation = Self::bare(sender, Completion::Delete);
        invocation.args = request_args(request);
        invocation
    }

    pub fn call(sender: Address, tag: CallTag, attached: AttachedAsset) -> Self {
        let mut invocation = Self::bare(sender, Completion::Call);
        invocation.args.push(tag.as_bytes().to_vec());
        invocation.attached = Some(attached);
        invocation
    }

    pub fn with_group_size(mut self, group_size: u32) -> Self {
        self.group_size = group_size;
        self
    }
}

fn request_args(request: AdminRequest) -> Vec<Vec<u8>> {
    let mut args = Vec::with_capacity(3);
    args.push(request.payload);
    args.push(request.signature);
    args.push(request.public_key);
    args
}

/// Decoded invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Create,
    OptIn,
    CloseOut,
    Update(AdminRequest),
    Delete(AdminRequest),
    Call(CallTag),
}

impl Request {
    pub fn decode(invocation: &Invocation) -> Result<Self, EscrowError> {
        match invocation.completion {
            Completion::Create => Ok(Request::Create),
            Completion::OptIn => Ok(Request::OptIn),
            Completion::CloseOut => Ok(Request::CloseOut),
            Completion::Update => AdminRequest::from_args(&invocation.args).map(Request::Update),
            Completion::Delete => AdminRequest::from_args(&invocation.args).map(Request::Delete),
            Completion::Call => invocation
                .args
                .first()
                .and_then(|tag| CallTag::parse(tag))
                .map(Request::Call)
                .ok_or(EscrowError::NoMatchingBranch),
        }
    }
}

/// Result of a committed invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Created,
    OptedIn,
    ClosedOut(AccountState),
    Updated { program_version: u32 },
    Deleted,
    Escrowed(EscrowReceipt),
    Redeemed(RedeemReceipt),
}

/// Execute `invocation` against `ledger`.
///
/// On error the ledger is exactly as it was before the call.
pub fn dispatch<T: AssetTransfer, V: SignatureVerifier>(
    ledger: &mut LedgerState,
    config: &EscrowConfig,
    invocation: &Invocation,
    transfer: &mut T,
    verifier: &V,
) -> Result<Outcome, EscrowError> {
    let sender = invocation.sender;
    match Request::decode(invocation)? {
        Request::Create => lifecycle::create(ledger, sender, config).map(|_| Outcome::Created),
        Request::OptIn => lifecycle::opt_in(ledger, sender).map(|_| Outcome::OptedIn),
        Request::CloseOut => {
            lifecycle::close_out(ledger, sender, config.close_out_policy).map(Outcome::ClosedOut)
        }
        Request::Update(request) => lifecycle::update(ledger, sender, &request, verifier)
            .map(|program_version| Outcome::Updated { program_version }),
        Request::Delete(request) => {
            lifecycle::delete(ledger, sender, &request, verifier).map(|_| Outcome::Deleted)
        }
        Request::Call(CallTag::Escrow) => escrow(
            ledger,
            config,
            sender,
            invocation.group_size,
            invocation.attached,
            transfer,
        )
        .map(Outcome::Escrowed),
        Request::Call(CallTag::Redeem) => redeem(
            ledger,
            config,
            sender,
            invocation.group_size,
            invocation.attached,
            transfer,
        )
        .map(Outcome::Redeemed),
    }
}
