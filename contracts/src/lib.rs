//! AART Stable Escrow Contracts
//!
//! Collateral-backed stable asset issuance with a single stored
//! collateralization ratio.
//!
//! ## Architecture
//!
//! - **Ratio**: Fixed-point issue/redeem math (32 fractional bits)
//! - **Ledger**: Typed global and per-account state with versioned commits
//! - **Lifecycle**: Create, opt-in, close-out, update and delete transitions
//! - **Escrow / Redemption**: The two plain-call operations
//! - **Dispatcher**: Decodes an invocation into a closed request set
//! - **StableEscrow**: Odra module hosting the core against CEP-18 tokens
//!
//! ## Atomicity
//!
//! Operations compute every new balance before the outbound transfer is
//! submitted and commit only after it succeeds. On chain, any error reverts
//! the whole call.

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod config;
pub mod ratio;
pub mod ledger;
pub mod token_adapter;
pub mod signature;

// Operations
pub mod lifecycle;
pub mod escrow;
pub mod redemption;
pub mod dispatcher;

// Contract modules
pub mod stable_escrow;
