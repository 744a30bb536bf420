//! Stable Escrow Contract
//!
//! Hosts the escrow core on Casper. Collateral and stable asset are CEP-18
//! tokens; the contract itself is the reserve that holds escrowed
//! collateral and the stable supply it pays out.
//!
//! Every entry point loads the typed ledger for the caller, runs the
//! dispatcher, and writes the ledger back only on success. Any core error
//! reverts the whole call, including token pulls and payouts.

use alloc::rc::Rc;
use odra::prelude::*;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::{runtime_args, U256};
use odra::{CallDef, ContractEnv};
use crate::config::{CloseOutPolicy, EscrowConfig, DEFAULT_COLLATERAL_ASSET, DEFAULT_STABLE_ASSET};
use crate::dispatcher::{dispatch, CallTag, Invocation, Outcome};
use crate::errors::EscrowError;
use crate::ledger::LedgerState;
use crate::lifecycle::AdminRequest;
use crate::signature::Ed25519Verifier;
use crate::token_adapter::AssetTransfer;
use crate::types::{AccountState, AssetId, AttachedAsset, GlobalState, TransferDescriptor};

pub mod events {
    use odra::prelude::*;

    #[odra::event]
    pub struct EscrowCreated {
        pub creator: Address,
        pub ratio_numerator: u64,
    }

    #[odra::event]
    pub struct OptedIn {
        pub account: Address,
    }

    #[odra::event]
    pub struct ClosedOut {
        pub account: Address,
    }

    #[odra::event]
    pub struct Escrowed {
        pub account: Address,
        pub collateral: u64,
        pub issued: u64,
    }

    #[odra::event]
    pub struct Redeemed {
        pub account: Address,
        pub redeemed: u64,
        pub released: u64,
    }

    #[odra::event]
    pub struct ProgramUpdateAuthorized {
        pub by: Address,
        pub program_version: u32,
    }

    #[odra::event]
    pub struct ProgramDeleted {
        pub by: Address,
    }
}

/// Token address for an asset, if one was configured at creation.
fn configured_token(token: Option<Address>) -> Result<Address, EscrowError> {
    token.ok_or(EscrowError::UnknownAsset)
}

/// Payouts through CEP-18 `transfer` calls made by the contract
struct Cep18Payout {
    env: Rc<ContractEnv>,
    collateral: (AssetId, Address),
    stable: (AssetId, Address),
}

impl Cep18Payout {
    fn token_for(&self, asset: AssetId) -> Result<Address, EscrowError> {
        if asset == self.collateral.0 {
            Ok(self.collateral.1)
        } else if asset == self.stable.0 {
            Ok(self.stable.1)
        } else {
            Err(EscrowError::UnknownAsset)
        }
    }
}

impl AssetTransfer for Cep18Payout {
    fn transfer(&mut self, descriptor: &TransferDescriptor) -> Result<(), EscrowError> {
        // Only the contract's own holdings can be paid out.
        if descriptor.sender != self.env.self_address() {
            return Err(EscrowError::TransferFailed);
        }
        let token = self.token_for(descriptor.asset)?;
        if descriptor.amount == 0 {
            return Ok(());
        }

        let transfer_args = runtime_args! {
            "recipient" => descriptor.receiver,
            "amount" => U256::from(descriptor.amount)
        };
        let transfer_call = CallDef::new("transfer", true, transfer_args);
        let success: bool = self.env.call_contract(token, transfer_call);
        if success {
            Ok(())
        } else {
            Err(EscrowError::TransferFailed)
        }
    }
}

/// Stable Escrow Contract
#[odra::module(events = [
    events::EscrowCreated,
    events::OptedIn,
    events::ClosedOut,
    events::Escrowed,
    events::Redeemed,
    events::ProgramUpdateAuthorized,
    events::ProgramDeleted
])]
pub struct StableEscrow {
    /// Facility configuration
    config: Var<EscrowConfig>,
    /// CEP-18 token holding the collateral asset
    collateral_token: Var<Address>,
    /// CEP-18 token holding the stable asset
    stable_token: Var<Address>,
    /// Account that created the facility
    creator: Var<Address>,
    /// Global counters
    global: Var<GlobalState>,
    /// Per-account balances
    accounts: Mapping<Address, AccountState>,
    /// Whether an account currently holds local state
    opted_in: Mapping<Address, bool>,
    /// Ledger version for snapshot commits
    ledger_version: Var<u64>,
    /// Number of authorized program updates
    program_version: Var<u32>,
    /// Set once deletion is authorized
    retired: Var<bool>,
}

#[odra::module]
impl StableEscrow {
    /// Create the facility. The deployer becomes the creator.
    pub fn init(
        &mut self,
        collateral_token: Address,
        stable_token: Address,
        initial_ratio: u64,
        close_out_policy: CloseOutPolicy,
    ) {
        let config = EscrowConfig::new(self.env().self_address())
            .with_assets(DEFAULT_COLLATERAL_ASSET, DEFAULT_STABLE_ASSET)
            .with_initial_ratio(initial_ratio)
            .with_close_out_policy(close_out_policy);
        self.config.set(config);
        self.collateral_token.set(collateral_token);
        self.stable_token.set(stable_token);

        let creator = self.env().caller();
        self.run(Invocation::create(creator));
    }

    // ========== Lifecycle ==========

    /// Allocate zeroed local state for the caller
    pub fn opt_in(&mut self) {
        let caller = self.env().caller();
        self.run(Invocation::opt_in(caller));
    }

    /// Release the caller's local state (subject to the close-out policy)
    pub fn close_out(&mut self) {
        let caller = self.env().caller();
        self.run(Invocation::close_out(caller));
    }

    /// Authorize a program update (creator + detached signature)
    pub fn update_program(&mut self, payload: Bytes, signature: Bytes, public_key: Bytes) -> u32 {
        let caller = self.env().caller();
        let request = AdminRequest::new(&payload, &signature, &public_key);
        match self.run(Invocation::update(caller, request)) {
            Outcome::Updated { program_version } => program_version,
            _ => self.env().revert(EscrowError::NoMatchingBranch),
        }
    }

    /// Authorize deletion (creator + detached signature); retires the facility
    pub fn delete_program(&mut self, payload: Bytes, signature: Bytes, public_key: Bytes) {
        let caller = self.env().caller();
        let request = AdminRequest::new(&payload, &signature, &public_key);
        self.run(Invocation::delete(caller, request));
    }

    // ========== Operations ==========

    /// Escrow `amount` collateral (pulled from the caller) for stable asset
    pub fn escrow(&mut self, amount: u64) {
        self.invoke(String::from("escrow"), amount);
    }

    /// Redeem `amount` stable asset (pulled from the caller) for collateral
    pub fn redeem(&mut self, amount: u64) {
        self.invoke(String::from("redeem"), amount);
    }

    /// Plain call selected by its tag, with `amount` of the matching asset
    /// attached
    pub fn invoke(&mut self, tag: String, amount: u64) {
        let tag = match CallTag::parse(tag.as_bytes()) {
            Some(tag) => tag,
            None => self.env().revert(EscrowError::NoMatchingBranch),
        };
        let caller = self.env().caller();
        let config = self.load_config();
        let (asset, token) = match tag {
            CallTag::Escrow => (config.collateral_asset, self.collateral_token.get()),
            CallTag::Redeem => (config.stable_asset, self.stable_token.get()),
        };
        let token = self.require_token(token);

        self.pull(token, caller, amount);
        self.run(Invocation::call(caller, tag, AttachedAsset { asset, amount }));
    }

    // ========== View Functions ==========

    pub fn global_state(&self) -> Option<GlobalState> {
        self.global.get()
    }

    pub fn account_state(&self, account: Address) -> Option<AccountState> {
        if self.opted_in.get(&account).unwrap_or(false) {
            self.accounts.get(&account)
        } else {
            None
        }
    }

    pub fn config(&self) -> Option<EscrowConfig> {
        self.config.get()
    }

    pub fn creator(&self) -> Option<Address> {
        self.creator.get()
    }

    pub fn program_version(&self) -> u32 {
        self.program_version.get().unwrap_or(0)
    }

    pub fn is_retired(&self) -> bool {
        self.retired.get().unwrap_or(false)
    }

    // ========== Internal Functions ==========

    fn require_token(&self, token: Option<Address>) -> Address {
        match configured_token(token) {
            Ok(token) => token,
            Err(error) => self.env().revert(error),
        }
    }

    fn load_config(&self) -> EscrowConfig {
        match self.config.get() {
            Some(config) => config,
            None => self.env().revert(EscrowError::NotCreated),
        }
    }

    fn load_ledger(&self, account: Address) -> LedgerState {
        let mut ledger = LedgerState::from_parts(
            self.creator.get(),
            self.global.get(),
            self.ledger_version.get().unwrap_or(0),
            self.program_version.get().unwrap_or(0),
            self.retired.get().unwrap_or(false),
        );
        if self.opted_in.get(&account).unwrap_or(false) {
            ledger.insert_account(account, self.accounts.get(&account).unwrap_or_default());
        }
        ledger
    }

    fn store_ledger(&mut self, ledger: &LedgerState, account: Address) {
        if let Some(creator) = ledger.creator() {
            self.creator.set(creator);
        }
        if let Some(global) = ledger.global() {
            self.global.set(global.clone());
        }
        self.ledger_version.set(ledger.version());
        self.program_version.set(ledger.program_version());
        self.retired.set(ledger.is_retired());

        match ledger.account(&account) {
            Some(state) => {
                self.accounts.set(&account, state.clone());
                self.opted_in.set(&account, true);
            }
            None => {
                if self.opted_in.get(&account).unwrap_or(false) {
                    self.accounts.set(&account, AccountState::default());
                    self.opted_in.set(&account, false);
                }
            }
        }
    }

    /// Pull the attached asset from `owner` into the reserve.
    fn pull(&self, token: Address, owner: Address, amount: u64) {
        if amount == 0 {
            return;
        }
        let pull_args = runtime_args! {
            "owner" => owner,
            "recipient" => self.env().self_address(),
            "amount" => U256::from(amount)
        };
        let pull_call = CallDef::new("transfer_from", true, pull_args);
        let success: bool = self.env().call_contract(token, pull_call);
        if !success {
            self.env().revert(EscrowError::TransferFailed);
        }
    }

    fn run(&mut self, invocation: Invocation) -> Outcome {
        let config = self.load_config();
        let mut ledger = self.load_ledger(invocation.sender);
        let collateral_token = self.require_token(self.collateral_token.get());
        let stable_token = self.require_token(self.stable_token.get());
        let mut payout = Cep18Payout {
            env: self.env().clone(),
            collateral: (config.collateral_asset, collateral_token),
            stable: (config.stable_asset, stable_token),
        };

        let outcome = match dispatch(&mut ledger, &config, &invocation, &mut payout, &Ed25519Verifier) {
            Ok(outcome) => outcome,
            Err(error) => self.env().revert(error),
        };
        self.store_ledger(&ledger, invocation.sender);
        self.emit_outcome(invocation.sender, &ledger, &outcome);
        outcome
    }

    fn emit_outcome(&self, sender: Address, ledger: &LedgerState, outcome: &Outcome) {
        match outcome {
            Outcome::Created => self.env().emit_event(events::EscrowCreated {
                creator: sender,
                ratio_numerator: ledger.global().map(|g| g.ratio_numerator).unwrap_or(0),
            }),
            Outcome::OptedIn => self.env().emit_event(events::OptedIn { account: sender }),
            Outcome::ClosedOut(_) => self.env().emit_event(events::ClosedOut { account: sender }),
            Outcome::Updated { program_version } => {
                self.env().emit_event(events::ProgramUpdateAuthorized {
                    by: sender,
                    program_version: *program_version,
                })
            }
            Outcome::Deleted => self.env().emit_event(events::ProgramDeleted { by: sender }),
            Outcome::Escrowed(receipt) => self.env().emit_event(events::Escrowed {
                account: sender,
                collateral: receipt.collateral,
                issued: receipt.issued,
            }),
            Outcome::Redeemed(receipt) => self.env().emit_event(events::Redeemed {
                account: sender,
                redeemed: receipt.redeemed,
                released: receipt.released,
            }),
        }
    }
}
