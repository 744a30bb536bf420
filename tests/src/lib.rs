//! AART Stable Escrow Integration Tests
//!
//! Runs the `StableEscrow` module on the Odra test VM against two mock
//! CEP-18 tokens.

pub mod mock_token {
    use odra::casper_types::U256;
    use odra::prelude::*;

    /// Minimal CEP-18 surface used by the escrow: balances and allowances.
    ///
    /// `transfer_from` returns `false` instead of reverting so the escrow's
    /// own failure path is the one exercised.
    #[odra::module]
    pub struct MockToken {
        balances: Mapping<Address, U256>,
        allowances: Mapping<(Address, Address), U256>,
    }

    #[odra::module]
    impl MockToken {
        pub fn mint(&mut self, owner: Address, amount: U256) {
            let balance = self.balances.get_or_default(&owner);
            self.balances.set(&owner, balance + amount);
        }

        pub fn balance_of(&self, owner: Address) -> U256 {
            self.balances.get_or_default(&owner)
        }

        pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
            self.allowances.get_or_default(&(owner, spender))
        }

        pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
            let owner = self.env().caller();
            self.allowances.set(&(owner, spender), amount);
            true
        }

        pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
            let caller = self.env().caller();
            self.move_balance(caller, recipient, amount)
        }

        /// Spend `owner`'s allowance to the caller
        pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
            let spender = self.env().caller();
            let current_allowance = self.allowance(owner, spender);
            if current_allowance < amount {
                return false;
            }
            if !self.move_balance(owner, recipient, amount) {
                return false;
            }
            self.allowances.set(&(owner, spender), current_allowance - amount);
            true
        }

        fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> bool {
            let from_balance = self.balances.get_or_default(&from);
            if from_balance < amount {
                return false;
            }
            self.balances.set(&from, from_balance - amount);
            let to_balance = self.balances.get_or_default(&to);
            self.balances.set(&to, to_balance + amount);
            true
        }
    }
}

#[cfg(test)]
mod escrow_flow_tests {
    use super::mock_token::{MockToken, MockTokenHostRef};
    use aart_escrow_contracts::config::CloseOutPolicy;
    use aart_escrow_contracts::ratio::{CRDB, INITIAL_CRN};
    use aart_escrow_contracts::stable_escrow::{StableEscrow, StableEscrowHostRef, StableEscrowInitArgs};
    use ed25519_dalek::{Signer, SigningKey};
    use odra::casper_types::bytesrepr::Bytes;
    use odra::casper_types::U256;
    use odra::host::{Deployer, HostEnv, HostRef, NoArgs};
    use odra::prelude::*;
    use pretty_assertions::assert_eq;

    const STABLE_SUPPLY: u64 = 1_000_000;
    const USER_ALLOWANCE: u64 = u64::MAX;

    struct Fixture {
        env: HostEnv,
        escrow: StableEscrowHostRef,
        collateral: MockTokenHostRef,
        stable: MockTokenHostRef,
        creator: Address,
        user: Address,
    }

    fn setup(initial_ratio: u64, close_out_policy: CloseOutPolicy) -> Fixture {
        let env = odra_test::env();
        let creator = env.get_account(0);
        let user = env.get_account(1);
        env.set_caller(creator);

        let mut collateral = MockToken::deploy(&env, NoArgs);
        let mut stable = MockToken::deploy(&env, NoArgs);
        let escrow = StableEscrow::deploy(
            &env,
            StableEscrowInitArgs {
                collateral_token: collateral.address().clone(),
                stable_token: stable.address().clone(),
                initial_ratio,
                close_out_policy,
            },
        );

        let escrow_addr = escrow.address().clone();
        stable.mint(escrow_addr, U256::from(STABLE_SUPPLY));
        collateral.mint(user, U256::from(100u64 << CRDB));

        // The escrow pulls attached assets with transfer_from.
        env.set_caller(user);
        collateral.approve(escrow_addr, U256::from(USER_ALLOWANCE));
        stable.approve(escrow_addr, U256::from(USER_ALLOWANCE));
        env.set_caller(creator);

        Fixture { env, escrow, collateral, stable, creator, user }
    }

    fn signed(payload: &[u8]) -> (Bytes, Bytes, Bytes) {
        let signing = SigningKey::from_bytes(&[42u8; 32]);
        (
            Bytes::from(payload.to_vec()),
            Bytes::from(signing.sign(payload).to_bytes().to_vec()),
            Bytes::from(signing.verifying_key().to_bytes().to_vec()),
        )
    }

    #[test]
    fn test_deploy_creates_facility() {
        let f = setup(INITIAL_CRN, CloseOutPolicy::Disallowed);
        let global = f.escrow.global_state().unwrap();
        assert_eq!(global.sum_asset, 0);
        assert_eq!(global.sum_stable, 0);
        assert_eq!(global.ratio_numerator, INITIAL_CRN);
        assert_eq!(f.escrow.creator(), Some(f.creator));
        assert_eq!(f.escrow.program_version(), 0);
        assert!(!f.escrow.is_retired());
    }

    #[test]
    fn test_opt_in_once() {
        let mut f = setup(INITIAL_CRN, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        f.escrow.opt_in();

        let local = f.escrow.account_state(f.user).unwrap();
        assert_eq!((local.asset_balance, local.stable_balance), (0, 0));
        assert!(f.escrow.try_opt_in().is_err());
    }

    #[test]
    fn test_escrow_moves_tokens_and_counters() {
        let mut f = setup(1, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        f.escrow.opt_in();
        f.escrow.escrow(7u64 << CRDB);

        let local = f.escrow.account_state(f.user).unwrap();
        assert_eq!(local.asset_balance, 7u64 << CRDB);
        assert_eq!(local.stable_balance, 7);
        let global = f.escrow.global_state().unwrap();
        assert_eq!((global.sum_asset, global.sum_stable), (7u64 << CRDB, 7));

        assert_eq!(f.stable.balance_of(f.user), U256::from(7u64));
        assert_eq!(f.collateral.balance_of(f.user), U256::from(93u64 << CRDB));
        assert_eq!(
            f.collateral.balance_of(f.escrow.address().clone()),
            U256::from(7u64 << CRDB)
        );
        assert_eq!(
            f.collateral.allowance(f.user, f.escrow.address().clone()),
            U256::from(USER_ALLOWANCE - (7u64 << CRDB))
        );
    }

    #[test]
    fn test_escrow_requires_allowance() {
        let mut f = setup(1, CloseOutPolicy::Disallowed);
        let holder = f.env.get_account(2);
        let escrow_addr = f.escrow.address().clone();
        let amount = 2u64 << CRDB;
        f.collateral.mint(holder, U256::from(amount));

        f.env.set_caller(holder);
        f.escrow.opt_in();
        assert!(f.escrow.try_escrow(amount).is_err());
        assert_eq!(f.collateral.balance_of(holder), U256::from(amount));
        assert_eq!(f.escrow.account_state(holder).unwrap().asset_balance, 0);

        f.collateral.approve(escrow_addr, U256::from(amount - 1));
        assert!(f.escrow.try_escrow(amount).is_err());

        f.collateral.approve(escrow_addr, U256::from(amount));
        f.escrow.escrow(amount);
        assert_eq!(f.collateral.balance_of(holder), U256::zero());
        assert_eq!(f.collateral.allowance(holder, escrow_addr), U256::zero());
        assert_eq!(f.escrow.account_state(holder).unwrap().stable_balance, 2);
    }

    #[test]
    fn test_escrow_without_opt_in_rejected() {
        let mut f = setup(1, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        assert!(f.escrow.try_escrow(1u64 << CRDB).is_err());
        assert_eq!(f.collateral.balance_of(f.user), U256::from(100u64 << CRDB));
        assert_eq!(f.escrow.global_state().unwrap().sum_asset, 0);
    }

    #[test]
    fn test_zero_escrow_rejected() {
        let mut f = setup(1, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        f.escrow.opt_in();
        assert!(f.escrow.try_escrow(0).is_err());
    }

    #[test]
    fn test_failed_payout_reverts_collateral_pull() {
        let mut f = setup(1, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        f.escrow.opt_in();

        // Needs more stable than the reserve holds.
        let amount = (STABLE_SUPPLY + 1) << CRDB;
        f.collateral.mint(f.user, U256::from(amount));
        let before = f.collateral.balance_of(f.user);

        assert!(f.escrow.try_escrow(amount).is_err());
        assert_eq!(f.collateral.balance_of(f.user), before);
        assert_eq!(f.escrow.account_state(f.user).unwrap().asset_balance, 0);
    }

    #[test]
    fn test_redeem_returns_stable_to_reserve() {
        let mut f = setup(1, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        f.escrow.opt_in();
        f.escrow.escrow(7u64 << CRDB);
        f.escrow.redeem(3);

        let local = f.escrow.account_state(f.user).unwrap();
        assert_eq!(local.stable_balance, 4);
        assert_eq!(f.stable.balance_of(f.user), U256::from(4u64));
        assert_eq!(f.escrow.global_state().unwrap().sum_stable, 4);

        // (3 * 1) >> 32 releases no collateral.
        assert_eq!(local.asset_balance, 7u64 << CRDB);
        assert_eq!(f.collateral.balance_of(f.user), U256::from(93u64 << CRDB));
    }

    #[test]
    fn test_redeem_more_than_issued_rejected() {
        let mut f = setup(1, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        f.escrow.opt_in();
        f.escrow.escrow(7u64 << CRDB);

        f.stable.mint(f.user, U256::from(10u64));
        assert!(f.escrow.try_redeem(8).is_err());
        assert_eq!(f.escrow.account_state(f.user).unwrap().stable_balance, 7);
        assert_eq!(f.stable.balance_of(f.user), U256::from(17u64));
    }

    #[test]
    fn test_unknown_call_tag_rejected() {
        let mut f = setup(1, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        f.escrow.opt_in();
        assert!(f.escrow.try_invoke(String::from("liquidate"), 1).is_err());
        assert!(f.escrow.try_invoke(String::from("escrow"), 1u64 << CRDB).is_ok());
    }

    #[test]
    fn test_close_out_rejected_by_default() {
        let mut f = setup(INITIAL_CRN, CloseOutPolicy::Disallowed);
        f.env.set_caller(f.user);
        f.escrow.opt_in();
        assert!(f.escrow.try_close_out().is_err());
        assert!(f.escrow.account_state(f.user).is_some());
    }

    #[test]
    fn test_close_out_with_zero_balance_policy() {
        let mut f = setup(1, CloseOutPolicy::RequireZeroBalances);
        f.env.set_caller(f.user);
        f.escrow.opt_in();
        f.escrow.close_out();
        assert!(f.escrow.account_state(f.user).is_none());

        f.escrow.opt_in();
        f.escrow.escrow(1u64 << CRDB);
        assert!(f.escrow.try_close_out().is_err());
    }

    #[test]
    fn test_update_requires_creator_and_signature() {
        let mut f = setup(INITIAL_CRN, CloseOutPolicy::Disallowed);
        let (payload, signature, public_key) = signed(b"upgrade");

        f.env.set_caller(f.user);
        assert!(f
            .escrow
            .try_update_program(payload.clone(), signature.clone(), public_key.clone())
            .is_err());

        f.env.set_caller(f.creator);
        assert!(f
            .escrow
            .try_update_program(Bytes::from(b"other".to_vec()), signature.clone(), public_key.clone())
            .is_err());
        assert_eq!(f.escrow.program_version(), 0);

        assert_eq!(f.escrow.update_program(payload, signature, public_key), 1);
        assert_eq!(f.escrow.program_version(), 1);
    }

    #[test]
    fn test_delete_retires_facility() {
        let mut f = setup(INITIAL_CRN, CloseOutPolicy::Disallowed);
        let (payload, signature, public_key) = signed(b"delete");
        f.escrow.delete_program(payload, signature, public_key);
        assert!(f.escrow.is_retired());

        f.env.set_caller(f.user);
        assert!(f.escrow.try_opt_in().is_err());
    }
}
