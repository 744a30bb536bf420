//! Deploy the stable escrow to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!   AART_COLLATERAL_TOKEN=hash-...   (CEP-18 collateral token)
//!   AART_STABLE_TOKEN=hash-...       (CEP-18 stable token)
//!
//! Optional:
//!   AART_INITIAL_CRN=21474836480     (ratio numerator, 32 fractional bits)
//!   AART_CLOSE_OUT_POLICY=zero-balance
//!
//! After deployment, users approve the escrow contract as spender on the
//! collateral token (escrow) and the stable token (redeem).

use std::str::FromStr;

use odra::host::{Deployer, HostRef};
use odra::prelude::*;

use aart_escrow_contracts::config::CloseOutPolicy;
use aart_escrow_contracts::ratio::INITIAL_CRN;
use aart_escrow_contracts::stable_escrow::{StableEscrow, StableEscrowInitArgs};

fn token_address(var: &str) -> Address {
    let raw = std::env::var(var).unwrap_or_else(|_| panic!("{} must be set", var));
    Address::from_str(&raw).unwrap_or_else(|_| panic!("{} is not a valid address: {}", var, raw))
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== AART Stable Escrow Livenet Deployment ===");
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200_000_000_000);
    env.set_gas(payment_amount);

    // Get deployer address
    let deployer = env.caller();
    println!("Deployer (creator): {:?}", deployer);

    let collateral_token = token_address("AART_COLLATERAL_TOKEN");
    let stable_token = token_address("AART_STABLE_TOKEN");
    let initial_ratio: u64 = std::env::var("AART_INITIAL_CRN")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(INITIAL_CRN);
    let close_out_policy = match std::env::var("AART_CLOSE_OUT_POLICY").as_deref() {
        Ok("zero-balance") => CloseOutPolicy::RequireZeroBalances,
        _ => CloseOutPolicy::Disallowed,
    };

    println!("Collateral token: {:?}", collateral_token);
    println!("Stable token: {:?}", stable_token);
    println!("Initial ratio numerator: {}", initial_ratio);
    println!("Close-out policy: {:?}", close_out_policy);
    println!();

    println!("Deploying StableEscrow...");
    let escrow = StableEscrow::deploy(
        &env,
        StableEscrowInitArgs {
            collateral_token,
            stable_token,
            initial_ratio,
            close_out_policy,
        },
    );
    let escrow_addr = escrow.address().clone();
    println!("StableEscrow deployed at: {:?}", escrow_addr);
    println!();

    // Escrow payouts come from the contract's own stable balance.
    println!("Next: fund {:?} with stable tokens before the first escrow call.", escrow_addr);
    // Attached assets are pulled with CEP-18 transfer_from.
    println!("Users must `approve` {:?} on the collateral token before escrow", escrow_addr);
    println!("and on the stable token before redeem.");
    println!("=== Deployment Complete ===");
}
