//! Fixed-point collateralization ratio.
//!
//! The ratio is stored as an integer numerator (CRN) over the fixed
//! denominator `2^CRDB`, so the true ratio is `CRN / 2^32`.
//!
//! Conversions follow the stored formulas exactly:
//! - issue:  `(collateral / CRN) >> CRDB`
//! - redeem: `(stable * CRN) >> CRDB`
//!
//! The issue formula divides by the raw numerator and then shifts by the
//! denominator exponent again, which scales the result down twice. At the
//! initial ratio it yields zero for every `u64` collateral amount. The
//! behaviour is kept as stored until the intended tokenomics are settled.
//!
//! The two formulas together never return collateral. For any ratio,
//! `issuable(a, r) * r <= a / 2^32 < 2^32`, so redeeming everything an
//! escrow issued releases `0`. Collateral can only leave the reserve for a
//! stable balance that was not produced by `issuable`, which the operations
//! never create.

use crate::errors::EscrowError;

/// Bits of precision in the ratio denominator
pub const CRDB: u32 = 32;

/// Ratio denominator (`2^CRDB`)
pub const CRD: u64 = 1 << CRDB;

/// Ratio numerator set at creation: 5.0 (five collateral units per stable unit)
pub const INITIAL_CRN: u64 = 5 << CRDB;

/// Stable amount issued for `collateral_amount` at `ratio_numerator`.
pub fn issuable(collateral_amount: u64, ratio_numerator: u64) -> Result<u64, EscrowError> {
    let scaled = collateral_amount
        .checked_div(ratio_numerator)
        .ok_or(EscrowError::DivisionByZero)?;
    Ok(scaled >> CRDB)
}

/// Collateral released for `stable_amount` at `ratio_numerator`.
///
/// The product is taken in 128 bits; a shifted result that does not fit
/// back into `u64` is an overflow, never a wrap.
pub fn redeemable(stable_amount: u64, ratio_numerator: u64) -> Result<u64, EscrowError> {
    let product = u128::from(stable_amount) * u128::from(ratio_numerator);
    u64::try_from(product >> CRDB).map_err(|_| EscrowError::Overflow)
}

/// Whether escrowing `collateral_amount` and redeeming everything it issued
/// returns no more collateral than was deposited.
pub fn round_trip_conserves(collateral_amount: u64, ratio_numerator: u64) -> Result<bool, EscrowError> {
    let issued = issuable(collateral_amount, ratio_numerator)?;
    let returned = redeemable(issued, ratio_numerator)?;
    Ok(returned <= collateral_amount)
}
