// SPDX-License-Identifier: AGPL-3.0-only
//! # Constant-product curve math (integer-only)
//!
//! Pricing primitives for the pool ledger. All arithmetic is u128 with
//! explicit overflow handling — no f32/f64 anywhere, so results are
//! identical on every platform.
//!
//! The exchange rate is the classic constant product:
//! `amount_out = (amount_in * reserve_out) / (reserve_in + amount_in)`
//! with floor division. A basis-point fee can be deducted from the input
//! before it hits the curve.

/// Basis point denominator
pub const BPS_DENOMINATOR: u128 = 10_000;
/// Max configurable fee: 1000 bps = 10%
pub const MAX_FEE_BPS: u128 = 1_000;
/// Precision multiplier for overflow-safe scaled division
pub const PRECISION: u128 = 1_000_000_000_000;

/// Compute swap output using the constant product formula.
/// `amount_out = (amount_in * reserve_out) / (reserve_in + amount_in)`
pub fn compute_output(amount_in: u128, reserve_in: u128, reserve_out: u128) -> u128 {
    if reserve_in == 0 || reserve_out == 0 || amount_in == 0 {
        return 0;
    }
    match (
        amount_in.checked_mul(reserve_out),
        reserve_in.checked_add(amount_in),
    ) {
        (Some(num), Some(den)) if den > 0 => num / den,
        _ => {
            // Overflow fallback: scaled division. Safe for all values below
            // BALANCE_UPPER_BOUND: amount_in * PRECISION < 2^64 * 2^40.
            let ratio_scaled = (amount_in * PRECISION) / reserve_in.saturating_add(amount_in);
            (ratio_scaled * reserve_out) / PRECISION
        }
    }
}

/// Deduct fee from input amount. Returns (after_fee, fee).
pub fn deduct_fee(amount: u128, fee_bps: u128) -> (u128, u128) {
    let fee = amount * fee_bps / BPS_DENOMINATOR;
    (amount - fee, fee)
}

/// Spot price (out per in) scaled by `PRECISION`. 0 if the in-reserve is empty.
pub fn spot_price_scaled(reserve_in: u128, reserve_out: u128) -> u128 {
    if reserve_in == 0 {
        return 0;
    }
    reserve_out.saturating_mul(PRECISION) / reserve_in
}

/// Execution price deviation from spot, in basis points.
/// 0 when the trade executes at or above spot (tiny trades round to spot).
pub fn price_impact_bps(
    reserve_in: u128,
    reserve_out: u128,
    amount_in: u128,
    amount_out: u128,
) -> u128 {
    let spot = spot_price_scaled(reserve_in, reserve_out);
    let exec = if amount_in > 0 {
        amount_out.saturating_mul(PRECISION) / amount_in
    } else {
        0
    };
    if spot > 0 && spot > exec {
        ((spot - exec) * BPS_DENOMINATOR) / spot
    } else {
        0
    }
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
