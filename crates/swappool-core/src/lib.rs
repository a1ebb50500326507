// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SWAPPOOL - CORE MODULE
//
// Pool ledger primitives: TokenType, PoolLedger, credit and swap logic.
// A two-token constant-product pool with per-account token balances.
// All financial arithmetic uses u128 atomic units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeMap;

// ABI layer: action enum, response envelope, events
pub mod abi;
// Constant-product curve math (integer-only)
pub mod curve;

use crate::curve::{compute_output, deduct_fee, price_impact_bps, spot_price_scaled, MAX_FEE_BPS};

/// Token id for the pool's first token
pub const TOKEN_TYPE_A: u8 = 1;
/// Token id for the pool's second token
pub const TOKEN_TYPE_B: u8 = 2;

/// Exclusive upper bound for every account balance and pool reserve (2^64).
/// All amounts are carried as u128 so intermediate products in the curve
/// math cannot overflow, but stored values must stay below this bound.
pub const BALANCE_UPPER_BOUND: u128 = 1 << 64;

/// One of the two token types held by the pool.
///
/// The pool is a fixed pair: every swap converts a token into its
/// [`opposite`](TokenType::opposite). Wire ids are `1` and `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenType {
    A,
    B,
}

impl TokenType {
    /// Resolve a wire id to a token type. Unknown ids are an error at this
    /// boundary — downstream code never sees an invalid token.
    pub fn from_id(id: u8) -> Result<Self, String> {
        match id {
            TOKEN_TYPE_A => Ok(TokenType::A),
            TOKEN_TYPE_B => Ok(TokenType::B),
            other => Err(format!(
                "Unknown token type: {} (expected {} or {})",
                other, TOKEN_TYPE_A, TOKEN_TYPE_B
            )),
        }
    }

    /// Wire id of this token type.
    pub const fn id(self) -> u8 {
        match self {
            TokenType::A => TOKEN_TYPE_A,
            TokenType::B => TOKEN_TYPE_B,
        }
    }

    /// The swap counterparty token.
    pub const fn opposite(self) -> TokenType {
        match self {
            TokenType::A => TokenType::B,
            TokenType::B => TokenType::A,
        }
    }
}

/// Result of an executed swap. Reserves are post-swap values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub account_id: u64,
    pub token_from: u8,
    pub amount_from: u128,
    pub token_to: u8,
    pub amount_to: u128,
    /// Fee retained by the pool (0 unless a fee was configured)
    pub fee: u128,
    pub reserve_from: u128,
    pub reserve_to: u128,
}

/// Read-only swap preview. Does not touch ledger state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    pub token_from: u8,
    pub amount_from: u128,
    pub token_to: u8,
    pub amount_to: u128,
    pub fee: u128,
    /// Execution price deviation from spot, in basis points
    pub price_impact_bps: u128,
    /// Spot price (out per in) scaled by `curve::PRECISION`
    pub spot_price_scaled: u128,
}

/// Pool summary derived from ledger state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolInfo {
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub fee_bps: u128,
    pub swap_count: u64,
}

/// Two-token pool ledger.
///
/// Holds per-token pool reserves and per-account per-token balances.
/// Reserves are seeded at construction and move only through
/// [`PoolLedger::swap`]; account balances are created on first credit via
/// [`PoolLedger::modify_account_balance`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolLedger {
    /// Token id → pool reserve.
    /// BTreeMap guarantees deterministic iteration and serialization.
    pub reserves: BTreeMap<u8, u128>,
    /// Account id → token id → balance. Absent entries read as 0.
    pub accounts: BTreeMap<u64, BTreeMap<u8, u128>>,
    /// Swap fee in basis points (0 = no fee). Retained by the pool.
    #[serde(default)]
    pub fee_bps: u128,
    /// Reserves as seeded at construction — baseline for the reserve audit.
    #[serde(default)]
    pub initial_reserves: BTreeMap<u8, u128>,
    /// Cumulative amount swapped INTO each reserve.
    /// Reserves change only through swaps; together with `swapped_out` this
    /// makes the invariant auditable: reserve = initial + in - out.
    #[serde(default)]
    pub swapped_in: BTreeMap<u8, u128>,
    /// Cumulative amount swapped OUT of each reserve.
    #[serde(default)]
    pub swapped_out: BTreeMap<u8, u128>,
    /// Number of swaps executed over the ledger's lifetime.
    #[serde(default)]
    pub swap_count: u64,
}

impl PoolLedger {
    /// Create a pool with initial reserves for token 1 and token 2.
    /// No swap fee — the curve applies no spread.
    pub fn new(initial_a: u128, initial_b: u128) -> Result<Self, String> {
        Self::with_fee(initial_a, initial_b, 0)
    }

    /// Create a pool with initial reserves and a swap fee in basis points.
    pub fn with_fee(initial_a: u128, initial_b: u128, fee_bps: u128) -> Result<Self, String> {
        if initial_a == 0 || initial_b == 0 {
            return Err("Initial reserves must be > 0 for both tokens".to_string());
        }
        if initial_a >= BALANCE_UPPER_BOUND || initial_b >= BALANCE_UPPER_BOUND {
            return Err(format!(
                "Initial reserve exceeds upper bound: ({}, {}) must be < {}",
                initial_a, initial_b, BALANCE_UPPER_BOUND
            ));
        }
        if fee_bps > MAX_FEE_BPS {
            return Err(format!(
                "Fee too high: {} bps (max {} bps)",
                fee_bps, MAX_FEE_BPS
            ));
        }

        let mut reserves = BTreeMap::new();
        reserves.insert(TOKEN_TYPE_A, initial_a);
        reserves.insert(TOKEN_TYPE_B, initial_b);

        Ok(Self {
            reserves: reserves.clone(),
            accounts: BTreeMap::new(),
            fee_bps,
            initial_reserves: reserves,
            swapped_in: BTreeMap::new(),
            swapped_out: BTreeMap::new(),
            swap_count: 0,
        })
    }

    /// Current pool reserve for a token type.
    pub fn pool_token_balance(&self, token: TokenType) -> u128 {
        self.reserves.get(&token.id()).copied().unwrap_or(0)
    }

    /// An account's balance for a token type. Defaults to 0 if never credited.
    pub fn account_token_balance(&self, account_id: u64, token: TokenType) -> u128 {
        self.accounts
            .get(&account_id)
            .and_then(|tokens| tokens.get(&token.id()))
            .copied()
            .unwrap_or(0)
    }

    /// Credit `amount` to an account's balance for a token type.
    ///
    /// Administrative operation — it does NOT move value out of the pool
    /// and is not required to balance against the reserves.
    /// Returns the new balance.
    pub fn modify_account_balance(
        &mut self,
        account_id: u64,
        token: TokenType,
        amount: u128,
    ) -> Result<u128, String> {
        let balance = self.account_token_balance(account_id, token);
        let new_balance = balance
            .checked_add(amount)
            .ok_or("Overflow: balance + amount exceeds u128")?;
        if new_balance >= BALANCE_UPPER_BOUND {
            return Err(format!(
                "Balance overflow: {} + {} exceeds upper bound {}",
                balance, amount, BALANCE_UPPER_BOUND
            ));
        }
        // Only modify state after validation passes
        self.accounts
            .entry(account_id)
            .or_default()
            .insert(token.id(), new_balance);
        Ok(new_balance)
    }

    /// Swap `amount_from` of `token_from` into the opposite token.
    ///
    /// Constant product: `amount_to = (reserve_to * in) / (reserve_from + in)`
    /// after fee deduction. Debits the account's from-balance, credits its
    /// to-balance, and moves the reserves accordingly. The fee (if any)
    /// stays in the from-reserve.
    pub fn swap(
        &mut self,
        account_id: u64,
        token_from: TokenType,
        amount_from: u128,
    ) -> Result<SwapOutcome, String> {
        if amount_from == 0 {
            return Err("Swap amount must be > 0".to_string());
        }

        let from_balance = self.account_token_balance(account_id, token_from);
        if from_balance < amount_from {
            return Err(format!(
                "Insufficient balance: account {} has {} of token {}, need {}",
                account_id,
                from_balance,
                token_from.id(),
                amount_from
            ));
        }

        let token_to = token_from.opposite();
        let reserve_from = self.pool_token_balance(token_from);
        let reserve_to = self.pool_token_balance(token_to);

        let (amount_after_fee, fee) = deduct_fee(amount_from, self.fee_bps);
        let amount_to = compute_output(amount_after_fee, reserve_from, reserve_to);

        if amount_to == 0 {
            return Err("Output amount is zero (insufficient liquidity)".to_string());
        }
        if amount_to >= reserve_to {
            return Err("Insufficient pool liquidity for this trade".to_string());
        }

        let new_reserve_from = reserve_from
            .checked_add(amount_from)
            .ok_or("Overflow: reserve + amount exceeds u128")?;
        if new_reserve_from >= BALANCE_UPPER_BOUND {
            return Err(format!(
                "Pool reserve overflow: {} + {} exceeds upper bound {}",
                reserve_from, amount_from, BALANCE_UPPER_BOUND
            ));
        }
        let new_reserve_to = reserve_to - amount_to;

        let to_balance = self.account_token_balance(account_id, token_to);
        let new_to_balance = to_balance
            .checked_add(amount_to)
            .ok_or("Overflow: balance + output exceeds u128")?;
        if new_to_balance >= BALANCE_UPPER_BOUND {
            return Err(format!(
                "Balance overflow: {} + {} exceeds upper bound {}",
                to_balance, amount_to, BALANCE_UPPER_BOUND
            ));
        }

        // All validations passed — apply account and reserve movements
        let tokens = self.accounts.entry(account_id).or_default();
        tokens.insert(token_from.id(), from_balance - amount_from);
        tokens.insert(token_to.id(), new_to_balance);

        self.reserves.insert(token_from.id(), new_reserve_from);
        self.reserves.insert(token_to.id(), new_reserve_to);

        // Track reserve flow for the audit
        let inflow = self.swapped_in.entry(token_from.id()).or_insert(0);
        *inflow = inflow.saturating_add(amount_from);
        let outflow = self.swapped_out.entry(token_to.id()).or_insert(0);
        *outflow = outflow.saturating_add(amount_to);
        self.swap_count += 1;

        Ok(SwapOutcome {
            account_id,
            token_from: token_from.id(),
            amount_from,
            token_to: token_to.id(),
            amount_to,
            fee,
            reserve_from: new_reserve_from,
            reserve_to: new_reserve_to,
        })
    }

    /// Compute a swap quote without executing (pure calculation).
    pub fn quote(&self, token_from: TokenType, amount_from: u128) -> Result<SwapQuote, String> {
        if amount_from == 0 {
            return Err("Quote amount must be > 0".to_string());
        }
        let token_to = token_from.opposite();
        let reserve_from = self.pool_token_balance(token_from);
        let reserve_to = self.pool_token_balance(token_to);

        let (amount_after_fee, fee) = deduct_fee(amount_from, self.fee_bps);
        let amount_to = compute_output(amount_after_fee, reserve_from, reserve_to);

        Ok(SwapQuote {
            token_from: token_from.id(),
            amount_from,
            token_to: token_to.id(),
            amount_to,
            fee,
            price_impact_bps: price_impact_bps(reserve_from, reserve_to, amount_from, amount_to),
            spot_price_scaled: spot_price_scaled(reserve_from, reserve_to),
        })
    }

    /// Pool summary (reserves, fee, lifetime swap count).
    pub fn pool_info(&self) -> PoolInfo {
        PoolInfo {
            reserve_a: self.pool_token_balance(TokenType::A),
            reserve_b: self.pool_token_balance(TokenType::B),
            fee_bps: self.fee_bps,
            swap_count: self.swap_count,
        }
    }

    /// Compute a deterministic state root hash over reserves and account
    /// balances. Uses SHA3-256 over sorted entries; BTreeMap guarantees
    /// iteration order, so equal state always yields an equal root.
    ///
    /// Used by:
    /// - Snapshot comparison after save/load round-trips
    /// - Change detection in tests and tooling
    pub fn state_root(&self) -> String {
        let mut hasher = Sha3_256::new();
        for (token, reserve) in &self.reserves {
            hasher.update([*token]);
            hasher.update(reserve.to_le_bytes());
        }
        for (account, tokens) in &self.accounts {
            hasher.update(account.to_le_bytes());
            for (token, balance) in tokens {
                hasher.update([*token]);
                hasher.update(balance.to_le_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }

    /// Reserve invariant audit.
    ///
    /// Verifies for every token: reserve == initial + swapped_in - swapped_out.
    /// Reserves move only through swaps, so any drift indicates a bug in the
    /// swap path (or direct mutation of the maps).
    ///
    /// Returns Ok(()) if the invariant holds, Err(message) with the delta if not.
    pub fn audit_reserves(&self) -> Result<(), String> {
        for (token, reserve) in &self.reserves {
            let initial = self.initial_reserves.get(token).copied().unwrap_or(0);
            let inflow = self.swapped_in.get(token).copied().unwrap_or(0);
            let outflow = self.swapped_out.get(token).copied().unwrap_or(0);

            let expected = initial
                .checked_add(inflow)
                .and_then(|v| v.checked_sub(outflow))
                .ok_or_else(|| {
                    format!(
                        "Reserve audit FAILED: flow counters inconsistent for token {}. \
                        initial={}, in={}, out={}",
                        token, initial, inflow, outflow
                    )
                })?;

            if expected != *reserve {
                return Err(format!(
                    "Reserve audit FAILED: token {} reserve {} != expected {} \
                    (initial={}, in={}, out={})",
                    token, reserve, expected, initial, inflow, outflow
                ));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
