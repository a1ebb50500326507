// SPDX-License-Identifier: AGPL-3.0-only
//! # Pool Ledger ABI
//!
//! Uniform call surface for the pool ledger: a tagged action enum,
//! structural validation, a response envelope, and typed events.
//!
//! ## Overview
//! Callers (tests, tooling, an embedding host) interact with the ledger
//! through JSON-serialisable [`PoolAction`]s so that every operation flows
//! through one dispatch point with uniform error reporting. Read-only
//! actions return their result as a decimal string (or JSON object) in
//! `PoolResponse.data`; mutating actions additionally emit events.
//!
//! ## Actions
//! | Action                   | Args                              |
//! |--------------------------|-----------------------------------|
//! | `GetPoolTokenBalance`    | token_type                        |
//! | `GetAccountTokenBalance` | account_id, token_type            |
//! | `ModifyAccountBalance`   | account_id, token_type, amount    |
//! | `Swap`                   | account_id, token_from, amount_from |
//! | `Quote`                  | token_from, amount_from           |
//! | `PoolInfo`               | (none)                            |

use serde::{Deserialize, Serialize};

use crate::{PoolLedger, TokenType};

// ─────────────────────────────────────────────────────────────
// u128 ↔ String serialization (JSON doesn't support 128-bit integers)
// ─────────────────────────────────────────────────────────────

mod u128_str {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(val: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────
// ACTIONS
// ─────────────────────────────────────────────────────────────

/// The ledger's call surface. Dispatched via [`PoolLedger::execute`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum PoolAction {
    /// Return the pool reserve for a token type.
    GetPoolTokenBalance { token_type: u8 },

    /// Return an account's balance for a token type (0 if never credited).
    GetAccountTokenBalance { account_id: u64, token_type: u8 },

    /// Credit `amount` to an account's balance for a token type.
    ModifyAccountBalance {
        account_id: u64,
        token_type: u8,
        #[serde(with = "u128_str")]
        amount: u128,
    },

    /// Swap `amount_from` of `token_from` into the opposite token.
    Swap {
        account_id: u64,
        token_from: u8,
        #[serde(with = "u128_str")]
        amount_from: u128,
    },

    // ── Read-only queries ──
    /// Preview a swap without executing it.
    Quote {
        token_from: u8,
        #[serde(with = "u128_str")]
        amount_from: u128,
    },

    /// Return the pool summary (reserves, fee, swap count).
    PoolInfo,
}

/// Validate an action structurally before dispatch.
pub fn validate_action(action: &PoolAction) -> Result<(), String> {
    match action {
        PoolAction::GetPoolTokenBalance { token_type } => {
            TokenType::from_id(*token_type).map(|_| ())
        }
        PoolAction::GetAccountTokenBalance { token_type, .. } => {
            TokenType::from_id(*token_type).map(|_| ())
        }
        PoolAction::ModifyAccountBalance {
            token_type, amount, ..
        } => {
            TokenType::from_id(*token_type)?;
            if *amount == 0 {
                return Err("ModifyAccountBalance: amount must be > 0".to_string());
            }
            Ok(())
        }
        PoolAction::Swap {
            token_from,
            amount_from,
            ..
        } => {
            TokenType::from_id(*token_from)?;
            if *amount_from == 0 {
                return Err("Swap: amount_from must be > 0".to_string());
            }
            Ok(())
        }
        PoolAction::Quote {
            token_from,
            amount_from,
        } => {
            TokenType::from_id(*token_from)?;
            if *amount_from == 0 {
                return Err("Quote: amount_from must be > 0".to_string());
            }
            Ok(())
        }
        PoolAction::PoolInfo => Ok(()),
    }
}

// ─────────────────────────────────────────────────────────────
// EVENTS
// ─────────────────────────────────────────────────────────────

/// Events emitted by mutating actions, for indexing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PoolEvent {
    /// Emitted on ModifyAccountBalance
    BalanceModified {
        account_id: u64,
        token_type: u8,
        #[serde(with = "u128_str")]
        amount: u128,
        #[serde(with = "u128_str")]
        new_balance: u128,
    },
    /// Emitted on Swap
    Swap {
        account_id: u64,
        token_from: u8,
        #[serde(with = "u128_str")]
        amount_from: u128,
        token_to: u8,
        #[serde(with = "u128_str")]
        amount_to: u128,
        #[serde(with = "u128_str")]
        fee: u128,
    },
}

// ─────────────────────────────────────────────────────────────
// RESPONSE
// ─────────────────────────────────────────────────────────────

/// Uniform response from action dispatch. Failures are reported here,
/// never as panics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolResponse {
    pub success: bool,
    /// JSON-encoded return data (balance, quote, pool info)
    #[serde(default)]
    pub data: Option<String>,
    /// Human-readable message
    pub message: String,
    /// Events emitted during this call
    #[serde(default)]
    pub events: Vec<PoolEvent>,
}

impl PoolResponse {
    fn ok(data: Option<String>, message: String, events: Vec<PoolEvent>) -> Self {
        Self {
            success: true,
            data,
            message,
            events,
        }
    }

    fn fail(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
            events: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────
// DISPATCH
// ─────────────────────────────────────────────────────────────

impl PoolLedger {
    /// Execute a validated action against the ledger.
    pub fn execute(&mut self, action: PoolAction) -> PoolResponse {
        if let Err(e) = validate_action(&action) {
            return PoolResponse::fail(e);
        }

        match action {
            PoolAction::GetPoolTokenBalance { token_type } => {
                // Validation already resolved the id
                let token = match TokenType::from_id(token_type) {
                    Ok(t) => t,
                    Err(e) => return PoolResponse::fail(e),
                };
                let balance = self.pool_token_balance(token);
                PoolResponse::ok(
                    Some(balance.to_string()),
                    format!("Pool balance: {}", balance),
                    Vec::new(),
                )
            }

            PoolAction::GetAccountTokenBalance {
                account_id,
                token_type,
            } => {
                let token = match TokenType::from_id(token_type) {
                    Ok(t) => t,
                    Err(e) => return PoolResponse::fail(e),
                };
                let balance = self.account_token_balance(account_id, token);
                PoolResponse::ok(
                    Some(balance.to_string()),
                    format!("Balance: {}", balance),
                    Vec::new(),
                )
            }

            PoolAction::ModifyAccountBalance {
                account_id,
                token_type,
                amount,
            } => {
                let token = match TokenType::from_id(token_type) {
                    Ok(t) => t,
                    Err(e) => return PoolResponse::fail(e),
                };
                match self.modify_account_balance(account_id, token, amount) {
                    Ok(new_balance) => PoolResponse::ok(
                        Some(new_balance.to_string()),
                        format!("Credited {} to account {}", amount, account_id),
                        vec![PoolEvent::BalanceModified {
                            account_id,
                            token_type,
                            amount,
                            new_balance,
                        }],
                    ),
                    Err(e) => PoolResponse::fail(e),
                }
            }

            PoolAction::Swap {
                account_id,
                token_from,
                amount_from,
            } => {
                let token = match TokenType::from_id(token_from) {
                    Ok(t) => t,
                    Err(e) => return PoolResponse::fail(e),
                };
                match self.swap(account_id, token, amount_from) {
                    Ok(outcome) => {
                        let data = serde_json::to_string(&outcome)
                            .unwrap_or_else(|_| "{}".to_string());
                        PoolResponse::ok(
                            Some(data),
                            format!(
                                "Swapped {} of token {} -> {} of token {}",
                                outcome.amount_from,
                                outcome.token_from,
                                outcome.amount_to,
                                outcome.token_to
                            ),
                            vec![PoolEvent::Swap {
                                account_id,
                                token_from: outcome.token_from,
                                amount_from: outcome.amount_from,
                                token_to: outcome.token_to,
                                amount_to: outcome.amount_to,
                                fee: outcome.fee,
                            }],
                        )
                    }
                    Err(e) => PoolResponse::fail(e),
                }
            }

            PoolAction::Quote {
                token_from,
                amount_from,
            } => {
                let token = match TokenType::from_id(token_from) {
                    Ok(t) => t,
                    Err(e) => return PoolResponse::fail(e),
                };
                match self.quote(token, amount_from) {
                    Ok(quote) => {
                        let data =
                            serde_json::to_string(&quote).unwrap_or_else(|_| "{}".to_string());
                        PoolResponse::ok(
                            Some(data),
                            format!("Quote: {} in -> {} out", quote.amount_from, quote.amount_to),
                            Vec::new(),
                        )
                    }
                    Err(e) => PoolResponse::fail(e),
                }
            }

            PoolAction::PoolInfo => {
                let info = self.pool_info();
                let data = serde_json::to_string(&info).unwrap_or_else(|_| "{}".to_string());
                PoolResponse::ok(Some(data), "Pool info".to_string(), Vec::new())
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
