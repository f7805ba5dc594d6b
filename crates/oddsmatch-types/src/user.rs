//! User accounts and collateral tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::UserId;

/// The two independent collateral tokens a market can trade in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Token {
    /// Play-money collateral.
    Mana,
    /// Sweepstakes (real-money equivalent) collateral.
    Cash,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mana => write!(f, "MANA"),
            Self::Cash => write!(f, "CASH"),
        }
    }
}

/// A user account. Balances are mutated only through ledger-consistent
/// operations staged on a settlement transaction; the engine never drives
/// either balance negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Mana balance.
    pub balance: f64,
    /// Cash (sweepstakes) balance.
    pub cash_balance: f64,
    /// Lifetime deposits, credited alongside bonus payouts.
    pub total_deposits: f64,
    pub id_verified: bool,
    pub sweepstakes_verified: bool,
    pub is_banned_from_trading: bool,
    pub user_deleted: bool,
}

impl User {
    /// The balance in the given collateral token.
    #[must_use]
    pub fn token_balance(&self, token: Token) -> f64 {
        match token {
            Token::Mana => self.balance,
            Token::Cash => self.cash_balance,
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl User {
    pub fn dummy(balance: f64) -> Self {
        Self {
            id: UserId::new(),
            // Distinct usernames keep bot-list tests honest.
            username: format!("trader-{:08x}", rand::random::<u32>()),
            balance,
            cash_balance: 0.0,
            total_deposits: balance,
            id_verified: true,
            sweepstakes_verified: true,
            is_banned_from_trading: false,
            user_deleted: false,
        }
    }

    pub fn dummy_named(username: &str, balance: f64) -> Self {
        Self {
            username: username.to_string(),
            ..Self::dummy(balance)
        }
    }
}
