//! Error types for the OddsMatch settlement engine.
//!
//! All errors use the `ODDS_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by subsystem:
//! - 1xx: Trade validation errors
//! - 2xx: Balance errors
//! - 3xx: Fill / settlement errors
//! - 9xx: General / internal errors
//!
//! The snapshot loader checks its validations in a fixed order and the
//! first failing condition aborts the whole settlement attempt — callers
//! can rely on exactly one of these surfacing per request.

use thiserror::Error;

use crate::{AnswerId, BetId, MarketId, Token, UserId};

/// Central error enum for all OddsMatch operations.
#[derive(Debug, Error)]
pub enum OddsmatchError {
    // =================================================================
    // Trade Validation Errors (1xx)
    // =================================================================
    /// Trading is globally disabled for this collateral token.
    #[error("ODDS_ERR_100: Trading with {0} is currently disabled")]
    TradingDisabled(Token),

    /// The acting user was not found.
    #[error("ODDS_ERR_101: User not found: {0}")]
    UserNotFound(UserId),

    /// The market was not found.
    #[error("ODDS_ERR_102: Market not found: {0}")]
    MarketNotFound(MarketId),

    /// The market's mechanism has no tradeable side.
    #[error("ODDS_ERR_103: This is not a market")]
    UnsupportedMechanism,

    /// The market is past its close time.
    #[error("ODDS_ERR_104: Trading is closed")]
    MarketClosed,

    /// The market has already resolved.
    #[error("ODDS_ERR_105: Market is resolved")]
    MarketResolved,

    /// Identity / sweepstakes verification required for this token.
    #[error("ODDS_ERR_106: You must be verified to trade on sweepstakes markets")]
    VerificationRequired,

    /// Administrators may not trade this token in a live deployment.
    #[error("ODDS_ERR_107: Admins cannot trade on sweepstakes markets")]
    PrivilegedAccountRestricted,

    /// The acting user is banned from trading or deleted.
    #[error("ODDS_ERR_108: You are banned or deleted")]
    AccountBanned,

    /// Non-interactive API callers may not trade this outcome type.
    #[error("ODDS_ERR_109: API users cannot bet on stock-like markets")]
    ApiRestricted,

    /// A limit price that is not on the 0.01 tick grid.
    #[error("ODDS_ERR_110: limitProb must be in increments of 0.01 (i.e. whole percentage points)")]
    InvalidLimitProb { prob: f64 },

    /// The requested outcome slot was not found on the market.
    #[error("ODDS_ERR_111: Answer not found: {0}")]
    AnswerNotFound(AnswerId),

    /// The outcome slot is resolved and cannot be bet on.
    #[error("ODDS_ERR_112: Answer is resolved and cannot be bet on: {0}")]
    AnswerResolved(AnswerId),

    /// A sum-to-one market cannot be traded before it has two answers.
    #[error("ODDS_ERR_113: Cannot bet until at least two answers are added")]
    NotEnoughAnswers,

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Not enough balance in the market's collateral token.
    #[error("ODDS_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: f64, available: f64 },

    /// A balance application would produce a negative balance.
    #[error("ODDS_ERR_201: Balance underflow for user {user_id}")]
    BalanceUnderflow { user_id: UserId },

    // =================================================================
    // Fill / Settlement Errors (3xx)
    // =================================================================
    /// The pricing step referenced a resting order absent from the snapshot.
    #[error("ODDS_ERR_300: Proposed fill references unknown resting order: {0}")]
    UnknownMakerOrder(BetId),

    /// A staged write referenced a resting order that does not exist.
    #[error("ODDS_ERR_301: Resting order not found: {0}")]
    OrderNotFound(BetId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("ODDS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("ODDS_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OddsmatchError>;

impl From<serde_json::Error> for OddsmatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = OddsmatchError::MarketNotFound(MarketId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("ODDS_ERR_102"), "Got: {msg}");
    }

    #[test]
    fn insufficient_balance_display() {
        let err = OddsmatchError::InsufficientBalance {
            needed: 100.0,
            available: 50.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("ODDS_ERR_200"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn tick_error_names_whole_percentage_points() {
        let err = OddsmatchError::InvalidLimitProb { prob: 0.123 };
        let msg = format!("{err}");
        assert!(msg.contains("whole percentage points"));
    }

    #[test]
    fn all_errors_have_odds_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(OddsmatchError::TradingDisabled(Token::Cash)),
            Box::new(OddsmatchError::UnsupportedMechanism),
            Box::new(OddsmatchError::MarketClosed),
            Box::new(OddsmatchError::MarketResolved),
            Box::new(OddsmatchError::AccountBanned),
            Box::new(OddsmatchError::ApiRestricted),
            Box::new(OddsmatchError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("ODDS_ERR_"),
                "Error missing ODDS_ERR_ prefix: {msg}"
            );
        }
    }
}
