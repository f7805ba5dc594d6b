//! Ledger entries — immutable, append-only records of value transfers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnswerId, MarketId, Token, TxnId, UserId};

/// The kind of account on either end of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// The system treasury.
    Bank,
    User,
}

/// Category tag for ledger entries emitted by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnCategory {
    UniqueBettorBonus,
}

/// Category-specific payload for a unique-bettor bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusData {
    pub market_id: MarketId,
    pub unique_new_bettor_id: UserId,
    pub answer_id: Option<AnswerId>,
    /// Eligible for the enhanced partner payout rate downstream.
    pub is_partner: bool,
}

/// One immutable value transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Txn {
    pub id: TxnId,
    pub from_type: AccountType,
    pub from_id: Option<UserId>,
    pub to_type: AccountType,
    pub to_id: UserId,
    pub amount: f64,
    pub token: Token,
    pub category: TxnCategory,
    pub data: BonusData,
    pub created_time: DateTime<Utc>,
}

/// A ledger insertion that may be a structural no-op, mirroring the
/// persistence builder's no-op update statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerStatement {
    Noop,
    Insert(Txn),
}

impl LedgerStatement {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Noop)
    }
}
