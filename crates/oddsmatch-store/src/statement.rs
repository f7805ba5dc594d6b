//! Write statements staged on a settlement transaction.
//!
//! The persistence builder compiles the fill aggregator's per-order
//! updates into exactly one [`BulkOrderUpdate`]; an empty round yields the
//! no-op statement rather than an empty batch.

use serde::{Deserialize, Serialize};

use oddsmatch_types::{BalanceUpdate, BetId, CandidateBet, Fill, PositionMetric, Txn};

/// The new state of one resting order after a settlement round. Applying
/// it merges exactly these four fields into the stored record, leaving
/// every other field untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitOrderUpdate {
    pub id: BetId,
    pub fills: Vec<Fill>,
    pub is_filled: bool,
    pub amount: f64,
    pub shares: f64,
}

/// One bulk update against the resting-order store, keyed by order id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkOrderUpdate {
    pub updates: Vec<LimitOrderUpdate>,
}

impl BulkOrderUpdate {
    /// The syntactically valid no-op statement.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            updates: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.updates.is_empty()
    }
}

/// One staged write. Every mutation the engine makes goes through one of
/// these, which is what makes the all-or-nothing contract checkable: a
/// component without the transaction cannot stage anything.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Merge fill state into touched resting orders.
    UpdateOrders(BulkOrderUpdate),
    /// Cancel resting orders as a side effect of the round.
    CancelOrders(Vec<BetId>),
    /// Apply per-user balance deltas (already merged per user).
    ApplyBalances(Vec<BalanceUpdate>),
    /// Append one immutable ledger entry.
    InsertTxn(Txn),
    /// Upsert position summaries on behalf of the redemption collaborator.
    UpsertMetrics(Vec<PositionMetric>),
    /// Insert the taker's bet row.
    InsertBet(CandidateBet),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_statement_is_noop() {
        assert!(BulkOrderUpdate::noop().is_noop());
        assert!(BulkOrderUpdate::default().is_noop());
    }

    #[test]
    fn populated_statement_is_not_noop() {
        let stmt = BulkOrderUpdate {
            updates: vec![LimitOrderUpdate {
                id: BetId::new(),
                fills: Vec::new(),
                is_filled: false,
                amount: 0.0,
                shares: 0.0,
            }],
        };
        assert!(!stmt.is_noop());
    }

    #[test]
    fn statement_serde_roundtrip() {
        let stmt = BulkOrderUpdate {
            updates: vec![LimitOrderUpdate {
                id: BetId::new(),
                fills: Vec::new(),
                is_filled: true,
                amount: 50.0,
                shares: 100.0,
            }],
        };
        let json = serde_json::to_string(&stmt).unwrap();
        let back: BulkOrderUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.updates.len(), 1);
        assert_eq!(back.updates[0].id, stmt.updates[0].id);
        assert!(back.updates[0].is_filled);
    }
}
