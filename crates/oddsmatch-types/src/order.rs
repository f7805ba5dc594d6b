//! Resting limit orders and their fills.
//!
//! A resting order is created when a user places an order that cannot be
//! immediately and fully matched. It is mutated only by the fill
//! aggregator and is terminal once `is_filled` or `is_cancelled`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnswerId, BetId, MarketId, Outcome, UserId, floating_equal};

/// One incremental fill of a resting limit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Collateral spent in this fill.
    pub amount: f64,
    /// Shares received in this fill.
    pub shares: f64,
    /// The taker bet this fill matched against.
    pub matched_bet_id: BetId,
    pub timestamp: DateTime<Utc>,
}

/// A resting limit order awaiting matching.
///
/// Invariant: `sum(fills.amount) == amount` and
/// `is_filled ⇔ floating_equal(amount, order_amount)` — near-equality, not
/// exact, because monetary sums accumulate rounding error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitOrder {
    pub id: BetId,
    pub user_id: UserId,
    pub market_id: MarketId,
    pub answer_id: Option<AnswerId>,
    pub outcome: Outcome,
    /// Total collateral committed when the order was placed.
    pub order_amount: f64,
    /// Quantized limit price in [0, 1], on the 0.01 grid.
    pub limit_prob: f64,
    pub fills: Vec<Fill>,
    /// Cached `sum(fills.amount)`.
    pub amount: f64,
    /// Cached `sum(fills.shares)`.
    pub shares: f64,
    pub is_filled: bool,
    pub is_cancelled: bool,
    pub created_time: DateTime<Utc>,
}

impl LimitOrder {
    /// Recompute the total collateral spent across all fills.
    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.fills.iter().map(|f| f.amount).sum()
    }

    /// Recompute the total shares received across all fills.
    #[must_use]
    pub fn total_shares(&self) -> f64 {
        self.fills.iter().map(|f| f.shares).sum()
    }

    /// Whether the cached totals satisfy the fill-completion invariant.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        floating_equal(self.total_amount(), self.amount)
            && (self.is_filled == floating_equal(self.amount, self.order_amount))
    }

    /// An order still open for matching.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.is_filled && !self.is_cancelled
    }
}

/// An ephemeral proposed fill of one resting order against a taker trade,
/// produced by the external pricing step. Never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerFill {
    /// The resting order being matched, as read in the snapshot.
    pub order: LimitOrder,
    pub amount: f64,
    pub shares: f64,
    pub timestamp: DateTime<Utc>,
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl LimitOrder {
    pub fn dummy(user_id: UserId, market_id: MarketId, outcome: Outcome, order_amount: f64) -> Self {
        Self {
            id: BetId::new(),
            user_id,
            market_id,
            answer_id: None,
            outcome,
            order_amount,
            limit_prob: 0.5,
            fills: Vec::new(),
            amount: 0.0,
            shares: 0.0,
            is_filled: false,
            is_cancelled: false,
            created_time: Utc::now(),
        }
    }

    pub fn dummy_on_answer(
        user_id: UserId,
        market_id: MarketId,
        answer_id: AnswerId,
        outcome: Outcome,
        order_amount: f64,
    ) -> Self {
        Self {
            answer_id: Some(answer_id),
            ..Self::dummy(user_id, market_id, outcome, order_amount)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_order_is_open() {
        let order = LimitOrder::dummy(UserId::new(), MarketId::new(), Outcome::Yes, 100.0);
        assert!(order.is_open());
        assert!(order.invariant_holds());
        assert_eq!(order.total_amount(), 0.0);
    }

    #[test]
    fn totals_sum_fills() {
        let mut order = LimitOrder::dummy(UserId::new(), MarketId::new(), Outcome::Yes, 100.0);
        let now = Utc::now();
        order.fills.push(Fill {
            amount: 30.0,
            shares: 60.0,
            matched_bet_id: BetId::new(),
            timestamp: now,
        });
        order.fills.push(Fill {
            amount: 20.0,
            shares: 35.0,
            matched_bet_id: BetId::new(),
            timestamp: now,
        });
        assert_eq!(order.total_amount(), 50.0);
        assert_eq!(order.total_shares(), 95.0);
    }

    #[test]
    fn invariant_detects_stale_cache() {
        let mut order = LimitOrder::dummy(UserId::new(), MarketId::new(), Outcome::No, 100.0);
        order.fills.push(Fill {
            amount: 40.0,
            shares: 80.0,
            matched_bet_id: BetId::new(),
            timestamp: Utc::now(),
        });
        // Cache not updated alongside fills.
        assert!(!order.invariant_holds());
        order.amount = 40.0;
        order.shares = 80.0;
        assert!(order.invariant_holds());
    }

    #[test]
    fn filled_and_cancelled_are_terminal() {
        let mut order = LimitOrder::dummy(UserId::new(), MarketId::new(), Outcome::Yes, 10.0);
        order.is_filled = true;
        assert!(!order.is_open());
        order.is_filled = false;
        order.is_cancelled = true;
        assert!(!order.is_open());
    }
}
