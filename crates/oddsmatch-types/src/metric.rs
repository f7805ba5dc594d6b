//! Position summaries (contract metrics).
//!
//! One row per `(user, market, answer-or-none)` aggregating shares held
//! and cost basis. Read by the snapshot loader; written back on behalf of
//! the redemption collaborator.

use serde::{Deserialize, Serialize};

use crate::{AnswerId, MarketId, UserId};

/// Aggregate position of one user on one market / answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMetric {
    pub user_id: UserId,
    pub market_id: MarketId,
    /// `None` for the answer-independent summary row.
    pub answer_id: Option<AnswerId>,
    pub yes_shares: f64,
    pub no_shares: f64,
    /// Cost basis: total collateral invested into the current position.
    pub invested: f64,
}

impl PositionMetric {
    #[must_use]
    pub fn new(user_id: UserId, market_id: MarketId, answer_id: Option<AnswerId>) -> Self {
        Self {
            user_id,
            market_id,
            answer_id,
            yes_shares: 0.0,
            no_shares: 0.0,
            invested: 0.0,
        }
    }

    /// Dedup key: metrics are unique per (user, answer, market).
    #[must_use]
    pub fn key(&self) -> (UserId, Option<AnswerId>, MarketId) {
        (self.user_id, self.answer_id, self.market_id)
    }

    /// Shares that could be netted against the opposite outcome.
    #[must_use]
    pub fn redeemable_shares(&self) -> f64 {
        self.yes_shares.min(self.no_shares)
    }
}

/// Deduplicate metrics by (user, answer, market), keeping the first
/// occurrence of each key.
#[must_use]
pub fn dedup_metrics(metrics: Vec<PositionMetric>) -> Vec<PositionMetric> {
    let mut seen = std::collections::HashSet::new();
    metrics
        .into_iter()
        .filter(|m| seen.insert(m.key()))
        .collect()
}
