//! Taker bets, synthetic maker bets, and the settlement-round result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnswerId, BetId, Fill, LimitOrder, MakerFill, MarketId, Outcome, UserId};

/// The taker's trade about to be recorded — validated and priced, but not
/// yet assigned a persisted row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateBet {
    pub id: BetId,
    pub user_id: UserId,
    pub market_id: MarketId,
    pub answer_id: Option<AnswerId>,
    pub outcome: Outcome,
    /// Collateral actually spent (zero for a fully resting limit order).
    pub amount: f64,
    pub shares: f64,
    pub limit_prob: Option<f64>,
    pub fills: Vec<Fill>,
    pub is_redemption: bool,
    /// Whether the trade came through a non-interactive API key.
    pub is_api: bool,
    pub created_time: DateTime<Utc>,
}

impl CandidateBet {
    /// A limit order that rested entirely without matching anything.
    #[must_use]
    pub fn is_unfilled_limit_order(&self) -> bool {
        self.limit_prob.is_some() && self.fills.is_empty()
    }
}

/// A read-only projection of one resting order's new activity in a
/// settlement round. Drives downstream position recomputation; never
/// persisted as a bet row by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticBet {
    pub user_id: UserId,
    pub market_id: MarketId,
    pub answer_id: Option<AnswerId>,
    pub outcome: Outcome,
    /// Incremental collateral spent this round only.
    pub amount: f64,
    /// Incremental shares received this round only.
    pub shares: f64,
    /// Timestamp of the latest new fill — later fills represent the more
    /// current price.
    pub created_time: DateTime<Utc>,
    pub loan_amount: f64,
    pub is_redemption: bool,
}

/// Fills and cancellations produced against one secondary answer of a
/// sum-to-one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherAnswerResult {
    pub answer_id: AnswerId,
    pub makers: Vec<MakerFill>,
    pub orders_to_cancel: Vec<LimitOrder>,
}

/// The full result of one settlement round, as handed back to the
/// order-placement orchestrator and to post-commit consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBetResult {
    pub bet: CandidateBet,
    pub makers: Vec<MakerFill>,
    pub orders_to_cancel: Vec<LimitOrder>,
    pub other_results: Vec<OtherAnswerResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_bet(limit_prob: Option<f64>, fills: Vec<Fill>) -> CandidateBet {
        CandidateBet {
            id: BetId::new(),
            user_id: UserId::new(),
            market_id: MarketId::new(),
            answer_id: None,
            outcome: Outcome::Yes,
            amount: 0.0,
            shares: 0.0,
            limit_prob,
            fills,
            is_redemption: false,
            is_api: false,
            created_time: Utc::now(),
        }
    }

    #[test]
    fn unfilled_limit_order_detection() {
        assert!(dummy_bet(Some(0.4), vec![]).is_unfilled_limit_order());
        assert!(!dummy_bet(None, vec![]).is_unfilled_limit_order());

        let fill = Fill {
            amount: 5.0,
            shares: 10.0,
            matched_bet_id: BetId::new(),
            timestamp: Utc::now(),
        };
        assert!(!dummy_bet(Some(0.4), vec![fill]).is_unfilled_limit_order());
    }
}
