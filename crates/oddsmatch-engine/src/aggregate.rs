//! Fill aggregation — the write half of a settlement round.
//!
//! Takes the proposed maker fills from the external pricing step, merges
//! them into the touched resting orders, synthesizes one marginal bet per
//! order for downstream position recomputation, accumulates maker spend,
//! calls the redemption collaborator with the post-fill state, and stages
//! every resulting write on the settlement transaction.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use oddsmatch_store::{BulkOrderUpdate, LimitOrderUpdate, SettlementTx};
use oddsmatch_types::{
    BalanceUpdate, BetId, Fill, MakerFill, Market, MarketId, Outcome, PositionMetric, Result,
    SyntheticBet, UserId, floating_equal, merge_balance_updates,
};

use crate::persist::build_order_update;
use crate::redemption::ShareRedeemer;

/// Everything one settlement round produced.
#[derive(Debug, Clone)]
pub struct FillRound {
    /// One marginal bet per touched resting order — this round's
    /// incremental activity only.
    pub new_maker_bets: Vec<SyntheticBet>,
    /// Synthetic redemption bets appended by the collaborator.
    pub redemption_bets: Vec<SyntheticBet>,
    /// Position summaries after fills and redemption.
    pub updated_metrics: Vec<PositionMetric>,
    /// Net per-user balance deltas (maker spend folded with redemption
    /// proceeds).
    pub balance_updates: Vec<BalanceUpdate>,
    /// The one bulk update against the resting-order store.
    pub order_update: BulkOrderUpdate,
}

impl FillRound {
    /// The canonical empty result: no bets, no deltas, a valid no-op
    /// statement, metrics passed through unchanged.
    #[must_use]
    pub fn empty(metrics: &[PositionMetric]) -> Self {
        Self {
            new_maker_bets: Vec::new(),
            redemption_bets: Vec::new(),
            updated_metrics: metrics.to_vec(),
            balance_updates: Vec::new(),
            order_update: BulkOrderUpdate::noop(),
        }
    }
}

/// Apply a round of proposed maker fills.
///
/// Fills are regrouped by resting order across all taker bets so each
/// touched order gets exactly one update, even when several taker bets
/// matched it in the same round — recomputing an order twice from the
/// snapshot would drop the first taker's fills.
///
/// With no fills at all, returns [`FillRound::empty`] and stages nothing.
pub fn update_makers(
    makers_by_taker: &BTreeMap<BetId, Vec<MakerFill>>,
    market: &Market,
    metrics: &[PositionMetric],
    redeemer: &dyn ShareRedeemer,
    tx: &mut SettlementTx<'_>,
) -> Result<FillRound> {
    // Regroup: order id -> ordered (taker id, fill) events.
    let mut fills_by_order: BTreeMap<BetId, Vec<(BetId, &MakerFill)>> = BTreeMap::new();
    for (taker_bet_id, makers) in makers_by_taker {
        for maker in makers {
            fills_by_order
                .entry(maker.order.id)
                .or_default()
                .push((*taker_bet_id, maker));
        }
    }

    if fills_by_order.is_empty() {
        return Ok(FillRound::empty(metrics));
    }

    let mut new_maker_bets: Vec<SyntheticBet> = Vec::new();
    let mut updates: Vec<LimitOrderUpdate> = Vec::new();
    let mut spend_updates: Vec<BalanceUpdate> = Vec::new();
    let mut maker_ids: Vec<UserId> = Vec::new();
    let mut seen_makers: HashSet<UserId> = HashSet::new();

    for (order_id, events) in &fills_by_order {
        let order = &events[0].1.order;

        let new_fills: Vec<Fill> = events
            .iter()
            .map(|(taker_bet_id, maker)| Fill {
                amount: maker.amount,
                shares: maker.shares,
                matched_bet_id: *taker_bet_id,
                timestamp: maker.timestamp,
            })
            .collect();

        let mut fills = order.fills.clone();
        fills.extend(new_fills.iter().cloned());
        let total_amount: f64 = fills.iter().map(|f| f.amount).sum();
        let total_shares: f64 = fills.iter().map(|f| f.shares).sum();
        // Near-equality: monetary sums accumulate rounding error.
        let is_filled = floating_equal(total_amount, order.order_amount);

        let new_amount: f64 = new_fills.iter().map(|f| f.amount).sum();
        let new_shares: f64 = new_fills.iter().map(|f| f.shares).sum();
        // Latest, not earliest: later fills represent the more current price.
        let created_time = new_fills
            .iter()
            .map(|f| f.timestamp)
            .max()
            .unwrap_or(order.created_time);

        new_maker_bets.push(SyntheticBet {
            user_id: order.user_id,
            market_id: order.market_id,
            answer_id: order.answer_id,
            outcome: order.outcome,
            amount: new_amount,
            shares: new_shares,
            created_time,
            loan_amount: 0.0,
            is_redemption: false,
        });
        updates.push(LimitOrderUpdate {
            id: *order_id,
            fills,
            is_filled,
            amount: total_amount,
            shares: total_shares,
        });
        spend_updates.push(BalanceUpdate::spend(order.user_id, market.token, new_amount));
        if seen_makers.insert(order.user_id) {
            maker_ids.push(order.user_id);
        }
        debug!(order = %order_id, filled = is_filled, "updated a matched limit order");
    }

    let post_fill_metrics = fold_bets_into_metrics(metrics, &new_maker_bets, market.id);

    info!(makers = maker_ids.len(), "redeeming shares for makers");
    let redemption = redeemer.redeem(tx, &maker_ids, market, &new_maker_bets, &post_fill_metrics)?;

    // Spend reduces balance, redemption increases it; one net delta per user.
    let balance_updates = merge_balance_updates(
        redemption
            .balance_updates
            .into_iter()
            .chain(spend_updates)
            .collect(),
    );

    let order_update = build_order_update(updates);

    tx.update_orders(order_update.clone());
    tx.apply_balances(balance_updates.clone());
    tx.upsert_metrics(redemption.updated_metrics.clone());

    Ok(FillRound {
        new_maker_bets,
        redemption_bets: redemption.bets_to_insert,
        updated_metrics: redemption.updated_metrics,
        balance_updates,
        order_update,
    })
}

/// Fold a round's marginal bets into the position summaries, creating
/// rows for first-time positions.
#[must_use]
pub fn fold_bets_into_metrics(
    metrics: &[PositionMetric],
    bets: &[SyntheticBet],
    market_id: MarketId,
) -> Vec<PositionMetric> {
    let mut out: Vec<PositionMetric> = metrics.to_vec();
    for bet in bets {
        let key = (bet.user_id, bet.answer_id, market_id);
        let idx = out.iter().position(|m| m.key() == key).unwrap_or_else(|| {
            out.push(PositionMetric::new(bet.user_id, market_id, bet.answer_id));
            out.len() - 1
        });
        let metric = &mut out[idx];
        match bet.outcome {
            Outcome::Yes => metric.yes_shares += bet.shares,
            Outcome::No => metric.no_shares += bet.shares,
        }
        metric.invested += bet.amount;
    }
    out
}
