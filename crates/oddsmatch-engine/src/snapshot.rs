//! Snapshot loading and trade validation.
//!
//! Reads, within one consistent transactional view, every piece of state
//! needed to validate and price a single trade, then runs the full
//! validation chain in a fixed order — the first failing condition aborts
//! the settlement attempt before any write is staged.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use oddsmatch_store::SettlementTx;
use oddsmatch_types::{
    Answer, AnswerId, BetId, LimitOrder, MakerFill, Market, MarketId, Mechanism, OddsmatchError,
    Outcome, OutcomeType, PositionMetric, Result, Token, TradingPolicy, User, UserId,
    dedup_metrics,
};

/// One incoming trade request, as handed to the snapshot loader. This is
/// the wire shape an outer API layer deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRequest {
    pub market_id: MarketId,
    pub user_id: UserId,
    /// Absent for pure limit-order placement.
    pub amount: Option<f64>,
    /// The outcome slots the trade targets; `None` targets the whole
    /// market.
    pub answer_ids: Option<Vec<AnswerId>>,
    pub outcome: Outcome,
    /// Whether the request came through a non-interactive API key.
    pub is_api: bool,
}

/// A resting order annotated with its owner's current balances.
#[derive(Debug, Clone)]
pub struct UnfilledOrder {
    pub order: LimitOrder,
    pub balance: f64,
    pub cash_balance: f64,
}

/// Everything a settlement round needs, read in one consistent view.
#[derive(Debug, Clone)]
pub struct BetSnapshot {
    pub user: User,
    pub market: Market,
    /// Outcome slots relevant to the trade (all slots for sum-to-one).
    pub answers: Vec<Answer>,
    pub unfilled_orders: Vec<UnfilledOrder>,
    /// Relevant-token balance per resting-order owner.
    pub balance_by_user_id: HashMap<UserId, f64>,
    pub unfilled_order_user_ids: Vec<UserId>,
    /// Position metrics for the actor and the order owners, deduplicated
    /// by (user, answer, market).
    pub metrics: Vec<PositionMetric>,
}

/// Whether a resting order could legally oppose the requested trade.
///
/// For a sum-to-one market, opposite-outcome orders on the selected
/// answers oppose, and so do same-outcome orders on *other* answers
/// (YES on one answer is economically NO on the rest). Otherwise only
/// opposite-outcome orders on the selected answers oppose.
fn opposes(
    order: &LimitOrder,
    sums_to_one: bool,
    answer_ids: Option<&[AnswerId]>,
    outcome: Outcome,
) -> bool {
    let in_selected =
        |ids: &[AnswerId]| order.answer_id.is_some_and(|id| ids.contains(&id));
    let outside_selected =
        |ids: &[AnswerId]| order.answer_id.is_some_and(|id| !ids.contains(&id));

    if sums_to_one {
        match answer_ids {
            // With no answer filter, every open order opposes one way or
            // the other.
            None => true,
            Some(ids) => {
                (in_selected(ids) && order.outcome != outcome)
                    || (outside_selected(ids) && order.outcome == outcome)
            }
        }
    } else {
        let selected = answer_ids.is_none_or(|ids| in_selected(ids));
        selected && order.outcome != outcome
    }
}

/// Load and validate the snapshot for one trade.
///
/// Validation order is fixed; see the error variants for the taxonomy.
/// All validations run before any mutation is staged.
pub fn load_snapshot(
    tx: &SettlementTx<'_>,
    policy: &TradingPolicy,
    request: &BetRequest,
) -> Result<BetSnapshot> {
    let market_token = tx.market(request.market_id).map(|m| m.token);

    // 1. Trading switch for the market's token. When the market itself is
    // missing this check cannot apply and falls through to NotFound below.
    if let Some(token) = market_token {
        if !tx.is_trading_enabled(token) {
            return Err(OddsmatchError::TradingDisabled(token));
        }
    }

    // 2-3. Actor and market must exist.
    let user = tx
        .user(request.user_id)
        .ok_or(OddsmatchError::UserNotFound(request.user_id))?
        .clone();
    let market = tx
        .market(request.market_id)
        .ok_or(OddsmatchError::MarketNotFound(request.market_id))?
        .clone();

    // 4. The mechanism must have a tradeable side.
    if !market.mechanism.is_tradeable() {
        return Err(OddsmatchError::UnsupportedMechanism);
    }

    // 5-6. Lifecycle.
    if market.is_closed(Utc::now()) {
        return Err(OddsmatchError::MarketClosed);
    }
    if market.is_resolved {
        return Err(OddsmatchError::MarketResolved);
    }

    // 7. Requested amount against the relevant-token balance.
    let balance = user.token_balance(market.token);
    if let Some(amount) = request.amount {
        if balance < amount {
            return Err(OddsmatchError::InsufficientBalance {
                needed: amount,
                available: balance,
            });
        }
    }

    // 8. Sweepstakes verification.
    if market.token == Token::Cash
        && (!user.sweepstakes_verified || !user.id_verified)
        && !policy.is_institutional_partner(user.id)
    {
        return Err(OddsmatchError::VerificationRequired);
    }

    // 9. Admins stay out of cash markets in a live deployment.
    if policy.is_admin(user.id) && market.token == Token::Cash && policy.is_prod {
        return Err(OddsmatchError::PrivilegedAccountRestricted);
    }

    // 10. Banned or deleted accounts.
    if user.is_banned_from_trading || policy.is_banned(user.id) || user.user_deleted {
        return Err(OddsmatchError::AccountBanned);
    }

    // 11. API callers cannot trade stock-like markets.
    if market.outcome_type == OutcomeType::Stonk && request.is_api {
        return Err(OddsmatchError::ApiRestricted);
    }

    // Requested answers must exist and be open; a sum-to-one market needs
    // at least two answers before it is tradeable.
    if let Some(ids) = &request.answer_ids {
        for id in ids {
            let answer = market
                .answer(*id)
                .ok_or(OddsmatchError::AnswerNotFound(*id))?;
            if answer.is_resolved() {
                return Err(OddsmatchError::AnswerResolved(*id));
            }
        }
    }
    let sums_to_one = market.mechanism.is_sum_to_one_multi();
    if sums_to_one && market.answers.len() < 2 {
        return Err(OddsmatchError::NotEnoughAnswers);
    }

    // Relevant outcome slots: all of them for sum-to-one (every answer
    // participates in pricing), otherwise the requested subset.
    let answers: Vec<Answer> = match &request.answer_ids {
        Some(ids) if !sums_to_one => market
            .answers
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect(),
        _ => market.answers.clone(),
    };

    // Every open order that could oppose this trade, annotated with its
    // owner's balances.
    let answer_ids = request.answer_ids.as_deref();
    let mut unfilled_orders = Vec::new();
    for order in tx.open_orders(market.id) {
        if !opposes(order, sums_to_one, answer_ids, request.outcome) {
            continue;
        }
        let owner = tx
            .user(order.user_id)
            .ok_or(OddsmatchError::UserNotFound(order.user_id))?;
        unfilled_orders.push(UnfilledOrder {
            order: order.clone(),
            balance: owner.balance,
            cash_balance: owner.cash_balance,
        });
    }

    let mut balance_by_user_id = HashMap::new();
    let mut unfilled_order_user_ids = Vec::new();
    for unfilled in &unfilled_orders {
        let owner_id = unfilled.order.user_id;
        if !balance_by_user_id.contains_key(&owner_id) {
            let token_balance = match market.token {
                Token::Cash => unfilled.cash_balance,
                Token::Mana => unfilled.balance,
            };
            balance_by_user_id.insert(owner_id, token_balance);
            unfilled_order_user_ids.push(owner_id);
        }
    }

    // Position metrics: the actor's rows on the relevant answers plus the
    // answer-independent row, and the order owners' rows restricted to the
    // answers their orders touch.
    let relevant_for_actor = |metric: &PositionMetric| match answer_ids {
        None => true,
        Some(ids) => metric
            .answer_id
            .is_none_or(|id| ids.contains(&id)),
    };
    let my_metrics: Vec<PositionMetric> = tx
        .user_metrics(user.id, market.id)
        .into_iter()
        .filter(|m| relevant_for_actor(m))
        .cloned()
        .collect();

    let mut maker_metrics = Vec::new();
    for owner_id in &unfilled_order_user_ids {
        for metric in tx.user_metrics(*owner_id, market.id) {
            let matches_an_order = unfilled_orders.iter().any(|u| {
                u.order.user_id == metric.user_id
                    && (u.order.answer_id == metric.answer_id || metric.answer_id.is_none())
            });
            if matches_an_order {
                maker_metrics.push(metric.clone());
            }
        }
    }

    let metrics = dedup_metrics(
        my_metrics
            .into_iter()
            .chain(maker_metrics)
            .collect(),
    );

    debug!(
        user = %user.id,
        market = %market.id,
        unfilled_orders = unfilled_orders.len(),
        metrics = metrics.len(),
        "loaded bet snapshot"
    );

    Ok(BetSnapshot {
        user,
        market,
        answers,
        unfilled_orders,
        balance_by_user_id,
        unfilled_order_user_ids,
        metrics,
    })
}

/// Structural check on the external pricing step's output: every proposed
/// fill must reference a resting order present in the snapshot.
pub fn verify_proposed_fills<'a, I>(snapshot: &BetSnapshot, fills: I) -> Result<()>
where
    I: IntoIterator<Item = &'a MakerFill>,
{
    let known: std::collections::HashSet<BetId> = snapshot
        .unfilled_orders
        .iter()
        .map(|u| u.order.id)
        .collect();
    for fill in fills {
        if !known.contains(&fill.order.id) {
            return Err(OddsmatchError::UnknownMakerOrder(fill.order.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use oddsmatch_store::Store;

    fn request(market: &Market, user: &User) -> BetRequest {
        BetRequest {
            market_id: market.id,
            user_id: user.id,
            amount: Some(10.0),
            answer_ids: None,
            outcome: Outcome::Yes,
            is_api: false,
        }
    }

    fn seed() -> (Store, User, Market) {
        let mut store = Store::new();
        let user = User::dummy(100.0);
        let market = Market::dummy_binary(UserId::new());
        store.insert_user(user.clone());
        store.insert_market(market.clone());
        (store, user, market)
    }

    #[test]
    fn clean_request_loads() {
        let (mut store, user, market) = seed();
        let tx = SettlementTx::begin(&mut store);
        let snapshot = load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user))
            .expect("snapshot should load");
        assert_eq!(snapshot.user.id, user.id);
        assert!(snapshot.unfilled_orders.is_empty());
    }

    #[test]
    fn trading_disabled_wins_over_everything() {
        let (mut store, mut user, mut market) = seed();
        // Violate several conditions at once.
        user.is_banned_from_trading = true;
        market.is_resolved = true;
        store.insert_user(user.clone());
        store.insert_market(market.clone());
        store.set_trading_enabled(market.token, false);

        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user))
            .unwrap_err();
        assert!(matches!(err, OddsmatchError::TradingDisabled(_)));
    }

    #[test]
    fn missing_user_before_missing_market_state() {
        let (mut store, user, market) = seed();
        let mut req = request(&market, &user);
        req.user_id = UserId::new();
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &req).unwrap_err();
        assert!(matches!(err, OddsmatchError::UserNotFound(_)));
    }

    #[test]
    fn missing_market_reported() {
        let (mut store, user, market) = seed();
        let mut req = request(&market, &user);
        req.market_id = MarketId::new();
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &req).unwrap_err();
        assert!(matches!(err, OddsmatchError::MarketNotFound(_)));
    }

    #[test]
    fn untradeable_mechanism_rejected() {
        let (mut store, user, mut market) = seed();
        market.mechanism = Mechanism::None;
        store.insert_market(market.clone());
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user))
            .unwrap_err();
        assert!(matches!(err, OddsmatchError::UnsupportedMechanism));
    }

    #[test]
    fn closed_before_resolved() {
        let (mut store, user, mut market) = seed();
        market.close_time = Some(Utc::now() - Duration::hours(1));
        market.is_resolved = true;
        store.insert_market(market.clone());
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user))
            .unwrap_err();
        assert!(matches!(err, OddsmatchError::MarketClosed));
    }

    #[test]
    fn resolved_before_insufficient_balance() {
        let (mut store, mut user, mut market) = seed();
        user.balance = 1.0;
        market.is_resolved = true;
        store.insert_user(user.clone());
        store.insert_market(market.clone());
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user))
            .unwrap_err();
        assert!(matches!(err, OddsmatchError::MarketResolved));
    }

    #[test]
    fn insufficient_balance_before_banned() {
        let (mut store, mut user, market) = seed();
        user.balance = 1.0;
        user.is_banned_from_trading = true;
        store.insert_user(user.clone());
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user))
            .unwrap_err();
        assert!(matches!(err, OddsmatchError::InsufficientBalance { .. }));
    }

    #[test]
    fn pure_limit_placement_skips_balance_check() {
        let (mut store, mut user, market) = seed();
        user.balance = 0.0;
        store.insert_user(user.clone());
        let mut req = request(&market, &user);
        req.amount = None;
        let tx = SettlementTx::begin(&mut store);
        assert!(load_snapshot(&tx, &TradingPolicy::default(), &req).is_ok());
    }

    #[test]
    fn cash_market_requires_verification() {
        let (mut store, mut user, mut market) = seed();
        user.sweepstakes_verified = false;
        user.cash_balance = 100.0;
        market.token = Token::Cash;
        store.insert_user(user.clone());
        store.insert_market(market.clone());
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user))
            .unwrap_err();
        assert!(matches!(err, OddsmatchError::VerificationRequired));
    }

    #[test]
    fn institutional_partner_bypasses_verification() {
        let (mut store, mut user, mut market) = seed();
        user.sweepstakes_verified = false;
        user.cash_balance = 100.0;
        market.token = Token::Cash;
        store.insert_user(user.clone());
        store.insert_market(market.clone());
        let mut policy = TradingPolicy::default();
        policy.institutional_partner_user_ids.insert(user.id);
        let tx = SettlementTx::begin(&mut store);
        assert!(load_snapshot(&tx, &policy, &request(&market, &user)).is_ok());
    }

    #[test]
    fn admin_blocked_on_cash_in_prod_only() {
        let (mut store, mut user, mut market) = seed();
        user.cash_balance = 100.0;
        market.token = Token::Cash;
        store.insert_user(user.clone());
        store.insert_market(market.clone());
        let mut policy = TradingPolicy::default();
        policy.admin_user_ids.insert(user.id);

        {
            let tx = SettlementTx::begin(&mut store);
            assert!(load_snapshot(&tx, &policy, &request(&market, &user)).is_ok());
        }

        policy.is_prod = true;
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &policy, &request(&market, &user)).unwrap_err();
        assert!(matches!(err, OddsmatchError::PrivilegedAccountRestricted));
    }

    #[test]
    fn banned_before_api_restriction() {
        let (mut store, mut user, mut market) = seed();
        user.is_banned_from_trading = true;
        market.outcome_type = OutcomeType::Stonk;
        store.insert_user(user.clone());
        store.insert_market(market.clone());
        let mut req = request(&market, &user);
        req.is_api = true;
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &req).unwrap_err();
        assert!(matches!(err, OddsmatchError::AccountBanned));
    }

    #[test]
    fn api_caller_blocked_on_stonk() {
        let (mut store, user, mut market) = seed();
        market.outcome_type = OutcomeType::Stonk;
        store.insert_market(market.clone());
        let mut req = request(&market, &user);
        req.is_api = true;
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &req).unwrap_err();
        assert!(matches!(err, OddsmatchError::ApiRestricted));
    }

    #[test]
    fn resolved_answer_rejected() {
        let (mut store, user, _) = seed();
        let mut market = Market::dummy_multi(UserId::new(), true, 3);
        market.answers[0].resolution = Some("YES".to_string());
        store.insert_market(market.clone());
        let mut req = request(&market, &user);
        req.answer_ids = Some(vec![market.answers[0].id]);
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &req).unwrap_err();
        assert!(matches!(err, OddsmatchError::AnswerResolved(_)));
    }

    #[test]
    fn sum_to_one_needs_two_answers() {
        let (mut store, user, _) = seed();
        let market = Market::dummy_multi(UserId::new(), true, 1);
        store.insert_market(market.clone());
        let mut req = request(&market, &user);
        req.answer_ids = Some(vec![market.answers[0].id]);
        let tx = SettlementTx::begin(&mut store);
        let err = load_snapshot(&tx, &TradingPolicy::default(), &req).unwrap_err();
        assert!(matches!(err, OddsmatchError::NotEnoughAnswers));
    }

    // -- opposing-order selection -----------------------------------------

    #[test]
    fn binary_market_takes_opposite_outcome_only() {
        let (mut store, user, market) = seed();
        let maker = User::dummy(50.0);
        store.insert_user(maker.clone());
        let no_order = LimitOrder::dummy(maker.id, market.id, Outcome::No, 20.0);
        let yes_order = LimitOrder::dummy(maker.id, market.id, Outcome::Yes, 20.0);
        let no_id = no_order.id;
        store.insert_order(no_order);
        store.insert_order(yes_order);

        let tx = SettlementTx::begin(&mut store);
        let snapshot =
            load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user)).unwrap();
        assert_eq!(snapshot.unfilled_orders.len(), 1);
        assert_eq!(snapshot.unfilled_orders[0].order.id, no_id);
        assert_eq!(snapshot.balance_by_user_id[&maker.id], 50.0);
    }

    #[test]
    fn sum_to_one_takes_same_outcome_on_other_answers() {
        let mut store = Store::new();
        let user = User::dummy(100.0);
        store.insert_user(user.clone());
        let market = Market::dummy_multi(UserId::new(), true, 3);
        store.insert_market(market.clone());
        let maker = User::dummy(50.0);
        store.insert_user(maker.clone());

        let target = market.answers[0].id;
        let other = market.answers[1].id;
        // Opposite outcome on the target answer: opposes.
        let opp =
            LimitOrder::dummy_on_answer(maker.id, market.id, target, Outcome::No, 10.0);
        // Same outcome on another answer: opposes (economically NO on target).
        let same_other =
            LimitOrder::dummy_on_answer(maker.id, market.id, other, Outcome::Yes, 10.0);
        // Same outcome on the target answer: does not oppose.
        let same_target =
            LimitOrder::dummy_on_answer(maker.id, market.id, target, Outcome::Yes, 10.0);
        let expected = vec![opp.id, same_other.id];
        store.insert_order(opp);
        store.insert_order(same_other);
        store.insert_order(same_target);

        let mut req = request(&market, &user);
        req.answer_ids = Some(vec![target]);
        let tx = SettlementTx::begin(&mut store);
        let snapshot = load_snapshot(&tx, &TradingPolicy::default(), &req).unwrap();
        let mut found: Vec<BetId> = snapshot
            .unfilled_orders
            .iter()
            .map(|u| u.order.id)
            .collect();
        found.sort_unstable();
        let mut expected = expected;
        expected.sort_unstable();
        assert_eq!(found, expected);
    }

    #[test]
    fn non_sum_to_one_multi_ignores_other_answers() {
        let mut store = Store::new();
        let user = User::dummy(100.0);
        store.insert_user(user.clone());
        let market = Market::dummy_multi(UserId::new(), false, 3);
        store.insert_market(market.clone());
        let maker = User::dummy(50.0);
        store.insert_user(maker.clone());

        let target = market.answers[0].id;
        let other = market.answers[1].id;
        let opp = LimitOrder::dummy_on_answer(maker.id, market.id, target, Outcome::No, 10.0);
        let other_no =
            LimitOrder::dummy_on_answer(maker.id, market.id, other, Outcome::No, 10.0);
        let opp_id = opp.id;
        store.insert_order(opp);
        store.insert_order(other_no);

        let mut req = request(&market, &user);
        req.answer_ids = Some(vec![target]);
        let tx = SettlementTx::begin(&mut store);
        let snapshot = load_snapshot(&tx, &TradingPolicy::default(), &req).unwrap();
        assert_eq!(snapshot.unfilled_orders.len(), 1);
        assert_eq!(snapshot.unfilled_orders[0].order.id, opp_id);
    }

    #[test]
    fn metrics_deduped_across_actor_and_makers() {
        let (mut store, user, market) = seed();
        let maker = User::dummy(50.0);
        store.insert_user(maker.clone());
        store.insert_order(LimitOrder::dummy(maker.id, market.id, Outcome::No, 20.0));

        store.upsert_metric(PositionMetric::new(user.id, market.id, None));
        store.upsert_metric(PositionMetric::new(maker.id, market.id, None));

        let tx = SettlementTx::begin(&mut store);
        let snapshot =
            load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user)).unwrap();
        assert_eq!(snapshot.metrics.len(), 2);
    }

    #[test]
    fn proposed_fill_must_reference_snapshot_order() {
        let (mut store, user, market) = seed();
        let maker = User::dummy(50.0);
        store.insert_user(maker.clone());
        let known = LimitOrder::dummy(maker.id, market.id, Outcome::No, 20.0);
        store.insert_order(known.clone());

        let tx = SettlementTx::begin(&mut store);
        let snapshot =
            load_snapshot(&tx, &TradingPolicy::default(), &request(&market, &user)).unwrap();

        let good = MakerFill {
            order: known,
            amount: 5.0,
            shares: 10.0,
            timestamp: Utc::now(),
        };
        assert!(verify_proposed_fills(&snapshot, [&good]).is_ok());

        let stranger = MakerFill {
            order: LimitOrder::dummy(maker.id, market.id, Outcome::No, 20.0),
            amount: 5.0,
            shares: 10.0,
            timestamp: Utc::now(),
        };
        let err = verify_proposed_fills(&snapshot, [&stranger]).unwrap_err();
        assert!(matches!(err, OddsmatchError::UnknownMakerOrder(_)));
    }

    #[test]
    fn bet_request_serde_roundtrip() {
        let req = BetRequest {
            market_id: MarketId::new(),
            user_id: UserId::new(),
            amount: Some(25.0),
            answer_ids: Some(vec![AnswerId::new()]),
            outcome: Outcome::Yes,
            is_api: false,
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: BetRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.market_id, req.market_id);
        assert_eq!(back.answer_ids, req.answer_ids);
        assert_eq!(back.amount, req.amount);
    }
}
