//! The in-memory datastore.
//!
//! Holds the only cross-call mutable state of the engine: users, markets,
//! bet rows, position metrics, the ledger, and the per-token trading
//! switch. All mutation from a settlement round arrives through a
//! committed [`crate::SettlementTx`].

use std::collections::HashMap;

use oddsmatch_types::{
    AnswerId, BetId, CandidateBet, LimitOrder, Market, MarketId, PositionMetric, Token, Txn, User,
    UserId,
};

/// In-memory backing store.
#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<UserId, User>,
    markets: HashMap<MarketId, Market>,
    orders: HashMap<BetId, LimitOrder>,
    bets: Vec<CandidateBet>,
    metrics: HashMap<(UserId, Option<AnswerId>, MarketId), PositionMetric>,
    txns: Vec<Txn>,
    /// Per-token trading switch; a token absent from the map is enabled.
    trading_disabled: HashMap<Token, bool>,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- seeding -----------------------------------------------------------

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn insert_market(&mut self, market: Market) {
        self.markets.insert(market.id, market);
    }

    pub fn insert_order(&mut self, order: LimitOrder) {
        self.orders.insert(order.id, order);
    }

    pub fn upsert_metric(&mut self, metric: PositionMetric) {
        self.metrics.insert(metric.key(), metric);
    }

    pub fn set_trading_enabled(&mut self, token: Token, enabled: bool) {
        self.trading_disabled.insert(token, !enabled);
    }

    // -- reads -------------------------------------------------------------

    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    #[must_use]
    pub fn market(&self, id: MarketId) -> Option<&Market> {
        self.markets.get(&id)
    }

    #[must_use]
    pub fn order(&self, id: BetId) -> Option<&LimitOrder> {
        self.orders.get(&id)
    }

    /// All unfilled, uncancelled limit orders on a market, in a stable
    /// order (by order id, which is time-ordered).
    #[must_use]
    pub fn open_orders(&self, market_id: MarketId) -> Vec<&LimitOrder> {
        let mut orders: Vec<&LimitOrder> = self
            .orders
            .values()
            .filter(|o| o.market_id == market_id && o.is_open())
            .collect();
        orders.sort_by_key(|o| o.id);
        orders
    }

    /// Position metrics for one user on one market (all answer rows).
    #[must_use]
    pub fn user_metrics(&self, user_id: UserId, market_id: MarketId) -> Vec<&PositionMetric> {
        let mut metrics: Vec<&PositionMetric> = self
            .metrics
            .values()
            .filter(|m| m.user_id == user_id && m.market_id == market_id)
            .collect();
        metrics.sort_by_key(|m| m.key());
        metrics
    }

    #[must_use]
    pub fn is_trading_enabled(&self, token: Token) -> bool {
        !self.trading_disabled.get(&token).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn bets(&self) -> &[CandidateBet] {
        &self.bets
    }

    #[must_use]
    pub fn txns(&self) -> &[Txn] {
        &self.txns
    }

    // -- crate-internal mutation (called only from a committing tx) --------

    pub(crate) fn users_mut(&mut self) -> &mut HashMap<UserId, User> {
        &mut self.users
    }

    pub(crate) fn orders_mut(&mut self) -> &mut HashMap<BetId, LimitOrder> {
        &mut self.orders
    }

    pub(crate) fn metrics_mut(
        &mut self,
    ) -> &mut HashMap<(UserId, Option<AnswerId>, MarketId), PositionMetric> {
        &mut self.metrics
    }

    pub(crate) fn push_txn(&mut self, txn: Txn) {
        self.txns.push(txn);
    }

    pub(crate) fn push_bet(&mut self, bet: CandidateBet) {
        self.bets.push(bet);
    }
}
