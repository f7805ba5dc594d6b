//! The settlement unit-of-work.
//!
//! A [`SettlementTx`] borrows the store exclusively for the duration of
//! one settlement round: reads see a consistent view (nothing else can
//! mutate while the borrow lives, which is the "at most one concurrently
//! committing settlement per market" guarantee the engine assumes), and
//! writes are staged as [`WriteOp`]s. `commit` first dry-run checks every
//! op and only then applies them, so a failing round leaves no partial
//! state. Dropping the transaction without committing discards all ops.

use std::collections::HashMap;

use tracing::debug;

use oddsmatch_types::{
    BalanceUpdate, BetId, CandidateBet, LedgerStatement, LimitOrder, Market, MarketId,
    OddsmatchError, PositionMetric, Result, Token, Txn, User, UserId, math::FILL_EPSILON,
};

use crate::statement::{BulkOrderUpdate, WriteOp};
use crate::store::Store;

/// Exclusive unit-of-work over the store for one settlement round.
pub struct SettlementTx<'a> {
    store: &'a mut Store,
    ops: Vec<WriteOp>,
}

impl<'a> SettlementTx<'a> {
    #[must_use]
    pub fn begin(store: &'a mut Store) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }

    // -- consistent reads --------------------------------------------------

    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.store.user(id)
    }

    #[must_use]
    pub fn market(&self, id: MarketId) -> Option<&Market> {
        self.store.market(id)
    }

    #[must_use]
    pub fn order(&self, id: BetId) -> Option<&LimitOrder> {
        self.store.order(id)
    }

    #[must_use]
    pub fn open_orders(&self, market_id: MarketId) -> Vec<&LimitOrder> {
        self.store.open_orders(market_id)
    }

    #[must_use]
    pub fn user_metrics(&self, user_id: UserId, market_id: MarketId) -> Vec<&PositionMetric> {
        self.store.user_metrics(user_id, market_id)
    }

    #[must_use]
    pub fn is_trading_enabled(&self, token: Token) -> bool {
        self.store.is_trading_enabled(token)
    }

    // -- staged writes -----------------------------------------------------

    pub fn update_orders(&mut self, statement: BulkOrderUpdate) {
        // A no-op statement is still staged: executing it zero or many
        // times within the transaction is safe.
        self.ops.push(WriteOp::UpdateOrders(statement));
    }

    pub fn cancel_orders(&mut self, ids: Vec<BetId>) {
        if !ids.is_empty() {
            self.ops.push(WriteOp::CancelOrders(ids));
        }
    }

    pub fn apply_balances(&mut self, updates: Vec<BalanceUpdate>) {
        if !updates.is_empty() {
            self.ops.push(WriteOp::ApplyBalances(updates));
        }
    }

    /// The ledger-insert primitive: appends one immutable entry.
    pub fn insert_ledger(&mut self, statement: LedgerStatement) {
        if let LedgerStatement::Insert(txn) = statement {
            self.ops.push(WriteOp::InsertTxn(txn));
        }
    }

    pub fn upsert_metrics(&mut self, metrics: Vec<PositionMetric>) {
        if !metrics.is_empty() {
            self.ops.push(WriteOp::UpsertMetrics(metrics));
        }
    }

    pub fn insert_bet(&mut self, bet: CandidateBet) {
        self.ops.push(WriteOp::InsertBet(bet));
    }

    #[must_use]
    pub fn staged_op_count(&self) -> usize {
        self.ops.len()
    }

    // -- commit ------------------------------------------------------------

    /// Atomically apply every staged op.
    ///
    /// # Errors
    /// - `OrderNotFound` if an update or cancellation references a missing order
    /// - `UserNotFound` if a balance delta references a missing user
    /// - `BalanceUnderflow` if the net effect would drive a balance negative
    ///
    /// On error, nothing is applied.
    pub fn commit(self) -> Result<()> {
        self.check()?;
        debug!(ops = self.ops.len(), "committing settlement transaction");
        let Self { store, ops } = self;
        for op in ops {
            apply_op(store, op);
        }
        Ok(())
    }

    /// Discard all staged ops without applying them.
    pub fn rollback(self) {
        debug!(ops = self.ops.len(), "rolling back settlement transaction");
    }

    fn check(&self) -> Result<()> {
        // Project net balances across every staged op so an underflow is
        // caught even when it only emerges from the combination.
        let mut projected: HashMap<(UserId, Token), f64> = HashMap::new();

        for op in &self.ops {
            match op {
                WriteOp::UpdateOrders(statement) => {
                    for update in &statement.updates {
                        if self.store.order(update.id).is_none() {
                            return Err(OddsmatchError::OrderNotFound(update.id));
                        }
                    }
                }
                WriteOp::CancelOrders(ids) => {
                    for id in ids {
                        if self.store.order(*id).is_none() {
                            return Err(OddsmatchError::OrderNotFound(*id));
                        }
                    }
                }
                WriteOp::ApplyBalances(updates) => {
                    for update in updates {
                        let user = self
                            .store
                            .user(update.user_id)
                            .ok_or(OddsmatchError::UserNotFound(update.user_id))?;
                        let balance = projected
                            .entry((update.user_id, update.token))
                            .or_insert_with(|| user.token_balance(update.token));
                        *balance += update.balance_delta;
                        if *balance < -FILL_EPSILON {
                            return Err(OddsmatchError::BalanceUnderflow {
                                user_id: update.user_id,
                            });
                        }
                    }
                }
                WriteOp::InsertTxn(_) | WriteOp::UpsertMetrics(_) | WriteOp::InsertBet(_) => {}
            }
        }
        Ok(())
    }
}

fn apply_op(store: &mut Store, op: WriteOp) {
    match op {
        WriteOp::UpdateOrders(statement) => {
            for update in statement.updates {
                // Checked above; merge only the four fill fields.
                if let Some(order) = store.orders_mut().get_mut(&update.id) {
                    order.fills = update.fills;
                    order.is_filled = update.is_filled;
                    order.amount = update.amount;
                    order.shares = update.shares;
                }
            }
        }
        WriteOp::CancelOrders(ids) => {
            for id in ids {
                if let Some(order) = store.orders_mut().get_mut(&id) {
                    order.is_cancelled = true;
                }
            }
        }
        WriteOp::ApplyBalances(updates) => {
            for update in updates {
                if let Some(user) = store.users_mut().get_mut(&update.user_id) {
                    match update.token {
                        Token::Mana => user.balance += update.balance_delta,
                        Token::Cash => user.cash_balance += update.balance_delta,
                    }
                    user.total_deposits += update.deposit_delta;
                }
            }
        }
        WriteOp::InsertTxn(txn) => store.push_txn(txn),
        WriteOp::UpsertMetrics(metrics) => {
            for metric in metrics {
                store.metrics_mut().insert(metric.key(), metric);
            }
        }
        WriteOp::InsertBet(bet) => store.push_bet(bet),
    }
}
