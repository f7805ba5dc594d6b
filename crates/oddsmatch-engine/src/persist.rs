//! Persistence building: compiles per-order updates into one bulk
//! statement against the resting-order store.

use oddsmatch_store::{BulkOrderUpdate, LimitOrderUpdate};
use oddsmatch_types::{BetId, LimitOrder};

/// Build the single bulk update for a settlement round. An empty round
/// yields the syntactically valid no-op statement, never an empty batch.
#[must_use]
pub fn build_order_update(updates: Vec<LimitOrderUpdate>) -> BulkOrderUpdate {
    if updates.is_empty() {
        BulkOrderUpdate::noop()
    } else {
        BulkOrderUpdate { updates }
    }
}

/// The ids to cancel for resting orders the pricing step wants gone.
#[must_use]
pub fn cancellation_ids(orders: &[LimitOrder]) -> Vec<BetId> {
    orders.iter().map(|o| o.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use oddsmatch_types::{MarketId, Outcome, UserId};

    #[test]
    fn empty_round_is_noop_statement() {
        let statement = build_order_update(Vec::new());
        assert!(statement.is_noop());
    }

    #[test]
    fn updates_pass_through() {
        let update = LimitOrderUpdate {
            id: BetId::new(),
            fills: Vec::new(),
            is_filled: true,
            amount: 10.0,
            shares: 18.0,
        };
        let statement = build_order_update(vec![update.clone()]);
        assert!(!statement.is_noop());
        assert_eq!(statement.updates.len(), 1);
        assert_eq!(statement.updates[0].id, update.id);
    }

    #[test]
    fn cancellation_ids_extracted() {
        let a = LimitOrder::dummy(UserId::new(), MarketId::new(), Outcome::Yes, 10.0);
        let b = LimitOrder::dummy(UserId::new(), MarketId::new(), Outcome::No, 10.0);
        let ids = cancellation_ids(&[a.clone(), b.clone()]);
        assert_eq!(ids, vec![a.id, b.id]);
    }
}
