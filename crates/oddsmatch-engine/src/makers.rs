//! Maker-id extraction: every counterparty a settlement round touched.

use oddsmatch_types::{NewBetResult, UserId};

/// Collect the distinct ids of every user whose resting order was filled
/// or cancelled by this bet, across the primary result and all
/// per-other-answer results. First occurrence wins the ordering.
#[must_use]
pub fn maker_ids_from_result(result: &NewBetResult) -> Vec<UserId> {
    let mut ids = Vec::new();
    let mut push = |id: UserId, ids: &mut Vec<UserId>| {
        if !ids.contains(&id) {
            ids.push(id);
        }
    };

    for maker in &result.makers {
        push(maker.order.user_id, &mut ids);
    }
    for other in &result.other_results {
        for maker in &other.makers {
            push(maker.order.user_id, &mut ids);
        }
    }
    for order in &result.orders_to_cancel {
        push(order.user_id, &mut ids);
    }
    for other in &result.other_results {
        for order in &other.orders_to_cancel {
            push(order.user_id, &mut ids);
        }
    }
    ids
}
