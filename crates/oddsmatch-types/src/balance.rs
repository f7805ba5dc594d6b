//! Balance deltas and the shared per-user combiner.
//!
//! Maker spend (negative) and redemption proceeds (positive) are expressed
//! as [`BalanceUpdate`]s and summed per user before being applied, so one
//! user touched by both ends up with a single net delta.

use serde::{Deserialize, Serialize};

use crate::{Token, UserId};

/// One signed balance change for a user in one collateral token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub user_id: UserId,
    pub token: Token,
    pub balance_delta: f64,
    /// Credited to `total_deposits` as well (bonus payouts count as deposits).
    pub deposit_delta: f64,
}

impl BalanceUpdate {
    #[must_use]
    pub fn spend(user_id: UserId, token: Token, amount: f64) -> Self {
        Self {
            user_id,
            token,
            balance_delta: -amount,
            deposit_delta: 0.0,
        }
    }

    #[must_use]
    pub fn credit(user_id: UserId, token: Token, amount: f64) -> Self {
        Self {
            user_id,
            token,
            balance_delta: amount,
            deposit_delta: 0.0,
        }
    }
}

/// Sum updates per (user, token). Output order follows first occurrence of
/// each key, so merging is deterministic for a deterministic input order.
#[must_use]
pub fn merge_balance_updates(updates: Vec<BalanceUpdate>) -> Vec<BalanceUpdate> {
    let mut order: Vec<(UserId, Token)> = Vec::new();
    let mut merged: std::collections::HashMap<(UserId, Token), BalanceUpdate> =
        std::collections::HashMap::new();
    for update in updates {
        let key = (update.user_id, update.token);
        if let Some(existing) = merged.get_mut(&key) {
            existing.balance_delta += update.balance_delta;
            existing.deposit_delta += update.deposit_delta;
        } else {
            order.push(key);
            merged.insert(key, update);
        }
    }
    order.into_iter().map(|key| merged[&key]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_per_user() {
        let user = UserId::new();
        let other = UserId::new();
        let merged = merge_balance_updates(vec![
            BalanceUpdate::spend(user, Token::Mana, 30.0),
            BalanceUpdate::credit(user, Token::Mana, 12.0),
            BalanceUpdate::spend(other, Token::Mana, 5.0),
        ]);
        assert_eq!(merged.len(), 2);
        let mine = merged.iter().find(|u| u.user_id == user).unwrap();
        assert!((mine.balance_delta - -18.0).abs() < 1e-12);
    }

    #[test]
    fn tokens_do_not_merge_across() {
        let user = UserId::new();
        let merged = merge_balance_updates(vec![
            BalanceUpdate::spend(user, Token::Mana, 10.0),
            BalanceUpdate::spend(user, Token::Cash, 10.0),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_preserves_first_occurrence_order() {
        let a = UserId::new();
        let b = UserId::new();
        let merged = merge_balance_updates(vec![
            BalanceUpdate::spend(b, Token::Mana, 1.0),
            BalanceUpdate::spend(a, Token::Mana, 1.0),
            BalanceUpdate::spend(b, Token::Mana, 1.0),
        ]);
        assert_eq!(merged[0].user_id, b);
        assert_eq!(merged[1].user_id, a);
    }
}
