//! Environment-specific trading policy: account allow/deny lists and the
//! deployment flag. Passed by reference into the snapshot loader and the
//! bonus engine rather than read from globals.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Account lists and deployment flags that gate trading and bonuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradingPolicy {
    /// Users barred from trading entirely.
    pub banned_user_ids: HashSet<UserId>,
    /// Known non-human accounts; their trades never earn creator bonuses.
    pub bot_usernames: HashSet<String>,
    /// Creators on the enhanced partner payout program.
    pub partner_user_ids: HashSet<UserId>,
    /// Institutional accounts exempt from sweepstakes verification.
    pub institutional_partner_user_ids: HashSet<UserId>,
    /// Administrator accounts, barred from cash markets in prod.
    pub admin_user_ids: HashSet<UserId>,
    /// Whether this is a live deployment.
    pub is_prod: bool,
}

impl TradingPolicy {
    #[must_use]
    pub fn is_banned(&self, user_id: UserId) -> bool {
        self.banned_user_ids.contains(&user_id)
    }

    #[must_use]
    pub fn is_bot(&self, username: &str) -> bool {
        self.bot_usernames.contains(username)
    }

    #[must_use]
    pub fn is_partner(&self, user_id: UserId) -> bool {
        self.partner_user_ids.contains(&user_id)
    }

    #[must_use]
    pub fn is_institutional_partner(&self, user_id: UserId) -> bool {
        self.institutional_partner_user_ids.contains(&user_id)
    }

    #[must_use]
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_user_ids.contains(&user_id)
    }
}
