//! Markets (contracts) and their outcome slots (answers).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnswerId, MarketId, Token, UserId};

/// How market prices are formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mechanism {
    /// Single-outcome automated market maker.
    Binary,
    /// Multi-outcome market; when `sums_to_one`, answer probabilities are
    /// constrained to sum to one, so YES on one answer is economically
    /// equivalent to NO on every other answer.
    Multi { sums_to_one: bool },
    /// Non-tradeable mechanism (polls, bounties, etc.).
    None,
}

impl Mechanism {
    /// Whether this mechanism has a tradeable side at all.
    #[must_use]
    pub fn is_tradeable(&self) -> bool {
        !matches!(self, Self::None)
    }

    #[must_use]
    pub fn is_sum_to_one_multi(&self) -> bool {
        matches!(self, Self::Multi { sums_to_one: true })
    }
}

/// Product flavor of the market, independent of its pricing mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeType {
    Binary,
    MultipleChoice,
    PseudoNumeric,
    /// Stock-like perpetual market; restricted for non-interactive callers.
    Stonk,
}

/// Whether the market shows up in discovery surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Unlisted,
}

/// The side of an outcome a bet is taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// One outcome slot of a multi-outcome market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub market_id: MarketId,
    /// The user who added this answer; receives first-trade bonuses.
    pub creator_id: UserId,
    pub text: String,
    /// Set once the answer resolves; resolved answers cannot be traded.
    pub resolution: Option<String>,
}

impl Answer {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }
}

/// A market (contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub creator_id: UserId,
    pub token: Token,
    pub mechanism: Mechanism,
    pub outcome_type: OutcomeType,
    pub visibility: Visibility,
    pub close_time: Option<DateTime<Utc>>,
    pub is_resolved: bool,
    /// Outcome slots; empty for single-outcome markets.
    pub answers: Vec<Answer>,
}

impl Market {
    /// Whether the market is past its close time as of `now`.
    #[must_use]
    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.close_time.is_some_and(|t| now > t)
    }

    #[must_use]
    pub fn answer(&self, id: AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == id)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Market {
    pub fn dummy_binary(creator_id: UserId) -> Self {
        Self {
            id: MarketId::new(),
            creator_id,
            token: Token::Mana,
            mechanism: Mechanism::Binary,
            outcome_type: OutcomeType::Binary,
            visibility: Visibility::Public,
            close_time: None,
            is_resolved: false,
            answers: Vec::new(),
        }
    }

    pub fn dummy_multi(creator_id: UserId, sums_to_one: bool, n_answers: usize) -> Self {
        let id = MarketId::new();
        let answers = (0..n_answers)
            .map(|i| Answer {
                id: AnswerId::new(),
                market_id: id,
                creator_id,
                text: format!("Answer {i}"),
                resolution: None,
            })
            .collect();
        Self {
            id,
            creator_id,
            token: Token::Mana,
            mechanism: Mechanism::Multi { sums_to_one },
            outcome_type: OutcomeType::MultipleChoice,
            visibility: Visibility::Public,
            close_time: None,
            is_resolved: false,
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mechanism_tradeability() {
        assert!(Mechanism::Binary.is_tradeable());
        assert!(Mechanism::Multi { sums_to_one: true }.is_tradeable());
        assert!(!Mechanism::None.is_tradeable());
    }

    #[test]
    fn sum_to_one_detection() {
        assert!(Mechanism::Multi { sums_to_one: true }.is_sum_to_one_multi());
        assert!(!Mechanism::Multi { sums_to_one: false }.is_sum_to_one_multi());
        assert!(!Mechanism::Binary.is_sum_to_one_multi());
    }

    #[test]
    fn outcome_opposite() {
        assert_eq!(Outcome::Yes.opposite(), Outcome::No);
        assert_eq!(Outcome::No.opposite(), Outcome::Yes);
    }

    #[test]
    fn close_time_check() {
        let mut market = Market::dummy_binary(UserId::new());
        let now = Utc::now();
        assert!(!market.is_closed(now));
        market.close_time = Some(now - chrono::Duration::hours(1));
        assert!(market.is_closed(now));
        market.close_time = Some(now + chrono::Duration::hours(1));
        assert!(!market.is_closed(now));
    }

    #[test]
    fn answer_lookup() {
        let market = Market::dummy_multi(UserId::new(), true, 3);
        let id = market.answers[1].id;
        assert!(market.answer(id).is_some());
        assert!(market.answer(AnswerId::new()).is_none());
    }
}
