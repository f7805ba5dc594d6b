//! Unique-bettor bonus: a one-time incentive credited to the market (or
//! answer) creator when a new user trades for the first time.

use chrono::Utc;
use tracing::debug;

use oddsmatch_types::{
    AccountType, BalanceUpdate, BonusData, CandidateBet, LedgerStatement, Market, Token,
    TradingPolicy, Txn, TxnCategory, TxnId, User,
    constants::{UNIQUE_ANSWER_BETTOR_BONUS, UNIQUE_BETTOR_BONUS},
};

/// A bonus decision: either a payout (balance update plus exactly one
/// ledger insertion) or the explicit no-op pair.
#[derive(Debug, Clone)]
pub struct BonusOutcome {
    pub balance_update: Option<BalanceUpdate>,
    pub ledger: LedgerStatement,
}

impl BonusOutcome {
    #[must_use]
    pub fn withheld() -> Self {
        Self {
            balance_update: None,
            ledger: LedgerStatement::Noop,
        }
    }

    #[must_use]
    pub fn is_withheld(&self) -> bool {
        self.balance_update.is_none() && self.ledger.is_noop()
    }
}

/// Evaluate bonus eligibility for the trade about to be recorded.
///
/// The bonus is withheld when the bettor created the answer/market, is a
/// known bot, the market is unlisted, the trade is a redemption, it is a
/// limit order that received zero fills, or it came through the API.
/// The payee is the answer's creator when the bet targets an answer, else
/// the market's creator; the partner flag requires the two to be the same
/// identity and on the partner list.
#[must_use]
pub fn unique_bettor_bonus(
    policy: &TradingPolicy,
    market: &Market,
    bettor: &User,
    bet: &CandidateBet,
) -> BonusOutcome {
    let answer = bet.answer_id.and_then(|id| market.answer(id));
    let payee_id = answer.map_or(market.creator_id, |a| a.creator_id);

    let is_creator = bettor.id == payee_id;
    let is_bot = policy.is_bot(&bettor.username);
    let is_unlisted = market.visibility == oddsmatch_types::Visibility::Unlisted;

    if is_creator
        || is_bot
        || is_unlisted
        || bet.is_redemption
        || bet.is_unfilled_limit_order()
        || bet.is_api
    {
        return BonusOutcome::withheld();
    }

    let amount = if market.mechanism.is_sum_to_one_multi() {
        UNIQUE_ANSWER_BETTOR_BONUS
    } else {
        UNIQUE_BETTOR_BONUS
    };

    // The enhanced partner rate requires the market creator to also be the
    // answer creator.
    let is_partner = policy.is_partner(market.creator_id) && payee_id == market.creator_id;

    let txn = Txn {
        id: TxnId::new(),
        from_type: AccountType::Bank,
        from_id: None,
        to_type: AccountType::User,
        to_id: payee_id,
        amount,
        token: Token::Mana,
        category: TxnCategory::UniqueBettorBonus,
        data: BonusData {
            market_id: market.id,
            unique_new_bettor_id: bettor.id,
            answer_id: bet.answer_id,
            is_partner,
        },
        created_time: Utc::now(),
    };
    debug!(payee = %payee_id, amount, is_partner, "unique bettor bonus constructed");

    BonusOutcome {
        balance_update: Some(BalanceUpdate {
            user_id: payee_id,
            token: Token::Mana,
            balance_delta: amount,
            deposit_delta: amount,
        }),
        ledger: LedgerStatement::Insert(txn),
    }
}
