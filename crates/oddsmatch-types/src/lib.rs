//! # oddsmatch-types
//!
//! Shared types, errors, and policy for the **OddsMatch** bet-matching and
//! settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`MarketId`], [`AnswerId`], [`BetId`], [`TxnId`]
//! - **Accounts**: [`User`], [`Token`]
//! - **Market model**: [`Market`], [`Mechanism`], [`OutcomeType`], [`Visibility`], [`Answer`], [`Outcome`]
//! - **Order model**: [`LimitOrder`], [`Fill`], [`MakerFill`]
//! - **Bet model**: [`CandidateBet`], [`SyntheticBet`], [`NewBetResult`], [`OtherAnswerResult`]
//! - **Positions**: [`PositionMetric`]
//! - **Ledger**: [`Txn`], [`LedgerStatement`], [`BonusData`]
//! - **Balances**: [`BalanceUpdate`], [`merge_balance_updates`]
//! - **Policy**: [`TradingPolicy`]
//! - **Errors**: [`OddsmatchError`] with `ODDS_ERR_` prefix codes
//! - **Float tolerance**: [`floating_equal`] shared by all components
//! - **Constants**: tick size and bonus amounts

pub mod balance;
pub mod bet;
pub mod constants;
pub mod error;
pub mod ids;
pub mod market;
pub mod math;
pub mod metric;
pub mod order;
pub mod policy;
pub mod txn;
pub mod user;

// Re-export all primary types at crate root for ergonomic imports:
//   use oddsmatch_types::{Market, LimitOrder, OddsmatchError, ...};

pub use balance::*;
pub use bet::*;
pub use error::*;
pub use ids::*;
pub use market::*;
pub use math::*;
pub use metric::*;
pub use order::*;
pub use policy::*;
pub use txn::*;
pub use user::*;

// Constants are accessed via `oddsmatch_types::constants::FOO`.
