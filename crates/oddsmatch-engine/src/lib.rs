//! # oddsmatch-engine
//!
//! **Settlement engine for OddsMatch.**
//!
//! The engine takes a validated bet request, the snapshot of everything it
//! can touch, and a pricing step's proposed fills, and turns them into one
//! atomic set of staged writes. It provides:
//!
//! - **Snapshot loading**: one consistent read of user, market, opposing
//!   orders, balances, and positions, with the full gate sequence applied
//! - **Fill aggregation**: per-order maker updates, synthetic maker bets,
//!   share redemption, and merged balance deltas
//! - **Bonus evaluation**: the unique-bettor incentive with its withhold
//!   rules
//! - **Quantization**: limit probabilities snapped to whole percentage
//!   points

pub mod aggregate;
pub mod bonus;
pub mod makers;
pub mod persist;
pub mod quantize;
pub mod redemption;
pub mod snapshot;

pub use aggregate::{FillRound, fold_bets_into_metrics, update_makers};
pub use bonus::{BonusOutcome, unique_bettor_bonus};
pub use makers::maker_ids_from_result;
pub use persist::{build_order_update, cancellation_ids};
pub use quantize::round_limit_prob;
pub use redemption::{NoopRedeemer, Redemption, ShareRedeemer};
pub use snapshot::{BetRequest, BetSnapshot, UnfilledOrder, load_snapshot, verify_proposed_fills};
