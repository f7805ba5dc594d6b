//! # oddsmatch-store
//!
//! In-memory datastore and the settlement **unit-of-work** for OddsMatch.
//!
//! ## Architecture
//!
//! Every settlement round follows one pattern:
//! 1. [`SettlementTx::begin`] takes an exclusive borrow of the [`Store`]
//! 2. The engine reads a consistent snapshot through the transaction
//! 3. Writes are staged as [`WriteOp`]s — never applied directly
//! 4. [`SettlementTx::commit`] dry-run checks every op, then applies all
//!    of them; any check failure applies nothing
//!
//! A component that never received the transaction cannot perform a
//! write, which makes the all-or-nothing contract checkable by the type
//! system.

pub mod statement;
pub mod store;
pub mod tx;

pub use statement::{BulkOrderUpdate, LimitOrderUpdate, WriteOp};
pub use store::Store;
pub use tx::SettlementTx;
