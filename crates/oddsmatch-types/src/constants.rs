//! System-wide constants for the OddsMatch settlement engine.

/// Tick size for limit prices: one whole percentage point.
pub const LIMIT_PROB_TICK: f64 = 0.01;

/// Bonus paid to the market creator for a user's first trade on a
/// single-outcome market.
pub const UNIQUE_BETTOR_BONUS: f64 = 5.0;

/// Bonus paid to the answer creator for a user's first trade on an answer
/// of a sum-to-one multi-outcome market.
pub const UNIQUE_ANSWER_BETTOR_BONUS: f64 = 2.0;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OddsMatch";
