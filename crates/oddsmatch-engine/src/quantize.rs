//! Price quantization for limit orders.
//!
//! Limit prices live on a 0.01 grid (whole percentage points). A price the
//! user supplies must already sit on the grid within tolerance; this
//! module only snaps away float noise, it never rounds a genuinely
//! off-grid price into validity.

use oddsmatch_types::{
    OddsmatchError, Result,
    constants::LIMIT_PROB_TICK,
    math::{TICK_EPSILON, floating_equal_eps},
};

/// Snap an optional limit price to the [`LIMIT_PROB_TICK`] grid.
///
/// # Errors
/// `InvalidLimitProb` if the price is present but not a whole number of
/// ticks within [`TICK_EPSILON`].
pub fn round_limit_prob(limit_prob: Option<f64>) -> Result<Option<f64>> {
    let Some(prob) = limit_prob else {
        return Ok(None);
    };
    let ticks = prob / LIMIT_PROB_TICK;
    if !floating_equal_eps(ticks.round(), ticks, TICK_EPSILON) {
        return Err(OddsmatchError::InvalidLimitProb { prob });
    }
    Ok(Some(ticks.round() * LIMIT_PROB_TICK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_price_passes_through() {
        assert_eq!(round_limit_prob(None).unwrap(), None);
    }

    #[test]
    fn on_grid_prices_accepted() {
        for cents in 1..100 {
            let prob = f64::from(cents) / 100.0;
            let rounded = round_limit_prob(Some(prob)).unwrap().unwrap();
            assert!(
                (rounded * 100.0 - f64::from(cents)).abs() < 1e-9,
                "prob {prob} snapped to {rounded}"
            );
        }
    }

    #[test]
    fn float_noise_is_snapped() {
        // 0.57 is not exactly representable; the tick count carries noise.
        let rounded = round_limit_prob(Some(0.57)).unwrap().unwrap();
        assert_eq!(rounded, 57.0 * LIMIT_PROB_TICK);
    }

    #[test]
    fn tick_constant_defines_the_grid() {
        // One tick in, one tick out, bit-exact.
        assert_eq!(
            round_limit_prob(Some(LIMIT_PROB_TICK)).unwrap(),
            Some(LIMIT_PROB_TICK)
        );
        // Half a tick is off-grid.
        assert!(round_limit_prob(Some(LIMIT_PROB_TICK / 2.0)).is_err());
    }

    #[test]
    fn off_grid_price_rejected() {
        let err = round_limit_prob(Some(0.575)).unwrap_err();
        assert!(matches!(err, OddsmatchError::InvalidLimitProb { .. }));
        assert!(round_limit_prob(Some(0.001)).is_err());
        assert!(round_limit_prob(Some(0.123)).is_err());
    }

    #[test]
    fn boundary_prices() {
        assert_eq!(round_limit_prob(Some(0.0)).unwrap(), Some(0.0));
        assert_eq!(round_limit_prob(Some(1.0)).unwrap(), Some(1.0));
    }
}
