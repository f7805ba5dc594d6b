//! The share-redemption collaborator interface.
//!
//! After a round's fills are applied, makers may hold offsetting YES and
//! NO positions that can be netted back into free collateral without a
//! counterparty. That netting is performed by an external collaborator;
//! the engine only defines its contract and folds its outputs into the
//! round result.

use oddsmatch_store::SettlementTx;
use oddsmatch_types::{
    BalanceUpdate, Market, PositionMetric, Result, SyntheticBet, UserId,
};

/// What the redemption collaborator hands back: redemption bets to append,
/// the position summaries after netting, and the collateral returned.
#[derive(Debug, Clone, Default)]
pub struct Redemption {
    pub bets_to_insert: Vec<SyntheticBet>,
    pub updated_metrics: Vec<PositionMetric>,
    pub balance_updates: Vec<BalanceUpdate>,
}

/// Nets offsetting opposite-outcome positions held by this round's makers
/// back into free collateral.
///
/// Called with the *post-fill* state; errors propagate unchanged and abort
/// the enclosing transaction.
pub trait ShareRedeemer {
    fn redeem(
        &self,
        tx: &mut SettlementTx<'_>,
        maker_ids: &[UserId],
        market: &Market,
        new_bets: &[SyntheticBet],
        metrics: &[PositionMetric],
    ) -> Result<Redemption>;
}

/// A redeemer that nets nothing — passes the metrics through untouched.
pub struct NoopRedeemer;

impl ShareRedeemer for NoopRedeemer {
    fn redeem(
        &self,
        _tx: &mut SettlementTx<'_>,
        _maker_ids: &[UserId],
        _market: &Market,
        _new_bets: &[SyntheticBet],
        metrics: &[PositionMetric],
    ) -> Result<Redemption> {
        Ok(Redemption {
            bets_to_insert: Vec::new(),
            updated_metrics: metrics.to_vec(),
            balance_updates: Vec::new(),
        })
    }
}
