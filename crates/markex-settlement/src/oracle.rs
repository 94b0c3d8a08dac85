//! Optional price check consulted after matching.
//!
//! With no oracle installed the check is skipped.

use markex_types::{CollectionId, MatchTerms, PaymentToken, Result};

/// External price sanity check on matched terms.
///
/// `window` is the exchange's configured staleness window; how it is
/// interpreted (blocks, seconds) is up to the oracle.
pub trait PriceOracle: std::fmt::Debug + Send + Sync {
    /// Accept or reject `terms`. Any error aborts the settlement and is
    /// reported as `PriceStale`.
    fn check(
        &self,
        terms: &MatchTerms,
        collection: CollectionId,
        payment_token: PaymentToken,
        window: u64,
    ) -> Result<()>;
}
