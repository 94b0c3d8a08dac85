//! Policy for semi-fungible assets held as per-id balances.
//!
//! Orders fill completely or not at all: both sides must name the same
//! non-zero amount.

use markex_types::{AssetClass, CriteriaId, MatchTerms, Order, Result};

use crate::policy::{MatchingPolicy, cannot_match, maker_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisibleAssetCriteria {
    id: CriteriaId,
}

impl DivisibleAssetCriteria {
    #[must_use]
    pub fn new(id: CriteriaId) -> Self {
        Self { id }
    }
}

impl MatchingPolicy for DivisibleAssetCriteria {
    fn id(&self) -> CriteriaId {
        self.id
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Divisible
    }

    fn match_orders(&self, sell: &Order, buy: &Order) -> Result<MatchTerms> {
        if sell.asset_id != buy.asset_id {
            return Err(cannot_match(format!(
                "asset {} != {}",
                sell.asset_id, buy.asset_id
            )));
        }
        if sell.amount == 0 {
            return Err(cannot_match("amount must be non-zero".to_string()));
        }
        // No partial fills.
        if sell.amount != buy.amount {
            return Err(cannot_match(format!(
                "amount {} != {}",
                sell.amount, buy.amount
            )));
        }
        let (maker, price) = maker_price(sell, buy)?;
        Ok(MatchTerms {
            price,
            asset_id: sell.asset_id,
            amount: sell.amount,
            maker,
        })
    }
}
