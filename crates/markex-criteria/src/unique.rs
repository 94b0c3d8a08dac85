//! Policy for one-of-a-kind assets.

use markex_types::{AssetClass, CriteriaId, MatchTerms, Order, Result, constants};

use crate::policy::{MatchingPolicy, cannot_match, maker_price};

/// Matches a single unique asset: both orders name the same asset id and
/// an amount of exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueAssetCriteria {
    id: CriteriaId,
}

impl UniqueAssetCriteria {
    #[must_use]
    pub fn new(id: CriteriaId) -> Self {
        Self { id }
    }
}

impl MatchingPolicy for UniqueAssetCriteria {
    fn id(&self) -> CriteriaId {
        self.id
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Unique
    }

    fn match_orders(&self, sell: &Order, buy: &Order) -> Result<MatchTerms> {
        if sell.asset_id != buy.asset_id {
            return Err(cannot_match(format!(
                "asset {} != {}",
                sell.asset_id, buy.asset_id
            )));
        }
        if sell.amount != constants::UNIQUE_ASSET_AMOUNT
            || buy.amount != constants::UNIQUE_ASSET_AMOUNT
        {
            return Err(cannot_match(format!(
                "unique asset amounts must be 1, got {} and {}",
                sell.amount, buy.amount
            )));
        }
        let (maker, price) = maker_price(sell, buy)?;
        Ok(MatchTerms {
            price,
            asset_id: sell.asset_id,
            amount: constants::UNIQUE_ASSET_AMOUNT,
            maker,
        })
    }
}

#[cfg(test)]
mod tests {
    use markex_types::{Address, AssetId, MarkexError, OrderSide};
    use rust_decimal::Decimal;

    use super::*;

    const CRITERIA: Address = Address([0xCC; 32]);

    fn pair() -> (Order, Order) {
        let sell = Order::dummy(Address([1; 32]), OrderSide::Sell, CRITERIA);
        let mut buy = Order::dummy(Address([2; 32]), OrderSide::Buy, CRITERIA);
        buy.listing_time = sell.listing_time;
        (sell, buy)
    }

    #[test]
    fn matching_pair_yields_sell_terms() {
        let (sell, buy) = pair();
        let terms = UniqueAssetCriteria::new(CRITERIA)
            .match_orders(&sell, &buy)
            .unwrap();
        assert_eq!(terms.price, Decimal::ONE);
        assert_eq!(terms.asset_id, AssetId(1));
        assert_eq!(terms.amount, 1);
        assert_eq!(terms.maker, OrderSide::Sell);
    }

    #[test]
    fn different_asset_rejected() {
        let (sell, mut buy) = pair();
        buy.asset_id = AssetId(2);
        assert!(matches!(
            UniqueAssetCriteria::new(CRITERIA).match_orders(&sell, &buy),
            Err(MarkexError::OrderCannotMatch { .. })
        ));
    }

    #[test]
    fn amount_other_than_one_rejected() {
        let (mut sell, mut buy) = pair();
        sell.amount = 2;
        buy.amount = 2;
        assert!(
            UniqueAssetCriteria::new(CRITERIA)
                .match_orders(&sell, &buy)
                .is_err()
        );
    }

    #[test]
    fn reports_unique_class() {
        let policy = UniqueAssetCriteria::new(CRITERIA);
        assert_eq!(policy.asset_class(), AssetClass::Unique);
        assert_eq!(policy.id(), CRITERIA);
    }
}
