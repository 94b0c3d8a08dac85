//! The matching policy contract and the checks every policy shares.

use markex_types::{AssetClass, CriteriaId, MarkexError, MatchTerms, Order, OrderSide, Result};
use rust_decimal::Decimal;

/// A rule deciding whether a sell order and a buy order match.
///
/// Implementations are pure: the same pair always yields the same result.
pub trait MatchingPolicy: std::fmt::Debug + Send + Sync {
    /// Identity orders reference in `matching_criteria`.
    fn id(&self) -> CriteriaId;

    /// Which transfer primitive settlement uses for matched assets.
    fn asset_class(&self) -> AssetClass;

    /// Agree on the terms of `sell` against `buy`.
    ///
    /// Callers run [`check_pair`] first; policies only check what is
    /// specific to their asset class.
    fn match_orders(&self, sell: &Order, buy: &Order) -> Result<MatchTerms>;
}

/// Preconditions common to every policy.
///
/// # Errors
/// - `InvalidOrderSide` unless `sell` is a sell and `buy` is a buy
/// - `OrderCannotMatch` on differing payment token, collection or criteria
pub fn check_pair(sell: &Order, buy: &Order) -> Result<()> {
    if sell.side != OrderSide::Sell || buy.side != OrderSide::Buy {
        return Err(MarkexError::InvalidOrderSide);
    }
    if sell.payment_token != buy.payment_token {
        return Err(cannot_match(format!(
            "payment token {} != {}",
            sell.payment_token, buy.payment_token
        )));
    }
    if sell.collection != buy.collection {
        return Err(cannot_match(format!(
            "collection {} != {}",
            sell.collection, buy.collection
        )));
    }
    if sell.matching_criteria != buy.matching_criteria {
        return Err(cannot_match(format!(
            "criteria {} != {}",
            sell.matching_criteria, buy.matching_criteria
        )));
    }
    Ok(())
}

/// The maker's side and price, enforcing strict price equality.
///
/// The maker is the order listed first; on a tie the sell order is maker.
///
/// # Errors
/// `OrderCannotMatch` if the two prices differ.
pub fn maker_price(sell: &Order, buy: &Order) -> Result<(OrderSide, Decimal)> {
    let maker = if buy.listing_time < sell.listing_time {
        OrderSide::Buy
    } else {
        OrderSide::Sell
    };
    if sell.price != buy.price {
        return Err(cannot_match(format!(
            "price {} != {}",
            sell.price, buy.price
        )));
    }
    let price = match maker {
        OrderSide::Sell => sell.price,
        OrderSide::Buy => buy.price,
    };
    Ok((maker, price))
}

pub(crate) fn cannot_match(reason: String) -> MarkexError {
    MarkexError::OrderCannotMatch { reason }
}

#[cfg(test)]
mod tests {
    use markex_types::{Address, PaymentToken};

    use super::*;

    const CRITERIA: Address = Address([0xCC; 32]);

    fn pair() -> (Order, Order) {
        let sell = Order::dummy(Address([1; 32]), OrderSide::Sell, CRITERIA);
        let mut buy = sell.clone();
        buy.trader = Address([2; 32]);
        buy.side = OrderSide::Buy;
        (sell, buy)
    }

    #[test]
    fn compatible_pair_passes() {
        let (sell, buy) = pair();
        assert!(check_pair(&sell, &buy).is_ok());
    }

    #[test]
    fn swapped_sides_rejected() {
        let (sell, buy) = pair();
        assert!(matches!(
            check_pair(&buy, &sell),
            Err(MarkexError::InvalidOrderSide)
        ));
        assert!(matches!(
            check_pair(&sell, &sell),
            Err(MarkexError::InvalidOrderSide)
        ));
    }

    #[test]
    fn differing_terms_cannot_match() {
        let (sell, buy) = pair();

        let mut other = buy.clone();
        other.payment_token = PaymentToken::Native;
        assert!(matches!(
            check_pair(&sell, &other),
            Err(MarkexError::OrderCannotMatch { .. })
        ));

        let mut other = buy.clone();
        other.collection = Address([0xDD; 32]);
        assert!(check_pair(&sell, &other).is_err());

        let mut other = buy;
        other.matching_criteria = Address([0xDE; 32]);
        assert!(check_pair(&sell, &other).is_err());
    }

    #[test]
    fn earlier_listing_is_maker() {
        let (sell, mut buy) = pair();
        buy.listing_time = sell.listing_time - chrono::Duration::seconds(1);
        assert_eq!(maker_price(&sell, &buy).unwrap().0, OrderSide::Buy);

        buy.listing_time = sell.listing_time + chrono::Duration::seconds(1);
        assert_eq!(maker_price(&sell, &buy).unwrap().0, OrderSide::Sell);
    }

    #[test]
    fn tie_goes_to_sell() {
        let (sell, buy) = pair();
        assert_eq!(sell.listing_time, buy.listing_time);
        assert_eq!(maker_price(&sell, &buy).unwrap().0, OrderSide::Sell);
    }

    #[test]
    fn price_mismatch_rejected() {
        let (sell, mut buy) = pair();
        buy.price = Decimal::new(2, 0);
        assert!(matches!(
            maker_price(&sell, &buy),
            Err(MarkexError::OrderCannotMatch { .. })
        ));
    }
}
