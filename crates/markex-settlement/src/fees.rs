//! Fee arithmetic.
//!
//! Every fee term is `price * rate / 10000`, truncated toward zero at
//! [`PAYMENT_PRECISION`](constants::PAYMENT_PRECISION) decimal places.
//! The seller receives the exact remainder, so
//! `seller_proceeds + platform + Σ order_fees == price` always holds.
//!
//! Sell-order fees and the platform fee come out of the price. Buy-order
//! fees are charged to the buyer on top of the price.
//!
//! All arithmetic is checked. A sum that does not fit a `Decimal` is an
//! `InvalidOrderParam` error, never a panic.

use markex_types::{Address, Fee, FeePayout, MarkexError, Order, Result, checked_total, constants};
use rust_decimal::{Decimal, RoundingStrategy};

/// `price * rate / 10000`, truncated.
///
/// The rate is scaled to a fraction first so the product never exceeds
/// the price.
///
/// # Errors
/// `InvalidOrderParam` if the term does not fit a `Decimal`.
pub fn fee_amount(price: Decimal, rate: u16) -> Result<Decimal> {
    Decimal::from(rate)
        .checked_div(Decimal::from(constants::INVERSE_BASIS_POINT))
        .and_then(|share| price.checked_mul(share))
        .map(|fee| {
            fee.round_dp_with_strategy(constants::PAYMENT_PRECISION, RoundingStrategy::ToZero)
        })
        .ok_or_else(|| overflow(price))
}

pub(crate) fn overflow(price: Decimal) -> MarkexError {
    MarkexError::InvalidOrderParam {
        reason: format!("fee arithmetic overflows at price {price}"),
    }
}

/// Reject pairs whose fee rates would take more than the whole price.
///
/// # Errors
/// `FeeRateExceeded` if `platform_rate + Σ sell fees > 10000` or
/// `Σ buy fees > 10000`.
pub fn check_rates(platform_rate: u16, sell: &Order, buy: &Order) -> Result<()> {
    let limit = u32::from(constants::INVERSE_BASIS_POINT);
    let seller_side = u32::from(platform_rate) + sell.total_fee_bps();
    if seller_side > limit {
        return Err(MarkexError::FeeRateExceeded {
            total_bps: seller_side,
        });
    }
    let buyer_side = buy.total_fee_bps();
    if buyer_side > limit {
        return Err(MarkexError::FeeRateExceeded {
            total_bps: buyer_side,
        });
    }
    Ok(())
}

/// How one settlement price is divided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSplit {
    pub platform: FeePayout,
    pub order_fees: Vec<FeePayout>,
    pub buyer_fees: Vec<FeePayout>,
    pub seller_proceeds: Decimal,
}

impl FeeSplit {
    /// Split `price` given rates already checked by [`check_rates`].
    ///
    /// # Errors
    /// `InvalidOrderParam` on arithmetic overflow.
    pub fn compute(
        price: Decimal,
        platform_rate: u16,
        platform_recipient: Address,
        sell_fees: &[Fee],
        buy_fees: &[Fee],
    ) -> Result<Self> {
        let platform = payout(price, platform_rate, platform_recipient)?;
        let order_fees = sell_fees
            .iter()
            .map(|fee| payout(price, fee.rate, fee.recipient))
            .collect::<Result<Vec<_>>>()?;
        let buyer_fees = buy_fees
            .iter()
            .map(|fee| payout(price, fee.rate, fee.recipient))
            .collect::<Result<Vec<_>>>()?;
        let deducted =
            checked_total(platform.amount, &order_fees).ok_or_else(|| overflow(price))?;
        let seller_proceeds = price.checked_sub(deducted).ok_or_else(|| overflow(price))?;
        Ok(Self {
            platform,
            order_fees,
            buyer_fees,
            seller_proceeds,
        })
    }

    /// Total charged to the buyer for `price`.
    ///
    /// # Errors
    /// `InvalidOrderParam` if price plus buyer fees overflows.
    pub fn buyer_outlay(&self, price: Decimal) -> Result<Decimal> {
        checked_total(price, &self.buyer_fees).ok_or_else(|| overflow(price))
    }

    /// Every non-zero payment leg as `(recipient, amount)`, seller last.
    #[must_use]
    pub fn legs(&self, seller: Address) -> Vec<(Address, Decimal)> {
        std::iter::once(&self.platform)
            .chain(&self.order_fees)
            .chain(&self.buyer_fees)
            .map(|p| (p.recipient, p.amount))
            .chain(std::iter::once((seller, self.seller_proceeds)))
            .filter(|(_, amount)| !amount.is_zero())
            .collect()
    }
}

fn payout(price: Decimal, rate: u16, recipient: Address) -> Result<FeePayout> {
    Ok(FeePayout {
        recipient,
        rate,
        amount: fee_amount(price, rate)?,
    })
}

#[cfg(test)]
mod tests {
    use markex_types::OrderSide;

    use super::*;

    const PLATFORM: Address = Address([0xF0; 32]);
    const RECIPIENT: Address = Address([0xF1; 32]);
    const SELLER: Address = Address([0x01; 32]);

    fn fee(rate: u16) -> Fee {
        Fee {
            rate,
            recipient: RECIPIENT,
        }
    }

    #[test]
    fn reference_split() {
        let split = FeeSplit::compute(Decimal::ONE, 250, PLATFORM, &[fee(300)], &[]).unwrap();
        assert_eq!(split.platform.amount, Decimal::new(25, 3));
        assert_eq!(split.order_fees[0].amount, Decimal::new(3, 2));
        assert_eq!(split.seller_proceeds, Decimal::new(945, 3));
    }

    #[test]
    fn truncates_at_payment_precision() {
        // 1e-18 * 1 / 10000 is below the smallest unit.
        let tiny = Decimal::new(1, 18);
        assert_eq!(fee_amount(tiny, 1).unwrap(), Decimal::ZERO);
        let split = FeeSplit::compute(tiny, 250, PLATFORM, &[], &[]).unwrap();
        assert_eq!(split.seller_proceeds, tiny);
    }

    #[test]
    fn proceeds_plus_deductions_equal_price() {
        let price = Decimal::new(123_456_789, 7);
        let split =
            FeeSplit::compute(price, 137, PLATFORM, &[fee(333), fee(17)], &[fee(91)]).unwrap();
        let deducted: Decimal = split.order_fees.iter().map(|p| p.amount).sum();
        assert_eq!(split.seller_proceeds + split.platform.amount + deducted, price);
        assert!(split.buyer_outlay(price).unwrap() > price);
    }

    #[test]
    fn legs_skip_zero_amounts() {
        let split = FeeSplit::compute(Decimal::ONE, 0, PLATFORM, &[fee(300)], &[]).unwrap();
        let legs = split.legs(SELLER);
        assert_eq!(legs.len(), 2);
        assert_eq!(legs.last(), Some(&(SELLER, Decimal::new(97, 2))));
    }

    #[test]
    fn large_price_splits_without_overflow() {
        let price = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let split = FeeSplit::compute(price, 250, PLATFORM, &[fee(300)], &[]).unwrap();
        assert_eq!(
            split.order_fees[0].amount,
            Decimal::from_i128_with_scale(3 * 10_i128.pow(26), 0)
        );
        assert_eq!(
            split.seller_proceeds,
            Decimal::from_i128_with_scale(945 * 10_i128.pow(25), 0)
        );
    }

    #[test]
    fn buyer_outlay_overflow_is_an_error() {
        let price = Decimal::from_i128_with_scale(7 * 10_i128.pow(28), 0);
        let split = FeeSplit::compute(price, 0, PLATFORM, &[], &[fee(5_000)]).unwrap();
        assert!(matches!(
            split.buyer_outlay(price),
            Err(MarkexError::InvalidOrderParam { .. })
        ));
        assert!(fee_amount(Decimal::MAX, 10_000).is_ok());
    }

    #[test]
    fn rate_ceiling() {
        let criteria = Address([0xCC; 32]);
        let mut sell = Order::dummy(SELLER, OrderSide::Sell, criteria);
        let mut buy = Order::dummy(Address([2; 32]), OrderSide::Buy, criteria);

        sell.fees = vec![fee(9_750)];
        assert!(check_rates(250, &sell, &buy).is_ok());

        sell.fees = vec![fee(9_751)];
        assert!(matches!(
            check_rates(250, &sell, &buy),
            Err(MarkexError::FeeRateExceeded { total_bps: 10_001 })
        ));

        sell.fees.clear();
        buy.fees = vec![fee(6_000), fee(4_001)];
        assert!(check_rates(0, &sell, &buy).is_err());
    }
}
