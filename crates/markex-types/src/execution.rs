//! Match terms and settlement receipts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, AssetId, CollectionId, ExecutionId, OrderHash, OrderSide, PaymentToken};

/// Asset class a matching policy trades; selects the transfer primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// One-of-a-kind asset, always moved as a single unit.
    Unique,
    /// Semi-fungible asset with a per-id balance.
    Divisible,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unique => write!(f, "UNIQUE"),
            Self::Divisible => write!(f, "DIVISIBLE"),
        }
    }
}

/// Terms agreed by a matching policy for a sell/buy pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTerms {
    /// The maker's price.
    pub price: Decimal,
    pub asset_id: AssetId,
    pub amount: u64,
    /// Side of the order whose price was authoritative.
    pub maker: OrderSide,
}

/// One payment leg sent to a fee recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePayout {
    pub recipient: Address,
    pub rate: u16,
    pub amount: Decimal,
}

/// Immutable record of a completed settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub sell_hash: OrderHash,
    pub buy_hash: OrderHash,
    pub seller: Address,
    pub buyer: Address,
    pub maker: OrderSide,
    pub collection: CollectionId,
    pub asset_id: AssetId,
    pub amount: u64,
    pub payment_token: PaymentToken,
    pub price: Decimal,
    /// Platform share carved out of the price.
    pub platform_fee: FeePayout,
    /// Sell order fees carved out of the price.
    pub order_fees: Vec<FeePayout>,
    /// Buy order fees paid by the buyer on top of the price.
    pub buyer_fees: Vec<FeePayout>,
    /// What reached the seller after all deductions.
    pub seller_proceeds: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl Execution {
    /// Everything the buyer paid: price plus buyer-side fees. `None` if
    /// the sum does not fit a `Decimal`.
    #[must_use]
    pub fn buyer_outlay(&self) -> Option<Decimal> {
        checked_total(self.price, &self.buyer_fees)
    }

    /// Seller proceeds plus every deduction. Equals `price` for every
    /// successful settlement.
    #[must_use]
    pub fn accounted_price(&self) -> Option<Decimal> {
        let base = self.seller_proceeds.checked_add(self.platform_fee.amount)?;
        checked_total(base, &self.order_fees)
    }
}

/// `base` plus every payout amount, or `None` on overflow.
#[must_use]
pub fn checked_total(base: Decimal, payouts: &[FeePayout]) -> Option<Decimal> {
    payouts
        .iter()
        .try_fold(base, |total, payout| total.checked_add(payout.amount))
}

impl std::fmt::Display for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Execution[{}] {} x{} of {} @ {} {} (maker {})",
            self.id,
            self.asset_id,
            self.amount,
            self.collection,
            self.price,
            self.payment_token,
            self.maker,
        )
    }
}
