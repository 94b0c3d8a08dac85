//! Order model for MarkEx.
//!
//! An [`Order`] is the immutable set of terms a trader signs. Its identity
//! is the [`OrderHash`], a SHA-256 digest over a canonical encoding of every
//! field, so two orders with identical terms share fill and cancel state.
//!
//! ## Status State Machine
//!
//! ```text
//!   ┌──────┐  settlement   ┌────────┐
//!   │ OPEN ├──────────────▶│ FILLED │
//!   └──┬───┘               └────────┘
//!      │ cancel
//!      ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    Address, AssetId, CollectionId, CriteriaId, OrderHash, PaymentToken, constants,
};

/// Which side of the trade the order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Stored status of an order hash.
///
/// Transitions are **monotonic**:
/// - `Open → Filled` (successful settlement)
/// - `Open → Cancelled` (trader cancelled)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Never cancelled or filled. Every unknown hash is open.
    #[default]
    Open,
    Cancelled,
    Filled,
}

impl OrderStatus {
    /// Can an order in this status move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::Cancelled | Self::Filled)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Filled => write!(f, "FILLED"),
        }
    }
}

/// A fee share carved out of the traded price, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fee {
    pub rate: u16,
    pub recipient: Address,
}

/// Terms signed by a trader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Owner of the order; the ed25519 key that must authorize it.
    pub trader: Address,
    pub side: OrderSide,
    /// Matching policy this order is evaluated under.
    pub matching_criteria: CriteriaId,
    pub collection: CollectionId,
    pub asset_id: AssetId,
    /// Units traded. Always 1 for unique assets.
    pub amount: u64,
    pub payment_token: PaymentToken,
    /// Price for the full order, in units of `payment_token`.
    pub price: Decimal,
    pub listing_time: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
    /// Sell side: paid out of the price. Buy side: paid by the buyer on top.
    pub fees: Vec<Fee>,
    pub salt: u64,
    /// Opaque bytes for criteria-specific checks.
    pub extra_params: Vec<u8>,
}

impl Order {
    /// Canonical hash over every field.
    ///
    /// Format: `"markex:order:v1:" || trader || side || criteria || collection
    /// || asset_id || amount || payment_token || price || listing || expiration
    /// || fees || salt || extra_params`
    #[must_use]
    pub fn hash(&self) -> OrderHash {
        let mut hasher = Sha256::new();
        hasher.update(constants::ORDER_HASH_DOMAIN);
        hasher.update(self.trader.as_bytes());
        hasher.update(match self.side {
            OrderSide::Buy => [0u8],
            OrderSide::Sell => [1u8],
        });
        hasher.update(self.matching_criteria.as_bytes());
        hasher.update(self.collection.as_bytes());
        hasher.update(self.asset_id.0.to_le_bytes());
        hasher.update(self.amount.to_le_bytes());
        match self.payment_token {
            PaymentToken::Native => hasher.update([0u8]),
            PaymentToken::Token(token) => {
                hasher.update([1u8]);
                hasher.update(token.as_bytes());
            }
        }
        // Normalized so that 1.0 and 1 hash identically.
        let price = self.price.normalize().to_string();
        hasher.update((price.len() as u64).to_le_bytes());
        hasher.update(price.as_bytes());
        for time in [self.listing_time, self.expiration_time] {
            hasher.update(time.timestamp().to_le_bytes());
            hasher.update(time.timestamp_subsec_nanos().to_le_bytes());
        }
        hasher.update((self.fees.len() as u64).to_le_bytes());
        for fee in &self.fees {
            hasher.update(fee.rate.to_le_bytes());
            hasher.update(fee.recipient.as_bytes());
        }
        hasher.update(self.salt.to_le_bytes());
        hasher.update((self.extra_params.len() as u64).to_le_bytes());
        hasher.update(&self.extra_params);

        OrderHash(hasher.finalize().into())
    }

    /// Bytes a trader signs to authorize this order under `nonce`.
    ///
    /// Format: `"markex:sig:v1:" || order_hash || nonce`
    #[must_use]
    pub fn signing_payload(&self, nonce: u64) -> Vec<u8> {
        let mut payload = Vec::with_capacity(64);
        payload.extend_from_slice(constants::ORDER_SIGNATURE_DOMAIN);
        payload.extend_from_slice(self.hash().as_bytes());
        payload.extend_from_slice(&nonce.to_le_bytes());
        payload
    }

    /// Sum of this order's fee rates in basis points.
    #[must_use]
    pub fn total_fee_bps(&self) -> u32 {
        self.fees.iter().map(|fee| u32::from(fee.rate)).sum()
    }

    /// Is `now` inside `[listing_time, expiration_time]`?
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.listing_time <= now && now <= self.expiration_time
    }
}

/// Bytes a trader signs to authorize every order under a Merkle `root`.
///
/// Format: `"markex:bulk:v1:" || root || nonce`
#[must_use]
pub fn bulk_signing_payload(root: &[u8; 32], nonce: u64) -> Vec<u8> {
    let mut payload = Vec::with_capacity(64);
    payload.extend_from_slice(constants::BULK_SIGNATURE_DOMAIN);
    payload.extend_from_slice(root);
    payload.extend_from_slice(&nonce.to_le_bytes());
    payload
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// A unique-asset order on a fixed dummy collection, priced at 1 unit
    /// of a dummy payment token and live for the next ten minutes.
    pub fn dummy(trader: Address, side: OrderSide, criteria: CriteriaId) -> Self {
        let now = Utc::now();
        Self {
            trader,
            side,
            matching_criteria: criteria,
            collection: Address([0xC0; 32]),
            asset_id: AssetId(1),
            amount: 1,
            payment_token: PaymentToken::Token(Address([0xE0; 32])),
            price: Decimal::ONE,
            listing_time: now - chrono::Duration::seconds(1000),
            expiration_time: now + chrono::Duration::minutes(10),
            fees: vec![],
            salt: rand::random::<u64>(),
            extra_params: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_order() -> Order {
        Order::dummy(Address([1; 32]), OrderSide::Sell, Address([2; 32]))
    }

    #[test]
    fn hash_is_deterministic() {
        let order = make_order();
        assert_eq!(order.hash(), order.clone().hash());
    }

    #[test]
    fn salt_changes_hash() {
        let a = make_order();
        let mut b = a.clone();
        b.salt = a.salt.wrapping_add(1);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn every_field_is_committed() {
        let base = make_order();
        let mut variants = Vec::new();

        let mut o = base.clone();
        o.side = OrderSide::Buy;
        variants.push(o);
        let mut o = base.clone();
        o.asset_id = AssetId(2);
        variants.push(o);
        let mut o = base.clone();
        o.amount = 2;
        variants.push(o);
        let mut o = base.clone();
        o.payment_token = PaymentToken::Native;
        variants.push(o);
        let mut o = base.clone();
        o.price = Decimal::new(2, 0);
        variants.push(o);
        let mut o = base.clone();
        o.fees.push(Fee {
            rate: 100,
            recipient: Address([9; 32]),
        });
        variants.push(o);
        let mut o = base.clone();
        o.extra_params = vec![1, 2, 3];
        variants.push(o);

        for variant in variants {
            assert_ne!(base.hash(), variant.hash(), "{variant:?}");
        }
    }

    #[test]
    fn equal_prices_hash_equally() {
        let a = make_order();
        let mut b = a.clone();
        b.price = Decimal::new(10, 1); // 1.0
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn signing_payload_differs_by_nonce() {
        let order = make_order();
        assert_ne!(order.signing_payload(0), order.signing_payload(1));
    }

    #[test]
    fn status_transitions() {
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Filled));
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Filled.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Filled));
        assert!(!OrderStatus::Filled.can_transition_to(OrderStatus::Open));
        assert!(OrderStatus::Filled.is_terminal());
        assert_eq!(OrderStatus::default(), OrderStatus::Open);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let order = make_order();
        assert!(order.is_live_at(order.listing_time));
        assert!(order.is_live_at(order.expiration_time));
        assert!(!order.is_live_at(order.expiration_time + chrono::Duration::seconds(1)));
        assert!(!order.is_live_at(order.listing_time - chrono::Duration::seconds(1)));
    }

    #[test]
    fn serde_roundtrip_preserves_hash() {
        let order = make_order();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order.hash(), back.hash());
    }
}
