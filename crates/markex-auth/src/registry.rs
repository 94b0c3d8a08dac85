//! Order registry: per-trader nonces and per-order status.
//!
//! Status is keyed by [`OrderHash`]. Transitions are monotonic: an order
//! leaves `Open` at most once, to either `Cancelled` or `Filled`. Nonces
//! only ever increase; bumping one revokes every signature made under the
//! old value without touching per-order storage.

use std::collections::HashMap;

use markex_types::{Address, MarkexError, Order, OrderHash, OrderStatus, Result};

/// Mutable order state shared by the authorizer and the settlement engine.
#[derive(Debug, Clone, Default)]
pub struct OrderRegistry {
    /// Current signer nonce per trader. Absent means 0.
    nonces: HashMap<Address, u64>,
    /// Terminal statuses. Absent means `Open`.
    statuses: HashMap<OrderHash, OrderStatus>,
}

impl OrderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of an order hash. Unknown hashes are `Open`.
    #[must_use]
    pub fn status_of(&self, hash: &OrderHash) -> OrderStatus {
        self.statuses.get(hash).copied().unwrap_or_default()
    }

    /// The trader's current signer nonce.
    #[must_use]
    pub fn nonce_of(&self, trader: &Address) -> u64 {
        self.nonces.get(trader).copied().unwrap_or(0)
    }

    /// Cancel one order. Only its trader may do so.
    ///
    /// Cancelling an already-cancelled order is a no-op.
    ///
    /// # Errors
    /// - `NotOrderTrader` if `caller` is not the order's trader
    /// - `OrderNotCancellable` if the order is already filled
    pub fn cancel(&mut self, caller: Address, order: &Order) -> Result<OrderHash> {
        let hash = order.hash();
        self.check_cancellable(caller, order, hash)?;
        self.statuses.insert(hash, OrderStatus::Cancelled);
        tracing::info!(order = %hash, trader = %order.trader, "Order cancelled");
        Ok(hash)
    }

    /// Cancel several orders, all belonging to `caller`.
    ///
    /// Every order is checked before any is cancelled: either all are
    /// cancelled or none are.
    pub fn cancel_many(&mut self, caller: Address, orders: &[Order]) -> Result<Vec<OrderHash>> {
        let hashes = orders
            .iter()
            .map(|order| {
                let hash = order.hash();
                self.check_cancellable(caller, order, hash).map(|()| hash)
            })
            .collect::<Result<Vec<_>>>()?;

        for hash in &hashes {
            self.statuses.insert(*hash, OrderStatus::Cancelled);
        }
        tracing::info!(trader = %caller, count = hashes.len(), "Orders cancelled");
        Ok(hashes)
    }

    /// Increment the caller's nonce, revoking all signatures made under the
    /// previous value. Returns the new nonce.
    pub fn bump_nonce(&mut self, caller: Address) -> u64 {
        let nonce = self.nonces.entry(caller).or_insert(0);
        *nonce += 1;
        tracing::info!(trader = %caller, nonce = *nonce, "Nonce incremented");
        *nonce
    }

    /// Record a successful settlement of `hash`.
    ///
    /// # Errors
    /// Returns `InvalidOrderParam` unless the order is currently `Open`.
    pub fn mark_filled(&mut self, hash: OrderHash) -> Result<()> {
        let status = self.status_of(&hash);
        if !status.can_transition_to(OrderStatus::Filled) {
            return Err(MarkexError::InvalidOrderParam {
                reason: format!("order {hash} is {status}, cannot fill"),
            });
        }
        self.statuses.insert(hash, OrderStatus::Filled);
        Ok(())
    }

    /// Number of orders in a terminal status.
    #[must_use]
    pub fn closed_count(&self) -> usize {
        self.statuses.len()
    }

    fn check_cancellable(&self, caller: Address, order: &Order, hash: OrderHash) -> Result<()> {
        if caller != order.trader {
            return Err(MarkexError::NotOrderTrader {
                caller,
                order: hash,
            });
        }
        if self.status_of(&hash) == OrderStatus::Filled {
            return Err(MarkexError::OrderNotCancellable(hash));
        }
        Ok(())
    }
}
