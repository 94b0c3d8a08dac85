//! Thread-safe handle to an exchange.
//!
//! Calls from different threads are serialized through one lock and each
//! runs to completion before the next starts.

use std::sync::{Arc, Mutex, MutexGuard};

use markex_types::{
    Address, ExchangeInput, ExchangePair, Execution, MarkexError, Order, OrderHash, Result,
};
use rust_decimal::Decimal;

use crate::engine::Exchange;
use crate::ledger::{AssetLedger, PaymentLedger};

/// Cloneable, `Send + Sync` wrapper around an [`Exchange`].
#[derive(Debug)]
pub struct SharedExchange<L> {
    inner: Arc<Mutex<Exchange<L>>>,
}

impl<L> Clone for SharedExchange<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L> SharedExchange<L>
where
    L: AssetLedger + PaymentLedger + Clone,
{
    #[must_use]
    pub fn new(exchange: Exchange<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(exchange)),
        }
    }

    pub fn settle(
        &self,
        sell: &ExchangeInput,
        buy: &ExchangeInput,
        caller: Address,
        value: Decimal,
    ) -> Result<Execution> {
        self.lock()?.settle(sell, buy, caller, value)
    }

    pub fn settle_best_effort(
        &self,
        pairs: &[ExchangePair],
        caller: Address,
        value: Decimal,
    ) -> Result<Vec<Result<Execution>>> {
        self.lock()?.settle_best_effort(pairs, caller, value)
    }

    pub fn settle_atomic(
        &self,
        pairs: &[ExchangePair],
        caller: Address,
        value: Decimal,
    ) -> Result<Vec<Execution>> {
        self.lock()?.settle_atomic(pairs, caller, value)
    }

    pub fn cancel_order(&self, caller: Address, order: &Order) -> Result<OrderHash> {
        self.lock()?.cancel_order(caller, order)
    }

    pub fn cancel_orders(&self, caller: Address, orders: &[Order]) -> Result<Vec<OrderHash>> {
        self.lock()?.cancel_orders(caller, orders)
    }

    pub fn increment_nonce(&self, caller: Address) -> Result<u64> {
        Ok(self.lock()?.increment_nonce(caller))
    }

    /// Run `f` with exclusive access to the exchange.
    pub fn with<T>(&self, f: impl FnOnce(&mut Exchange<L>) -> T) -> Result<T> {
        Ok(f(&mut *self.lock()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Exchange<L>>> {
        self.inner
            .lock()
            .map_err(|_| MarkexError::Internal("exchange lock poisoned".to_string()))
    }
}
