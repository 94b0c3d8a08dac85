//! Batch settlement.
//!
//! Two modes share one native-value attachment per call:
//!
//! - **Best-effort**: each pair is checkpointed. A failing pair is rolled
//!   back to its own checkpoint and recorded; the rest of the batch
//!   continues.
//! - **Atomic**: the whole batch is one transaction. The first failure
//!   discards every pair and is reported as `BatchAborted`.
//!
//! In both modes unused attached value is refunded to the caller.

use chrono::Utc;
use markex_types::{Address, ExchangePair, Execution, MarkexError, PaymentToken, Result};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::engine::Exchange;
use crate::fees;
use crate::ledger::{AssetLedger, PaymentLedger};

impl<L> Exchange<L>
where
    L: AssetLedger + PaymentLedger + Clone,
{
    /// Settle every pair independently.
    ///
    /// Returns one result per pair, in order. The call as a whole fails
    /// only when the exchange is closed, when `value` does not cover the
    /// native-paid pairs the caller is buying (or that total overflows),
    /// or when `value` cannot be attached.
    pub fn settle_best_effort(
        &mut self,
        pairs: &[ExchangePair],
        caller: Address,
        value: Decimal,
    ) -> Result<Vec<Result<Execution>>> {
        self.ensure_open()?;
        let needed = native_outlay(pairs, caller)?;
        if needed > value {
            return Err(MarkexError::InsufficientValue {
                needed,
                attached: value,
            });
        }

        let now = Utc::now();
        let mut tx = self.begin(caller, value)?;
        let mut results = Vec::with_capacity(pairs.len());
        for (index, pair) in pairs.iter().enumerate() {
            let checkpoint = tx.clone();
            match self.execute(&mut tx, &pair.sell, &pair.buy, caller, now) {
                Ok(execution) => results.push(Ok(execution)),
                Err(err) => {
                    warn!(index, sell = %pair.sell.hash(), error = %err, "Pair skipped");
                    tx = checkpoint;
                    results.push(Err(err));
                }
            }
        }
        self.commit(tx, caller)?;

        let settled = results.iter().filter(|r| r.is_ok()).count();
        info!(
            pairs = pairs.len(),
            settled,
            failed = pairs.len() - settled,
            "Best-effort batch settled"
        );
        Ok(results)
    }

    /// Settle every pair or none.
    ///
    /// # Errors
    /// `ExchangeClosed`, an attachment failure, or `BatchAborted` naming
    /// the first failing pair.
    pub fn settle_atomic(
        &mut self,
        pairs: &[ExchangePair],
        caller: Address,
        value: Decimal,
    ) -> Result<Vec<Execution>> {
        self.ensure_open()?;
        let now = Utc::now();
        let mut tx = self.begin(caller, value)?;
        let executions = pairs
            .iter()
            .enumerate()
            .map(|(index, pair)| {
                self.execute(&mut tx, &pair.sell, &pair.buy, caller, now)
                    .map_err(|source| {
                        warn!(index, error = %source, "Atomic batch aborted");
                        MarkexError::BatchAborted {
                            index,
                            source: Box::new(source),
                        }
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        self.commit(tx, caller)?;
        info!(pairs = executions.len(), "Atomic batch settled");
        Ok(executions)
    }
}

/// Native value the caller must attach for the pairs they pay for:
/// price plus buyer fees for every native pair whose buyer is `caller`.
fn native_outlay(pairs: &[ExchangePair], caller: Address) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for buy in pairs.iter().map(|pair| &pair.buy.order) {
        if buy.payment_token != PaymentToken::Native || buy.trader != caller {
            continue;
        }
        let overflow = || fees::overflow(buy.price);
        let mut outlay = buy.price;
        for fee in &buy.fees {
            let amount = fees::fee_amount(buy.price, fee.rate)?;
            outlay = outlay.checked_add(amount).ok_or_else(overflow)?;
        }
        total = total.checked_add(outlay).ok_or_else(overflow)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use markex_types::{ExchangeInput, Fee, Order, OrderSide};

    const CALLER: Address = Address([0xB0; 32]);
    const OTHER: Address = Address([0xB1; 32]);

    fn native_pair(buyer: Address, price: i64, fee_bps: u16) -> ExchangePair {
        let mut sell = Order::dummy(Address([1; 32]), OrderSide::Sell, Address([0xCC; 32]));
        sell.payment_token = PaymentToken::Native;
        sell.price = Decimal::new(price, 0);
        let mut buy = sell.clone();
        buy.side = OrderSide::Buy;
        buy.trader = buyer;
        if fee_bps > 0 {
            buy.fees.push(Fee {
                rate: fee_bps,
                recipient: Address([0xF1; 32]),
            });
        }
        ExchangePair::new(ExchangeInput::unsigned(sell), ExchangeInput::unsigned(buy))
    }

    #[test]
    fn outlay_counts_only_callers_native_buys() {
        let mut token_pair = native_pair(CALLER, 7, 0);
        token_pair.buy.order.payment_token = PaymentToken::Token(Address([0xE0; 32]));
        let pairs = vec![
            native_pair(CALLER, 2, 0),
            native_pair(OTHER, 5, 0),
            native_pair(CALLER, 1, 1_000),
            token_pair,
        ];
        // 2 + (1 + 0.1)
        assert_eq!(native_outlay(&pairs, CALLER).unwrap(), Decimal::new(31, 1));
        assert_eq!(native_outlay(&[], CALLER).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn outlay_overflow_is_an_error() {
        let mut big = native_pair(CALLER, 1, 0);
        big.buy.order.price = Decimal::MAX;
        let pairs = vec![big, native_pair(CALLER, 1, 0)];
        assert!(matches!(
            native_outlay(&pairs, CALLER),
            Err(MarkexError::InvalidOrderParam { .. })
        ));
    }
}
