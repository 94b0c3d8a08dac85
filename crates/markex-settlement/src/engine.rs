//! The exchange: single-pair settlement and the state it runs against.
//!
//! Each settlement call:
//! 1. Requires the exchange to be open
//! 2. Checks both orders are open, signed by a non-null trader, live and
//!    not negatively priced
//! 3. Authorizes both orders for the caller
//! 4. Checks the payment token is accepted
//! 5. Matches the pair under its granted criteria (and the price oracle, if any)
//! 6. Checks fee rates
//! 7. Marks both orders `Filled`
//! 8. Transfers the asset seller → buyer
//! 9. Pays out price and fees from the buyer
//!
//! Steps 2-9 run on a [`Transaction`], a working copy of the order registry
//! and the ledger. The copy replaces the live state only when the whole
//! call succeeds, so a failure at any step leaves nothing behind. Orders
//! are marked `Filled` before any collaborator is called.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use markex_auth::{OrderAuthorizer, OrderRegistry};
use markex_criteria::CriteriaRegistry;
use markex_types::{
    Address, AssetClass, CriteriaId, ExchangeConfig, ExchangeInput, Execution, ExecutionId,
    MarkexError, MatchTerms, Order, OrderHash, OrderStatus, PaymentToken, Result, constants,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::fees::{self, FeeSplit};
use crate::ledger::{AssetLedger, PaymentLedger};
use crate::oracle::PriceOracle;

/// Working copy of mutable exchange state for one call.
#[derive(Debug, Clone)]
pub(crate) struct Transaction<L> {
    pub(crate) registry: OrderRegistry,
    pub(crate) ledger: L,
    /// Attached native value still held in escrow.
    pub(crate) escrowed: Decimal,
}

/// A signed-order exchange settling against the ledger `L`.
#[derive(Debug)]
pub struct Exchange<L> {
    pub(crate) config: ExchangeConfig,
    pub(crate) open: bool,
    pub(crate) criteria: CriteriaRegistry,
    pub(crate) oracle: Option<Arc<dyn PriceOracle>>,
    registry: OrderRegistry,
    ledger: L,
}

impl<L> Exchange<L>
where
    L: AssetLedger + PaymentLedger + Clone,
{
    /// Create a closed exchange with an empty criteria registry.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(config: ExchangeConfig, ledger: L) -> Result<Self> {
        config.validate()?;
        info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            owner = %config.owner,
            account = %config.exchange_account,
            platform_fee_rate = config.platform_fee_rate,
            "Exchange created"
        );
        Ok(Self {
            criteria: CriteriaRegistry::new(config.criteria_router),
            config,
            open: false,
            oracle: None,
            registry: OrderRegistry::new(),
            ledger,
        })
    }

    // --- Settlement ---

    /// Settle one sell/buy pair.
    ///
    /// `value` is native currency the caller attaches. It is escrowed under
    /// the exchange account for the duration of the call; whatever the
    /// settlement does not use is refunded.
    pub fn settle(
        &mut self,
        sell: &ExchangeInput,
        buy: &ExchangeInput,
        caller: Address,
        value: Decimal,
    ) -> Result<Execution> {
        self.ensure_open()?;
        let now = Utc::now();
        let mut tx = self.begin(caller, value)?;
        let execution = self.execute(&mut tx, sell, buy, caller, now)?;
        self.commit(tx, caller)?;
        info!(
            execution = %execution.id,
            sell = %execution.sell_hash,
            buy = %execution.buy_hash,
            price = %execution.price,
            "Settled"
        );
        Ok(execution)
    }

    /// Match two orders without settling them.
    pub fn match_orders(&self, sell: &Order, buy: &Order) -> Result<MatchTerms> {
        self.criteria.match_orders(sell, buy).map(|(_, terms)| terms)
    }

    // --- Order management ---

    /// Cancel an order. Only its trader may do so.
    pub fn cancel_order(&mut self, caller: Address, order: &Order) -> Result<OrderHash> {
        self.registry.cancel(caller, order)
    }

    /// Cancel several of the caller's orders, all or nothing.
    pub fn cancel_orders(&mut self, caller: Address, orders: &[Order]) -> Result<Vec<OrderHash>> {
        self.registry.cancel_many(caller, orders)
    }

    /// Revoke every signature the caller made under their current nonce.
    pub fn increment_nonce(&mut self, caller: Address) -> u64 {
        self.registry.bump_nonce(caller)
    }

    // --- Queries ---

    #[must_use]
    pub fn status_of(&self, hash: &OrderHash) -> OrderStatus {
        self.registry.status_of(hash)
    }

    #[must_use]
    pub fn nonce_of(&self, trader: &Address) -> u64 {
        self.registry.nonce_of(trader)
    }

    #[must_use]
    pub fn is_granted(&self, criteria: &CriteriaId) -> bool {
        self.criteria.is_granted(criteria)
    }

    #[must_use]
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    #[must_use]
    pub fn criteria(&self) -> &CriteriaRegistry {
        &self.criteria
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access for minting and approvals outside settlement.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    // --- Transactions ---

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(MarkexError::ExchangeClosed)
        }
    }

    /// Start a working copy and escrow the attached value.
    pub(crate) fn begin(&self, caller: Address, value: Decimal) -> Result<Transaction<L>> {
        if value < Decimal::ZERO {
            return Err(MarkexError::InvalidOrderParam {
                reason: format!("attached value {value} is negative"),
            });
        }
        let mut tx = Transaction {
            registry: self.registry.clone(),
            ledger: self.ledger.clone(),
            escrowed: Decimal::ZERO,
        };
        if !value.is_zero() {
            tx.ledger
                .transfer_native(caller, self.config.exchange_account, value)?;
            tx.escrowed = value;
        }
        Ok(tx)
    }

    /// Refund unused escrow and replace live state with the working copy.
    pub(crate) fn commit(&mut self, mut tx: Transaction<L>, caller: Address) -> Result<()> {
        if !tx.escrowed.is_zero() {
            tx.ledger
                .transfer_native(self.config.exchange_account, caller, tx.escrowed)?;
            debug!(caller = %caller, refund = %tx.escrowed, "Unused value refunded");
        }
        self.registry = tx.registry;
        self.ledger = tx.ledger;
        Ok(())
    }

    /// Settle one pair on `tx`. Leaves `tx` partially modified on error;
    /// callers discard or roll it back.
    pub(crate) fn execute(
        &self,
        tx: &mut Transaction<L>,
        sell_input: &ExchangeInput,
        buy_input: &ExchangeInput,
        caller: Address,
        now: DateTime<Utc>,
    ) -> Result<Execution> {
        let sell = &sell_input.order;
        let buy = &buy_input.order;

        let sell_hash = check_order(&tx.registry, sell, now)?;
        let buy_hash = check_order(&tx.registry, buy, now)?;

        let authorizer = OrderAuthorizer::new(&tx.registry);
        authorizer.authorize(sell_input, caller)?;
        authorizer.authorize(buy_input, caller)?;

        self.check_payment_token(sell.payment_token)?;

        let (policy, terms) = self.criteria.match_orders(sell, buy)?;
        debug!(
            sell = %sell_hash,
            buy = %buy_hash,
            price = %terms.price,
            amount = terms.amount,
            maker = %terms.maker,
            "Orders matched"
        );
        self.check_price(&terms, sell)?;
        fees::check_rates(self.config.platform_fee_rate, sell, buy)?;

        tx.registry.mark_filled(sell_hash)?;
        tx.registry.mark_filled(buy_hash)?;

        let operator = self.config.exchange_account;
        match policy.asset_class() {
            AssetClass::Unique => tx.ledger.transfer_unique(
                operator,
                sell.collection,
                sell.trader,
                buy.trader,
                terms.asset_id,
            )?,
            AssetClass::Divisible => tx.ledger.transfer_divisible(
                operator,
                sell.collection,
                sell.trader,
                buy.trader,
                terms.asset_id,
                terms.amount,
            )?,
        }

        let split = FeeSplit::compute(
            terms.price,
            self.config.platform_fee_rate,
            self.config.platform_fee_recipient,
            &sell.fees,
            &buy.fees,
        )?;
        let outlay = split.buyer_outlay(terms.price)?;
        let legs = split.legs(sell.trader);
        match sell.payment_token {
            PaymentToken::Native => {
                if caller != buy.trader {
                    return Err(MarkexError::NativePayerMismatch {
                        buyer: buy.trader,
                        caller,
                    });
                }
                if tx.escrowed < outlay {
                    return Err(MarkexError::InsufficientValue {
                        needed: outlay,
                        attached: tx.escrowed,
                    });
                }
                for (recipient, amount) in legs {
                    tx.ledger.transfer_native(operator, recipient, amount)?;
                }
                tx.escrowed -= outlay;
            }
            PaymentToken::Token(token) => {
                for (recipient, amount) in legs {
                    tx.ledger
                        .transfer_from(operator, token, buy.trader, recipient, amount)?;
                }
            }
        }

        Ok(Execution {
            id: ExecutionId::new(),
            sell_hash,
            buy_hash,
            seller: sell.trader,
            buyer: buy.trader,
            maker: terms.maker,
            collection: sell.collection,
            asset_id: terms.asset_id,
            amount: terms.amount,
            payment_token: sell.payment_token,
            price: terms.price,
            platform_fee: split.platform,
            order_fees: split.order_fees,
            buyer_fees: split.buyer_fees,
            seller_proceeds: split.seller_proceeds,
            executed_at: now,
        })
    }

    fn check_payment_token(&self, token: PaymentToken) -> Result<()> {
        match token {
            PaymentToken::Token(address) if !self.config.accepts(token) => {
                Err(MarkexError::InvalidPaymentToken(address))
            }
            _ => Ok(()),
        }
    }

    fn check_price(&self, terms: &MatchTerms, sell: &Order) -> Result<()> {
        let Some(oracle) = &self.oracle else {
            return Ok(());
        };
        oracle
            .check(
                terms,
                sell.collection,
                sell.payment_token,
                self.config.price_staleness_window,
            )
            .map_err(|err| match err {
                stale @ MarkexError::PriceStale { .. } => stale,
                other => MarkexError::PriceStale {
                    reason: other.to_string(),
                },
            })
    }
}

/// Order-level preconditions. Returns the order's hash.
fn check_order(registry: &OrderRegistry, order: &Order, now: DateTime<Utc>) -> Result<OrderHash> {
    let hash = order.hash();
    if order.trader.is_zero() {
        return Err(MarkexError::InvalidOrderParam {
            reason: format!("{hash} has no trader"),
        });
    }
    if order.price < Decimal::ZERO {
        return Err(MarkexError::InvalidOrderParam {
            reason: format!("{hash} has negative price {}", order.price),
        });
    }
    let status = registry.status_of(&hash);
    if status != OrderStatus::Open {
        return Err(MarkexError::InvalidOrderParam {
            reason: format!("{hash} is {status}"),
        });
    }
    if !order.is_live_at(now) {
        return Err(MarkexError::InvalidOrderParam {
            reason: format!(
                "{hash} is live from {} to {}, now {now}",
                order.listing_time, order.expiration_time
            ),
        });
    }
    Ok(hash)
}
