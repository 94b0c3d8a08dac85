//! Error types for MarkEx.
//!
//! All errors use the `MX_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 2xx: Authorization errors
//! - 3xx: Matching errors
//! - 4xx: Lifecycle / administration errors
//! - 5xx: Settlement and fee errors
//! - 6xx: Asset / payment collaborator errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Address, AssetId, CriteriaId, OrderHash};

/// Central error enum for all MarkEx operations.
#[derive(Debug, Error)]
pub enum MarkexError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The order is cancelled, filled, outside its validity window, or
    /// otherwise structurally unusable.
    #[error("MX_ERR_100: Invalid order parameters: {reason}")]
    InvalidOrderParam { reason: String },

    /// Only the order's trader may cancel it.
    #[error("MX_ERR_101: Caller {caller} is not the trader of {order}")]
    NotOrderTrader { caller: Address, order: OrderHash },

    /// A filled order cannot be cancelled.
    #[error("MX_ERR_102: Order {0} cannot be cancelled in its current state")]
    OrderNotCancellable(OrderHash),

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// Signature, bulk proof, or nonce check failed.
    #[error("MX_ERR_200: Failed authorization: {reason}")]
    FailedAuthorization { reason: String },

    // =================================================================
    // Matching Errors (3xx)
    // =================================================================
    /// The pair is incompatible under its matching policy.
    #[error("MX_ERR_300: Orders cannot be matched: {reason}")]
    OrderCannotMatch { reason: String },

    /// The sell input is not a sell order or the buy input is not a buy order.
    #[error("MX_ERR_301: Invalid order side")]
    InvalidOrderSide,

    /// The orders name a matching policy that is not on the allow-list.
    #[error("MX_ERR_302: Matching criteria is not granted: {0}")]
    MatchCriteriaNotGranted(CriteriaId),

    /// The price oracle rejected the matched terms.
    #[error("MX_ERR_303: Price check failed: {reason}")]
    PriceStale { reason: String },

    // =================================================================
    // Lifecycle / Administration Errors (4xx)
    // =================================================================
    /// Settlement entry points are gated on the exchange being open.
    #[error("MX_ERR_400: Exchange is closed")]
    ExchangeClosed,

    /// An administrator-only operation was called by someone else.
    #[error("MX_ERR_401: Caller {0} is not the owner")]
    NotOwner(Address),

    /// An identity-valued setting was given the null identity.
    #[error("MX_ERR_402: Address cannot be zero: {field}")]
    ZeroAddress { field: &'static str },

    /// The requested platform fee rate is above the construction-time cap.
    #[error("MX_ERR_403: Platform fee rate {rate} bps exceeds maximum {max} bps")]
    PlatformFeeTooHigh { rate: u16, max: u16 },

    // =================================================================
    // Settlement / Fee Errors (5xx)
    // =================================================================
    /// Summed fee rates exceed 10000 basis points.
    #[error("MX_ERR_500: Fee rates exceed 10000 bps: total {total_bps}")]
    FeeRateExceeded { total_bps: u32 },

    /// The native value attached to the call does not cover the payment.
    #[error("MX_ERR_501: Insufficient native value: need {needed}, attached {attached}")]
    InsufficientValue { needed: Decimal, attached: Decimal },

    /// Native-currency settlement must be submitted by the buyer.
    #[error("MX_ERR_502: Native payment must be submitted by the buyer {buyer}, not {caller}")]
    NativePayerMismatch { buyer: Address, caller: Address },

    /// An atomic batch failed; nothing from it was applied.
    #[error("MX_ERR_503: Atomic batch aborted at pair {index}: {source}")]
    BatchAborted {
        index: usize,
        #[source]
        source: Box<MarkexError>,
    },

    /// The orders settle in a token the exchange does not accept.
    #[error("MX_ERR_504: Invalid payment token: {0}")]
    InvalidPaymentToken(Address),

    // =================================================================
    // Collaborator Errors (6xx)
    // =================================================================
    /// Not enough token or native balance.
    #[error("MX_ERR_600: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// The buyer has not approved enough of the payment token.
    #[error("MX_ERR_601: Insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: Decimal, approved: Decimal },

    /// The sender does not hold the asset (or not enough units of it).
    #[error("MX_ERR_602: {owner} does not own {amount} of asset {asset}")]
    NotAssetOwner {
        owner: Address,
        asset: AssetId,
        amount: u64,
    },

    /// The exchange is not an approved operator for the asset owner.
    #[error("MX_ERR_603: Operator {operator} not approved by {owner}")]
    OperatorNotApproved { operator: Address, owner: Address },

    /// Crediting a holder would overflow their balance.
    #[error("MX_ERR_604: Balance overflow crediting {holder}")]
    BalanceOverflow { holder: Address },

    /// Transfers move a strictly positive amount.
    #[error("MX_ERR_605: Invalid transfer amount: {0}")]
    InvalidTransferAmount(Decimal),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MX_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("MX_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, missing fields, etc.).
    #[error("MX_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarkexError>;

impl From<serde_json::Error> for MarkexError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl MarkexError {
    /// The innermost error, looking through [`MarkexError::BatchAborted`].
    #[must_use]
    pub fn root_cause(&self) -> &MarkexError {
        match self {
            Self::BatchAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
