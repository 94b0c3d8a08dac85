//! # markex-settlement
//!
//! **Settlement plane**: turns authorized, matched sell/buy pairs into
//! asset and payment transfers.
//!
//! ## Components
//!
//! 1. **Exchange**: single-pair settlement, cancellation, nonces, queries
//! 2. **Batches**: best-effort (per-pair checkpoints) and atomic settlement
//! 3. **Administration**: lifecycle, criteria, fees, oracle, ownership
//! 4. **Collaborators**: [`AssetLedger`], [`PaymentLedger`], [`PriceOracle`]
//! 5. **SharedExchange**: serialized multi-threaded access
//!
//! ## Settlement Flow
//!
//! ```text
//! ExchangeInput x2 → OrderAuthorizer → CriteriaRegistry → fee split
//!     → mark Filled → AssetLedger → PaymentLedger → Execution
//! ```
//!
//! Every call runs on a working copy of registry and ledger state that is
//! committed only on success.

pub mod admin;
pub mod batch;
pub mod engine;
pub mod fees;
pub mod ledger;
pub mod oracle;
pub mod shared;

pub use engine::Exchange;
pub use fees::FeeSplit;
pub use ledger::{AssetLedger, InMemoryLedger, PaymentLedger};
pub use oracle::PriceOracle;
pub use shared::SharedExchange;
