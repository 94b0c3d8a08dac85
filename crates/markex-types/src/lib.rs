//! # markex-types
//!
//! Shared types, errors, and configuration for **MarkEx**, a signed-order
//! exchange for unique and semi-fungible assets.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`AssetId`], [`PaymentToken`], [`OrderHash`], [`ExecutionId`]
//! - **Order model**: [`Order`], [`OrderSide`], [`OrderStatus`], [`Fee`]
//! - **Wire inputs**: [`ExchangeInput`], [`ExchangePair`], [`Authorization`]
//! - **Settlement model**: [`MatchTerms`], [`AssetClass`], [`Execution`], [`FeePayout`]
//! - **Configuration**: [`ExchangeConfig`]
//! - **Errors**: [`MarkexError`] with `MX_ERR_` prefix codes
//! - **Constants**: basis-point denominator, hashing domains, defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod execution;
pub mod ids;
pub mod input;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use markex_types::{Order, OrderSide, ExchangeInput, Execution, ...};

pub use config::*;
pub use error::*;
pub use execution::*;
pub use ids::*;
pub use input::*;
pub use order::*;

// Constants are accessed via `markex_types::constants::FOO`
// (not re-exported to avoid name collisions).
