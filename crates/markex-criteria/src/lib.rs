//! # markex-criteria
//!
//! **Matching plane**: pure functions that decide whether a sell order and
//! a buy order agree, and on what terms.
//!
//! - **No side effects**: policies never touch balances or order status
//! - **Strict pricing**: the maker's price is authoritative, the taker must equal it
//! - **Pluggable**: policies are trait objects granted by identity in a
//!   [`CriteriaRegistry`]
//!
//! ```text
//! CriteriaRegistry::match_orders(sell, buy)
//!   -> check_pair (sides, token, collection, criteria)
//!   -> granted policy lookup
//!   -> MatchingPolicy::match_orders -> MatchTerms
//! ```

pub mod divisible;
pub mod policy;
pub mod registry;
pub mod unique;

pub use divisible::DivisibleAssetCriteria;
pub use policy::{MatchingPolicy, check_pair, maker_price};
pub use registry::CriteriaRegistry;
pub use unique::UniqueAssetCriteria;
