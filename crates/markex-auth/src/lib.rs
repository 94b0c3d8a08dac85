//! # markex-auth
//!
//! **Authorization plane**: decides whether an order may be executed, and
//! tracks the per-order and per-trader state that authorization depends on.
//!
//! ## Components
//!
//! 1. **OrderRegistry**: order status (open, cancelled, filled) and signer nonces
//! 2. **OrderAuthorizer**: self-submission, single signatures, bulk signatures
//! 3. **MerkleTree**: root and proofs for bulk-signed order sets
//! 4. **OrderSigner**: trader-side signing of single and bulk orders
//!
//! ## Authorization Flow
//!
//! ```text
//! caller == trader ──▶ OK
//!        │ no
//!        ▼
//! nonce == registry.nonce_of(trader) ──▶ verify(sig, payload) ──▶ OK
//! ```
//!
//! Bumping a trader's nonce invalidates every signature made under the
//! previous nonce at once.

pub mod authorizer;
pub mod merkle;
pub mod registry;
pub mod signer;

pub use authorizer::OrderAuthorizer;
pub use merkle::MerkleTree;
pub use registry::OrderRegistry;
pub use signer::OrderSigner;
