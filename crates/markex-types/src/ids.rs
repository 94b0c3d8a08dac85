//! Identifiers used throughout MarkEx.
//!
//! Accounts, collections, matching criteria and payment tokens share one
//! 32-byte [`Address`] representation. For trader accounts the address is
//! the raw ed25519 public key, so a signature can be checked against the
//! address directly. The all-zero address is the null identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// 32-byte identity of an account or contract-like component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The null identity.
    pub const ZERO: Self = Self([0u8; 32]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Short hex prefix for log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}

/// Identity of a matching policy registered with the criteria registry.
pub type CriteriaId = Address;

/// Identity of an asset collection.
pub type CollectionId = Address;

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Which unit inside a collection an order refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PaymentToken
// ---------------------------------------------------------------------------

/// The fungible medium an order is priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PaymentToken {
    /// The ledger's native currency, paid from value attached to the call.
    Native,
    /// A token pulled from the buyer through an allowance.
    Token(Address),
}

impl PaymentToken {
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}

impl fmt::Display for PaymentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Token(addr) => write!(f, "token:{addr}"),
        }
    }
}

// ---------------------------------------------------------------------------
// OrderHash
// ---------------------------------------------------------------------------

/// SHA-256 digest identifying an order. Fill and cancel state is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderHash(pub [u8; 32]);

impl OrderHash {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OrderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// ExecutionId
// ---------------------------------------------------------------------------

/// Unique identifier of a settled trade. UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ExecutionId(pub Uuid);

impl ExecutionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exec:{}", self.0)
    }
}
