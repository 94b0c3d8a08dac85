//! Wire types submitted to the settlement surface.
//!
//! An [`ExchangeInput`] carries an order and, alongside it, the payload
//! that authorizes a third party to execute it. The authorization is never
//! part of the hashed order terms.

use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};

use crate::{Order, OrderHash};

/// How an order is authorized for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authorization {
    /// No signature. Valid only when the caller is the order's trader.
    None,
    /// The trader signed this order directly.
    Single { nonce: u64, signature: Signature },
    /// The trader signed a Merkle root over many orders; `proof` shows this
    /// order's hash is one of the leaves.
    Bulk {
        nonce: u64,
        proof: Vec<[u8; 32]>,
        signature: Signature,
    },
}

impl Authorization {
    /// The signer nonce embedded in the payload, if any.
    #[must_use]
    pub fn nonce(&self) -> Option<u64> {
        match self {
            Self::None => None,
            Self::Single { nonce, .. } | Self::Bulk { nonce, .. } => Some(*nonce),
        }
    }
}

/// One side of a trade as submitted for settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeInput {
    pub order: Order,
    pub authorization: Authorization,
}

impl ExchangeInput {
    /// An input carrying no signature, for submission by the trader itself.
    #[must_use]
    pub fn unsigned(order: Order) -> Self {
        Self {
            order,
            authorization: Authorization::None,
        }
    }

    #[must_use]
    pub fn hash(&self) -> OrderHash {
        self.order.hash()
    }
}

/// A sell input and the buy input it is settled against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePair {
    pub sell: ExchangeInput,
    pub buy: ExchangeInput,
}

impl ExchangePair {
    #[must_use]
    pub fn new(sell: ExchangeInput, buy: ExchangeInput) -> Self {
        Self { sell, buy }
    }
}
