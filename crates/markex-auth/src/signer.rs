//! Trader-side signing: produces [`ExchangeInput`]s a relayer can submit.

use ed25519_dalek::{Signer, SigningKey};
use markex_types::{Address, Authorization, ExchangeInput, Order, OrderHash, bulk_signing_payload};

use crate::merkle::MerkleTree;

/// An ed25519 key held by a trader. Its public key is the trader [`Address`].
#[derive(Debug, Clone)]
pub struct OrderSigner {
    key: SigningKey,
}

impl OrderSigner {
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Deterministic signer from a 32-byte secret seed.
    #[must_use]
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(SigningKey::from_bytes(&seed))
    }

    /// The trader address this key signs for.
    #[must_use]
    pub fn address(&self) -> Address {
        Address(self.key.verifying_key().to_bytes())
    }

    /// Sign a single order under `nonce`.
    #[must_use]
    pub fn sign(&self, order: Order, nonce: u64) -> ExchangeInput {
        let signature = self.key.sign(&order.signing_payload(nonce));
        ExchangeInput {
            order,
            authorization: Authorization::Single { nonce, signature },
        }
    }

    /// Sign every order with one signature over their Merkle root.
    ///
    /// Returns one input per order, in order, each carrying its own proof.
    #[must_use]
    pub fn sign_bulk(&self, orders: Vec<Order>, nonce: u64) -> Vec<ExchangeInput> {
        let hashes: Vec<OrderHash> = orders.iter().map(Order::hash).collect();
        let Some(tree) = MerkleTree::build(&hashes) else {
            return Vec::new();
        };
        let signature = self.key.sign(&bulk_signing_payload(&tree.root(), nonce));

        orders
            .into_iter()
            .enumerate()
            .map(|(index, order)| ExchangeInput {
                order,
                authorization: Authorization::Bulk {
                    nonce,
                    proof: tree.proof(index).unwrap_or_default(),
                    signature,
                },
            })
            .collect()
    }
}
