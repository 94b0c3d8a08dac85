//! Order authorizer: decides whether a caller may have an order executed.
//!
//! Rules, checked in order:
//! 1. The caller is the order's trader, which needs no signature.
//! 2. The embedded nonce equals the trader's current nonce.
//! 3. The signature verifies under the trader's key, either over the order
//!    itself or over a Merkle root the order is proven to belong to.
//!
//! Every failure is [`MarkexError::FailedAuthorization`].

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use markex_types::{
    Address, Authorization, ExchangeInput, MarkexError, Order, Result, bulk_signing_payload,
};

use crate::merkle;
use crate::registry::OrderRegistry;

/// Stateless signature and nonce checks against an [`OrderRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct OrderAuthorizer<'a> {
    registry: &'a OrderRegistry,
}

impl<'a> OrderAuthorizer<'a> {
    #[must_use]
    pub fn new(registry: &'a OrderRegistry) -> Self {
        Self { registry }
    }

    /// Authorize `input` for execution on behalf of `caller`.
    pub fn authorize(&self, input: &ExchangeInput, caller: Address) -> Result<()> {
        let order = &input.order;
        if caller == order.trader {
            return Ok(());
        }

        let (nonce, payload, signature) = match &input.authorization {
            Authorization::None => {
                return Err(failed(order, "third-party submission without signature"));
            }
            Authorization::Single { nonce, signature } => {
                (*nonce, order.signing_payload(*nonce), signature)
            }
            Authorization::Bulk {
                nonce,
                proof,
                signature,
            } => {
                let root = merkle::compute_root(&order.hash(), proof);
                (*nonce, bulk_signing_payload(&root, *nonce), signature)
            }
        };

        let current = self.registry.nonce_of(&order.trader);
        if nonce != current {
            return Err(failed(
                order,
                &format!("signed under nonce {nonce}, current nonce is {current}"),
            ));
        }

        verify(&order.trader, &payload, signature).map_err(|reason| failed(order, reason))
    }
}

fn verify(
    trader: &Address,
    payload: &[u8],
    signature: &Signature,
) -> std::result::Result<(), &'static str> {
    let key = VerifyingKey::from_bytes(trader.as_bytes())
        .map_err(|_| "trader is not a valid ed25519 public key")?;
    key.verify(payload, signature)
        .map_err(|_| "signature does not verify under trader key")
}

fn failed(order: &Order, reason: &str) -> MarkexError {
    tracing::warn!(
        order = %order.hash(),
        trader = %order.trader,
        reason,
        "Authorization rejected"
    );
    MarkexError::FailedAuthorization {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use markex_types::OrderSide;

    use super::*;
    use crate::signer::OrderSigner;

    const CRITERIA: Address = Address([0xCC; 32]);
    const RELAYER: Address = Address([0xEE; 32]);

    fn setup() -> (OrderRegistry, OrderSigner, Order) {
        let signer = OrderSigner::from_seed([1u8; 32]);
        let order = Order::dummy(signer.address(), OrderSide::Sell, CRITERIA);
        (OrderRegistry::new(), signer, order)
    }

    #[test]
    fn self_submission_needs_no_signature() {
        let (registry, signer, order) = setup();
        let input = ExchangeInput::unsigned(order);
        assert!(OrderAuthorizer::new(&registry).authorize(&input, signer.address()).is_ok());
    }

    #[test]
    fn unsigned_third_party_rejected() {
        let (registry, _, order) = setup();
        let input = ExchangeInput::unsigned(order);
        let err = OrderAuthorizer::new(&registry)
            .authorize(&input, RELAYER)
            .unwrap_err();
        assert!(matches!(err, MarkexError::FailedAuthorization { .. }));
    }

    #[test]
    fn valid_signature_accepted() {
        let (registry, signer, order) = setup();
        let input = signer.sign(order, 0);
        assert!(OrderAuthorizer::new(&registry).authorize(&input, RELAYER).is_ok());
    }

    #[test]
    fn signature_from_other_key_rejected() {
        let (registry, _, order) = setup();
        let impostor = OrderSigner::from_seed([2u8; 32]);
        let input = impostor.sign(order, 0);
        let err = OrderAuthorizer::new(&registry)
            .authorize(&input, RELAYER)
            .unwrap_err();
        assert!(matches!(err, MarkexError::FailedAuthorization { .. }));
    }

    #[test]
    fn tampered_order_rejected() {
        let (registry, signer, order) = setup();
        let mut input = signer.sign(order, 0);
        input.order.price += rust_decimal::Decimal::ONE;
        assert!(OrderAuthorizer::new(&registry).authorize(&input, RELAYER).is_err());
    }

    #[test]
    fn nonce_bump_revokes_signature() {
        let (mut registry, signer, order) = setup();
        let input = signer.sign(order, 0);
        registry.bump_nonce(signer.address());
        let err = OrderAuthorizer::new(&registry)
            .authorize(&input, RELAYER)
            .unwrap_err();
        assert!(
            matches!(err, MarkexError::FailedAuthorization { ref reason } if reason.contains("nonce"))
        );
    }

    #[test]
    fn signature_under_new_nonce_accepted() {
        let (mut registry, signer, order) = setup();
        let nonce = registry.bump_nonce(signer.address());
        let input = signer.sign(order, nonce);
        assert!(OrderAuthorizer::new(&registry).authorize(&input, RELAYER).is_ok());
    }

    #[test]
    fn bulk_signature_accepted_for_each_order() {
        let (registry, signer, _) = setup();
        let orders: Vec<Order> = (0..5)
            .map(|_| Order::dummy(signer.address(), OrderSide::Sell, CRITERIA))
            .collect();
        let inputs = signer.sign_bulk(orders, 0);
        assert_eq!(inputs.len(), 5);
        for input in &inputs {
            assert!(OrderAuthorizer::new(&registry).authorize(input, RELAYER).is_ok());
        }
    }

    #[test]
    fn bulk_proof_for_foreign_order_rejected() {
        let (registry, signer, order) = setup();
        let orders: Vec<Order> = (0..3)
            .map(|_| Order::dummy(signer.address(), OrderSide::Sell, CRITERIA))
            .collect();
        let mut input = signer.sign_bulk(orders, 0).remove(0);
        input.order = order;
        assert!(OrderAuthorizer::new(&registry).authorize(&input, RELAYER).is_err());
    }

    #[test]
    fn signature_moved_to_other_trader_rejected() {
        let (registry, signer, mut order) = setup();
        let input = signer.sign(order.clone(), 0);
        order.trader = Address([0xFF; 32]);
        let input = ExchangeInput {
            order,
            authorization: input.authorization,
        };
        assert!(OrderAuthorizer::new(&registry).authorize(&input, RELAYER).is_err());
    }
}
