//! Criteria registry: the set of matching policies the exchange accepts.
//!
//! Orders name a policy by [`CriteriaId`]. Only granted policies may be
//! used for settlement; granting and revoking is an administrative act
//! performed through the exchange.

use std::collections::HashMap;
use std::sync::Arc;

use markex_types::{Address, CriteriaId, MarkexError, MatchTerms, Order, Result};

use crate::policy::{MatchingPolicy, check_pair};

/// Granted policies, keyed by identity.
#[derive(Debug, Clone)]
pub struct CriteriaRegistry {
    id: Address,
    policies: HashMap<CriteriaId, Arc<dyn MatchingPolicy>>,
}

impl CriteriaRegistry {
    /// An empty registry identified by `id`.
    #[must_use]
    pub fn new(id: Address) -> Self {
        Self {
            id,
            policies: HashMap::new(),
        }
    }

    /// The registry's own identity (the exchange's criteria router).
    #[must_use]
    pub fn id(&self) -> Address {
        self.id
    }

    /// Grant a policy under its own identity, replacing any previous
    /// policy with the same identity.
    ///
    /// # Errors
    /// `ZeroAddress` if the policy identity is zero.
    pub fn grant(&mut self, policy: Arc<dyn MatchingPolicy>) -> Result<CriteriaId> {
        let id = policy.id();
        if id.is_zero() {
            return Err(MarkexError::ZeroAddress { field: "criteria" });
        }
        tracing::info!(criteria = %id, class = %policy.asset_class(), "Criteria granted");
        self.policies.insert(id, policy);
        Ok(id)
    }

    /// Remove a policy. Returns whether it was granted.
    pub fn revoke(&mut self, id: &CriteriaId) -> bool {
        let removed = self.policies.remove(id).is_some();
        if removed {
            tracing::info!(criteria = %id, "Criteria revoked");
        }
        removed
    }

    #[must_use]
    pub fn is_granted(&self, id: &CriteriaId) -> bool {
        self.policies.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &CriteriaId) -> Option<Arc<dyn MatchingPolicy>> {
        self.policies.get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Run the common checks, resolve the orders' policy and match.
    ///
    /// Returns the policy alongside the terms so the caller can pick the
    /// transfer primitive from its asset class.
    ///
    /// # Errors
    /// - `InvalidOrderSide` / `OrderCannotMatch` from [`check_pair`]
    /// - `MatchCriteriaNotGranted` if the shared criteria is not granted
    /// - any error from the policy itself
    pub fn match_orders(
        &self,
        sell: &Order,
        buy: &Order,
    ) -> Result<(Arc<dyn MatchingPolicy>, MatchTerms)> {
        check_pair(sell, buy)?;
        let policy = self
            .get(&sell.matching_criteria)
            .ok_or(MarkexError::MatchCriteriaNotGranted(sell.matching_criteria))?;
        let terms = policy.match_orders(sell, buy)?;
        Ok((policy, terms))
    }
}
