//! Exchange lifecycle and owner-only administration.
//!
//! Every operation here checks `caller == owner` first (`NotOwner`).
//! Identity-valued settings reject the zero address (`ZeroAddress`).

use std::sync::Arc;

use markex_criteria::{CriteriaRegistry, MatchingPolicy};
use markex_types::{Address, CriteriaId, MarkexError, Result};
use tracing::info;

use crate::engine::Exchange;
use crate::ledger::{AssetLedger, PaymentLedger};
use crate::oracle::PriceOracle;

impl<L> Exchange<L>
where
    L: AssetLedger + PaymentLedger + Clone,
{
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open settlement. A no-op if already open.
    pub fn open_exchange(&mut self, caller: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        if !self.open {
            self.open = true;
            info!(owner = %caller, "Exchange opened");
        }
        Ok(())
    }

    /// Close settlement. A no-op if already closed.
    pub fn close_exchange(&mut self, caller: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        if self.open {
            self.open = false;
            info!(owner = %caller, "Exchange closed");
        }
        Ok(())
    }

    // --- Criteria ---

    pub fn grant_criteria(
        &mut self,
        caller: Address,
        policy: Arc<dyn MatchingPolicy>,
    ) -> Result<CriteriaId> {
        self.ensure_owner(caller)?;
        self.criteria.grant(policy)
    }

    /// Remove a policy from the allow-list. Returns whether it was granted.
    pub fn revoke_criteria(&mut self, caller: Address, criteria: &CriteriaId) -> Result<bool> {
        self.ensure_owner(caller)?;
        Ok(self.criteria.revoke(criteria))
    }

    /// Replace the criteria registry. Policies granted on the old registry
    /// are not carried over.
    pub fn set_match_criteria_router(
        &mut self,
        caller: Address,
        router: CriteriaRegistry,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        let id = non_zero(router.id(), "criteria_router")?;
        self.config.criteria_router = id;
        self.criteria = router;
        info!(router = %id, granted = self.criteria.len(), "Criteria router replaced");
        Ok(())
    }

    // --- Fees ---

    pub fn set_platform_fee_recipient(
        &mut self,
        caller: Address,
        recipient: Address,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        self.config.platform_fee_recipient = non_zero(recipient, "platform_fee_recipient")?;
        info!(recipient = %recipient, "Platform fee recipient updated");
        Ok(())
    }

    /// Change the platform fee. Bounded by the maximum fixed at construction.
    pub fn set_platform_fee_rate(&mut self, caller: Address, rate: u16) -> Result<()> {
        self.ensure_owner(caller)?;
        let max = self.config.max_platform_fee_rate;
        if rate > max {
            return Err(MarkexError::PlatformFeeTooHigh { rate, max });
        }
        self.config.platform_fee_rate = rate;
        info!(rate, "Platform fee rate updated");
        Ok(())
    }

    // --- Payment tokens ---

    /// Accept or stop accepting `token` for settlement. Native currency is
    /// always accepted.
    pub fn set_payment_token(
        &mut self,
        caller: Address,
        token: Address,
        accepted: bool,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        let token = non_zero(token, "payment_token")?;
        let changed = if accepted {
            self.config.accepted_payment_tokens.insert(token)
        } else {
            self.config.accepted_payment_tokens.remove(&token)
        };
        if changed {
            info!(token = %token, accepted, "Payment token updated");
        }
        Ok(())
    }

    // --- Oracle ---

    pub fn set_oracle(&mut self, caller: Address, oracle: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        self.config.oracle = non_zero(oracle, "oracle")?;
        info!(oracle = %oracle, "Oracle updated");
        Ok(())
    }

    /// Install or remove the price check consulted after matching.
    pub fn install_price_oracle(
        &mut self,
        caller: Address,
        oracle: Option<Arc<dyn PriceOracle>>,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        info!(installed = oracle.is_some(), "Price oracle check changed");
        self.oracle = oracle;
        Ok(())
    }

    /// Set the price-staleness window handed to the oracle.
    pub fn set_block_range(&mut self, caller: Address, window: u64) -> Result<()> {
        self.ensure_owner(caller)?;
        self.config.price_staleness_window = window;
        info!(window, "Price staleness window updated");
        Ok(())
    }

    // --- Ownership ---

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        self.config.owner = non_zero(new_owner, "owner")?;
        info!(from = %caller, to = %new_owner, "Ownership transferred");
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller == self.config.owner {
            Ok(())
        } else {
            Err(MarkexError::NotOwner(caller))
        }
    }
}

fn non_zero(address: Address, field: &'static str) -> Result<Address> {
    if address.is_zero() {
        Err(MarkexError::ZeroAddress { field })
    } else {
        Ok(address)
    }
}
