//! Asset and payment collaborators.
//!
//! The engine never holds balances itself. It moves assets and payments
//! through two traits, acting as an approved operator on the traders'
//! behalf. [`InMemoryLedger`] is the in-process implementation used by
//! tests and embedders without an external ledger.
//!
//! Implementations must be `Clone`: each settlement runs on a working copy
//! that is committed only on success.
//!
//! Balances never go negative and never overflow. Transfers move strictly
//! positive amounts and validate everything before writing.

use std::collections::{HashMap, HashSet};

use markex_types::{Address, AssetId, CollectionId, MarkexError, Result};
use rust_decimal::Decimal;

/// Moves unique and semi-fungible assets.
pub trait AssetLedger {
    /// Move a unique asset `from → to`. `operator` must be `from` or approved by it.
    fn transfer_unique(
        &mut self,
        operator: Address,
        collection: CollectionId,
        from: Address,
        to: Address,
        asset_id: AssetId,
    ) -> Result<()>;

    /// Move `amount` units of a semi-fungible asset `from → to`.
    fn transfer_divisible(
        &mut self,
        operator: Address,
        collection: CollectionId,
        from: Address,
        to: Address,
        asset_id: AssetId,
        amount: u64,
    ) -> Result<()>;
}

/// Moves fungible payment: tokens by allowance, native currency directly.
pub trait PaymentLedger {
    /// Pull `amount` of `token` from `from` to `to`, spending the allowance
    /// `from` granted `operator`.
    fn transfer_from(
        &mut self,
        operator: Address,
        token: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<()>;

    /// Move native currency held by `from`.
    fn transfer_native(&mut self, from: Address, to: Address, amount: Decimal) -> Result<()>;
}

/// In-memory ledger for both asset classes, tokens and native currency.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    unique_owners: HashMap<(CollectionId, AssetId), Address>,
    divisible: HashMap<(CollectionId, AssetId, Address), u64>,
    /// `(collection, owner, operator)` approved for every asset in the collection.
    operators: HashSet<(CollectionId, Address, Address)>,
    tokens: HashMap<(Address, Address), Decimal>,
    /// `(token, owner, spender) → remaining allowance`.
    allowances: HashMap<(Address, Address, Address), Decimal>,
    native: HashMap<Address, Decimal>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Assets ---

    pub fn mint_unique(&mut self, collection: CollectionId, asset_id: AssetId, owner: Address) {
        self.unique_owners.insert((collection, asset_id), owner);
    }

    pub fn mint_divisible(
        &mut self,
        collection: CollectionId,
        asset_id: AssetId,
        owner: Address,
        amount: u64,
    ) -> Result<()> {
        let credited = self
            .divisible_balance(collection, asset_id, owner)
            .checked_add(amount)
            .ok_or(MarkexError::BalanceOverflow { holder: owner })?;
        self.divisible.insert((collection, asset_id, owner), credited);
        Ok(())
    }

    /// Approve or revoke `operator` for every asset `owner` holds in `collection`.
    pub fn set_approval_for_all(
        &mut self,
        collection: CollectionId,
        owner: Address,
        operator: Address,
        approved: bool,
    ) {
        if approved {
            self.operators.insert((collection, owner, operator));
        } else {
            self.operators.remove(&(collection, owner, operator));
        }
    }

    #[must_use]
    pub fn owner_of(&self, collection: CollectionId, asset_id: AssetId) -> Option<Address> {
        self.unique_owners.get(&(collection, asset_id)).copied()
    }

    #[must_use]
    pub fn divisible_balance(
        &self,
        collection: CollectionId,
        asset_id: AssetId,
        holder: Address,
    ) -> u64 {
        self.divisible
            .get(&(collection, asset_id, holder))
            .copied()
            .unwrap_or(0)
    }

    // --- Tokens ---

    pub fn mint_token(&mut self, token: Address, holder: Address, amount: Decimal) -> Result<()> {
        let credited = credit(self.token_balance(token, holder), amount, holder)?;
        self.tokens.insert((token, holder), credited);
        Ok(())
    }

    /// Set (not add to) the allowance `owner` grants `spender`.
    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: Decimal) {
        self.allowances.insert((token, owner, spender), amount);
    }

    #[must_use]
    pub fn token_balance(&self, token: Address, holder: Address) -> Decimal {
        self.tokens
            .get(&(token, holder))
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Decimal {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of every holder's balance of `token`.
    #[must_use]
    pub fn token_supply(&self, token: Address) -> Decimal {
        self.tokens
            .iter()
            .filter(|((t, _), _)| *t == token)
            .map(|(_, amount)| *amount)
            .sum()
    }

    // --- Native currency ---

    pub fn deposit_native(&mut self, holder: Address, amount: Decimal) -> Result<()> {
        let credited = credit(self.native_balance(holder), amount, holder)?;
        self.native.insert(holder, credited);
        Ok(())
    }

    #[must_use]
    pub fn native_balance(&self, holder: Address) -> Decimal {
        self.native.get(&holder).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn native_supply(&self) -> Decimal {
        self.native.values().copied().sum()
    }

    fn check_operator(
        &self,
        collection: CollectionId,
        owner: Address,
        operator: Address,
    ) -> Result<()> {
        if operator == owner || self.operators.contains(&(collection, owner, operator)) {
            Ok(())
        } else {
            Err(MarkexError::OperatorNotApproved { operator, owner })
        }
    }
}

fn credit(balance: Decimal, amount: Decimal, holder: Address) -> Result<Decimal> {
    if amount < Decimal::ZERO {
        return Err(MarkexError::InvalidTransferAmount(amount));
    }
    balance
        .checked_add(amount)
        .ok_or(MarkexError::BalanceOverflow { holder })
}

fn positive(amount: Decimal) -> Result<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(MarkexError::InvalidTransferAmount(amount))
    }
}

impl AssetLedger for InMemoryLedger {
    fn transfer_unique(
        &mut self,
        operator: Address,
        collection: CollectionId,
        from: Address,
        to: Address,
        asset_id: AssetId,
    ) -> Result<()> {
        if self.owner_of(collection, asset_id) != Some(from) {
            return Err(MarkexError::NotAssetOwner {
                owner: from,
                asset: asset_id,
                amount: 1,
            });
        }
        self.check_operator(collection, from, operator)?;
        self.unique_owners.insert((collection, asset_id), to);
        Ok(())
    }

    fn transfer_divisible(
        &mut self,
        operator: Address,
        collection: CollectionId,
        from: Address,
        to: Address,
        asset_id: AssetId,
        amount: u64,
    ) -> Result<()> {
        positive(Decimal::from(amount))?;
        let held = self.divisible_balance(collection, asset_id, from);
        if held < amount {
            return Err(MarkexError::NotAssetOwner {
                owner: from,
                asset: asset_id,
                amount,
            });
        }
        self.check_operator(collection, from, operator)?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .divisible_balance(collection, asset_id, to)
            .checked_add(amount)
            .ok_or(MarkexError::BalanceOverflow { holder: to })?;
        self.divisible
            .insert((collection, asset_id, from), held - amount);
        self.divisible.insert((collection, asset_id, to), credited);
        Ok(())
    }
}

impl PaymentLedger for InMemoryLedger {
    fn transfer_from(
        &mut self,
        operator: Address,
        token: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<()> {
        positive(amount)?;
        let approved = self.allowance(token, from, operator);
        if operator != from && approved < amount {
            return Err(MarkexError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        let available = self.token_balance(token, from);
        if available < amount {
            return Err(MarkexError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let credited = if from == to {
            available
        } else {
            credit(self.token_balance(token, to), amount, to)?
        };
        if operator != from {
            self.allowances
                .insert((token, from, operator), approved - amount);
        }
        self.tokens.insert((token, from), available - amount);
        self.tokens.insert((token, to), credited);
        Ok(())
    }

    fn transfer_native(&mut self, from: Address, to: Address, amount: Decimal) -> Result<()> {
        positive(amount)?;
        let available = self.native_balance(from);
        if available < amount {
            return Err(MarkexError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = credit(self.native_balance(to), amount, to)?;
        self.native.insert(from, available - amount);
        self.native.insert(to, credited);
        Ok(())
    }
}
