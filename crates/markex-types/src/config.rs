//! Construction-time configuration for an exchange.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Address, MarkexError, PaymentToken, Result, constants};

/// Configuration of one exchange instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Administrator identity allowed to open/close and reconfigure.
    pub owner: Address,
    /// Account the exchange operates under: the approved operator for
    /// asset and token transfers, and the escrow for attached native value.
    pub exchange_account: Address,
    /// Identity of the criteria registry routing matching policies.
    pub criteria_router: Address,
    /// Identity of the price oracle.
    pub oracle: Address,
    /// Window handed to the price oracle's staleness check.
    #[serde(default = "default_staleness_window")]
    pub price_staleness_window: u64,
    /// Receives the platform share of every settlement.
    pub platform_fee_recipient: Address,
    /// Platform share of the price, in basis points.
    #[serde(default)]
    pub platform_fee_rate: u16,
    /// Upper bound for `platform_fee_rate`, enforced on every change.
    #[serde(default = "default_max_platform_fee_rate")]
    pub max_platform_fee_rate: u16,
    /// Tokens orders may settle in. Native currency is always accepted.
    #[serde(default)]
    pub accepted_payment_tokens: BTreeSet<Address>,
}

fn default_staleness_window() -> u64 {
    constants::DEFAULT_PRICE_STALENESS_WINDOW
}

fn default_max_platform_fee_rate() -> u16 {
    constants::DEFAULT_MAX_PLATFORM_FEE_RATE
}

impl ExchangeConfig {
    /// A configuration with default fee and staleness settings.
    #[must_use]
    pub fn new(
        owner: Address,
        exchange_account: Address,
        criteria_router: Address,
        oracle: Address,
        platform_fee_recipient: Address,
    ) -> Self {
        Self {
            owner,
            exchange_account,
            criteria_router,
            oracle,
            price_staleness_window: constants::DEFAULT_PRICE_STALENESS_WINDOW,
            platform_fee_recipient,
            platform_fee_rate: constants::DEFAULT_PLATFORM_FEE_RATE,
            max_platform_fee_rate: constants::DEFAULT_MAX_PLATFORM_FEE_RATE,
            accepted_payment_tokens: BTreeSet::new(),
        }
    }

    /// Whether orders may settle in `token`.
    #[must_use]
    pub fn accepts(&self, token: PaymentToken) -> bool {
        match token {
            PaymentToken::Native => true,
            PaymentToken::Token(address) => self.accepted_payment_tokens.contains(&address),
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check identities are non-null and fee rates are within bounds.
    pub fn validate(&self) -> Result<()> {
        let identities = [
            ("owner", self.owner),
            ("exchange_account", self.exchange_account),
            ("criteria_router", self.criteria_router),
            ("oracle", self.oracle),
            ("platform_fee_recipient", self.platform_fee_recipient),
        ];
        if let Some((field, _)) = identities.iter().find(|(_, addr)| addr.is_zero()) {
            return Err(MarkexError::Configuration(format!(
                "{field} must not be the zero address"
            )));
        }
        if self.accepted_payment_tokens.contains(&Address::ZERO) {
            return Err(MarkexError::Configuration(
                "accepted_payment_tokens must not contain the zero address".to_string(),
            ));
        }
        if self.max_platform_fee_rate > constants::INVERSE_BASIS_POINT {
            return Err(MarkexError::Configuration(format!(
                "max_platform_fee_rate {} exceeds {} bps",
                self.max_platform_fee_rate,
                constants::INVERSE_BASIS_POINT
            )));
        }
        if self.platform_fee_rate > self.max_platform_fee_rate {
            return Err(MarkexError::Configuration(format!(
                "platform_fee_rate {} exceeds max_platform_fee_rate {}",
                self.platform_fee_rate, self.max_platform_fee_rate
            )));
        }
        Ok(())
    }
}
