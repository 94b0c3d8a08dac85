//! System-wide constants for MarkEx.

/// Denominator for all fee rates: rates are expressed in basis points.
pub const INVERSE_BASIS_POINT: u16 = 10_000;

/// Decimal places kept when computing fee terms. Each term is truncated
/// toward zero at this precision; the seller receives the exact remainder.
pub const PAYMENT_PRECISION: u32 = 18;

/// Default platform fee rate (basis points) for a new exchange.
pub const DEFAULT_PLATFORM_FEE_RATE: u16 = 0;

/// Default cap on the platform fee rate (basis points).
pub const DEFAULT_MAX_PLATFORM_FEE_RATE: u16 = 250;

/// Default price-staleness window handed to the price oracle.
pub const DEFAULT_PRICE_STALENESS_WINDOW: u64 = 100_000;

/// Amount carried by unique-asset orders.
pub const UNIQUE_ASSET_AMOUNT: u64 = 1;

/// Domain tag for order hashes.
pub const ORDER_HASH_DOMAIN: &[u8] = b"markex:order:v1:";

/// Domain tag for single-order signatures.
pub const ORDER_SIGNATURE_DOMAIN: &[u8] = b"markex:sig:v1:";

/// Domain tag for bulk (Merkle root) signatures.
pub const BULK_SIGNATURE_DOMAIN: &[u8] = b"markex:bulk:v1:";

/// Domain tag for internal Merkle nodes.
pub const MERKLE_NODE_DOMAIN: &[u8] = b"markex:node:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "MarkEx";
