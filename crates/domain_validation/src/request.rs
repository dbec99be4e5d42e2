//! Payload sent to the external validation systems

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimKey, Protocol};

/// Request forwarded to whichever validation system the router selects
///
/// The same shape is sent to all three systems; only the routing differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// Protocol identity of the claim
    pub protocol: Protocol,
    /// Claim identity
    pub claim_key: ClaimKey,
    /// Product code (6814, 7701, 7709 route to CNOUA)
    pub product_code: u32,
    /// Contract number from the housing-contract lookup, when one exists
    pub contract_number: Option<i64>,
    /// Payment type (1-5)
    pub payment_type: u8,
    /// Principal amount in the original currency
    pub principal: Decimal,
    /// Monetary correction amount
    pub correction: Decimal,
    /// Beneficiary name
    pub beneficiary: Option<String>,
    /// Operator making the request
    pub operator_id: String,
}
