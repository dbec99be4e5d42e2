//! Authorization request

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimKey;

/// One payment authorization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Claim to pay against
    pub claim_key: ClaimKey,
    /// Payment type (1-5)
    pub payment_type: u8,
    /// Principal amount, at most 2 decimal places
    pub amount: Decimal,
    /// Monetary correction amount
    #[serde(default)]
    pub correction_amount: Decimal,
    /// Beneficiary name; mandatory when the claim's insurance type is not 0
    pub beneficiary: Option<String>,
    /// Contract number from the housing-contract lookup, drives routing
    pub contract_number: Option<i64>,
    /// Operator executing the authorization
    pub operator_id: String,
    /// Whether the external validation gate applies (defaults to true)
    #[serde(default = "default_external_validation")]
    pub external_validation: bool,
}

fn default_external_validation() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_apply_on_deserialization() {
        let request: AuthorizationRequest = serde_json::from_value(serde_json::json!({
            "claim_key": {
                "insurance_type": 1, "origin": 10, "branch": 31, "claim_number": 123456
            },
            "payment_type": 1,
            "amount": "100.00",
            "beneficiary": "MARIA DA SILVA",
            "contract_number": null,
            "operator_id": "OP1234"
        }))
        .unwrap();

        assert_eq!(request.correction_amount, dec!(0));
        assert!(request.external_validation);
    }
}
