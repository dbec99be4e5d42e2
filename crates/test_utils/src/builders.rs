//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimKey, Currency, Money, Protocol};
use domain_authorization::AuthorizationRequest;
use domain_claims::{Claim, PolicyRef};

use crate::fixtures::IdFixtures;

/// Builder for claim records
pub struct TestClaimBuilder {
    key: ClaimKey,
    protocol: Protocol,
    product_code: u32,
    expected_reserve: Decimal,
    total_paid: Decimal,
    occurrence_counter: u32,
    policy_insurance_type: u32,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    pub fn new() -> Self {
        Self {
            key: IdFixtures::claim_key(),
            protocol: IdFixtures::protocol(),
            product_code: 6814,
            expected_reserve: dec!(1000.00),
            total_paid: dec!(0),
            occurrence_counter: 0,
            policy_insurance_type: 1,
        }
    }

    pub fn with_key(mut self, key: ClaimKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_product_code(mut self, product_code: u32) -> Self {
        self.product_code = product_code;
        self
    }

    pub fn with_expected_reserve(mut self, reserve: Decimal) -> Self {
        self.expected_reserve = reserve;
        self
    }

    pub fn with_total_paid(mut self, paid: Decimal) -> Self {
        self.total_paid = paid;
        self
    }

    pub fn with_occurrence_counter(mut self, counter: u32) -> Self {
        self.occurrence_counter = counter;
        self
    }

    /// Insurance type 0 makes the beneficiary optional
    pub fn with_policy_insurance_type(mut self, insurance_type: u32) -> Self {
        self.policy_insurance_type = insurance_type;
        self
    }

    pub fn build(self) -> Claim {
        let now = Utc::now();
        Claim {
            key: self.key,
            protocol: self.protocol,
            policy: PolicyRef {
                origin: 10,
                branch: 31,
                number: 88001,
            },
            leader: None,
            product_code: self.product_code,
            expected_reserve: Money::new(self.expected_reserve, Currency::BRL),
            total_paid: Money::new(self.total_paid, Currency::BRL),
            occurrence_counter: self.occurrence_counter,
            policy_insurance_type: self.policy_insurance_type,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Builder for authorization requests
pub struct TestAuthorizationRequestBuilder {
    claim_key: ClaimKey,
    payment_type: u8,
    amount: Decimal,
    correction_amount: Decimal,
    beneficiary: Option<String>,
    contract_number: Option<i64>,
    operator_id: String,
    external_validation: bool,
}

impl Default for TestAuthorizationRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAuthorizationRequestBuilder {
    pub fn new() -> Self {
        Self {
            claim_key: IdFixtures::claim_key(),
            payment_type: 1,
            amount: dec!(100.00),
            correction_amount: dec!(0),
            beneficiary: Some("MARIA DA SILVA".to_string()),
            contract_number: None,
            operator_id: "OP1234".to_string(),
            external_validation: true,
        }
    }

    pub fn with_claim_key(mut self, key: ClaimKey) -> Self {
        self.claim_key = key;
        self
    }

    pub fn with_payment_type(mut self, payment_type: u8) -> Self {
        self.payment_type = payment_type;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_correction_amount(mut self, correction: Decimal) -> Self {
        self.correction_amount = correction;
        self
    }

    pub fn with_beneficiary(mut self, beneficiary: Option<&str>) -> Self {
        self.beneficiary = beneficiary.map(str::to_string);
        self
    }

    pub fn with_contract_number(mut self, contract_number: Option<i64>) -> Self {
        self.contract_number = contract_number;
        self
    }

    pub fn with_operator(mut self, operator_id: &str) -> Self {
        self.operator_id = operator_id.to_string();
        self
    }

    pub fn without_external_validation(mut self) -> Self {
        self.external_validation = false;
        self
    }

    pub fn build(self) -> AuthorizationRequest {
        AuthorizationRequest {
            claim_key: self.claim_key,
            payment_type: self.payment_type,
            amount: self.amount,
            correction_amount: self.correction_amount,
            beneficiary: self.beneficiary,
            contract_number: self.contract_number,
            operator_id: self.operator_id,
            external_validation: self.external_validation,
        }
    }
}
