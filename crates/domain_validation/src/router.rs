//! Routing of validation requests to exactly one external system
//!
//! Product routing always wins over contract routing: a consortium product
//! goes to CNOUA no matter what the contract number says. Non-consortium
//! requests split on the contract number, SIPUA above zero and SIMDA at
//! zero or absent.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::client::{ValidationClient, CONSORTIUM_PRODUCT_CODES};
use crate::request::ValidationRequest;
use crate::response::ValidationResponse;

/// Outcome of the routing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationRoute {
    Cnoua,
    Sipua,
    Simda,
    /// No system claims the request; cannot occur under the current rules
    None,
}

impl ValidationRoute {
    pub fn service_name(&self) -> &'static str {
        match self {
            ValidationRoute::Cnoua => "CNOUA",
            ValidationRoute::Sipua => "SIPUA",
            ValidationRoute::Simda => "SIMDA",
            ValidationRoute::None => "NONE",
        }
    }
}

/// Static description of the routing rules, for monitoring and debugging
#[derive(Debug, Clone, Serialize)]
pub struct RoutingInfo {
    pub consortium_products: &'static [u32],
    pub sipua_rule: &'static str,
    pub simda_rule: &'static str,
    pub priority: &'static [&'static str],
    pub services: &'static [&'static str],
}

/// Routes each validation request to exactly one client
pub struct ValidationRouter {
    cnoua: Arc<dyn ValidationClient>,
    sipua: Arc<dyn ValidationClient>,
    simda: Arc<dyn ValidationClient>,
}

impl ValidationRouter {
    pub fn new(
        cnoua: Arc<dyn ValidationClient>,
        sipua: Arc<dyn ValidationClient>,
        simda: Arc<dyn ValidationClient>,
    ) -> Self {
        Self {
            cnoua,
            sipua,
            simda,
        }
    }

    /// Determines which system would handle the request without calling it
    pub fn determine_service(
        &self,
        product_code: u32,
        contract_number: Option<i64>,
    ) -> ValidationRoute {
        if self.cnoua.supports(product_code, contract_number) {
            ValidationRoute::Cnoua
        } else if self.sipua.supports(product_code, contract_number) {
            ValidationRoute::Sipua
        } else if self.simda.supports(product_code, contract_number) {
            ValidationRoute::Simda
        } else {
            ValidationRoute::None
        }
    }

    /// Routes the request to the selected system and returns its response
    pub async fn route_and_validate(&self, request: &ValidationRequest) -> ValidationResponse {
        let route = self.determine_service(request.product_code, request.contract_number);
        match route {
            ValidationRoute::Cnoua => {
                info!(
                    product = request.product_code,
                    "routing to CNOUA: consortium product"
                );
                self.cnoua.validate(request).await
            }
            ValidationRoute::Sipua => {
                info!(
                    contract = ?request.contract_number,
                    "routing to SIPUA: contract number > 0"
                );
                self.sipua.validate(request).await
            }
            ValidationRoute::Simda => {
                info!(
                    contract = ?request.contract_number,
                    "routing to SIMDA: contract number absent or 0"
                );
                self.simda.validate(request).await
            }
            ValidationRoute::None => {
                error!(
                    product = request.product_code,
                    contract = ?request.contract_number,
                    "no validation service supports this request"
                );
                ValidationResponse::unavailable(
                    "ROUTER",
                    "ROUTING_ERROR",
                    "No validation service available for this product/contract",
                    Utc::now(),
                    0,
                )
            }
        }
    }

    /// Probes all three systems independently
    ///
    /// A failing probe marks that one system unhealthy without affecting the
    /// results for the others.
    pub async fn check_all_services_health(&self) -> HashMap<String, bool> {
        let mut health = HashMap::new();
        for client in [&self.cnoua, &self.sipua, &self.simda] {
            let name = client.service().name();
            let healthy = match client.is_healthy().await {
                Ok(healthy) => healthy,
                Err(err) => {
                    error!(service = name, error = %err, "health probe failed");
                    false
                }
            };
            health.insert(name.to_string(), healthy);
        }
        info!(
            cnoua = health["CNOUA"],
            sipua = health["SIPUA"],
            simda = health["SIMDA"],
            "external validation services health"
        );
        health
    }

    /// Static routing metadata
    pub fn routing_info(&self) -> RoutingInfo {
        RoutingInfo {
            consortium_products: &CONSORTIUM_PRODUCT_CODES,
            sipua_rule: "contract number > 0",
            simda_rule: "contract number absent or 0",
            priority: &["product code (CNOUA)", "contract type (SIPUA/SIMDA)"],
            services: &["CNOUA", "SIPUA", "SIMDA"],
        }
    }
}
