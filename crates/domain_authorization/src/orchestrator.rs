//! Authorization orchestrator
//!
//! Runs the full pipeline for one payment: precondition rules, the single
//! routed external validation, and the four storage steps under one
//! transaction. Also serves the dry-run, cancel and retry surface.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use core_kernel::{
    AuthorizationId, BusinessDateSource, IsolationLevel, Money, Rate, TransactionOptions,
};
use domain_claims::{
    AccompanimentRecord, HistoryRecord, PAYMENT_AUTHORIZATION_OPERATION,
};
use domain_phases::PhaseLifecycleEngine;
use domain_validation::{ValidationRequest, ValidationRouter, ValidationStatus};

use crate::context::TransactionContext;
use crate::error::AuthorizationError;
use crate::ports::{AuthorizationStore, AuthorizationTransaction, StandardizationRates};
use crate::preconditions;
use crate::request::AuthorizationRequest;
use crate::response::{AuthorizationResponse, AuthorizationStatus, ValidationReport};

/// One remembered authorization attempt, kept to serve cancel and retry
#[derive(Debug, Clone)]
struct AuthorizationRecord {
    request: AuthorizationRequest,
    response: AuthorizationResponse,
}

/// Drives payment authorizations end to end
pub struct AuthorizationOrchestrator {
    store: Arc<dyn AuthorizationStore>,
    router: Arc<ValidationRouter>,
    phases: Arc<PhaseLifecycleEngine>,
    dates: Arc<dyn BusinessDateSource>,
    rates: Arc<dyn StandardizationRates>,
    isolation: IsolationLevel,
    log: RwLock<HashMap<AuthorizationId, AuthorizationRecord>>,
}

impl AuthorizationOrchestrator {
    pub fn new(
        store: Arc<dyn AuthorizationStore>,
        router: Arc<ValidationRouter>,
        phases: Arc<PhaseLifecycleEngine>,
        dates: Arc<dyn BusinessDateSource>,
        rates: Arc<dyn StandardizationRates>,
    ) -> Self {
        Self {
            store,
            router,
            phases,
            dates,
            rates,
            isolation: IsolationLevel::default(),
            log: RwLock::new(HashMap::new()),
        }
    }

    /// Overrides the isolation level requested for the storage transaction
    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    /// Authorizes one payment against a claim
    pub async fn authorize(
        &self,
        request: AuthorizationRequest,
    ) -> Result<AuthorizationResponse, AuthorizationError> {
        let authorization_id = AuthorizationId::new_v7();
        info!(
            %authorization_id,
            claim = %request.claim_key,
            amount = %request.amount,
            "starting payment authorization"
        );

        let claim = self.load_claim(&request).await?;

        // Step 1: local precondition rules, before any I/O
        let violations = preconditions::check(&request, &claim);
        if !violations.is_empty() {
            let errors: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            warn!(%authorization_id, ?errors, "authorization rejected by preconditions");
            return Ok(self
                .remember(
                    request.clone(),
                    AuthorizationResponse::rejected(authorization_id, &request, errors, vec![]),
                )
                .await);
        }

        // Step 2: external validation gate, exactly one routed call
        let mut validation_results = Vec::new();
        if request.external_validation {
            let validation_request = ValidationRequest {
                protocol: claim.protocol,
                claim_key: claim.key,
                product_code: claim.product_code,
                contract_number: request.contract_number,
                payment_type: request.payment_type,
                principal: request.amount,
                correction: request.correction_amount,
                beneficiary: request.beneficiary.clone(),
                operator_id: request.operator_id.clone(),
            };
            let validation = self.router.route_and_validate(&validation_request).await;
            let status = validation.status;
            let message = validation
                .message
                .clone()
                .unwrap_or_else(|| "Validation rejected".to_string());
            let service = validation.service.clone();
            validation_results.push(validation);

            match status {
                ValidationStatus::Approved => {}
                ValidationStatus::Rejected(_) => {
                    warn!(%authorization_id, %service, %message, "external validation rejected");
                    return Ok(self
                        .remember(
                            request.clone(),
                            AuthorizationResponse::rejected(
                                authorization_id,
                                &request,
                                vec![format!("{service}: {message}")],
                                validation_results,
                            ),
                        )
                        .await);
                }
                ValidationStatus::Unavailable => {
                    warn!(%authorization_id, %service, %message, "external validation unavailable");
                    return Ok(self
                        .remember(
                            request.clone(),
                            AuthorizationResponse::error(
                                authorization_id,
                                &request,
                                vec![format!("{service}: {message}")],
                                validation_results,
                            ),
                        )
                        .await);
                }
            }
        }

        // Steps 3-6: the storage pipeline, one transaction
        let business_date = self.dates.business_date().await?;
        let operation_time = self.dates.operation_time();
        let rate = self.rates.rate_for(business_date).await?;

        let tx = self
            .store
            .begin(
                &request.claim_key,
                TransactionOptions::with_isolation(self.isolation),
            )
            .await?;

        // Re-check the balance under the claim's lock; a concurrent
        // authorization may have consumed the pending balance since the
        // precondition pass
        let current = tx.claim().await;
        let amount = Money::brl(request.amount);
        if !current.can_cover(&amount) {
            let message = format!(
                "Payment of {} exceeds pending balance of {}",
                request.amount,
                current.pending().amount()
            );
            warn!(%authorization_id, %message, "authorization rejected under claim lock");
            drop(tx);
            return Ok(self
                .remember(
                    request.clone(),
                    AuthorizationResponse::rejected(
                        authorization_id,
                        &request,
                        vec![message],
                        validation_results,
                    ),
                )
                .await);
        }

        let mut ctx = TransactionContext::new(
            authorization_id,
            request.claim_key,
            request.operator_id.clone(),
            business_date,
            operation_time,
        );
        info!(%authorization_id, step = %ctx.step, "transaction BEGIN");

        match self.run_steps(tx.as_ref(), &mut ctx, &request, rate).await {
            Ok(occurrence) => match tx.commit().await {
                Ok(()) => {
                    info!(
                        %authorization_id,
                        occurrence,
                        elapsed_ms = ctx.elapsed_ms(),
                        "transaction COMMIT"
                    );
                    let response = AuthorizationResponse::approved(
                        authorization_id,
                        &request,
                        occurrence,
                        validation_results,
                    );
                    Ok(self.remember(request, response).await)
                }
                Err(commit_error) => {
                    ctx.mark_rollback(format!("commit failed: {commit_error}"));
                    error!(
                        %authorization_id,
                        reason = ctx.rollback_reason.as_deref().unwrap_or_default(),
                        "transaction ROLLBACK"
                    );
                    Ok(self
                        .remember(
                            request.clone(),
                            AuthorizationResponse::error(
                                authorization_id,
                                &request,
                                vec!["Payment authorization processing failed".to_string()],
                                vec![],
                            ),
                        )
                        .await)
                }
            },
            Err(step_error) => {
                ctx.mark_rollback(format!("failed at step {}: {}", ctx.step, step_error));
                error!(
                    %authorization_id,
                    step = %ctx.step,
                    reason = ctx.rollback_reason.as_deref().unwrap_or_default(),
                    "transaction ROLLBACK"
                );
                // Dropping the transaction discards every staged write
                drop(tx);
                Ok(self
                    .remember(
                        request.clone(),
                        AuthorizationResponse::error(
                            authorization_id,
                            &request,
                            vec!["Payment authorization processing failed".to_string()],
                            vec![],
                        ),
                    )
                    .await)
            }
        }
    }

    /// Runs the four storage steps, advancing the context after each
    async fn run_steps(
        &self,
        tx: &dyn AuthorizationTransaction,
        ctx: &mut TransactionContext,
        request: &AuthorizationRequest,
        rate: Rate,
    ) -> Result<u32, AuthorizationError> {
        // History step
        let occurrence = tx.allocate_occurrence().await?;
        let principal = Money::brl(request.amount);
        let correction = Money::brl(request.correction_amount);
        tx.insert_history(HistoryRecord::payment_authorization(
            request.claim_key,
            occurrence,
            ctx.transaction_date,
            ctx.transaction_time,
            principal,
            correction,
            request.beneficiary.clone(),
            rate,
            &request.operator_id,
        ))
        .await?;
        info!(authorization_id = %ctx.authorization_id, step = %ctx.step, occurrence, "step complete");
        ctx.advance()?;

        // ClaimMaster step
        tx.apply_payment(principal).await?;
        info!(authorization_id = %ctx.authorization_id, step = %ctx.step, "step complete");
        ctx.advance()?;

        // Accompaniment step
        let claim = tx.claim().await;
        tx.insert_accompaniment(
            AccompanimentRecord::new(
                claim.protocol,
                PAYMENT_AUTHORIZATION_OPERATION,
                ctx.transaction_date,
                occurrence,
                ctx.transaction_time,
                &request.operator_id,
            )
            .with_description("Payment authorization"),
        )
        .await?;
        info!(authorization_id = %ctx.authorization_id, step = %ctx.step, "step complete");
        ctx.advance()?;

        // Phases step
        self.phases
            .update_phases_in(
                tx.as_phase_access(),
                claim.protocol,
                PAYMENT_AUTHORIZATION_OPERATION,
                ctx.transaction_date,
                &request.operator_id,
            )
            .await?;
        info!(authorization_id = %ctx.authorization_id, step = %ctx.step, "step complete");
        ctx.advance()?;

        Ok(occurrence)
    }

    /// Dry-run validation: preconditions and routing, no writes
    pub async fn validate(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<ValidationReport, AuthorizationError> {
        let claim = self.load_claim(request).await?;
        let violations = preconditions::check(request, &claim);
        let required_service = self
            .router
            .determine_service(claim.product_code, request.contract_number);

        Ok(ValidationReport {
            valid: violations.is_empty(),
            errors: violations.iter().map(|v| v.to_string()).collect(),
            required_service,
        })
    }

    /// Cancels a pending authorization
    ///
    /// Only pending authorizations can be cancelled; anything already
    /// resolved stays as it is and `false` is returned.
    pub async fn cancel(
        &self,
        authorization_id: AuthorizationId,
        cancelled_by: &str,
        reason: &str,
    ) -> bool {
        let mut log = self.log.write().await;
        if let Some(record) = log.get_mut(&authorization_id) {
            if record.response.status == AuthorizationStatus::Pending {
                record.response.status = AuthorizationStatus::Cancelled;
                record
                    .response
                    .warnings
                    .push(format!("Cancelled by {cancelled_by}: {reason}"));
                info!(%authorization_id, cancelled_by, "authorization cancelled");
                return true;
            }
        }
        false
    }

    /// Re-runs a previous authorization's request as a new attempt
    pub async fn retry(
        &self,
        authorization_id: AuthorizationId,
    ) -> Result<AuthorizationResponse, AuthorizationError> {
        let request = {
            let log = self.log.read().await;
            log.get(&authorization_id)
                .map(|record| record.request.clone())
        }
        .ok_or(AuthorizationError::AuthorizationNotFound(authorization_id))?;

        info!(original = %authorization_id, "retrying authorization");
        self.authorize(request).await
    }

    /// Looks up a remembered authorization outcome
    pub async fn find_authorization(
        &self,
        authorization_id: AuthorizationId,
    ) -> Option<AuthorizationResponse> {
        self.log
            .read()
            .await
            .get(&authorization_id)
            .map(|record| record.response.clone())
    }

    async fn load_claim(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<domain_claims::Claim, AuthorizationError> {
        match self.store.get_claim(&request.claim_key).await {
            Ok(claim) => Ok(claim),
            Err(err) if err.is_not_found() => Err(AuthorizationError::ClaimNotFound(
                request.claim_key.to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn remember(
        &self,
        request: AuthorizationRequest,
        response: AuthorizationResponse,
    ) -> AuthorizationResponse {
        let mut log = self.log.write().await;
        log.insert(
            response.authorization_id,
            AuthorizationRecord {
                request,
                response: response.clone(),
            },
        );
        response
    }
}
