use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};

use super::errors::{AlreadyInFlight, OrchestrationError};
use super::guard::InFlightApprovals;
use super::types::{
    ApprovalRequest, ApprovalRun, OrchestrationOutcome, GENERATION_CANCELLED_REASON,
    GENERATION_FAILED_REASON, NO_PROJECT_REASON,
};
use crate::backend::{BackendApi, GenerateInvoiceRequest, SubscriptionAction};
use crate::notify::NotificationSink;
use crate::observability::{OperationTimer, OrchestrationMetrics};
use crate::retry::{retry_with_backoff, AttemptFailure, RetryError, RetryPolicy};
use crate::shutdown::ShutdownSignal;
use crate::telemetry::{create_approval_span, generate_correlation_id};

/// Coordinates a subscription approval and the invoice generation that
/// depends on it.
///
/// The approval call is issued once and never retried. Invoice generation is
/// retried under the configured [`RetryPolicy`]. Every run reports exactly one
/// [`OrchestrationOutcome`] to the notification sink.
pub struct ActionOrchestrator {
    backend: Arc<dyn BackendApi>,
    sink: Arc<dyn NotificationSink>,
    policy: RetryPolicy,
    in_flight: InFlightApprovals,
    shutdown: ShutdownSignal,
    metrics: Arc<OrchestrationMetrics>,
}

impl ActionOrchestrator {
    pub fn new(backend: Arc<dyn BackendApi>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            backend,
            sink,
            policy: RetryPolicy::default(),
            in_flight: InFlightApprovals::new(),
            shutdown: ShutdownSignal::never(),
            metrics: Arc::new(OrchestrationMetrics::new()),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_in_flight(mut self, in_flight: InFlightApprovals) -> Self {
        self.in_flight = in_flight;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<OrchestrationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn in_flight(&self) -> &InFlightApprovals {
        &self.in_flight
    }

    pub fn metrics(&self) -> &OrchestrationMetrics {
        &self.metrics
    }

    /// Approve the subscription, then generate its invoice
    pub async fn approve_and_generate(&self, request: &ApprovalRequest) -> OrchestrationOutcome {
        self.run_approval(request).await.outcome
    }

    /// Like [`Self::approve_and_generate`], refusing to start while another
    /// run holds the same request id
    pub async fn try_approve(
        &self,
        request: &ApprovalRequest,
    ) -> Result<OrchestrationOutcome, AlreadyInFlight> {
        let _ticket = self
            .in_flight
            .try_acquire(&request.id)
            .ok_or_else(|| AlreadyInFlight {
                id: request.id.clone(),
            })?;

        Ok(self.approve_and_generate(request).await)
    }

    /// Full run, returning attempt records and the typed error alongside the outcome
    pub async fn run_approval(&self, request: &ApprovalRequest) -> ApprovalRun {
        let correlation_id = generate_correlation_id();
        let span = create_approval_span(
            "approve_and_generate",
            &request.id,
            &request.plan,
            &correlation_id,
        );

        async {
            let timer = OperationTimer::new("approve_and_generate");
            self.metrics.record_run_started();

            let run = self.approve(request).await;
            self.report(&run.outcome);

            timer.finish();
            run
        }
        .instrument(span)
        .await
    }

    /// Generation only, for an approval that already went through but left no
    /// invoice behind
    pub async fn regenerate_invoice(
        &self,
        request: &ApprovalRequest,
        project_id: &str,
    ) -> OrchestrationOutcome {
        let correlation_id = generate_correlation_id();
        let span = create_approval_span(
            "regenerate_invoice",
            &request.id,
            &request.plan,
            &correlation_id,
        );

        async {
            self.metrics.record_run_started();
            let run = self.generate(request, project_id).await;
            self.report(&run.outcome);
            run.outcome
        }
        .instrument(span)
        .await
    }

    async fn approve(&self, request: &ApprovalRequest) -> ApprovalRun {
        if request.id.trim().is_empty() {
            warn!("Refusing approval request without an id");
            self.metrics.record_approval_failed();
            return ApprovalRun::failed(OrchestrationError::EmptyRequestId);
        }

        info!(user.id = %request.subject_user_id, "Approving subscription");

        let response = match self
            .backend
            .transition(&request.id, SubscriptionAction::Approve)
            .await
        {
            Ok(response) => response,
            Err(source) => {
                error!(error = %source, "Subscription approval failed");
                self.metrics.record_approval_failed();
                return ApprovalRun::failed(OrchestrationError::PrimaryTransition { source });
            }
        };

        let Some(project) = response.project else {
            info!("Subscription approved without a linked project");
            self.metrics.record_without_project();
            return ApprovalRun::settled(OrchestrationOutcome::without_document(NO_PROJECT_REASON));
        };

        info!(project.id = %project.id, "Subscription approved, generating invoice");
        self.generate(request, &project.id).await
    }

    async fn generate(&self, request: &ApprovalRequest, project_id: &str) -> ApprovalRun {
        let invoice_request = GenerateInvoiceRequest {
            user_id: request.subject_user_id.clone(),
            project_id: project_id.to_string(),
            plan: request.plan.clone(),
        };
        let invoice_request = &invoice_request;
        let backend = self.backend.as_ref();
        let mut shutdown = self.shutdown.clone();

        let run = retry_with_backoff(&self.policy, &mut shutdown, move |attempt| {
            debug!(attempt, "Requesting invoice generation");
            backend.generate_document(invoice_request)
        })
        .await;

        self.metrics.record_generation_attempts(run.attempt_count());
        for attempt in run.attempts.iter().filter(|attempt| attempt.timed_out) {
            debug!(attempt = attempt.attempt_number, "Counting timed out attempt");
            self.metrics.record_generation_timeout();
        }

        match run.result {
            Ok(invoice) => {
                info!(
                    reference_number = %invoice.reference_number,
                    attempts = run.attempts.len(),
                    "Invoice generated"
                );
                self.metrics.record_document_generated();
                ApprovalRun {
                    outcome: OrchestrationOutcome::ApprovedWithDocument {
                        reference_number: invoice.reference_number,
                    },
                    attempts: run.attempts,
                    error: None,
                }
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                let last = match last {
                    AttemptFailure::TimedOut(limit) => OrchestrationError::SideEffectTimeout {
                        attempt: attempts,
                        timeout_ms: limit.as_millis() as u64,
                    },
                    AttemptFailure::Failed(source) => OrchestrationError::SideEffectAttempt {
                        attempt: attempts,
                        source,
                    },
                };
                warn!(attempts, last_error = %last, "Invoice generation exhausted its retries");
                self.metrics.record_generation_exhausted();
                ApprovalRun {
                    outcome: OrchestrationOutcome::without_document(GENERATION_FAILED_REASON),
                    attempts: run.attempts,
                    error: Some(OrchestrationError::SideEffectExhausted {
                        attempts,
                        last: Box::new(last),
                    }),
                }
            }
            Err(RetryError::Cancelled { attempts }) => {
                warn!(attempts, "Invoice generation cancelled by shutdown");
                self.metrics.record_run_cancelled();
                ApprovalRun {
                    outcome: OrchestrationOutcome::without_document(GENERATION_CANCELLED_REASON),
                    attempts: run.attempts,
                    error: Some(OrchestrationError::Cancelled { attempts }),
                }
            }
        }
    }

    /// Best-effort delivery; a failing sink never changes the outcome
    fn report(&self, outcome: &OrchestrationOutcome) {
        match self.sink.report(outcome) {
            Ok(()) => debug!("Outcome reported"),
            Err(e) => warn!(error = %e, "Failed to deliver outcome notification"),
        }
    }
}
