//! Request dispatch.
//!
//! Connects the verification service to its collaborators: an enrollment
//! lookup that fetches a user's reference signatures and a sink that
//! receives the result. Verification itself is CPU-bound and runs on the
//! blocking pool so lookups and deliveries for other requests keep moving.
//!
//! Every request ends with a definite outcome. Lookup failures become
//! computation errors; delivery failures are reported alongside the
//! outcome and never change it.

use crate::service::VerificationService;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sigauth_core::{Trajectory, VerificationOutcome};
use sigauth_ingestion::VerificationRequest;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Enrollment lookup failure.
#[derive(Error, Debug)]
pub enum LookupError {
    /// No enrollment exists for the user.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The enrollment store could not be reached or answered badly.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Result delivery failure.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The consumer refused the result.
    #[error("result rejected by consumer: {0}")]
    Rejected(String),

    /// The consumer could not be reached.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Source of a user's enrolled signatures.
pub trait EnrollmentLookup: Send + Sync {
    fn fetch_enrolled(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Trajectory>, LookupError>> + Send;
}

/// Consumer of verification results.
pub trait ResultSink: Send + Sync {
    fn deliver(
        &self,
        result: &VerificationResult,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// What is reported downstream for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    /// Correlation token from the request.
    pub token: String,
    pub user_id: String,
    pub outcome: VerificationOutcome,
    pub completed_at: DateTime<Utc>,
}

/// Whether the result reached the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Failed(String),
}

/// Result of handling one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub result: VerificationResult,
    pub delivery: DeliveryStatus,
}

/// Runs verification requests against a lookup and a sink.
pub struct Dispatcher<L, S> {
    service: Arc<VerificationService>,
    lookup: L,
    sink: S,
}

impl<L, S> Dispatcher<L, S>
where
    L: EnrollmentLookup,
    S: ResultSink,
{
    pub fn new(service: Arc<VerificationService>, lookup: L, sink: S) -> Self {
        Self {
            service,
            lookup,
            sink,
        }
    }

    /// Verify a request and deliver the result.
    #[tracing::instrument(skip_all, fields(token = %request.token, user_id = %request.user_id))]
    pub async fn handle(&self, request: VerificationRequest) -> DispatchReport {
        let VerificationRequest {
            token,
            user_id,
            candidates,
        } = request;

        let outcome = self.evaluate(&user_id, candidates).await;
        let result = VerificationResult {
            token,
            user_id,
            outcome,
            completed_at: Utc::now(),
        };

        let delivery = match self.sink.deliver(&result).await {
            Ok(()) => DeliveryStatus::Delivered,
            Err(e) => {
                tracing::error!(error = %e, outcome = result.outcome.kind(), "result delivery failed");
                DeliveryStatus::Failed(e.to_string())
            }
        };

        DispatchReport { result, delivery }
    }

    /// Fetch the enrollment and run verification off the async executor.
    pub async fn evaluate(&self, user_id: &str, candidates: Vec<Trajectory>) -> VerificationOutcome {
        let enrolled = match self.lookup.fetch_enrolled(user_id).await {
            Ok(enrolled) => enrolled,
            Err(e) => {
                tracing::warn!(error = %e, "enrollment lookup failed");
                return VerificationOutcome::computation_error(format!(
                    "enrollment lookup failed: {e}"
                ));
            }
        };
        tracing::debug!(enrolled = enrolled.len(), "enrollment fetched");

        let service = Arc::clone(&self.service);
        let task = tokio::task::spawn_blocking(move || service.verify(&candidates, &enrolled));
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "verification task aborted");
                VerificationOutcome::computation_error(format!("verification task failed: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fixtures::{circle, enrollment, line};
    use sigauth_core::InvalidInputReason;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryLookup(HashMap<String, Vec<Trajectory>>);

    impl EnrollmentLookup for MemoryLookup {
        async fn fetch_enrolled(&self, user_id: &str) -> Result<Vec<Trajectory>, LookupError> {
            self.0
                .get(user_id)
                .cloned()
                .ok_or_else(|| LookupError::UserNotFound(user_id.to_string()))
        }
    }

    struct UnreachableLookup;

    impl EnrollmentLookup for UnreachableLookup {
        async fn fetch_enrolled(&self, _user_id: &str) -> Result<Vec<Trajectory>, LookupError> {
            Err(anyhow::anyhow!("connection refused").into())
        }
    }

    #[derive(Default)]
    struct CollectingSink(Mutex<Vec<VerificationResult>>);

    impl ResultSink for CollectingSink {
        async fn deliver(&self, result: &VerificationResult) -> Result<(), DeliveryError> {
            self.0.lock().unwrap().push(result.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        async fn deliver(&self, _result: &VerificationResult) -> Result<(), DeliveryError> {
            Err(DeliveryError::Rejected("503 Service Unavailable".to_string()))
        }
    }

    fn lookup() -> MemoryLookup {
        let mut users = HashMap::new();
        users.insert("alice".to_string(), enrollment(5));
        users.insert("bob".to_string(), enrollment(3));
        MemoryLookup(users)
    }

    fn service() -> Arc<VerificationService> {
        Arc::new(VerificationService::default())
    }

    #[tokio::test]
    async fn test_accepted_and_delivered() {
        let dispatcher = Dispatcher::new(service(), lookup(), CollectingSink::default());
        let report = dispatcher
            .handle(VerificationRequest::new("t-1", "alice", vec![line(77)]))
            .await;

        assert_eq!(report.result.outcome, VerificationOutcome::Accepted);
        assert_eq!(report.delivery, DeliveryStatus::Delivered);

        let delivered = dispatcher.sink.0.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].token, "t-1");
    }

    #[tokio::test]
    async fn test_forgery_rejected() {
        let dispatcher = Dispatcher::new(service(), lookup(), CollectingSink::default());
        let report = dispatcher
            .handle(VerificationRequest::new("t-2", "alice", vec![circle()]))
            .await;
        assert_eq!(report.result.outcome, VerificationOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_small_enrollment_rejected_as_invalid() {
        let dispatcher = Dispatcher::new(service(), lookup(), CollectingSink::default());
        let report = dispatcher
            .handle(VerificationRequest::new("t-3", "bob", vec![line(77)]))
            .await;
        assert_eq!(
            report.result.outcome,
            VerificationOutcome::invalid(InvalidInputReason::InsufficientEnrollment)
        );
    }

    #[tokio::test]
    async fn test_unknown_user_is_computation_error() {
        let dispatcher = Dispatcher::new(service(), lookup(), CollectingSink::default());
        let report = dispatcher
            .handle(VerificationRequest::new("t-4", "mallory", vec![line(77)]))
            .await;

        match &report.result.outcome {
            VerificationOutcome::ComputationError { reason } => {
                assert!(reason.contains("user not found: mallory"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(report.delivery, DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn test_transport_failure_is_computation_error() {
        let dispatcher = Dispatcher::new(service(), UnreachableLookup, CollectingSink::default());
        let outcome = dispatcher.evaluate("alice", vec![line(77)]).await;
        assert_eq!(outcome.kind(), "computation_error");
        assert!(outcome.reason().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_outcome() {
        let dispatcher = Dispatcher::new(service(), lookup(), FailingSink);
        let report = dispatcher
            .handle(VerificationRequest::new("t-5", "alice", vec![line(77)]))
            .await;

        assert_eq!(report.result.outcome, VerificationOutcome::Accepted);
        match report.delivery {
            DeliveryStatus::Failed(msg) => assert!(msg.contains("503")),
            DeliveryStatus::Delivered => panic!("delivery should have failed"),
        }
    }

    #[test]
    fn test_result_serialization() {
        let result = VerificationResult {
            token: "t-6".to_string(),
            user_id: "alice".to_string(),
            outcome: VerificationOutcome::Rejected,
            completed_at: Utc::now(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["token"], "t-6");
        assert_eq!(value["outcome"]["status"], "rejected");
    }
}
