use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::document::{DocumentId, DocumentStatus, StoredDocument};
use crate::errors::ApplicationError;
use crate::wizard::DocumentStore;

/// Reviewer action on a stored document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject,
    /// Rejected documents go back to draft for revision.
    Revise,
    Resubmit,
}

impl ApprovalDecision {
    pub fn target_status(self) -> DocumentStatus {
        match self {
            Self::Approve => DocumentStatus::Approved,
            Self::Reject => DocumentStatus::Rejected,
            Self::Revise => DocumentStatus::Draft,
            Self::Resubmit => DocumentStatus::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Revise => "revise",
            Self::Resubmit => "resubmit",
        }
    }
}

/// Loads `id`, applies `decision` and saves the result.
pub async fn decide<S>(
    store: &S,
    id: &DocumentId,
    decision: ApprovalDecision,
) -> Result<StoredDocument, ApplicationError>
where
    S: DocumentStore + ?Sized,
{
    let mut document = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::NotFound(format!("document `{}`", id.0)))?;

    let from = document.status.clone();
    document.transition_to(decision.target_status())?;
    store.save(document.clone()).await?;

    info!(
        event_name = "approvals.decision_applied",
        document_id = %id.0,
        decision = decision.as_str(),
        from = from.as_str(),
        to = document.status.as_str(),
        "document status updated"
    );
    Ok(document)
}

/// [`decide`], recording the outcome on `sink`.
pub async fn decide_with_audit<S, A>(
    store: &S,
    id: &DocumentId,
    decision: ApprovalDecision,
    sink: &A,
    audit: &AuditContext,
) -> Result<StoredDocument, ApplicationError>
where
    S: DocumentStore + ?Sized,
    A: AuditSink + ?Sized,
{
    let result = decide(store, id, decision).await;
    let context = audit.clone().with_document(id.clone());
    match &result {
        Ok(document) => sink.emit(
            AuditEvent::new(
                &context,
                "approvals.decision_applied",
                AuditCategory::Approval,
                AuditOutcome::Success,
            )
            .with_metadata("decision", decision.as_str())
            .with_metadata("status", document.status.as_str()),
        ),
        Err(error) => sink.emit(
            AuditEvent::new(
                &context,
                "approvals.decision_rejected",
                AuditCategory::Approval,
                AuditOutcome::Rejected,
            )
            .with_metadata("decision", decision.as_str())
            .with_metadata("error", error.to_string()),
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{decide, decide_with_audit, ApprovalDecision};
    use crate::audit::{AuditContext, AuditOutcome, InMemoryAuditSink};
    use crate::domain::document::{DocumentId, DocumentStatus};
    use crate::errors::{ApplicationError, DomainError};
    use crate::test_support::stored_with_status;
    use crate::wizard::{DocumentStore, InMemoryDocumentStore};

    async fn store_with(id: &str, status: DocumentStatus) -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::default();
        store.save(stored_with_status(id, status)).await.expect("seed");
        store
    }

    #[tokio::test]
    async fn approve_moves_pending_to_approved_and_saves() {
        let store = store_with("q-1", DocumentStatus::Pending).await;
        let id = DocumentId("q-1".to_owned());

        let updated = decide(&store, &id, ApprovalDecision::Approve).await.expect("approve");

        assert_eq!(updated.status, DocumentStatus::Approved);
        let reloaded = store.find_by_id(&id).await.expect("find").expect("present");
        assert_eq!(reloaded.status, DocumentStatus::Approved);
    }

    #[tokio::test]
    async fn rejected_document_can_be_revised_and_resubmitted() {
        let store = store_with("q-2", DocumentStatus::Pending).await;
        let id = DocumentId("q-2".to_owned());

        decide(&store, &id, ApprovalDecision::Reject).await.expect("reject");
        decide(&store, &id, ApprovalDecision::Revise).await.expect("revise");
        let resubmitted = decide(&store, &id, ApprovalDecision::Resubmit).await.expect("resubmit");

        assert_eq!(resubmitted.status, DocumentStatus::Pending);
    }

    #[tokio::test]
    async fn illegal_transition_is_a_domain_error_and_nothing_is_saved() {
        let store = store_with("q-3", DocumentStatus::Approved).await;
        let id = DocumentId("q-3".to_owned());

        let error = decide(&store, &id, ApprovalDecision::Reject).await.expect_err("approved is final");

        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::InvalidStatusTransition {
                from: DocumentStatus::Approved,
                to: DocumentStatus::Rejected,
            })
        );
        let reloaded = store.find_by_id(&id).await.expect("find").expect("present");
        assert_eq!(reloaded.status, DocumentStatus::Approved);
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let store = InMemoryDocumentStore::default();
        let error = decide(&store, &DocumentId("ghost".to_owned()), ApprovalDecision::Approve)
            .await
            .expect_err("missing");
        assert!(matches!(error, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn audited_decisions_record_outcome() {
        let store = store_with("q-4", DocumentStatus::Pending).await;
        let sink = InMemoryAuditSink::default();
        let audit = AuditContext::new(None, "req-9", "reviewer-1");
        let id = DocumentId("q-4".to_owned());

        decide_with_audit(&store, &id, ApprovalDecision::Approve, &sink, &audit)
            .await
            .expect("approve");
        let _ = decide_with_audit(&store, &id, ApprovalDecision::Approve, &sink, &audit).await;

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].outcome, AuditOutcome::Success);
        assert_eq!(events[0].document_id, Some(id.clone()));
        assert_eq!(events[1].outcome, AuditOutcome::Rejected);
        assert_eq!(events[1].event_type, "approvals.decision_rejected");
    }
}
