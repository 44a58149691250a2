use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::document::{
    DocumentId, DocumentKind, DocumentRecord, DocumentStatus, DocumentSummary, StoredDocument,
};
use crate::domain::principal::Principal;
use crate::wizard::ports::{DocumentStore, IdentityProvider, Navigator, PersistenceError};

/// Process-local document store. New submissions land as `Pending`.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
    queued_failures: RwLock<VecDeque<PersistenceError>>,
    submissions: AtomicUsize,
}

impl InMemoryDocumentStore {
    /// The next `submit` call returns `error` instead of storing anything.
    pub async fn fail_next_submit(&self, error: PersistenceError) {
        self.queued_failures.write().await.push_back(error);
    }

    /// Successful `submit` calls so far.
    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn submit(
        &self,
        kind: DocumentKind,
        record: &DocumentRecord,
    ) -> Result<DocumentId, PersistenceError> {
        if let Some(error) = self.queued_failures.write().await.pop_front() {
            return Err(error);
        }
        if record.kind != kind {
            return Err(PersistenceError::Rejected(format!(
                "record of kind {} submitted as {}",
                record.kind.as_str(),
                kind.as_str()
            )));
        }

        let id = DocumentId(format!("{}-{}", kind.as_str(), Uuid::new_v4()));
        let stored = StoredDocument {
            id: id.clone(),
            status: DocumentStatus::Pending,
            record: record.clone(),
            updated_at: Utc::now(),
        };

        let mut documents = self.documents.write().await;
        if documents.contains_key(&id.0) {
            return Err(PersistenceError::Conflict(id.0));
        }
        documents.insert(id.0.clone(), stored);
        drop(documents);
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<StoredDocument>, PersistenceError> {
        let documents = self.documents.read().await;
        Ok(documents.get(&id.0).cloned())
    }

    async fn list_summaries(&self) -> Result<Vec<DocumentSummary>, PersistenceError> {
        let documents = self.documents.read().await;
        let mut stored: Vec<&StoredDocument> = documents.values().collect();
        stored.sort_by(|left, right| {
            left.record
                .created_at
                .cmp(&right.record.created_at)
                .then_with(|| left.id.0.cmp(&right.id.0))
        });
        Ok(stored.into_iter().map(StoredDocument::summary).collect())
    }

    async fn save(&self, document: StoredDocument) -> Result<(), PersistenceError> {
        let mut documents = self.documents.write().await;
        documents.insert(document.id.0.clone(), document);
        Ok(())
    }
}

/// Identity fixed at construction.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentity {
    principal: Option<Principal>,
}

impl StaticIdentity {
    pub fn signed_in(principal: Principal) -> Self {
        Self { principal: Some(principal) }
    }

    pub fn anonymous() -> Self {
        Self { principal: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<Principal> {
        self.principal.clone()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn on_cancel(&self) {}

    fn on_complete(&self, _record: &DocumentRecord, _id: &DocumentId) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationEvent {
    Cancelled,
    Completed { id: DocumentId, kind: DocumentKind },
}

/// Remembers every navigation callback it receives.
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    events: Arc<Mutex<Vec<NavigationEvent>>>,
}

impl RecordingNavigator {
    pub fn events(&self) -> Vec<NavigationEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn push(&self, event: NavigationEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

impl Navigator for RecordingNavigator {
    fn on_cancel(&self) {
        self.push(NavigationEvent::Cancelled);
    }

    fn on_complete(&self, record: &DocumentRecord, id: &DocumentId) {
        self.push(NavigationEvent::Completed { id: id.clone(), kind: record.kind });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{InMemoryDocumentStore, NavigationEvent, RecordingNavigator, StaticIdentity};
    use crate::domain::document::{
        BasicInfo, DocumentKind, DocumentRecord, DocumentStatus, DocumentTemplate, LineItem, Terms,
    };
    use crate::domain::principal::{Principal, PrincipalId};
    use crate::wizard::ports::{DocumentStore, IdentityProvider, Navigator, PersistenceError};

    fn record(kind: DocumentKind, title: &str, day: u32) -> DocumentRecord {
        let items = vec![LineItem {
            name: "Paper".to_string(),
            description: None,
            quantity: 2,
            unit_price: Decimal::new(1250, 2),
        }];
        DocumentRecord {
            kind,
            basic: BasicInfo {
                title: title.to_string(),
                reference: "REF-1".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, day).expect("date"),
                client_name: "Acme".to_string(),
                client_email: "a@acme.com".to_string(),
                client_phone: None,
            },
            grand_total: crate::domain::document::grand_total(&items),
            items,
            terms: Terms {
                payment_terms: "Net 30".to_string(),
                delivery_terms: None,
                additional_notes: None,
            },
            template: DocumentTemplate::Standard,
            created_by: PrincipalId("user-1".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).single().expect("timestamp"),
        }
    }

    #[tokio::test]
    async fn submit_stores_pending_document_with_kind_prefixed_id() {
        let store = InMemoryDocumentStore::default();
        let id = store
            .submit(DocumentKind::Quotation, &record(DocumentKind::Quotation, "Q", 1))
            .await
            .expect("submit");

        assert!(id.0.starts_with("quotation-"));
        let stored = store.find_by_id(&id).await.expect("find").expect("present");
        assert_eq!(stored.status, DocumentStatus::Pending);
        assert_eq!(stored.record.grand_total, Decimal::new(2500, 2));
        assert_eq!(store.submission_count(), 1);
    }

    #[tokio::test]
    async fn queued_failure_is_returned_once() {
        let store = InMemoryDocumentStore::default();
        store.fail_next_submit(PersistenceError::Unavailable("offline".to_string())).await;

        let first = store.submit(DocumentKind::Quotation, &record(DocumentKind::Quotation, "Q", 1)).await;
        assert_eq!(first, Err(PersistenceError::Unavailable("offline".to_string())));
        assert!(store.is_empty().await);

        store
            .submit(DocumentKind::Quotation, &record(DocumentKind::Quotation, "Q", 1))
            .await
            .expect("second attempt succeeds");
        assert_eq!(store.len().await, 1);
        assert_eq!(store.submission_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_submissions_are_all_counted() {
        let store = Arc::new(InMemoryDocumentStore::default());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .submit(DocumentKind::Quotation, &record(DocumentKind::Quotation, "Q", 1))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("submit");
        }

        assert_eq!(store.submission_count(), 16);
        assert_eq!(store.len().await, 16);
    }

    #[tokio::test]
    async fn mismatched_kind_is_rejected() {
        let store = InMemoryDocumentStore::default();
        let result =
            store.submit(DocumentKind::Quotation, &record(DocumentKind::PurchaseOrder, "PO", 1)).await;
        assert!(matches!(result, Err(PersistenceError::Rejected(_))));
    }

    #[tokio::test]
    async fn summaries_are_listed_oldest_first() {
        let store = InMemoryDocumentStore::default();
        store
            .submit(DocumentKind::Quotation, &record(DocumentKind::Quotation, "Later", 5))
            .await
            .expect("submit");
        store
            .submit(DocumentKind::PurchaseOrder, &record(DocumentKind::PurchaseOrder, "Earlier", 2))
            .await
            .expect("submit");

        let titles: Vec<String> = store
            .list_summaries()
            .await
            .expect("list")
            .into_iter()
            .map(|summary| summary.title)
            .collect();
        assert_eq!(titles, vec!["Earlier".to_string(), "Later".to_string()]);
    }

    #[test]
    fn static_identity_reports_configured_principal() {
        let signed_in = StaticIdentity::signed_in(Principal::new("user-1", "ops@acme.com"));
        assert_eq!(signed_in.current_user().map(|user| user.id.0), Some("user-1".to_string()));
        assert!(StaticIdentity::anonymous().current_user().is_none());
    }

    #[test]
    fn recording_navigator_keeps_callbacks_in_order() {
        let navigator = RecordingNavigator::default();
        let document = record(DocumentKind::SalesAgreement, "SA", 3);
        navigator.on_cancel();
        navigator.on_complete(&document, &crate::domain::document::DocumentId("sa-1".to_string()));

        assert_eq!(
            navigator.events(),
            vec![
                NavigationEvent::Cancelled,
                NavigationEvent::Completed {
                    id: crate::domain::document::DocumentId("sa-1".to_string()),
                    kind: DocumentKind::SalesAgreement,
                },
            ]
        );
    }
}
