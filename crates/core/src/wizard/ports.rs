//! Collaborators the wizard depends on but does not implement.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::document::{
    DocumentId, DocumentKind, DocumentRecord, DocumentSummary, StoredDocument,
};
use crate::domain::principal::Principal;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document conflicts with an existing record: {0}")]
    Conflict(String),
    #[error("document rejected by store: {0}")]
    Rejected(String),
    #[error("document `{0}` not found")]
    NotFound(String),
}

/// Supplies the authenticated principal. Resolved before the wizard is reachable.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<Principal>;
}

/// Writes document headers and their line items as related records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn submit(
        &self,
        kind: DocumentKind,
        record: &DocumentRecord,
    ) -> Result<DocumentId, PersistenceError>;

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<StoredDocument>, PersistenceError>;

    async fn list_summaries(&self) -> Result<Vec<DocumentSummary>, PersistenceError>;

    async fn save(&self, document: StoredDocument) -> Result<(), PersistenceError>;
}

/// Fire-and-forget navigation hooks.
pub trait Navigator: Send + Sync {
    fn on_cancel(&self);
    fn on_complete(&self, record: &DocumentRecord, id: &DocumentId);
}
