pub mod approvals;
pub mod audit;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod errors;
pub mod preview;
pub mod wizard;

#[cfg(test)]
mod test_support;

pub use approvals::{decide, decide_with_audit, ApprovalDecision};
pub use dashboard::{pending_approvals, KindFilter, ListingQuery, SortOrder};
pub use domain::document::{
    DocumentId, DocumentKind, DocumentRecord, DocumentStatus, DocumentSummary, DocumentTemplate,
    LineItem, StoredDocument,
};
pub use domain::locale::{Language, TextDirection};
pub use domain::principal::{Principal, PrincipalId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use preview::{DocumentPreview, PreviewError, PreviewRenderer};
pub use wizard::{
    SectionInput, SectionKind, StepOutcome, SubmissionState, WizardEngine, WizardError,
    WizardSession,
};
