//! Multi-section document creation wizard.

pub mod defaults;
pub mod engine;
pub mod memory;
pub mod ports;
pub mod sections;
pub mod session;
pub mod validation;

pub use defaults::{reference_number, SectionDefaults};
pub use engine::{StepOutcome, WizardEngine};
pub use memory::{
    InMemoryDocumentStore, NavigationEvent, NoopNavigator, RecordingNavigator, StaticIdentity,
};
pub use ports::{DocumentStore, IdentityProvider, Navigator, PersistenceError};
pub use sections::{
    BasicInfoInput, LineItemInput, LineItemsInput, SectionInput, SectionKind, SectionRecord,
    TemplateChoiceInput, TermsInput, Validation, SECTION_COUNT,
};
pub use session::{
    Accumulated, Advance, CancelRejected, SubmissionState, WizardAction, WizardError,
    WizardSession, WizardSessionId, WizardState,
};
pub use validation::{FieldError, FieldErrors};
