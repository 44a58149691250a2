use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, NoopAuditSink};
use crate::config::WizardConfig;
use crate::domain::document::{DocumentId, DocumentKind, DocumentRecord};
use crate::wizard::defaults::SectionDefaults;
use crate::wizard::ports::{DocumentStore, IdentityProvider, Navigator};
use crate::wizard::sections::{SectionInput, SectionKind};
use crate::wizard::session::{Advance, CancelRejected, WizardError, WizardSession, WizardSessionId};
use crate::wizard::validation::FieldErrors;

/// What an engine step did to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Invalid(FieldErrors),
    Moved { from: SectionKind, to: SectionKind },
    Completed { id: DocumentId, record: DocumentRecord },
}

/// Drives [`WizardSession`]s against the identity, store and navigation ports.
pub struct WizardEngine<S, I, N> {
    store: S,
    identity: I,
    navigator: N,
    settings: WizardConfig,
    audit: Arc<dyn AuditSink>,
}

impl<S, I, N> WizardEngine<S, I, N>
where
    S: DocumentStore,
    I: IdentityProvider,
    N: Navigator,
{
    pub fn new(store: S, identity: I, navigator: N, settings: WizardConfig) -> Self {
        Self { store, identity, navigator, settings, audit: Arc::new(NoopAuditSink) }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &WizardConfig {
        &self.settings
    }

    pub fn initialize(&self, kind: DocumentKind) -> WizardSession {
        let session = WizardSession::initialize(kind, SectionDefaults::generate(kind, &self.settings));
        info!(
            event_name = "wizard.session_started",
            session_id = %session.id(),
            document_kind = kind.as_str(),
            "wizard session started"
        );
        session
    }

    /// Validates and confirms the active section. Confirming the last section submits.
    pub async fn advance(
        &self,
        session: &mut WizardSession,
        input: &SectionInput,
    ) -> Result<StepOutcome, WizardError> {
        let section = session.current_section();
        let step = session.advance(input).map_err(|error| self.rejected(session, error))?;
        match step {
            Advance::Invalid(errors) => {
                info!(
                    event_name = "wizard.section_rejected",
                    session_id = %session.id(),
                    section = section.name(),
                    error_count = errors.len(),
                    "section input failed validation"
                );
                self.audit.emit(
                    AuditEvent::new(
                        &self.audit_context(session),
                        "wizard.section_rejected",
                        AuditCategory::Validation,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("section", section.name())
                    .with_metadata("errors", errors.to_string()),
                );
                Ok(StepOutcome::Invalid(errors))
            }
            Advance::Moved { from, to } => {
                self.section_confirmed(session, from);
                Ok(StepOutcome::Moved { from, to })
            }
            Advance::ReadyToSubmit => {
                self.section_confirmed(session, section);
                self.finalize(session).await
            }
        }
    }

    pub fn retreat(&self, session: &mut WizardSession) -> Result<SectionKind, WizardError> {
        let section = session.retreat().map_err(|error| self.rejected(session, error))?;
        info!(
            event_name = "wizard.section_revisited",
            session_id = %session.id(),
            section = section.name(),
            "returned to earlier section"
        );
        Ok(section)
    }

    /// Discards the session and notifies the navigator. Nothing is persisted.
    pub fn cancel(&self, session: WizardSession) -> Result<WizardSessionId, CancelRejected> {
        let context = self.audit_context(&session);
        let id = match session.cancel() {
            Ok(id) => id,
            Err(rejected) => {
                let error = self.rejected(&rejected.session, rejected.error);
                return Err(CancelRejected { session: rejected.session, error });
            }
        };
        info!(event_name = "wizard.cancelled", session_id = %id, "wizard session cancelled");
        self.audit.emit(AuditEvent::new(
            &context,
            "wizard.cancelled",
            AuditCategory::Navigation,
            AuditOutcome::Success,
        ));
        self.navigator.on_cancel();
        Ok(id)
    }

    /// Resubmits a failed session without re-entering any section.
    pub async fn retry(&self, session: &mut WizardSession) -> Result<StepOutcome, WizardError> {
        session.retry().map_err(|error| self.rejected(session, error))?;
        self.finalize(session).await
    }

    pub fn resume_editing(&self, session: &mut WizardSession) -> Result<SectionKind, WizardError> {
        session.resume_editing().map_err(|error| self.rejected(session, error))?;
        Ok(session.current_section())
    }

    async fn finalize(&self, session: &mut WizardSession) -> Result<StepOutcome, WizardError> {
        info!(
            event_name = "wizard.submission_started",
            session_id = %session.id(),
            document_kind = session.kind().as_str(),
            "submitting document"
        );

        let Some(principal) = self.identity.current_user() else {
            return Err(self.fail(session, WizardError::Unauthenticated));
        };

        let record = match session.assemble_record(principal.id.clone(), Utc::now()) {
            Ok(record) => record,
            Err(error) => return Err(self.fail(session, error)),
        };

        match self.store.submit(session.kind(), &record).await {
            Ok(id) => {
                session.mark_completed(id.clone());
                info!(
                    event_name = "wizard.submission_completed",
                    session_id = %session.id(),
                    document_id = %id.0,
                    grand_total = %record.grand_total,
                    "document stored"
                );
                self.audit.emit(
                    AuditEvent::new(
                        &self.audit_context(session).with_document(id.clone()),
                        "wizard.submission_completed",
                        AuditCategory::Persistence,
                        AuditOutcome::Success,
                    )
                    .with_metadata("grand_total", record.grand_total.to_string())
                    .with_metadata("line_items", record.items.len().to_string()),
                );
                self.navigator.on_complete(&record, &id);
                Ok(StepOutcome::Completed { id, record })
            }
            Err(error) => Err(self.fail(session, WizardError::from(error))),
        }
    }

    fn section_confirmed(&self, session: &WizardSession, section: SectionKind) {
        info!(
            event_name = "wizard.section_confirmed",
            session_id = %session.id(),
            section = section.name(),
            "section confirmed"
        );
        self.audit.emit(
            AuditEvent::new(
                &self.audit_context(session),
                "wizard.section_confirmed",
                AuditCategory::Wizard,
                AuditOutcome::Success,
            )
            .with_metadata("section", section.name()),
        );
    }

    fn rejected(&self, session: &WizardSession, error: WizardError) -> WizardError {
        warn!(
            event_name = "wizard.transition_rejected",
            session_id = %session.id(),
            error = %error,
            "wizard transition rejected"
        );
        self.audit.emit(
            AuditEvent::new(
                &self.audit_context(session),
                "wizard.transition_rejected",
                AuditCategory::Wizard,
                AuditOutcome::Rejected,
            )
            .with_metadata("error", error.to_string()),
        );
        error
    }

    fn fail(&self, session: &mut WizardSession, error: WizardError) -> WizardError {
        session.mark_failed(error.to_string());
        warn!(
            event_name = "wizard.submission_failed",
            session_id = %session.id(),
            error = %error,
            "document submission failed"
        );
        self.audit.emit(
            AuditEvent::new(
                &self.audit_context(session),
                "wizard.submission_failed",
                AuditCategory::Persistence,
                AuditOutcome::Failed,
            )
            .with_metadata("error", error.to_string()),
        );
        error
    }

    fn audit_context(&self, session: &WizardSession) -> AuditContext {
        let actor = self
            .identity
            .current_user()
            .map(|principal| principal.id.0)
            .unwrap_or_else(|| "anonymous".to_owned());
        AuditContext::new(Some(session.id().clone()), session.id().0.clone(), actor)
    }
}
