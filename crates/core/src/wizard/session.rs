use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::document::{
    grand_total, BasicInfo, DocumentId, DocumentKind, DocumentRecord, DocumentTemplate, LineItem,
    Terms,
};
use crate::domain::principal::PrincipalId;
use crate::wizard::defaults::SectionDefaults;
use crate::wizard::ports::PersistenceError;
use crate::wizard::sections::{SectionInput, SectionKind, SectionRecord, Validation};
use crate::wizard::validation::FieldErrors;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WizardSessionId(pub String);

impl WizardSessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for WizardSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Editing,
    Submitting,
    Failed,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub section_index: usize,
    pub submission: SubmissionState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardAction {
    Advance,
    Retreat,
    Cancel,
    Finalize,
    Retry,
    ResumeEditing,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("{action:?} is not allowed in state {state:?}")]
    IllegalTransition { state: WizardState, action: WizardAction },
    #[error("input for section {received:?} submitted while {expected:?} is active")]
    SectionMismatch { expected: SectionKind, received: SectionKind },
    #[error("no authenticated user is available to own the document")]
    Unauthenticated,
    #[error("cannot finalize before sections {missing:?} are confirmed")]
    IncompleteSession { missing: Vec<SectionKind> },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result of a synchronous `advance` on the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    Invalid(FieldErrors),
    Moved { from: SectionKind, to: SectionKind },
    /// The last section was confirmed; the session is now `Submitting`.
    ReadyToSubmit,
}

/// Confirmed section records, in the order they were first confirmed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Accumulated {
    entries: Vec<SectionRecord>,
}

impl Accumulated {
    /// Overwrites a section's earlier record in place.
    pub fn insert(&mut self, record: SectionRecord) {
        let kind = record.kind();
        match self.entries.iter_mut().find(|entry| entry.kind() == kind) {
            Some(slot) => *slot = record,
            None => self.entries.push(record),
        }
    }

    pub fn get(&self, section: SectionKind) -> Option<&SectionRecord> {
        self.entries.iter().find(|entry| entry.kind() == section)
    }

    pub fn contains(&self, section: SectionKind) -> bool {
        self.get(section).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionRecord> {
        self.entries.iter()
    }

    pub fn sections(&self) -> Vec<SectionKind> {
        self.entries.iter().map(SectionRecord::kind).collect()
    }

    pub fn missing(&self) -> Vec<SectionKind> {
        SectionKind::ORDER.into_iter().filter(|section| !self.contains(*section)).collect()
    }

    pub fn basic_info(&self) -> Option<&BasicInfo> {
        match self.get(SectionKind::BasicInfo) {
            Some(SectionRecord::BasicInfo(basic)) => Some(basic),
            _ => None,
        }
    }

    pub fn line_items(&self) -> Option<&[LineItem]> {
        match self.get(SectionKind::LineItems) {
            Some(SectionRecord::LineItems(items)) => Some(items),
            _ => None,
        }
    }

    pub fn terms(&self) -> Option<&Terms> {
        match self.get(SectionKind::Terms) {
            Some(SectionRecord::Terms(terms)) => Some(terms),
            _ => None,
        }
    }

    pub fn template(&self) -> Option<DocumentTemplate> {
        match self.get(SectionKind::TemplateChoice) {
            Some(SectionRecord::TemplateChoice(template)) => Some(*template),
            _ => None,
        }
    }
}

/// Returned by [`WizardSession::cancel`] when the session cannot be discarded.
#[derive(Debug)]
pub struct CancelRejected {
    pub session: WizardSession,
    pub error: WizardError,
}

/// One open wizard instance. Owned by the interaction that created it.
#[derive(Clone, Debug)]
pub struct WizardSession {
    id: WizardSessionId,
    kind: DocumentKind,
    section_index: usize,
    accumulated: Accumulated,
    submission: SubmissionState,
    defaults: SectionDefaults,
    failure: Option<String>,
    stored_id: Option<DocumentId>,
}

impl WizardSession {
    pub fn initialize(kind: DocumentKind, defaults: SectionDefaults) -> Self {
        Self {
            id: WizardSessionId::generate(),
            kind,
            section_index: 0,
            accumulated: Accumulated::default(),
            submission: SubmissionState::Editing,
            defaults,
            failure: None,
            stored_id: None,
        }
    }

    pub fn id(&self) -> &WizardSessionId {
        &self.id
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn current_section(&self) -> SectionKind {
        SectionKind::ORDER[self.section_index]
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submission
    }

    pub fn state(&self) -> WizardState {
        WizardState { section_index: self.section_index, submission: self.submission }
    }

    pub fn is_submitting(&self) -> bool {
        self.submission == SubmissionState::Submitting
    }

    pub fn accumulated(&self) -> &Accumulated {
        &self.accumulated
    }

    pub fn defaults(&self) -> &SectionDefaults {
        &self.defaults
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn stored_id(&self) -> Option<&DocumentId> {
        self.stored_id.as_ref()
    }

    /// Values to refill a section's inputs: the confirmed record if any, else defaults.
    pub fn section_input(&self, section: SectionKind) -> SectionInput {
        self.accumulated
            .get(section)
            .map(SectionRecord::to_input)
            .unwrap_or_else(|| self.defaults.input_for(section))
    }

    pub fn current_input(&self) -> SectionInput {
        self.section_input(self.current_section())
    }

    pub fn validate_current_section(&self, input: &SectionInput) -> Result<Validation, WizardError> {
        let expected = self.current_section();
        if input.kind() != expected {
            return Err(WizardError::SectionMismatch { expected, received: input.kind() });
        }
        Ok(input.validate())
    }

    pub fn advance(&mut self, input: &SectionInput) -> Result<Advance, WizardError> {
        self.require(SubmissionState::Editing, WizardAction::Advance)?;

        let record = match self.validate_current_section(input)? {
            Validation::Valid(record) => record,
            Validation::Invalid(errors) => return Ok(Advance::Invalid(errors)),
        };

        let from = self.current_section();
        self.accumulated.insert(record);

        if from.is_last() {
            self.submission = SubmissionState::Submitting;
            self.failure = None;
            return Ok(Advance::ReadyToSubmit);
        }

        self.section_index += 1;
        Ok(Advance::Moved { from, to: self.current_section() })
    }

    pub fn retreat(&mut self) -> Result<SectionKind, WizardError> {
        if self.submission != SubmissionState::Editing || self.section_index == 0 {
            return Err(self.illegal(WizardAction::Retreat));
        }

        self.section_index -= 1;
        Ok(self.current_section())
    }

    /// Discards the session. Nothing it accumulated is persisted.
    pub fn cancel(self) -> Result<WizardSessionId, CancelRejected> {
        match self.submission {
            SubmissionState::Editing | SubmissionState::Failed => Ok(self.id),
            SubmissionState::Submitting | SubmissionState::Completed => {
                let error = self.illegal(WizardAction::Cancel);
                Err(CancelRejected { session: self, error })
            }
        }
    }

    /// Failed -> Submitting, keeping every confirmed section.
    pub fn retry(&mut self) -> Result<(), WizardError> {
        self.require(SubmissionState::Failed, WizardAction::Retry)?;
        self.submission = SubmissionState::Submitting;
        self.failure = None;
        Ok(())
    }

    /// Failed -> Editing on the last section.
    pub fn resume_editing(&mut self) -> Result<(), WizardError> {
        self.require(SubmissionState::Failed, WizardAction::ResumeEditing)?;
        self.submission = SubmissionState::Editing;
        Ok(())
    }

    pub fn assemble_record(
        &self,
        created_by: PrincipalId,
        created_at: DateTime<Utc>,
    ) -> Result<DocumentRecord, WizardError> {
        self.require(SubmissionState::Submitting, WizardAction::Finalize)?;

        let accumulated = &self.accumulated;
        let (Some(basic), Some(items), Some(terms), Some(template)) = (
            accumulated.basic_info(),
            accumulated.line_items(),
            accumulated.terms(),
            accumulated.template(),
        ) else {
            return Err(WizardError::IncompleteSession { missing: accumulated.missing() });
        };

        Ok(DocumentRecord {
            kind: self.kind,
            basic: basic.clone(),
            items: items.to_vec(),
            terms: terms.clone(),
            template,
            grand_total: grand_total(items),
            created_by,
            created_at,
        })
    }

    pub(crate) fn mark_completed(&mut self, id: DocumentId) {
        self.submission = SubmissionState::Completed;
        self.stored_id = Some(id);
        self.failure = None;
    }

    pub(crate) fn mark_failed(&mut self, reason: impl Into<String>) {
        self.submission = SubmissionState::Failed;
        self.failure = Some(reason.into());
    }

    fn require(&self, expected: SubmissionState, action: WizardAction) -> Result<(), WizardError> {
        if self.submission == expected {
            Ok(())
        } else {
            Err(self.illegal(action))
        }
    }

    fn illegal(&self, action: WizardAction) -> WizardError {
        WizardError::IllegalTransition { state: self.state(), action }
    }
}
