use thiserror::Error;

use crate::domain::document::DocumentStatus;
use crate::wizard::{PersistenceError, WizardError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid document status transition from {from:?} to {to:?}")]
    InvalidStatusTransition { from: DocumentStatus, to: DocumentStatus },
    #[error("unknown document kind `{0}` (expected po|quotation|agreement)")]
    UnknownDocumentKind(String),
    #[error("unknown template `{0}` (expected standard|professional|minimal|detailed)")]
    UnknownTemplate(String),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("preview rendering failure: {0}")]
    Preview(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unauthenticated: {message}")]
    Unauthenticated { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Stable snake_case class reported to callers alongside the message.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::NotFound { .. } => "not_found",
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::Internal { .. } => "internal",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Unauthenticated { .. } => "Sign in before submitting the document.",
            Self::NotFound { .. } => "The requested document could not be found.",
            Self::ServiceUnavailable { .. } => {
                "The document could not be saved right now. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Unauthenticated { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unauthenticated { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<PersistenceError> for ApplicationError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other.to_string()),
        }
    }
}

impl From<WizardError> for ApplicationError {
    fn from(value: WizardError) -> Self {
        match value {
            WizardError::Persistence(error) => Self::from(error),
            other => Self::Domain(DomainError::Wizard(other)),
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error @ DomainError::Wizard(WizardError::Unauthenticated)) => {
                Self::Unauthenticated { message: error.to_string(), correlation_id }
            }
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::NotFound(message) => Self::NotFound { message, correlation_id },
            ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message) | ApplicationError::Preview(message) => {
                Self::Internal { message, correlation_id }
            }
        }
    }
}
