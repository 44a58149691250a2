pub mod config;
pub mod create;
pub mod preview;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use docket_core::config::{AppConfig, LoadOptions};
use docket_core::wizard::{FieldErrors, SectionInput, SectionKind, WizardSession};
use docket_core::{ApplicationError, DocumentKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with(command, message, None)
    }

    pub fn success_with(command: &str, message: impl Into<String>, details: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            details,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_with(command, error_class, message, exit_code, None)
    }

    pub fn failure_with(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        details: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            details,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub(crate) fn config_failure(command: &str, error: impl std::fmt::Display) -> Self {
        Self::failure(command, "config_validation", format!("configuration issue: {error}"), 2)
    }

    pub(crate) fn invalid_input(command: &str, message: impl Into<String>) -> Self {
        Self::failure(command, "invalid_input", message, 3)
    }

    /// Reports `error` through the interface layer so the class and user message
    /// match what every other surface shows. `correlation_id` is usually the session id.
    pub(crate) fn application_failure(
        command: &str,
        error: impl Into<ApplicationError>,
        correlation_id: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let cause = error.into();
        let detail = cause.to_string();
        let interface = cause.into_interface(correlation_id);
        Self::failure_with(
            command,
            interface.error_class(),
            format!("{} ({detail})", interface.user_message()),
            exit_code,
            Some(json!({ "correlation_id": interface.correlation_id() })),
        )
    }

    pub(crate) fn section_invalid(command: &str, section: SectionKind, errors: &FieldErrors) -> Self {
        Self::failure_with(
            command,
            "section_validation",
            format!("{} is invalid: {errors}", section.title()),
            4,
            serde_json::to_value(errors).ok(),
        )
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Section values read from a JSON input file. Sections left out use the wizard defaults.
#[derive(Debug, Default, Deserialize)]
pub struct WizardScript {
    #[serde(default)]
    pub sections: Vec<SectionInput>,
}

impl WizardScript {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("could not read input `{}`", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("could not parse input `{}`", path.display()))
    }

    /// The scripted input for `section`, falling back to what the session would show.
    pub fn input_for(&self, session: &WizardSession, section: SectionKind) -> SectionInput {
        self.sections
            .iter()
            .rev()
            .find(|input| input.kind() == section)
            .cloned()
            .unwrap_or_else(|| session.section_input(section))
    }
}

pub(crate) fn load_config(command: &str, options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| CommandResult::config_failure(command, error))
}

pub(crate) fn parse_kind(command: &str, raw: &str) -> Result<DocumentKind, CommandResult> {
    DocumentKind::from_str(raw).map_err(|error| CommandResult::invalid_input(command, error.to_string()))
}

pub(crate) fn read_script(command: &str, path: &Path) -> Result<WizardScript, CommandResult> {
    WizardScript::read(path)
        .map_err(|error| CommandResult::invalid_input(command, format!("{error:#}")))
}
