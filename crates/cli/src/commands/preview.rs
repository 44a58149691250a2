use std::path::Path;

use docket_core::config::LoadOptions;
use docket_core::wizard::{Advance, SectionDefaults, SectionKind, WizardSession};
use docket_core::{DocumentPreview, Language, PreviewRenderer};
use serde_json::json;

use crate::commands::{load_config, parse_kind, read_script, CommandResult};

/// Confirms the scripted sections locally and renders the preview. Nothing is submitted.
pub fn run(
    options: &LoadOptions,
    kind: &str,
    input: &Path,
    language: Option<Language>,
) -> CommandResult {
    let config = match load_config("preview", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let kind = match parse_kind("preview", kind) {
        Ok(kind) => kind,
        Err(result) => return result,
    };
    let script = match read_script("preview", input) {
        Ok(script) => script,
        Err(result) => return result,
    };

    let mut session =
        WizardSession::initialize(kind, SectionDefaults::generate(kind, &config.wizard));
    for section in SectionKind::ORDER {
        let input = script.input_for(&session, section);
        match session.advance(&input) {
            Ok(Advance::Invalid(errors)) => {
                return CommandResult::section_invalid("preview", section, &errors);
            }
            Ok(Advance::Moved { .. } | Advance::ReadyToSubmit) => {}
            Err(error) => {
                let session_id = session.id().0.clone();
                return CommandResult::application_failure("preview", error, session_id, 6);
            }
        }
    }

    let preview = DocumentPreview::from_session(&session, language.unwrap_or(config.ui.language));
    let rendered = match PreviewRenderer::new().and_then(|renderer| renderer.render(&preview)) {
        Ok(rendered) => rendered,
        Err(error) => {
            let session_id = session.id().0.clone();
            return CommandResult::application_failure("preview", error, session_id, 7);
        }
    };

    CommandResult::success_with(
        "preview",
        rendered,
        Some(json!({
            "kind": kind.as_str(),
            "template": preview.template.as_str(),
            "direction": preview.direction.as_str(),
            "grand_total": preview.grand_total.to_string(),
            "line_items": preview.lines.len(),
        })),
    )
}
