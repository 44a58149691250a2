use std::path::Path;

use docket_core::config::LoadOptions;
use docket_core::wizard::{
    InMemoryDocumentStore, NoopNavigator, SectionKind, StaticIdentity, StepOutcome, WizardEngine,
};
use docket_core::Principal;
use serde_json::json;
use tracing::info;

use crate::commands::{load_config, parse_kind, read_script, CommandResult};

/// Walks every section with the scripted input and submits the document.
/// Without `user` no identity is available and the submission fails.
pub fn run(options: &LoadOptions, kind: &str, input: &Path, user: Option<&str>) -> CommandResult {
    let config = match load_config("create", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let kind = match parse_kind("create", kind) {
        Ok(kind) => kind,
        Err(result) => return result,
    };
    let script = match read_script("create", input) {
        Ok(script) => script,
        Err(result) => return result,
    };

    let identity = match user {
        Some(user) => StaticIdentity::signed_in(Principal::new(user, format!("{user}@localhost"))),
        None => StaticIdentity::anonymous(),
    };
    let engine =
        WizardEngine::new(InMemoryDocumentStore::default(), identity, NoopNavigator, config.wizard);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "create",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                5,
            );
        }
    };

    runtime.block_on(async {
        let mut session = engine.initialize(kind);

        for section in SectionKind::ORDER {
            let input = script.input_for(&session, section);
            match engine.advance(&mut session, &input).await {
                Ok(StepOutcome::Invalid(errors)) => {
                    return CommandResult::section_invalid("create", section, &errors);
                }
                Ok(StepOutcome::Moved { .. }) => {}
                Ok(StepOutcome::Completed { id, record }) => {
                    info!(
                        event_name = "cli.create.completed",
                        document_id = %id.0,
                        "document created from script"
                    );
                    return CommandResult::success_with(
                        "create",
                        format!("{} {} stored as pending", kind.display_name(), record.basic.reference),
                        Some(json!({
                            "document_id": id.0,
                            "kind": kind.as_str(),
                            "status": "pending",
                            "reference": record.basic.reference,
                            "grand_total": record.grand_total.to_string(),
                            "line_items": record.items.len(),
                            "template": record.template.as_str(),
                            "created_by": record.created_by.0,
                        })),
                    );
                }
                Err(error) => {
                    let session_id = session.id().0.clone();
                    return CommandResult::application_failure("create", error, session_id, 6);
                }
            }
        }

        CommandResult::failure(
            "create",
            "incomplete",
            "wizard ended without submitting the document",
            6,
        )
    })
}
