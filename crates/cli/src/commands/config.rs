use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use docket_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "wizard.default_payment_terms",
        &config.wizard.default_payment_terms,
        source("wizard.default_payment_terms", &["DOCKET_WIZARD_DEFAULT_PAYMENT_TERMS"]),
    ));
    lines.push(render_line(
        "wizard.default_template",
        config.wizard.default_template.as_str(),
        source("wizard.default_template", &["DOCKET_WIZARD_DEFAULT_TEMPLATE"]),
    ));
    lines.push(render_line(
        "wizard.reference_suffix_max",
        &config.wizard.reference_suffix_max.to_string(),
        source("wizard.reference_suffix_max", &["DOCKET_WIZARD_REFERENCE_SUFFIX_MAX"]),
    ));
    lines.push(render_line(
        "ui.language",
        config.ui.language.code(),
        source("ui.language", &["DOCKET_UI_LANGUAGE"]),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["DOCKET_LOGGING_LEVEL", "DOCKET_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["DOCKET_LOGGING_FORMAT", "DOCKET_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("docket.toml"), PathBuf::from("config/docket.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
