use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::document::DocumentTemplate;
use crate::domain::locale::Language;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub wizard: WizardConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// Values used to pre-populate a freshly initialized wizard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WizardConfig {
    pub default_payment_terms: String,
    pub default_template: DocumentTemplate,
    /// Generated reference numbers use a suffix in `0..reference_suffix_max`.
    pub reference_suffix_max: u32,
}

#[derive(Clone, Debug)]
pub struct UiConfig {
    pub language: Language,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub language: Option<Language>,
    pub default_template: Option<DocumentTemplate>,
    pub default_payment_terms: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            default_payment_terms: "Payment due within 30 days of invoice".to_string(),
            default_template: DocumentTemplate::Standard,
            reference_suffix_max: 10_000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wizard: WizardConfig::default(),
            ui: UiConfig { language: Language::English },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("docket.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(wizard) = patch.wizard {
            if let Some(default_payment_terms) = wizard.default_payment_terms {
                self.wizard.default_payment_terms = default_payment_terms;
            }
            if let Some(default_template) = wizard.default_template {
                self.wizard.default_template = default_template;
            }
            if let Some(reference_suffix_max) = wizard.reference_suffix_max {
                self.wizard.reference_suffix_max = reference_suffix_max;
            }
        }

        if let Some(ui) = patch.ui {
            if let Some(language) = ui.language {
                self.ui.language = language;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DOCKET_WIZARD_DEFAULT_PAYMENT_TERMS") {
            self.wizard.default_payment_terms = value;
        }
        if let Some(value) = read_env("DOCKET_WIZARD_DEFAULT_TEMPLATE") {
            self.wizard.default_template =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "DOCKET_WIZARD_DEFAULT_TEMPLATE".to_string(),
                    value: value.clone(),
                })?;
        }
        if let Some(value) = read_env("DOCKET_WIZARD_REFERENCE_SUFFIX_MAX") {
            self.wizard.reference_suffix_max =
                parse_u32("DOCKET_WIZARD_REFERENCE_SUFFIX_MAX", &value)?;
        }

        if let Some(value) = read_env("DOCKET_UI_LANGUAGE") {
            self.ui.language = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "DOCKET_UI_LANGUAGE".to_string(),
                value: value.clone(),
            })?;
        }

        let log_level = read_env("DOCKET_LOGGING_LEVEL").or_else(|| read_env("DOCKET_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("DOCKET_LOGGING_FORMAT").or_else(|| read_env("DOCKET_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(language) = overrides.language {
            self.ui.language = language;
        }
        if let Some(default_template) = overrides.default_template {
            self.wizard.default_template = default_template;
        }
        if let Some(default_payment_terms) = overrides.default_payment_terms {
            self.wizard.default_payment_terms = default_payment_terms;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_wizard(&self.wizard)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("docket.toml"), PathBuf::from("config/docket.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_wizard(wizard: &WizardConfig) -> Result<(), ConfigError> {
    // Defaults must pass the Terms section's own rule, or the first advance fails.
    if wizard.default_payment_terms.trim().chars().count() < 3 {
        return Err(ConfigError::Validation(
            "wizard.default_payment_terms must be at least 3 characters".to_string(),
        ));
    }

    if wizard.reference_suffix_max == 0 {
        return Err(ConfigError::Validation(
            "wizard.reference_suffix_max must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    wizard: Option<WizardPatch>,
    ui: Option<UiPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct WizardPatch {
    default_payment_terms: Option<String>,
    default_template: Option<DocumentTemplate>,
    reference_suffix_max: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct UiPatch {
    language: Option<Language>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
