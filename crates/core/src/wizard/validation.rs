use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Static description of one form field and the rule it is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub rule: FieldRule,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRule {
    Optional,
    NonEmpty { message: &'static str },
    MinLength { min: usize, message: &'static str },
    Email { message: &'static str },
    IsoDate { message: &'static str },
    MinInteger { min: i64, message: &'static str },
    NonNegative { message: &'static str },
    OneOf { allowed: &'static [&'static str], message: &'static str },
    MinItems { min: usize, message: &'static str },
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, rule: FieldRule) -> Self {
        Self { name, label, rule }
    }

    pub fn required(&self) -> bool {
        !matches!(self.rule, FieldRule::Optional)
    }
}

impl FieldRule {
    pub fn check_text(&self, value: &str) -> Result<(), &'static str> {
        let trimmed = value.trim();
        match *self {
            Self::Optional => Ok(()),
            Self::NonEmpty { message } => ok_if(!trimmed.is_empty(), message),
            Self::MinLength { min, message } => ok_if(trimmed.chars().count() >= min, message),
            Self::Email { message } => ok_if(is_email_shaped(trimmed), message),
            Self::IsoDate { message } => parse_iso_date(trimmed).map(|_| ()).ok_or(message),
            Self::OneOf { allowed, message } => {
                let lowered = trimmed.to_ascii_lowercase();
                ok_if(allowed.iter().any(|candidate| *candidate == lowered), message)
            }
            Self::MinInteger { message, .. }
            | Self::NonNegative { message }
            | Self::MinItems { message, .. } => Err(message),
        }
    }

    pub fn check_integer(&self, value: i64) -> Result<(), &'static str> {
        match *self {
            Self::Optional => Ok(()),
            Self::MinInteger { min, message } => ok_if(value >= min, message),
            Self::NonNegative { message } => ok_if(value >= 0, message),
            Self::NonEmpty { message }
            | Self::MinLength { message, .. }
            | Self::Email { message }
            | Self::IsoDate { message }
            | Self::OneOf { message, .. }
            | Self::MinItems { message, .. } => Err(message),
        }
    }

    pub fn check_decimal(&self, value: Decimal) -> Result<(), &'static str> {
        match *self {
            Self::Optional => Ok(()),
            Self::NonNegative { message } => ok_if(value >= Decimal::ZERO, message),
            Self::MinInteger { min, message } => ok_if(value >= Decimal::from(min), message),
            Self::NonEmpty { message }
            | Self::MinLength { message, .. }
            | Self::Email { message }
            | Self::IsoDate { message }
            | Self::OneOf { message, .. }
            | Self::MinItems { message, .. } => Err(message),
        }
    }

    pub fn check_count(&self, count: usize) -> Result<(), &'static str> {
        match *self {
            Self::Optional => Ok(()),
            Self::MinItems { min, message } => ok_if(count >= min, message),
            Self::NonEmpty { message } => ok_if(count > 0, message),
            Self::MinLength { message, .. }
            | Self::Email { message }
            | Self::IsoDate { message }
            | Self::MinInteger { message, .. }
            | Self::NonNegative { message }
            | Self::OneOf { message, .. } => Err(message),
        }
    }
}

fn ok_if(condition: bool, message: &'static str) -> Result<(), &'static str> {
    if condition {
        Ok(())
    } else {
        Err(message)
    }
}

/// `local@domain.tld` with no whitespace and no empty domain labels.
pub fn is_email_shaped(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Blank optional text is stored as absent.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|text| !text.is_empty()).map(str::to_string)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-level errors for one section, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.into(), message: message.into() });
    }

    pub fn check(&mut self, field: impl Into<String>, outcome: Result<(), &'static str>) {
        if let Err(message) = outcome {
            self.push(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors.iter().find(|error| error.field == field).map(|error| error.message.as_str())
    }

    pub fn has_error_for(&self, field: &str) -> bool {
        self.message_for(field).is_some()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> =
            self.errors.iter().map(|error| format!("{}: {}", error.field, error.message)).collect();
        f.write_str(&rendered.join("; "))
    }
}
