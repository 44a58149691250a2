use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Interface language. Only the two-way toggle is modelled; translations live
/// in the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Self::English => Self::Arabic,
            Self::Arabic => Self::English,
        }
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Self::English => TextDirection::Ltr,
            Self::Arabic => TextDirection::Rtl,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Arabic => "ar",
        }
    }
}

impl TextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ar" | "arabic" => Ok(Self::Arabic),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported language `{other}` (expected en|ar)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Language, TextDirection};

    #[test]
    fn toggle_flips_language_and_direction() {
        let language = Language::default();
        assert_eq!(language.direction(), TextDirection::Ltr);

        let toggled = language.toggle();
        assert_eq!(toggled, Language::Arabic);
        assert_eq!(toggled.direction(), TextDirection::Rtl);
        assert_eq!(toggled.toggle(), Language::English);
    }

    #[test]
    fn parses_codes_and_names() {
        assert_eq!("AR".parse::<Language>().expect("code"), Language::Arabic);
        assert_eq!("english".parse::<Language>().expect("name"), Language::English);
        assert!("fr".parse::<Language>().is_err());
    }
}
