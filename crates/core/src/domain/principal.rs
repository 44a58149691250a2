use serde::{Deserialize, Serialize};

use crate::domain::locale::Language;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

/// The authenticated user a document is created on behalf of.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub full_name: Option<String>,
    pub language: Language,
}

impl Principal {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: PrincipalId(id.into()),
            email: email.into(),
            full_name: None,
            language: Language::default(),
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().filter(|name| !name.trim().is_empty()).unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::Principal;

    #[test]
    fn display_name_falls_back_to_email() {
        let principal = Principal::new("user-1", "ops@acme.com");
        assert_eq!(principal.display_name(), "ops@acme.com");

        let named = principal.with_full_name("Dana Ops");
        assert_eq!(named.display_name(), "Dana Ops");
    }
}
