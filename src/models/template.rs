use serde::{Deserialize, Serialize};

/// Marcador substituído pelo nome do contato
pub const NAME_SLOT: &str = "{name}";

/// Texto de campanha com um único campo `{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_name_slot(&self) -> bool {
        self.0.contains(NAME_SLOT)
    }

    /// Substitui todas as ocorrências de `{name}`
    pub fn render(&self, name: &str) -> String {
        self.0.replace(NAME_SLOT, name)
    }
}
