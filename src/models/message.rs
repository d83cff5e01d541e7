use serde::{Deserialize, Serialize};

pub const EMBED_COLOR: u32 = 0xF39C12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub content: String,
    pub embeds: Vec<Embed>,
    pub allowed_mentions: AllowedMentions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Nothing is pingable unless explicitly allow-listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl AllowedMentions {
    pub fn none() -> Self {
        Self {
            parse: Vec::new(),
            roles: None,
        }
    }

    pub fn for_roles(roles: Vec<String>) -> Self {
        Self {
            parse: Vec::new(),
            roles: Some(roles),
        }
    }
}

impl EmbedField {
    pub fn inline(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            inline: true,
        }
    }

    pub fn block(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            inline: false,
        }
    }
}
