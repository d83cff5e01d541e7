use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::validation::FieldPolicy;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub discord_webhook_url: Option<String>,
    pub turnstile_secret: Option<String>,

    #[serde(default = "default_turnstile_verify_url")]
    pub turnstile_verify_url: String,

    #[serde(default = "default_turnstile_timeout_seconds")]
    pub turnstile_timeout_seconds: u64,

    #[serde(default = "default_discord_api_base")]
    pub discord_api_base: String,

    #[serde(default = "default_delivery_timeout_seconds")]
    pub delivery_timeout_seconds: u64,

    pub mention_role_id: Option<String>,

    pub discord_bot_token: Option<String>,
    pub discord_guild_id: Option<String>,

    #[serde(default = "default_require_profile_links")]
    pub require_profile_links: bool,

    #[serde(default)]
    pub require_contact_handle: bool,

    #[serde(default)]
    pub debug_skip_delivery: bool,

    #[serde(default = "default_footer_text")]
    pub footer_text: String,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }

    pub fn field_policy(&self) -> FieldPolicy {
        FieldPolicy {
            require_profile_links: self.require_profile_links,
            require_contact_handle: self.require_contact_handle,
        }
    }

    pub fn directory_credentials(&self) -> Option<(&str, &str)> {
        match (
            self.discord_bot_token.as_deref(),
            self.discord_guild_id.as_deref(),
        ) {
            (Some(token), Some(guild_id)) => Some((token, guild_id)),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_webhook_url: None,
            turnstile_secret: None,
            turnstile_verify_url: default_turnstile_verify_url(),
            turnstile_timeout_seconds: default_turnstile_timeout_seconds(),
            discord_api_base: default_discord_api_base(),
            delivery_timeout_seconds: default_delivery_timeout_seconds(),
            mention_role_id: None,
            discord_bot_token: None,
            discord_guild_id: None,
            require_profile_links: default_require_profile_links(),
            require_contact_handle: false,
            debug_skip_delivery: false,
            footer_text: default_footer_text(),
            server_port: default_server_port(),
        }
    }
}

fn default_turnstile_verify_url() -> String {
    "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string()
}

fn default_turnstile_timeout_seconds() -> u64 {
    6
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_delivery_timeout_seconds() -> u64 {
    10
}

fn default_require_profile_links() -> bool {
    true
}

fn default_footer_text() -> String {
    "Guild Apply".to_string()
}

fn default_server_port() -> u16 {
    3000
}
