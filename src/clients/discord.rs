use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{config::Config, error::IntakeError, models::message::WebhookMessage};

const UPSTREAM_BODY_LIMIT: usize = 300;

pub struct DiscordClient {
    http_client: Client,
    api_base: String,
    timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildMember {
    #[serde(default)]
    pub nick: Option<String>,
    pub user: MemberUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberUser {
    pub id: String,
    pub username: String,

    #[serde(default)]
    pub global_name: Option<String>,

    #[serde(default)]
    pub discriminator: Option<String>,
}

impl DiscordClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            api_base: config.discord_api_base.clone(),
            timeout: Duration::from_secs(config.delivery_timeout_seconds),
        }
    }

    pub async fn execute_webhook(
        &self,
        webhook_url: &str,
        message: &WebhookMessage,
    ) -> Result<(), IntakeError> {
        debug!("Delivering webhook message");

        let response = self
            .http_client
            .post(webhook_url)
            .timeout(self.timeout)
            .json(message)
            .send()
            .await
            .map_err(|e| IntakeError::DeliveryNetworkError {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            info!("Webhook delivery succeeded");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(IntakeError::DeliveryFailed {
            status: status.as_u16(),
            body: truncate(&body, UPSTREAM_BODY_LIMIT),
        })
    }

    /// Best-effort guild-member directory search. Callers treat any failure
    /// as "handle stays unresolved".
    pub async fn search_member(
        &self,
        bot_token: &str,
        guild_id: &str,
        query: &str,
    ) -> Result<Option<GuildMember>, Error> {
        let url = format!("{}/guilds/{}/members/search", self.api_base, guild_id);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bot {bot_token}"))
            .query(&[("query", query), ("limit", "10")])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("member search returned status {}", status));
        }

        let members: Vec<GuildMember> = response.json().await?;
        Ok(pick_member(&members, query))
    }
}

/// Match tiers: exact username, exact display name or nickname, prefix,
/// substring, then legacy `name#discriminator`.
fn pick_member(members: &[GuildMember], query: &str) -> Option<GuildMember> {
    let wanted = query.trim().trim_start_matches('@').to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    if let Some(member) = members
        .iter()
        .find(|m| m.user.username.to_lowercase() == wanted)
    {
        return Some(member.clone());
    }

    if let Some(member) = members
        .iter()
        .find(|m| display_names(m).iter().any(|name| *name == wanted))
    {
        return Some(member.clone());
    }

    if let Some(member) = members
        .iter()
        .find(|m| all_names(m).iter().any(|name| name.starts_with(&wanted)))
    {
        return Some(member.clone());
    }

    if let Some(member) = members
        .iter()
        .find(|m| all_names(m).iter().any(|name| name.contains(&wanted)))
    {
        return Some(member.clone());
    }

    if let Some((name, discriminator)) = wanted.split_once('#') {
        if let Some(member) = members.iter().find(|m| {
            m.user.username.to_lowercase() == name
                && m.user.discriminator.as_deref() == Some(discriminator)
        }) {
            return Some(member.clone());
        }
    }

    None
}

fn display_names(member: &GuildMember) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(nick) = &member.nick {
        names.push(nick.to_lowercase());
    }
    if let Some(global_name) = &member.user.global_name {
        names.push(global_name.to_lowercase());
    }
    names
}

fn all_names(member: &GuildMember) -> Vec<String> {
    let mut names = display_names(member);
    names.push(member.user.username.to_lowercase());
    names
}

fn truncate(body: &str, limit: usize) -> String {
    if body.len() <= limit {
        return body.to_string();
    }

    let mut end = limit;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
