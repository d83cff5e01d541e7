use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::models::message::Embed;

/// One guild-application submission as posted by the browser form collector.
/// Field names follow the wire contract; aliases cover the legacy key names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    #[serde(rename = "turnstileToken", alias = "cf-turnstile-response")]
    pub turnstile_token: String,

    pub character: String,
    pub realm: String,
    pub btag: String,

    #[serde(alias = "class", deserialize_with = "one_or_many")]
    pub classes: Vec<String>,

    #[serde(alias = "role", deserialize_with = "one_or_many")]
    pub roles: Vec<String>,

    pub rio: String,
    pub wcl: String,

    pub availability: String,
    pub notes: String,

    pub consent: bool,

    pub discord: String,
    pub discord_id_guess: String,
    pub discord_username_guess: String,

    // Honeypot; humans never see this field, so any value means a bot.
    pub website: String,

    // Legacy submission path: the client may send a pre-rendered message.
    pub content: Option<String>,
    pub embeds: Option<Vec<Embed>>,

    pub meta: Option<SubmissionMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionMeta {
    pub ts: Option<i64>,
}

impl ApplicationForm {
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.ts)
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now)
    }

    pub fn prebuilt_embed(&self) -> Option<&Embed> {
        self.embeds.as_ref().and_then(|embeds| embeds.first())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
