use chrono::SecondsFormat;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    clients::{discord::DiscordClient, turnstile::TurnstileClient},
    config::Config,
    error::IntakeError,
    models::{
        application::ApplicationForm,
        contact::ContactHandle,
        message::{AllowedMentions, EMBED_COLOR, Embed, EmbedField, EmbedFooter, WebhookMessage},
        validation::validate_application,
    },
};

#[derive(Debug)]
pub enum IntakeOutcome {
    Delivered,
    /// Honeypot tripped; the submission was dropped but the caller is told
    /// it succeeded.
    Absorbed,
    /// Debug mode: the assembled message, delivery skipped.
    Preview(WebhookMessage),
}

/// Runs one submission through the intake gates. Every gate short-circuits;
/// at most one verification call and one delivery call happen per request.
pub async fn process_application(
    config: &Config,
    turnstile: &TurnstileClient,
    discord: &DiscordClient,
    payload: &str,
    remote_ip: Option<&str>,
    skip_delivery: bool,
) -> Result<IntakeOutcome, IntakeError> {
    let request_id = Uuid::new_v4().to_string();

    let webhook_url =
        config
            .discord_webhook_url
            .as_deref()
            .ok_or(IntakeError::ServerMisconfigured {
                missing: "DISCORD_WEBHOOK_URL",
            })?;
    let secret = config
        .turnstile_secret
        .as_deref()
        .ok_or(IntakeError::ServerMisconfigured {
            missing: "TURNSTILE_SECRET",
        })?;

    let form: ApplicationForm =
        serde_json::from_str(payload).map_err(|e| IntakeError::ValidationFailed {
            problems: vec![format!("request body is not a valid submission: {e}")],
        })?;

    if !form.website.trim().is_empty() {
        info!(%request_id, "Honeypot field set, absorbing submission");
        return Ok(IntakeOutcome::Absorbed);
    }

    let token = form.turnstile_token.trim();
    if token.is_empty() {
        return Err(IntakeError::MissingVerificationToken);
    }

    let verdict = turnstile
        .verify(secret, token, remote_ip)
        .await
        .map_err(|detail| {
            warn!(%request_id, error = %detail, "Turnstile verification unreachable");
            IntakeError::VerificationNetworkError { detail }
        })?;

    if !verdict.success {
        info!(
            %request_id,
            codes = ?verdict.error_codes,
            "Turnstile rejected submission"
        );
        return Err(IntakeError::VerificationRejected {
            codes: verdict.error_codes,
        });
    }

    validate_application(&form, &config.field_policy())
        .map_err(|problems| IntakeError::ValidationFailed { problems })?;

    let contact = resolve_contact(config, discord, &form).await;
    let message = assemble_message(config, &form, &contact);

    if skip_delivery {
        info!(%request_id, "Debug mode, skipping delivery");
        return Ok(IntakeOutcome::Preview(message));
    }

    discord.execute_webhook(webhook_url, &message).await?;

    info!(
        %request_id,
        character = %form.character,
        realm = %form.realm,
        "Application delivered"
    );
    Ok(IntakeOutcome::Delivered)
}

/// Normalizes the contact handle and, when directory credentials are
/// configured, tries to resolve it to a stable member id. Lookup failure is
/// non-fatal: the handle simply stays unresolved.
async fn resolve_contact(
    config: &Config,
    discord: &DiscordClient,
    form: &ApplicationForm,
) -> String {
    let mut handle = ContactHandle::parse(&form.discord);

    if !handle.is_present() {
        let id_guess = form.discord_id_guess.trim();
        if !id_guess.is_empty() && id_guess.bytes().all(|b| b.is_ascii_digit()) {
            handle = ContactHandle::parse(&format!("<@{id_guess}>"));
        } else if !form.discord_username_guess.trim().is_empty() {
            handle = ContactHandle::parse(&form.discord_username_guess);
        }
    }

    if !handle.is_present() {
        return "—".to_string();
    }

    let normalized = handle.normalized();

    if let ContactHandle::Username(name) = &handle {
        if let Some((bot_token, guild_id)) = config.directory_credentials() {
            match discord.search_member(bot_token, guild_id, name).await {
                Ok(Some(member)) => {
                    debug!(member_id = %member.user.id, "Resolved contact handle");
                    return format!("{normalized} (<@{}>)", member.user.id);
                }
                Ok(None) => debug!("No directory match for contact handle"),
                Err(e) => warn!(error = %e, "Directory lookup failed"),
            }
        }
    }

    normalized
}

/// Builds the outgoing message. A caller-supplied panel is never trusted to
/// be complete: the mandatory display fields are re-derived from the
/// validated form and backfilled wherever the panel omits them.
pub fn assemble_message(
    config: &Config,
    form: &ApplicationForm,
    contact_value: &str,
) -> WebhookMessage {
    let timestamp = form
        .submitted_at()
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    let embed = match form.prebuilt_embed() {
        Some(prebuilt) => backfill_embed(prebuilt.clone(), config, form, contact_value, &timestamp),
        None => build_embed(config, form, contact_value, &timestamp),
    };

    let headline = form
        .content
        .clone()
        .filter(|content| !content.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "**New Guild Application** — {} @ {}",
                form.character.trim(),
                form.realm.trim()
            )
        });

    let (content, allowed_mentions) = match config.mention_role_id.as_deref() {
        Some(role_id) => (
            format!("<@&{role_id}> {headline}"),
            AllowedMentions::for_roles(vec![role_id.to_string()]),
        ),
        None => (headline, AllowedMentions::none()),
    };

    WebhookMessage {
        content,
        embeds: vec![embed],
        allowed_mentions,
    }
}

fn build_embed(
    config: &Config,
    form: &ApplicationForm,
    contact_value: &str,
    timestamp: &str,
) -> Embed {
    let mut fields = vec![
        EmbedField::inline("BattleTag", form.btag.trim()),
        EmbedField::inline("Class", &join_selections(&form.classes)),
        EmbedField::inline("Roles", &join_selections(&form.roles)),
        EmbedField::block("Availability", text_or_dash(&form.availability)),
    ];

    if !form.rio.trim().is_empty() {
        fields.push(EmbedField::block("Raider.IO", form.rio.trim()));
    }
    if !form.wcl.trim().is_empty() {
        fields.push(EmbedField::block("Warcraft Logs", form.wcl.trim()));
    }

    fields.push(EmbedField::block("Discord", contact_value));

    Embed {
        title: format!("{} @ {}", form.character.trim(), form.realm.trim()),
        description: text_or_dash(&form.notes).to_string(),
        color: EMBED_COLOR,
        fields,
        timestamp: Some(timestamp.to_string()),
        footer: Some(EmbedFooter {
            text: config.footer_text.clone(),
        }),
    }
}

fn backfill_embed(
    mut embed: Embed,
    config: &Config,
    form: &ApplicationForm,
    contact_value: &str,
    timestamp: &str,
) -> Embed {
    let reference = build_embed(config, form, contact_value, timestamp);

    if embed.title.trim().is_empty() {
        embed.title = reference.title.clone();
    }
    if embed.description.trim().is_empty() {
        embed.description = reference.description.clone();
    }
    if embed.color == 0 {
        embed.color = reference.color;
    }
    if embed.timestamp.is_none() {
        embed.timestamp = reference.timestamp.clone();
    }
    if embed.footer.is_none() {
        embed.footer = reference.footer.clone();
    }

    for needed in reference.fields {
        let present = embed
            .fields
            .iter()
            .any(|field| field.name.eq_ignore_ascii_case(&needed.name));
        if !present {
            embed.fields.push(needed);
        }
    }

    embed
}

fn join_selections(values: &[String]) -> String {
    let joined = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() {
        "—".to_string()
    } else {
        joined
    }
}

fn text_or_dash(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() { "—" } else { trimmed }
}
