use anyhow::Result;
use apply_service::{
    config::Config,
    models::application::ApplicationForm,
    pipeline::assemble_message,
};
use serde_json::json;

fn submission() -> serde_json::Value {
    json!({
        "turnstileToken": "tok",
        "character": "Thrall",
        "realm": "Stormrage",
        "btag": "Thrall#1234",
        "classes": ["Shaman"],
        "roles": ["DPS"],
        "rio": "https://raider.io/x",
        "wcl": "https://warcraftlogs.com/x",
        "availability": "Weeknights",
        "notes": "Long-time raider",
        "consent": true,
        "meta": { "ts": 1754550000000i64 }
    })
}

fn field_value<'a>(message: &'a serde_json::Value, name: &str) -> Option<&'a str> {
    message["embeds"][0]["fields"]
        .as_array()?
        .iter()
        .find(|field| field["name"] == name)?["value"]
        .as_str()
}

/// Test: the raw path builds the panel with the expected fields and order
#[test]
fn test_raw_path_builds_complete_panel() -> Result<()> {
    let form: ApplicationForm = serde_json::from_value(submission())?;
    let message = assemble_message(&Config::default(), &form, "@toxarica");
    let value = serde_json::to_value(&message)?;

    assert_eq!(
        value["content"],
        "**New Guild Application** — Thrall @ Stormrage"
    );
    assert_eq!(value["embeds"][0]["title"], "Thrall @ Stormrage");
    assert_eq!(value["embeds"][0]["description"], "Long-time raider");
    assert_eq!(value["embeds"][0]["color"], 0xF39C12);
    assert_eq!(value["embeds"][0]["footer"]["text"], "Guild Apply");

    let names: Vec<&str> = value["embeds"][0]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "BattleTag",
            "Class",
            "Roles",
            "Availability",
            "Raider.IO",
            "Warcraft Logs",
            "Discord"
        ]
    );

    assert_eq!(field_value(&value, "BattleTag"), Some("Thrall#1234"));
    assert_eq!(field_value(&value, "Discord"), Some("@toxarica"));

    let timestamp = value["embeds"][0]["timestamp"].as_str().unwrap();
    assert!(timestamp.starts_with("2025-08-07"), "got {timestamp}");

    Ok(())
}

/// Test: no mentions are allowed unless a role is configured
#[test]
fn test_default_mention_scope_is_empty() -> Result<()> {
    let form: ApplicationForm = serde_json::from_value(submission())?;
    let message = assemble_message(&Config::default(), &form, "@toxarica");
    let value = serde_json::to_value(&message)?;

    assert_eq!(value["allowed_mentions"]["parse"], json!([]));
    assert!(value["allowed_mentions"].get("roles").is_none());
    assert!(!value["content"].as_str().unwrap().contains("<@&"));

    Ok(())
}

/// Test: a configured role is mentioned and allow-listed, nothing else
#[test]
fn test_configured_role_mention_is_allow_listed() -> Result<()> {
    let config = Config {
        mention_role_id: Some("987654321".to_string()),
        ..Config::default()
    };

    let form: ApplicationForm = serde_json::from_value(submission())?;
    let message = assemble_message(&config, &form, "@toxarica");
    let value = serde_json::to_value(&message)?;

    assert!(
        value["content"]
            .as_str()
            .unwrap()
            .starts_with("<@&987654321> ")
    );
    assert_eq!(value["allowed_mentions"]["parse"], json!([]));
    assert_eq!(value["allowed_mentions"]["roles"], json!(["987654321"]));

    Ok(())
}

/// Test: a pre-built panel is backfilled with the mandatory fields it omits
#[test]
fn test_prebuilt_panel_is_backfilled() -> Result<()> {
    let mut payload = submission();
    payload["content"] = json!("custom headline");
    payload["embeds"] = json!([{
        "title": "Thrall @ Stormrage",
        "description": "already rendered",
        "fields": [
            { "name": "BattleTag", "value": "Thrall#1234", "inline": true }
        ]
    }]);

    let form: ApplicationForm = serde_json::from_value(payload)?;
    let message = assemble_message(&Config::default(), &form, "@toxarica");
    let value = serde_json::to_value(&message)?;

    assert_eq!(value["content"], "custom headline");
    assert_eq!(value["embeds"][0]["description"], "already rendered");

    // The caller's field is kept, the omitted mandatory ones are re-derived.
    assert_eq!(field_value(&value, "BattleTag"), Some("Thrall#1234"));
    assert_eq!(field_value(&value, "Class"), Some("Shaman"));
    assert_eq!(field_value(&value, "Roles"), Some("DPS"));
    assert_eq!(field_value(&value, "Availability"), Some("Weeknights"));
    assert_eq!(field_value(&value, "Discord"), Some("@toxarica"));

    assert_eq!(value["embeds"][0]["color"], 0xF39C12);
    assert_eq!(value["embeds"][0]["footer"]["text"], "Guild Apply");
    assert!(value["embeds"][0]["timestamp"].is_string());

    Ok(())
}

/// Test: absent notes and availability render as an em dash placeholder
#[test]
fn test_empty_free_text_renders_placeholder() -> Result<()> {
    let mut payload = submission();
    payload["notes"] = json!("");

    let form: ApplicationForm = serde_json::from_value(payload)?;
    let message = assemble_message(&Config::default(), &form, "—");
    let value = serde_json::to_value(&message)?;

    assert_eq!(value["embeds"][0]["description"], "—");
    assert_eq!(field_value(&value, "Discord"), Some("—"));

    Ok(())
}
