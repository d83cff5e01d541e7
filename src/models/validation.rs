use url::Url;

use crate::models::application::ApplicationForm;

/// Which optional field groups a deployment treats as required.
#[derive(Debug, Clone, Copy)]
pub struct FieldPolicy {
    pub require_profile_links: bool,
    pub require_contact_handle: bool,
}

pub fn validate_application(
    form: &ApplicationForm,
    policy: &FieldPolicy,
) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    require_text(&mut problems, "character", &form.character);
    require_text(&mut problems, "realm", &form.realm);
    require_text(&mut problems, "btag", &form.btag);
    require_text(&mut problems, "availability", &form.availability);

    if form.classes.iter().all(|class| class.trim().is_empty()) {
        problems.push("at least one class selection is required".to_string());
    }

    if form.roles.iter().all(|role| role.trim().is_empty()) {
        problems.push("at least one role selection is required".to_string());
    }

    if !form.consent {
        problems.push("consent must be given".to_string());
    }

    check_link(
        &mut problems,
        "rio",
        &form.rio,
        policy.require_profile_links,
    );
    check_link(
        &mut problems,
        "wcl",
        &form.wcl,
        policy.require_profile_links,
    );

    if policy.require_contact_handle && form.discord.trim().is_empty() {
        problems.push("discord handle is required".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn require_text(problems: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        problems.push(format!("{field} is required"));
    }
}

/// A present link must be an absolute http(s) URL even when links are
/// optional for the deployment.
fn check_link(problems: &mut Vec<String>, field: &str, value: &str, required: bool) {
    let value = value.trim();

    if value.is_empty() {
        if required {
            problems.push(format!("{field} is required"));
        }
        return;
    }

    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => problems.push(format!("{field} must be an absolute http(s) URL")),
    }
}
