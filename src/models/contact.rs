/// A parsed chat handle: a numeric mention token, a plain username, or
/// text we could not make sense of (kept verbatim).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactHandle {
    Mention(u64),
    Username(String),
    Raw(String),
}

impl ContactHandle {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Self::Raw(String::new());
        }

        if let Some(id) = parse_mention(trimmed) {
            return Self::Mention(id);
        }

        if trimmed.starts_with('<') {
            return Self::Raw(trimmed.to_string());
        }

        let name = trimmed.trim_start_matches('@');
        let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.is_empty() {
            Self::Raw(String::new())
        } else {
            Self::Username(collapsed)
        }
    }

    /// Canonical display form: `<@id>` for mentions, `@name` for usernames,
    /// raw text untouched.
    pub fn normalized(&self) -> String {
        match self {
            Self::Mention(id) => format!("<@{id}>"),
            Self::Username(name) => format!("@{name}"),
            Self::Raw(text) => text.clone(),
        }
    }

    pub fn is_present(&self) -> bool {
        match self {
            Self::Mention(_) => true,
            Self::Username(name) => !name.is_empty(),
            Self::Raw(text) => !text.trim().is_empty(),
        }
    }
}

fn parse_mention(value: &str) -> Option<u64> {
    let inner = value.strip_prefix("<@")?.strip_suffix('>')?;
    let digits = inner.strip_prefix('!').unwrap_or(inner);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}
