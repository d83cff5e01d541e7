use serde::Serialize;

/// The single response envelope every request gets back.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
            stage: None,
            details: None,
        }
    }

    pub fn ok_with_details(details: serde_json::Value) -> Self {
        Self {
            ok: true,
            error: None,
            stage: None,
            details: Some(details),
        }
    }

    pub fn error(stage: &str, error: String, details: Option<serde_json::Value>) -> Self {
        Self {
            ok: false,
            error: Some(error),
            stage: Some(stage.to_string()),
            details,
        }
    }
}
