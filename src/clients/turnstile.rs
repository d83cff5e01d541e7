use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;

#[derive(Debug, Clone, Deserialize)]
pub struct TurnstileVerdict {
    pub success: bool,

    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
}

pub struct TurnstileClient {
    http_client: Client,
    verify_url: String,
    timeout: Duration,
}

impl TurnstileClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            verify_url: config.turnstile_verify_url.clone(),
            timeout: Duration::from_secs(config.turnstile_timeout_seconds),
        }
    }

    /// Redeems a challenge token with the verification service. A network
    /// failure or timeout is an `Err`; a rejected token is an `Ok` verdict
    /// with `success == false`.
    pub async fn verify(
        &self,
        secret: &str,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<TurnstileVerdict, String> {
        let mut params = vec![
            ("secret", secret.to_string()),
            ("response", token.to_string()),
        ];
        if let Some(ip) = remote_ip {
            params.push(("remoteip", ip.to_string()));
        }

        debug!(remote_ip = ?remote_ip, "Verifying turnstile token");

        let response = self
            .http_client
            .post(&self.verify_url)
            .timeout(self.timeout)
            .form(&params)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("verifier returned status {status}"));
        }

        response
            .json::<TurnstileVerdict>()
            .await
            .map_err(|e| format!("invalid verifier response: {e}"))
    }
}
