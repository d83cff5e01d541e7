use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clients::{discord::DiscordClient, turnstile::TurnstileClient},
    config::Config,
    error::IntakeError,
    models::response::ApiResponse,
    pipeline::{self, IntakeOutcome},
};

pub struct AppState {
    pub config: Config,
    pub turnstile: TurnstileClient,
    pub discord: DiscordClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            turnstile: TurnstileClient::new(&config),
            discord: DiscordClient::new(&config),
            config,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/apply", any(apply))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.server_port;
    let state = Arc::new(AppState::new(config));

    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Application intake server started");

    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct ApplyParams {
    debug: Option<String>,
}

async fn apply(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(params): Query<ApplyParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return IntakeError::MethodNotAllowed.into_response();
    }

    let remote_ip = client_ip(&headers);
    let skip_delivery =
        state.config.debug_skip_delivery || matches!(params.debug.as_deref(), Some("1" | "true"));
    let payload = String::from_utf8_lossy(&body);

    let result = pipeline::process_application(
        &state.config,
        &state.turnstile,
        &state.discord,
        &payload,
        remote_ip.as_deref(),
        skip_delivery,
    )
    .await;

    match result {
        Ok(IntakeOutcome::Delivered) | Ok(IntakeOutcome::Absorbed) => {
            (StatusCode::OK, Json(ApiResponse::ok())).into_response()
        }
        Ok(IntakeOutcome::Preview(message)) => {
            let details = serde_json::to_value(&message).unwrap_or_default();
            (StatusCode::OK, Json(ApiResponse::ok_with_details(details))).into_response()
        }
        Err(error) => error.into_response(),
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    for name in ["cf-connecting-ip", "x-forwarded-for"] {
        let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
            continue;
        };
        let first = value.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }
    None
}

/// Reports configuration completeness; a degraded service still serves 200
/// so the platform keeps routing to it.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let webhook_configured = state.config.discord_webhook_url.is_some();
    let turnstile_configured = state.config.turnstile_secret.is_some();
    let directory_configured = state.config.directory_credentials().is_some();

    let status = if webhook_configured && turnstile_configured {
        "healthy"
    } else {
        "degraded"
    };

    Json(serde_json::json!({
        "status": status,
        "checks": {
            "webhook_configured": webhook_configured,
            "turnstile_configured": turnstile_configured,
            "directory_configured": directory_configured,
        }
    }))
}
