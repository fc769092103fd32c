use crate::api::api_error::APIError;
use crate::api::model::{ProvisionRequest, ProvisionResult};
use crate::api::server::AppState;
use crate::error::Error;
use axum::extract::State;
use axum::headers::authorization::Bearer;
use axum::headers::Authorization;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router, TypedHeader};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::normalize_path::NormalizePath;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// The API router, with trailing slashes trimmed before routing (`/api/` is `/api`).
pub(super) type App = NormalizePath<Router>;

/// Response headers added unless a handler already set them.
const SECURE_HEADERS: &[(&str, &str)] = &[
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

pub(super) fn new(state: AppState) -> App {
    let router = Router::new()
        .route("/", get(root))
        .route("/api", get(greeting).post(provision))
        .route("/healthcheck", get(health_check))
        .layer(middleware::from_fn(secure_headers))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state);
    NormalizePath::trim_trailing_slash(router)
}

async fn secure_headers<B>(request: Request<B>, next: Next<B>) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for &(name, value) in SECURE_HEADERS {
        headers
            .entry(name)
            .or_insert_with(|| HeaderValue::from_static(value));
    }
    response
}

#[allow(clippy::unused_async)]
async fn root() -> Redirect {
    Redirect::to("/api")
}

#[allow(clippy::unused_async)]
async fn greeting() -> impl IntoResponse {
    Json(json!({"message": "Do you wanna build a sandcastle?"}))
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn provision(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    WithRejection(Json(payload), _): WithRejection<Json<ProvisionRequest>, APIError>,
) -> Result<(StatusCode, Json<ProvisionResult>), APIError> {
    match bearer {
        Some(TypedHeader(Authorization(bearer)))
            if state.config.token_permitted(bearer.token()) => {}
        _ => {
            tracing::debug!("rejected provisioning request without a valid token");
            return Err(Error::Unauthorized.into());
        }
    }

    let request = match payload.validate() {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!("rejected provisioning request: {err}");
            return Err(Error::InvalidRequest(err).into());
        }
    };

    tracing::info!("provisioning \"{}\" for {}", request.domain, request.customer);
    let done = state.provisioner.provision(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProvisionResult::new(&request.domain, &done)),
    ))
}
