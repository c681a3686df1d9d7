//! dai-api - HTTP API for the digital asset archive.
//!
//! Exposes the archive registry, detail and notes pages, and the audit CSV
//! export over axum. `main` wires PostgreSQL repositories into [`AppState`];
//! tests wire the in-memory store instead.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use uuid::Uuid;

use dai_core::defaults::{CORS_MAX_AGE_SECS, MAX_BODY_SIZE_BYTES};
use dai_core::{ApiKeyRepository, ArchiveService};

pub use config::ApiConfig;
pub use error::ApiError;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: ArchiveService,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(service: ArchiveService, api_keys: Arc<dyn ApiKeyRepository>) -> Self {
        Self {
            service,
            api_keys,
            rate_limiter: None,
        }
    }

    /// Enable a global limit of `requests` per `period`.
    ///
    /// Zero values leave rate limiting off.
    pub fn with_rate_limit(mut self, requests: u64, period: Duration) -> Self {
        let quota = NonZeroU32::new(requests.min(u32::MAX as u64) as u32).and_then(|burst| {
            Quota::with_period(period / burst.get()).map(|q| q.allow_burst(burst))
        });
        self.rate_limiter = quota.map(|q| Arc::new(RateLimiter::direct(q)));
        self
    }
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Digital Asset Archive API",
        description = "Archive registry, disclosure-controlled detail pages, archive notes and the compliance audit export"
    ),
    paths(
        handlers::health_check,
        handlers::registry::list_registry,
        handlers::registry::get_archive_detail,
        handlers::notes::get_notes_page,
        handlers::notes::add_note,
        handlers::audit::export_audit_csv,
    ),
    components(schemas(
        dai_core::RegistryEntry,
        dai_core::ArchiveDetail,
        dai_core::SourceLink,
        dai_core::DisclosureLevel,
        dai_core::ArchiveNotesPage,
        dai_core::ArchiveSummary,
        dai_core::NoteView,
        dai_core::NotesPagination,
        handlers::notes::AddNoteBody,
        handlers::notes::AddNoteResponse,
    )),
    tags(
        (name = "Registry", description = "Archive registry and detail pages"),
        (name = "Notes", description = "Append-only archive notes"),
        (name = "Audit", description = "Compliance audit export"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

// =============================================================================
// ROUTER
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(subsystem = "api", component = "rate_limit", "Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS))
}

/// Build the application router.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(handlers::openapi_json))
        .route("/archive-registry", get(handlers::registry::list_registry))
        .route(
            "/archive-registry/:id",
            get(handlers::registry::get_archive_detail),
        )
        .route(
            "/archive-registry/:id/notes",
            get(handlers::notes::get_notes_page).post(handlers::notes::add_note),
        )
        .route(
            "/admin/archive-audit/export",
            get(handlers::audit::export_audit_csv),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(allowed_origins))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE_BYTES))
        .with_state(state)
}
