//! Bearer API key authentication.
//!
//! Requests without a valid `dai_key_` token proceed as anonymous viewers;
//! handlers decide whether that is enough.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use tracing::warn;

use dai_core::defaults::API_KEY_PREFIX;
use dai_core::{ApiKeyRepository, Permission, PermissionCheck, Viewer};

use crate::{ApiError, AppState};

/// Extractor resolving the request's viewer.
///
/// ```ignore
/// async fn handler(auth: Auth) -> impl IntoResponse {
///     if auth.viewer.has_permission(Permission::ViewArchives) { /* ... */ }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Auth {
    pub viewer: Viewer,
}

impl Auth {
    /// Require a permission: 401 for anonymous viewers, 403 otherwise.
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.viewer.has_permission(permission) {
            return Ok(());
        }
        if !self.viewer.is_authenticated() {
            return Err(ApiError::Unauthorized(
                "Authentication required".to_string(),
            ));
        }
        Err(ApiError::Forbidden(format!(
            "Scope {} required",
            permission.scope()
        )))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let viewer = match bearer_token(parts) {
            Some(token) if token.starts_with(API_KEY_PREFIX) => {
                match state.api_keys.validate_api_key(token).await {
                    Ok(Some(key)) => Viewer::from_scope(key.user_id, &key.scope),
                    Ok(None) => Viewer::anonymous(),
                    Err(e) => {
                        warn!(
                            subsystem = "api",
                            component = "auth",
                            error = %e,
                            "API key lookup failed, treating request as anonymous"
                        );
                        Viewer::anonymous()
                    }
                }
            }
            _ => Viewer::anonymous(),
        };

        Ok(Auth { viewer })
    }
}
