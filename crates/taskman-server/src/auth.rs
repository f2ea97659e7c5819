use std::sync::Arc;

use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use taskman_core::error::AppError;
use taskman_core::token::Claims;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, inserted as a request extension by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    /// Fail with 403 unless the caller is an admin or `user_id` itself.
    pub fn ensure_can_manage(&self, user_id: i64) -> Result<(), AppError> {
        if self.0.can_manage_user(user_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "User {} may not modify user {user_id}",
                self.0.id
            )))
        }
    }

    pub fn ensure_admin(&self) -> Result<(), AppError> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator role required".into()))
        }
    }
}

fn bearer_token<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that validates `Authorization: Bearer <jwt>` and exposes the claims
/// to handlers as [`CurrentUser`].
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return ApiError(AppError::Unauthorized(
            "Missing or invalid Authorization header. Expected: Bearer <token>".into(),
        ))
        .into_response();
    };

    let claims = match state.tokens.validate(token) {
        Ok(claims) => claims,
        Err(err) => return ApiError(err).into_response(),
    };

    request.extensions_mut().insert(CurrentUser(claims));
    next.run(request).await
}
