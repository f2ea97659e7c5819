use std::sync::Arc;

use axum::extract::State;

use crate::dto::LoginRequest;
use crate::error::{ApiError, AppJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed JWT", body = String, content_type = "text/plain"),
        (status = 401, description = "Unknown e-mail or wrong password", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<String, ApiError> {
    let user = state
        .users()
        .authenticate(&body.username, &body.password)
        .await?;
    let token = state.tokens.issue(&user)?;

    tracing::info!(user_id = user.id, "Issued access token");
    Ok(token)
}
