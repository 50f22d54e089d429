//! Authentication middleware
//!
//! Verifies the bearer JWT and resolves it to the account that owns it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::decode_token;
use crate::AppState;

/// Authenticated user information resolved from the JWT
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer {
        Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
        Err(_) => return unauthorized_response("No token, authorization denied"),
    };

    let claims = match decode_token(&token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(_) => return unauthorized_response("Token is not valid"),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    let user = sqlx::query_as::<_, AuthUser>(
        "SELECT id, name, phone, email FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await;

    let auth_user = match user {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized_response("Token is not valid"),
        Err(e) => return AppError::from(e).into_response(),
    };

    tracing::debug!(user_id = %auth_user.id, "Authenticated request");
    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
