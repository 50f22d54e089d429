//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::UserProfile;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    token_expiry: i64,
}

/// Input for registering a new account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Phone number is required"))]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub phone: String,
    pub password: String,
}

/// Token plus the account it was issued for
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub exp: i64,
    pub iat: i64,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    phone: String,
    email: Option<String>,
    password_hash: String,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
        }
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            token_expiry: config.jwt.token_expiry,
        }
    }

    /// Register a new account and issue a token for it
    pub async fn register(&self, mut input: RegisterInput) -> AppResult<AuthResponse> {
        input.name = input.name.trim().to_string();
        input.phone = input.phone.trim().to_string();
        input.email = input
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        input.validate()?;
        shared::validate_phone(&input.phone).map_err(|m| AppError::validation("phone", m))?;

        let phone_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)",
        )
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        if phone_taken {
            return Err(AppError::DuplicateEntry("phone".to_string()));
        }

        if let Some(email) = &input.email {
            let email_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
            )
            .bind(email)
            .fetch_one(&self.db)
            .await?;

            if email_taken {
                return Err(AppError::DuplicateEntry("email".to_string()));
            }
        }

        // Hash password
        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, phone, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, phone, email, password_hash
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            // A concurrent registration can still win the race past the checks above
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    let constraint = db_err.constraint().unwrap_or_default();
                    if constraint.contains("email") {
                        return AppError::DuplicateEntry("email".to_string());
                    }
                    return AppError::DuplicateEntry("phone".to_string());
                }
            }
            e.into()
        })?;

        tracing::info!(user_id = %user.id, "User registered");

        let token = self.generate_token(user.id)?;
        Ok(self.auth_response(token, user.into()))
    }

    /// Authenticate with phone and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        if input.phone.trim().is_empty() || input.password.is_empty() {
            return Err(AppError::ValidationError(
                "Phone and password are required".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, phone, email, password_hash
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(input.phone.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        // Verify password
        let valid = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.generate_token(user.id)?;
        Ok(self.auth_response(token, user.into()))
    }

    /// Load the public profile of an account
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, phone, email, password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(user.into())
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode_token(token, &self.jwt_secret)
    }

    /// Generate a signed access token
    pub fn generate_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.token_expiry);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    fn auth_response(&self, token: String, user: UserProfile) -> AuthResponse {
        AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_expiry,
            user,
        }
    }
}

/// Decode and validate a JWT signed with `secret`
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AppError::InvalidToken
    })
}
