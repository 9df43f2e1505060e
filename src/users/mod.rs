// region:    --- Imports
use crate::auth;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- Model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Seller,
    Admin,
}

impl UserRole {
    pub fn can_sell(self) -> bool {
        matches!(self, UserRole::Seller | UserRole::Admin)
    }

    pub fn can_admin(self) -> bool {
        self == UserRole::Admin
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
// endregion: --- Model

// region:    --- Commands
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Registration rules carried over from the signup form: username 4-20
/// characters, password at least 6, and nobody self-registers as admin.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), String> {
    if req.username.chars().count() < 4 || req.username.chars().count() > 20 {
        return Err("username must be between 4 and 20 characters".to_string());
    }
    if !req.email.contains('@') || !req.email.contains('.') {
        return Err("invalid email address".to_string());
    }
    if req.password.chars().count() < 6 {
        return Err("password must be at least 6 characters".to_string());
    }
    if req.role == UserRole::Admin {
        return Err("role must be buyer or seller".to_string());
    }
    Ok(())
}

pub async fn register(db: &DatabaseManager, req: RegisterRequest) -> Result<User, ApiError> {
    validate_registration(&req).map_err(ApiError::Validation)?;

    if query::handlers::get_user_by_username(db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("username"));
    }
    if query::handlers::get_user_by_email(db, &req.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("email"));
    }

    let password_hash = auth::hash_password(&req.password)?;
    let user = db
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(
                    "INSERT INTO users (username, email, password_hash, role)
                     VALUES ($1, $2, $3, $4)
                     RETURNING *",
                )
                .bind(&req.username)
                .bind(&req.email)
                .bind(&password_hash)
                .bind(req.role)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await?;

    info!(
        "{:<12} --> Registered {} as {:?}",
        "Users", user.username, user.role
    );
    Ok(user)
}

/// Checks credentials and issues a bearer token.
pub async fn login(
    db: &DatabaseManager,
    jwt_secret: &str,
    req: LoginRequest,
) -> Result<(String, User), ApiError> {
    let user = query::handlers::get_user_by_email(db, &req.email)
        .await?
        .ok_or(ApiError::Unauthorized("invalid email or password"))?;

    if !auth::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("invalid email or password"));
    }
    if !user.is_active {
        return Err(ApiError::Unauthorized(
            "your account has been deactivated, please contact admin",
        ));
    }

    let token = auth::create_token(jwt_secret, user.id)?;
    info!("{:<12} --> {} logged in", "Users", user.username);
    Ok((token, user))
}

/// Admin-only role / active-flag update.
pub async fn update_user(
    db: &DatabaseManager,
    user_id: i64,
    update: UserUpdate,
) -> Result<User, ApiError> {
    let user = db
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(
                    "UPDATE users
                     SET role = COALESCE($1, role),
                         is_active = COALESCE($2, is_active)
                     WHERE id = $3
                     RETURNING *",
                )
                .bind(update.role)
                .bind(update.is_active)
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await
            })
        })
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(user)
}
// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str, role: UserRole) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        }
    }

    #[test]
    fn valid_registration_passes() {
        let req = request("alice", "alice@example.com", "hunter22", UserRole::Buyer);
        assert!(validate_registration(&req).is_ok());
    }

    #[test]
    fn short_username_rejected() {
        let req = request("al", "al@example.com", "hunter22", UserRole::Buyer);
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn short_password_rejected() {
        let req = request("alice", "alice@example.com", "abc", UserRole::Seller);
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn admin_self_registration_rejected() {
        let req = request("mallory", "mallory@example.com", "hunter22", UserRole::Admin);
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn roles_gate_selling_and_admin() {
        assert!(!UserRole::Buyer.can_sell());
        assert!(UserRole::Seller.can_sell());
        assert!(UserRole::Admin.can_sell());
        assert!(UserRole::Admin.can_admin());
        assert!(!UserRole::Seller.can_admin());
    }
}
