use crate::middleware::validate::{Fields, Schema};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid username regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// `users` row. Not serializable: the password hash must never leave the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Owner summary embedded in diary details.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
    pub diaries_count: i64,
    pub tags_count: i64,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Schema for RegisterRequest {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let name = fields
            .text("name")
            .required("Name is required")
            .max(100, "Name must be at most 100 characters")
            .read();
        let username = fields
            .text("username")
            .required("Username is required")
            .min(3, "Username must be at least 3 characters")
            .max(30, "Username must be at most 30 characters")
            .pattern(
                &USERNAME_RE,
                "Username can only contain letters, numbers, and underscores",
            )
            .read();
        let email = fields
            .text("email")
            .required("Email is required")
            .max(255, "Email must be at most 255 characters")
            .pattern(&EMAIL_RE, "Invalid email address")
            .read();
        let password = fields
            .text("password")
            .required("Password is required")
            .untrimmed()
            .min(6, "Password must be at least 6 characters")
            .max(128, "Password must be at most 128 characters")
            .read();

        Some(Self {
            name: name?,
            username: username?,
            email: email?,
            password: password?,
        })
    }
}

#[derive(Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Schema for LoginRequest {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let username = fields.text("username").required("Username is required").read();
        let password = fields
            .text("password")
            .required("Password is required")
            .untrimmed()
            .read();

        Some(Self {
            username: username?,
            password: password?,
        })
    }
}

#[derive(Debug)]
pub struct UpdateProfileRequest {
    pub name: String,
}

impl Schema for UpdateProfileRequest {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let name = fields
            .text("name")
            .required("Name is required")
            .max(100, "Name must be at most 100 characters")
            .read();

        Some(Self { name: name? })
    }
}

#[derive(Debug)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl Schema for ChangePasswordRequest {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let current_password = fields
            .text("currentPassword")
            .required("Current password is required")
            .untrimmed()
            .read();
        let new_password = fields
            .text("newPassword")
            .required("New password is required")
            .untrimmed()
            .min(6, "New password must be at least 6 characters")
            .max(128, "New password must be at most 128 characters")
            .read();

        Some(Self {
            current_password: current_password?,
            new_password: new_password?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::{json, Value};

    fn parse<T: Schema + std::fmt::Debug>(body: Value) -> Result<T, AppError> {
        let Value::Object(map) = body else { unreachable!() };
        let mut fields = Fields::body(&map);
        let parsed = T::read(&mut fields);
        fields.finish(parsed)
    }

    #[test]
    fn register_accepts_valid_input() {
        let req: RegisterRequest = parse(json!({
            "name": " Alice ",
            "username": "alice_01",
            "email": "alice@example.com",
            "password": "secret1"
        }))
        .unwrap();
        assert_eq!(req.name, "Alice");
        assert_eq!(req.username, "alice_01");
    }

    #[test]
    fn register_reports_every_bad_field() {
        let err = parse::<RegisterRequest>(json!({
            "username": "a!",
            "email": "not-an-email",
            "password": "123"
        }))
        .unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert_eq!(errors["name"], "Name is required");
        assert_eq!(errors["username"], "Username must be at least 3 characters");
        assert_eq!(errors["email"], "Invalid email address");
        assert_eq!(errors["password"], "Password must be at least 6 characters");
    }

    #[test]
    fn user_response_has_no_credential() {
        let user = User {
            id: 1,
            name: "Alice".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$...".into(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
            updated_at: "2024-01-01T00:00:00.000Z".into(),
        };
        let value = serde_json::to_value(UserResponse::from(user)).unwrap();
        let text = value.to_string();
        assert!(!text.contains("password"));
        assert!(!text.contains("argon2"));
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00.000Z");
    }
}
