use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Authorization role of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        use std::str::FromStr;
        // Unrecognized database data falls back to the least-privileged role.
        Role::from_str(&s).unwrap_or(Role::User)
    }
}

/// Identity entity representing a complete user record from the database.
///
/// Owned by the persistent store. The refresh-token field holds the single
/// currently valid refresh token (or none); issuing a new one invalidates the
/// prior value by overwrite.
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub confirmed: bool,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Reduced projection of [`Identity`] used for authorization checks and as the
/// cached snapshot.
///
/// Deliberately carries no password hash, refresh token, or relational data;
/// flows that need contacts or groups must load the full entity from the
/// store. This is also what bounds cache staleness to harmless fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub confirmed: bool,
    pub role: Role,
    pub avatar_url: Option<String>,
}

impl AuthenticatedIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&Identity> for AuthenticatedIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            confirmed: identity.confirmed,
            role: identity.role,
            avatar_url: identity.avatar_url.clone(),
        }
    }
}

/// Data structure for creating a new identity.
///
/// Password must already be hashed (see `lib-auth::pwd::hash_password`).
#[derive(Debug, Clone)]
pub struct IdentityForCreate {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
}

impl IdentityForCreate {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash,
            avatar_url: None,
        }
    }
}
