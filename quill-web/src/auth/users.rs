//! User accounts and password checks

#[cfg(feature = "sqlite")]
use super::database::DatabaseUserStore;
use super::jwt::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use quill_core::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Stored account with password hash
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserData {
    /// Create new user with hashed password
    pub fn new(username: &str, password: &str) -> Result<Self, AuthError> {
        Ok(Self {
            id: UserId::generate(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        })
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash).unwrap_or(false)
    }
}

/// Why a username was refused, as shown next to the field
pub fn username_problem(username: &str) -> Option<&'static str> {
    if username.is_empty() {
        return Some("This field is required.");
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Some("Ensure this value has at most 150 characters.");
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Some(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    None
}

/// Why a password was refused, as shown next to the field
pub fn password_problem(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        return Some("This field is required.");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Some("This password is too short. It must contain at least 8 characters.");
    }
    None
}

/// User store supporting both in-memory and database storage
#[derive(Debug, Clone)]
pub enum UserStore {
    /// In-memory storage (for development and testing)
    Memory {
        users: Arc<RwLock<HashMap<String, UserData>>>,
    },
    /// Database storage
    #[cfg(feature = "sqlite")]
    Database(DatabaseUserStore),
}

impl Default for UserStore {
    fn default() -> Self {
        Self::memory()
    }
}

impl UserStore {
    pub fn memory() -> Self {
        Self::Memory {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[cfg(feature = "sqlite")]
    pub fn database(database_store: DatabaseUserStore) -> Self {
        Self::Database(database_store)
    }

    /// Create an account. Callers validate the fields first.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserData, AuthError> {
        debug!("Starting user registration for: {}", username);

        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        match self {
            Self::Memory { users } => {
                let mut users = users.write().await;
                if users.contains_key(username) {
                    debug!("Registration failed: username '{}' already exists", username);
                    return Err(AuthError::UsernameTaken);
                }

                let user = UserData::new(username, password)?;
                users.insert(user.username.clone(), user.clone());
                info!("Registered new user: {}", user.username);
                Ok(user)
            }
            #[cfg(feature = "sqlite")]
            Self::Database(db_store) => {
                let user = UserData::new(username, password)?;
                db_store.insert_user(&user).await?;
                info!("Registered new user: {}", user.username);
                Ok(user)
            }
        }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserData, AuthError> {
        let user = self
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.verify_password(password) {
            warn!("Invalid password for user: {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        debug!("User authenticated: {}", username);
        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserData>, AuthError> {
        match self {
            Self::Memory { users } => Ok(users.read().await.get(username).cloned()),
            #[cfg(feature = "sqlite")]
            Self::Database(db_store) => db_store.get_user_by_username(username).await,
        }
    }

    pub async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<UserData>, AuthError> {
        match self {
            Self::Memory { users } => Ok(users
                .read()
                .await
                .values()
                .find(|user| &user.id == user_id)
                .cloned()),
            #[cfg(feature = "sqlite")]
            Self::Database(db_store) => db_store.get_user_by_id(user_id).await,
        }
    }
}

/// Hash password using Argon2
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Storage(format!("Failed to hash password: {}", e)))
}

/// Verify password against hash
fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidToken)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
