use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{decode_row, decode_rows, first_row, require_changes, ServiceError, ServiceResult};
use crate::auth::CredentialVerifier;
use crate::database::executor::QueryExecutor;
use crate::database::models::{User, UserSummary};
use crate::database::query_builder::{build_delete, build_insert, build_partial_update, build_select, build_select_by_key};
use crate::database::tables::USERS;

const NOT_FOUND: &str = "User not found";

/// Columns safe to send back to clients
const PUBLIC_COLUMNS: &[&str] = &["username", "first_name", "last_name", "email", "photo_url"];

/// Result of a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub is_admin: bool,
}

#[derive(Deserialize)]
struct CredentialRow {
    username: String,
    password: String,
    is_admin: bool,
}

pub struct UserService;

impl UserService {
    /// Register a user. The plaintext password is replaced by its digest before
    /// the insert is built.
    pub async fn create(
        db: &dyn QueryExecutor,
        credentials: &dyn CredentialVerifier,
        mut values: Map<String, Value>,
    ) -> ServiceResult<User> {
        for required in ["username", "password", "first_name", "last_name", "email"] {
            if !values.get(required).is_some_and(Value::is_string) {
                return Err(ServiceError::Validation(vec![format!("{} is required", required)]));
            }
        }
        hash_password(credentials, &mut values)?;

        let descriptor = build_insert(&values, &USERS, PUBLIC_COLUMNS)?;
        let rows = db.fetch_rows(&descriptor).await?;
        decode_row(first_row(rows, NOT_FOUND)?)
    }

    pub async fn all(db: &dyn QueryExecutor) -> ServiceResult<Vec<UserSummary>> {
        let descriptor = build_select(&[], &["username", "first_name", "last_name", "email"], &USERS)?;
        decode_rows(db.fetch_rows(&descriptor).await?)
    }

    pub async fn get(db: &dyn QueryExecutor, username: &str) -> ServiceResult<User> {
        let descriptor = build_select_by_key(&USERS, PUBLIC_COLUMNS, "username", json!(username))?;
        decode_row(first_row(db.fetch_rows(&descriptor).await?, NOT_FOUND)?)
    }

    /// Partial update; a new password is hashed first. The update returns the
    /// whole row, which is narrowed to the public fields on decode.
    pub async fn update(
        db: &dyn QueryExecutor,
        credentials: &dyn CredentialVerifier,
        username: &str,
        mut values: Map<String, Value>,
    ) -> ServiceResult<User> {
        require_changes(&values)?;
        if values.contains_key("password") {
            hash_password(credentials, &mut values)?;
        }

        let descriptor = build_partial_update(&USERS, &values, "username", json!(username))?;
        decode_row(first_row(db.fetch_rows(&descriptor).await?, NOT_FOUND)?)
    }

    pub async fn delete(db: &dyn QueryExecutor, username: &str) -> ServiceResult<&'static str> {
        let descriptor = build_delete(&USERS, "username", json!(username))?;
        first_row(db.fetch_rows(&descriptor).await?, NOT_FOUND)?;
        debug!("Deleted user {}", username);
        Ok("User deleted")
    }

    /// Check a username/password pair. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn authenticate(
        db: &dyn QueryExecutor,
        credentials: &dyn CredentialVerifier,
        username: &str,
        password: &str,
    ) -> ServiceResult<AuthenticatedUser> {
        let descriptor = build_select_by_key(&USERS, &["username", "password", "is_admin"], "username", json!(username))?;
        let Some(row) = db.fetch_rows(&descriptor).await?.into_iter().next() else {
            warn!("Login attempt for unknown user {}", username);
            return Err(ServiceError::InvalidCredentials);
        };

        let row: CredentialRow = decode_row(row)?;
        if !credentials.compare(password, &row.password) {
            warn!("Wrong password for user {}", username);
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(AuthenticatedUser {
            username: row.username,
            is_admin: row.is_admin,
        })
    }
}

fn hash_password(credentials: &dyn CredentialVerifier, values: &mut Map<String, Value>) -> ServiceResult<()> {
    let Some(Value::String(plaintext)) = values.get("password") else {
        return Err(ServiceError::Validation(vec!["password must be a string".to_string()]));
    };
    let digest = credentials.hash(plaintext)?;
    values.insert("password".to_string(), Value::String(digest));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordError;
    use crate::testing::ScriptedExecutor;

    /// Reversible stand-in so tests can see what was stored
    struct PlainVerifier;

    impl CredentialVerifier for PlainVerifier {
        fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
            Ok(format!("hashed:{}", plaintext))
        }

        fn compare(&self, plaintext: &str, digest: &str) -> bool {
            digest == format!("hashed:{}", plaintext)
        }
    }

    fn user_row() -> Value {
        json!({
            "username": "u1",
            "first_name": "U1F",
            "last_name": "U1L",
            "email": "u1@email.com",
            "photo_url": null
        })
    }

    fn new_user() -> Map<String, Value> {
        json!({
            "username": "u1",
            "password": "password1",
            "first_name": "U1F",
            "last_name": "U1L",
            "email": "u1@email.com"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[tokio::test]
    async fn create_stores_only_the_digest() {
        let db = ScriptedExecutor::new(vec![vec![user_row()]]);
        let user = UserService::create(&db, &PlainVerifier, new_user()).await.unwrap();
        assert_eq!(user.username, "u1");

        let seen = db.seen();
        assert_eq!(
            seen[0].query,
            "INSERT INTO users (username, password, first_name, last_name, email) \
             VALUES ($1, $2, $3, $4, $5) RETURNING username, first_name, last_name, email, photo_url"
        );
        assert_eq!(seen[0].params[1], json!("hashed:password1"));
    }

    #[tokio::test]
    async fn update_rehashes_password_and_hides_it() {
        let mut full_row = user_row();
        full_row["password"] = json!("hashed:newpass");
        full_row["is_admin"] = json!(false);
        let db = ScriptedExecutor::new(vec![vec![full_row]]);

        let values = json!({ "password": "newpass" }).as_object().cloned().unwrap();
        let user = UserService::update(&db, &PlainVerifier, "u1", values).await.unwrap();

        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("password").is_none());
        assert_eq!(db.seen()[0].params, vec![json!("hashed:newpass"), json!("u1")]);
    }

    #[tokio::test]
    async fn authenticate_accepts_the_right_password() {
        let row = json!({ "username": "u1", "password": "hashed:password1", "is_admin": true });
        let db = ScriptedExecutor::new(vec![vec![row]]);

        let user = UserService::authenticate(&db, &PlainVerifier, "u1", "password1").await.unwrap();
        assert_eq!(user, AuthenticatedUser { username: "u1".to_string(), is_admin: true });
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password_and_unknown_user() {
        let row = json!({ "username": "u1", "password": "hashed:password1", "is_admin": false });
        let db = ScriptedExecutor::new(vec![vec![row]]);
        let err = UserService::authenticate(&db, &PlainVerifier, "u1", "wrong").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        let db = ScriptedExecutor::default();
        let err = UserService::authenticate(&db, &PlainVerifier, "nope", "password1").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
    }
}
