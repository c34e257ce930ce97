use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Payload;

/// Public view of a user row. The password digest and admin flag are not
/// fields here, so decoding a full row drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

/// Listing entry for `GET /users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(
        required(message = "username is required"),
        length(min = 1, max = 30, message = "username must be 1 to 30 characters")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "password is required"),
        length(min = 5, max = 20, message = "password must be 5 to 20 characters")
    )]
    pub password: Option<String>,
    #[validate(
        required(message = "first_name is required"),
        length(min = 1, max = 30, message = "first_name must be 1 to 30 characters")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "last_name is required"),
        length(min = 1, max = 30, message = "last_name must be 1 to 30 characters")
    )]
    pub last_name: Option<String>,
    #[validate(
        required(message = "email is required"),
        email(message = "email must be a valid email address")
    )]
    pub email: Option<String>,
    #[validate(url(message = "photo_url must be a valid URL"))]
    pub photo_url: Option<String>,
}

impl Payload for UserCreate {
    const FIELDS: &'static [&'static str] =
        &["username", "password", "first_name", "last_name", "email", "photo_url"];
}

/// Username is the key; `is_admin` is never writable through the API
#[derive(Debug, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 5, max = 20, message = "password must be 5 to 20 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 30, message = "first_name must be 1 to 30 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 30, message = "last_name must be 1 to 30 characters"))]
    pub last_name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(url(message = "photo_url must be a valid URL"))]
    pub photo_url: Option<String>,
}

impl Payload for UserUpdate {
    const FIELDS: &'static [&'static str] = &["password", "first_name", "last_name", "email", "photo_url"];
    const NOT_NULL: &'static [&'static str] = &["password", "first_name", "last_name", "email"];
}

/// `POST /auth/login` body. Missing fields are reported as bad credentials,
/// not as validation errors.
#[derive(Debug, Default, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use serde_json::json;

    #[test]
    fn create_reports_missing_fields_in_order() {
        let err = UserCreate::from_json(&json!({ "username": "testUser" })).unwrap_err();
        match err {
            ServiceError::Validation(messages) => assert_eq!(
                messages,
                vec![
                    "password is required",
                    "first_name is required",
                    "last_name is required",
                    "email is required",
                ]
            ),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn create_checks_email_format() {
        let err = UserCreate::from_json(&json!({
            "username": "testUser",
            "password": "password1",
            "first_name": "Test",
            "last_name": "User",
            "email": "not-an-email"
        }))
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m == vec!["email must be a valid email address"]));
    }

    #[test]
    fn update_may_clear_only_the_photo() {
        assert!(UserUpdate::from_json(&json!({ "photo_url": null })).is_ok());
        let err = UserUpdate::from_json(&json!({ "email": null })).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m == vec!["email must not be null"]));
    }

    #[test]
    fn decoding_a_full_row_drops_secrets() {
        let row = json!({
            "username": "u1",
            "password": "$argon2id$...",
            "first_name": "U",
            "last_name": "One",
            "email": "u1@email.com",
            "photo_url": null,
            "is_admin": true
        });
        let user: User = serde_json::from_value(row).unwrap();
        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("password").is_none());
        assert!(out.get("is_admin").is_none());
    }
}
