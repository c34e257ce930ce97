mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use jobly_api::auth::verify_jwt;

fn user_row(username: &str) -> serde_json::Value {
    json!({
        "username": username,
        "first_name": "First",
        "last_name": "Last",
        "email": format!("{}@email.com", username),
        "photo_url": null
    })
}

#[tokio::test]
async fn registration_is_public_and_returns_a_token() -> Result<()> {
    let app = TestApp::new();
    app.db.push(vec![user_row("new")]);

    let (status, body) = app
        .post(
            "/users",
            None,
            json!({
                "username": "new",
                "password": "password1",
                "first_name": "First",
                "last_name": "Last",
                "email": "new@email.com",
                "is_admin": true
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], json!("new"));
    assert!(body["user"].get("password").is_none());

    let claims = verify_jwt(body["token"].as_str().expect("token"), &app.config.security.jwt_secret)?;
    assert_eq!(claims.username, "new");
    assert!(!claims.is_admin);

    // is_admin is not accepted and the stored password is a digest
    let insert = &app.db.seen()[0];
    assert!(!insert.query.contains("is_admin"));
    assert!(insert.params[1].as_str().unwrap_or_default().starts_with("$argon2id$"));
    Ok(())
}

#[tokio::test]
async fn registration_validates_fields() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/users",
            None,
            json!({
                "username": "new",
                "password": "pw",
                "first_name": "First",
                "last_name": "Last",
                "email": "nope"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!(["password must be 5 to 20 characters", "email must be a valid email address"])
    );
    assert!(app.db.seen().is_empty());
    Ok(())
}

#[tokio::test]
async fn reads_need_a_login() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app.get("/users", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.db.push(vec![json!({ "username": "u1", "first_name": "F", "last_name": "L", "email": "u1@email.com" })]);
    let (status, body) = app.get("/users", Some(&app.user_token())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"][0]["username"], json!("u1"));

    let (status, body) = app.get("/users/ghost", Some(&app.user_token())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("User not found"));
    Ok(())
}

#[tokio::test]
async fn only_self_or_admin_may_modify() -> Result<()> {
    let app = TestApp::new();
    let u1 = app.user_token();

    let (status, _) = app.patch("/users/u2", Some(&u1), json!({ "first_name": "X" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.delete("/users/u2", Some(&u1)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.db.seen().is_empty());

    let mut full_row = user_row("u1");
    full_row["password"] = json!("$argon2id$stored");
    full_row["is_admin"] = json!(false);
    app.db.push(vec![full_row]);
    let (status, body) = app.patch("/users/u1", Some(&u1), json!({ "first_name": "New" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("is_admin").is_none());

    app.db.push(vec![json!({ "username": "u2" })]);
    let (status, body) = app.delete("/users/u2", Some(&app.admin_token())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User deleted" }));
    Ok(())
}
