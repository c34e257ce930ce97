use crate::auth::{generate_jwt, Claims};
use crate::config::config;

/// Mint a token with the configured secret. No database lookup is made.
pub fn handle(username: &str, admin: bool) -> anyhow::Result<()> {
    let security = &config().security;
    let claims = Claims::new(username, admin, security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;
    println!("{}", token);
    Ok(())
}
