//! Account commands - `login`, `logout`, `whoami` and `hash-password`.

use crate::{cli::AppContext, core::auth, errors::Result};

/// Checks the credentials and remembers the user.
pub async fn login(ctx: &AppContext, username: &str, password: &str) -> Result<String> {
    auth::login(ctx.db(), &ctx.users, username, password).await?;
    Ok(format!("✅ Logged in as '{}'.", username.trim()))
}

/// Forgets the logged-in user.
pub async fn logout(ctx: &AppContext) -> Result<String> {
    auth::logout(ctx.db()).await?;
    Ok("✅ Logged out.".to_string())
}

/// Names the logged-in user.
pub async fn whoami(ctx: &AppContext) -> Result<String> {
    Ok(auth::current_user(ctx.db())
        .await?
        .map_or_else(|| "Not logged in.".to_string(), |user| format!("Logged in as '{user}'.")))
}

/// Produces the `passwordHash` value for a credential document.
#[must_use]
pub fn hash_password(username: &str, password: &str) -> String {
    auth::hash_password(username.trim(), password.trim())
}
