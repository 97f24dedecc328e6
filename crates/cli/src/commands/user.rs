//! Customer account commands.

use thiserror::Error;
use tracing::info;

use bewear_storefront::services::{AuthError, AuthService};

use super::{CommandError, connect};

/// Errors from user commands.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a password account, the same way `/api/auth/register` does.
///
/// # Errors
///
/// Returns `UserError::Auth` if validation fails or the email is taken.
pub async fn create(name: &str, email: &str, password: &str) -> Result<(), UserError> {
    let pool = connect().await?;

    let user = AuthService::new(&pool)
        .register_with_password(name, email, password)
        .await?;

    info!(user_id = %user.id, email = %user.email, "User created");
    Ok(())
}
