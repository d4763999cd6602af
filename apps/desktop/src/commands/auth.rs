//! # Auth Commands
//!
//! Email + password login. There are no tokens: a successful login returns
//! a [`Session`] that the front end passes to every other command.
//!
//! ```text
//! authenticate(email, password)
//!      │
//!      ▼
//! credentials_by_email ── None ──► argon2 verify (decoy hash)
//!      │                                     │
//!      ▼                                     ▼
//! argon2 verify ──────── mismatch ──► NOT_FOUND "Invalid credentials"
//!      │
//!      ▼
//! Login { user (no hash), session }
//! ```

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};
use ts_rs::TS;

use stockroom_core::{Session, User};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub user: User,
    pub session: Session,
}

/// Checks an email/password pair.
///
/// Unknown email, wrong password and empty input all fail the same way.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> ApiResult<Login> {
    let start = Instant::now();
    let email = email.trim();
    debug!(email = %email, "authenticate command");

    if email.is_empty() || password.is_empty() {
        warn!("Login rejected: empty email or password");
        return Err(ApiError::invalid_credentials());
    }

    let credentials = match state.repos().users.credentials_by_email(email).await? {
        Some(c) => c,
        None => {
            state.passwords().reject(password);
            warn!(email = %email, "Login rejected: unknown email");
            return Err(ApiError::invalid_credentials());
        }
    };

    if !state.passwords().verify(password, &credentials.password_hash) {
        warn!(email = %email, "Login rejected: wrong password");
        return Err(ApiError::invalid_credentials());
    }

    let user = credentials.user;
    let session = Session::new(&user);

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        user_id = %user.id,
        role = %user.role,
        "User logged in"
    );

    Ok(Login { user, session })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{memory_state, ADMIN_EMAIL, ADMIN_PASSWORD};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_valid_credentials_return_user() {
        let (state, _) = memory_state().await;

        let login = authenticate(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        assert_eq!(login.user.email, ADMIN_EMAIL);
        assert_eq!(login.session.user_id, login.user.id);

        let json = serde_json::to_value(&login).unwrap();
        assert!(json["user"].get("passwordHash").is_none());
        assert!(json["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_every_failure_looks_the_same() {
        let (state, _) = memory_state().await;

        let cases = [
            (ADMIN_EMAIL, "wrong"),
            ("nobody@stock.local", ADMIN_PASSWORD),
            ("", ""),
            (ADMIN_EMAIL, ""),
            ("", ADMIN_PASSWORD),
        ];
        for (email, password) in cases {
            let err = authenticate(&state, email, password).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::NotFound, "{email:?}/{password:?}");
            assert_eq!(err.message, "Invalid credentials");
        }
    }
}
