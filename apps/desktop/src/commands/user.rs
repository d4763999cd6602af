//! # User Commands
//!
//! The account directory. Read operations never expose password hashes:
//! [`User`] has no such field and hashes only travel inside the store
//! layer's `UserCredentials`.

use std::time::Instant;
use tracing::{debug, info, warn};

use stockroom_core::{
    HistoryAction, HistoryRecord, NewUser, SearchQuery, Session, User, UserPatch,
};

use super::record_history;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Creates an account; the plaintext password is hashed before storage.
pub async fn add_user(state: &AppState, session: &Session, input: NewUser) -> ApiResult<User> {
    let start = Instant::now();
    debug!(email = %input.email, "add_user command");

    input.validate()?;
    let hash = state.passwords().hash(&input.password)?;
    let user = input.into_user();

    state.repos().users.insert(&user, &hash).await?;
    record_history(
        state,
        HistoryRecord::new(
            HistoryAction::UserAdded,
            format!("User: {} <{}>", user.full_name(), user.email),
        )
        .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        user_id = %user.id,
        role = %user.role,
        "User added"
    );
    Ok(user)
}

/// Updates an account.
///
/// A blank or missing password keeps the current hash; a value that is
/// already an argon2 hash is stored unchanged.
pub async fn update_user(
    state: &AppState,
    session: &Session,
    id: &str,
    patch: UserPatch,
) -> ApiResult<User> {
    let start = Instant::now();
    debug!(id = %id, "update_user command");

    patch.validate()?;
    let mut user = state
        .repos()
        .users
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    user.apply(&patch);

    let hash = match patch.new_password() {
        Some(password) => Some(state.passwords().hash_if_plain(password)?),
        None => None,
    };

    state.repos().users.update(&user, hash.as_deref()).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::UserUpdated, format!("User: {}", user.full_name()))
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        user_id = %user.id,
        password_changed = hash.is_some(),
        "User updated"
    );
    Ok(user)
}

/// Deletes an account. The logged-in user cannot delete themselves.
pub async fn delete_user(state: &AppState, session: &Session, id: &str) -> ApiResult<()> {
    let start = Instant::now();
    debug!(id = %id, "delete_user command");

    if let Err(e) = session.ensure_not_self(id) {
        warn!(user_id = %id, "Rejected self-deletion");
        return Err(e.into());
    }

    let user = state
        .repos()
        .users
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    state.repos().users.delete(id).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::UserDeleted, format!("User: {}", user.full_name()))
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        user_id = %id,
        "User deleted"
    );
    Ok(())
}

pub async fn get_user(state: &AppState, session: &Session, id: &str) -> ApiResult<User> {
    debug!(id = %id, by = %session.user_id, "get_user command");
    state
        .repos()
        .users
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))
}

pub async fn list_users(state: &AppState, session: &Session) -> ApiResult<Vec<User>> {
    debug!(by = %session.user_id, "list_users command");
    Ok(state.repos().users.list().await?)
}

/// Matches name, surname and email.
pub async fn search_users(state: &AppState, session: &Session, query: &str) -> ApiResult<Vec<User>> {
    let start = Instant::now();
    debug!(query = %query, by = %session.user_id, "search_users command");

    let users = match SearchQuery::parse(query)? {
        Some(q) => state.repos().users.search(&q).await?,
        None => state.repos().users.list().await?,
    };

    debug!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = users.len(),
        "search_users complete"
    );
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::auth::authenticate;
    use crate::commands::history::list_history;
    use crate::commands::testing::memory_state;
    use crate::error::ErrorCode;
    use stockroom_core::Role;

    fn new_user(name: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            surname: "Rakoto".to_string(),
            email: email.to_string(),
            role: Role::User,
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_user_hashes_and_records_history() {
        let (state, session) = memory_state().await;
        let before = list_history(&state, &session).await.unwrap().len();

        let user = add_user(&state, &session, new_user("Ana", "ana@stock.local", "pw1"))
            .await
            .unwrap();

        let creds = state
            .repos()
            .users
            .credentials_by_email("ana@stock.local")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(creds.password_hash, "pw1");
        assert!(state.passwords().verify("pw1", &creds.password_hash));

        let history = list_history(&state, &session).await.unwrap();
        assert_eq!(history.len(), before + 1);
        assert_eq!(history[0].action, "User added");
        assert_eq!(history[0].user_id.as_deref(), Some(session.user_id.as_str()));

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
    }

    #[tokio::test]
    async fn test_add_user_requires_password() {
        let (state, session) = memory_state().await;
        let err = add_user(&state, &session, new_user("Ana", "ana@stock.local", ""))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_update_password_semantics() {
        let (state, session) = memory_state().await;
        let user = add_user(&state, &session, new_user("Ana", "ana@stock.local", "first"))
            .await
            .unwrap();

        // blank password keeps the hash
        let patch = UserPatch {
            role: Some(Role::Manager),
            password: Some(String::new()),
            ..UserPatch::default()
        };
        let updated = update_user(&state, &session, &user.id, patch).await.unwrap();
        assert_eq!(updated.role, Role::Manager);
        assert!(authenticate(&state, "ana@stock.local", "first").await.is_ok());

        // plaintext is hashed
        let patch = UserPatch {
            password: Some("second".to_string()),
            ..UserPatch::default()
        };
        update_user(&state, &session, &user.id, patch).await.unwrap();
        assert!(authenticate(&state, "ana@stock.local", "first").await.is_err());
        assert!(authenticate(&state, "ana@stock.local", "second").await.is_ok());

        // an existing hash is stored as-is
        let hash = state.passwords().hash("third").unwrap();
        let patch = UserPatch {
            password: Some(hash.clone()),
            ..UserPatch::default()
        };
        update_user(&state, &session, &user.id, patch).await.unwrap();
        let creds = state
            .repos()
            .users
            .credentials_by_email("ana@stock.local")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.password_hash, hash);
        assert!(authenticate(&state, "ana@stock.local", "third").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_unknown_user_writes_nothing() {
        let (state, session) = memory_state().await;
        let before = list_history(&state, &session).await.unwrap().len();

        let err = update_user(&state, &session, "missing", UserPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(list_history(&state, &session).await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let (state, session) = memory_state().await;
        let other = add_user(&state, &session, new_user("Ana", "ana@stock.local", "pw"))
            .await
            .unwrap();

        let err = delete_user(&state, &session, &session.user_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert!(get_user(&state, &session, &session.user_id).await.is_ok());

        delete_user(&state, &session, &other.id).await.unwrap();
        let ids: Vec<String> = list_users(&state, &session)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, [session.user_id.clone()]);
    }

    #[tokio::test]
    async fn test_search_users() {
        let (state, session) = memory_state().await;
        add_user(&state, &session, new_user("Ana", "ana@stock.local", "pw"))
            .await
            .unwrap();

        let found = search_users(&state, &session, "  ANA@ ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ana");

        let all = search_users(&state, &session, "").await.unwrap();
        assert_eq!(all, list_users(&state, &session).await.unwrap());
    }
}
