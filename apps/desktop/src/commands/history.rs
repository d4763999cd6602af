//! # History Commands
//!
//! Read-only access to the audit log, newest first.

use tracing::debug;

use stockroom_core::{HistoryRecord, SearchQuery, Session};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_history(state: &AppState, session: &Session) -> ApiResult<Vec<HistoryRecord>> {
    debug!(by = %session.user_id, "list_history command");
    Ok(state.repos().history.list().await?)
}

/// Matches the action label and the details text.
pub async fn search_history(
    state: &AppState,
    session: &Session,
    query: &str,
) -> ApiResult<Vec<HistoryRecord>> {
    debug!(query = %query, by = %session.user_id, "search_history command");
    let records = match SearchQuery::parse(query)? {
        Some(q) => state.repos().history.search(&q).await?,
        None => state.repos().history.list().await?,
    };
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::category::add_category;
    use crate::commands::testing::memory_state;
    use stockroom_core::NewCategory;

    #[tokio::test]
    async fn test_search_history() {
        let (state, session) = memory_state().await;
        add_category(
            &state,
            &session,
            NewCategory {
                name: "Quincaillerie".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap();

        let found = search_history(&state, &session, "QUINCAILL").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].action, "Category added");

        let by_action = search_history(&state, &session, "user added").await.unwrap();
        assert_eq!(by_action.len(), 1);

        assert_eq!(
            search_history(&state, &session, "").await.unwrap(),
            list_history(&state, &session).await.unwrap()
        );
    }
}
