//! # Category Commands

use std::time::Instant;
use tracing::{debug, info};

use stockroom_core::{
    Category, CategoryPatch, HistoryAction, HistoryRecord, NewCategory, SearchQuery, Session,
};

use super::record_history;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn add_category(
    state: &AppState,
    session: &Session,
    input: NewCategory,
) -> ApiResult<Category> {
    let start = Instant::now();
    debug!(name = %input.name, "add_category command");

    input.validate()?;
    let category = input.into_category();

    state.repos().categories.insert(&category).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::CategoryAdded, format!("Category: {}", category.name))
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        category_id = %category.id,
        "Category added"
    );
    Ok(category)
}

pub async fn update_category(
    state: &AppState,
    session: &Session,
    id: &str,
    patch: CategoryPatch,
) -> ApiResult<Category> {
    let start = Instant::now();
    debug!(id = %id, "update_category command");

    let mut category = state
        .repos()
        .categories
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))?;
    category.apply(&patch);

    state.repos().categories.update(&category).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::CategoryUpdated, format!("Category: {}", category.name))
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        category_id = %category.id,
        "Category updated"
    );
    Ok(category)
}

/// Deletes a category; its products become uncategorised.
pub async fn delete_category(state: &AppState, session: &Session, id: &str) -> ApiResult<()> {
    let start = Instant::now();
    debug!(id = %id, "delete_category command");

    let category = state
        .repos()
        .categories
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))?;

    state.repos().categories.delete(id).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::CategoryDeleted, format!("Category: {}", category.name))
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        category_id = %id,
        "Category deleted"
    );
    Ok(())
}

pub async fn list_categories(state: &AppState, session: &Session) -> ApiResult<Vec<Category>> {
    debug!(by = %session.user_id, "list_categories command");
    Ok(state.repos().categories.list().await?)
}

pub async fn search_categories(
    state: &AppState,
    session: &Session,
    query: &str,
) -> ApiResult<Vec<Category>> {
    debug!(query = %query, by = %session.user_id, "search_categories command");
    let categories = match SearchQuery::parse(query)? {
        Some(q) => state.repos().categories.search(&q).await?,
        None => state.repos().categories.list().await?,
    };
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::history::list_history;
    use crate::commands::testing::memory_state;
    use crate::error::ErrorCode;

    fn new_category(name: &str, description: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_category_lifecycle() {
        let (state, session) = memory_state().await;
        let before = list_history(&state, &session).await.unwrap().len();

        let category = add_category(&state, &session, new_category("Bureau", "Fournitures"))
            .await
            .unwrap();
        let renamed = update_category(
            &state,
            &session,
            &category.id,
            CategoryPatch {
                name: Some("Papeterie".to_string()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Papeterie");
        assert_eq!(renamed.description, "Fournitures");

        delete_category(&state, &session, &category.id).await.unwrap();
        assert!(list_categories(&state, &session).await.unwrap().is_empty());

        let history = list_history(&state, &session).await.unwrap();
        assert_eq!(history.len(), before + 3);
        assert_eq!(history[0].action, "Category deleted");

        let err = delete_category(&state, &session, &category.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(list_history(&state, &session).await.unwrap().len(), before + 3);
    }

    #[tokio::test]
    async fn test_search_categories() {
        let (state, session) = memory_state().await;
        add_category(&state, &session, new_category("Bureau", "Fournitures"))
            .await
            .unwrap();
        add_category(&state, &session, new_category("Informatique", "Matériel"))
            .await
            .unwrap();

        let found = search_categories(&state, &session, "fourn").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bureau");

        let all = search_categories(&state, &session, " ").await.unwrap();
        assert_eq!(all, list_categories(&state, &session).await.unwrap());
    }
}
