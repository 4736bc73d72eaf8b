use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateCategoryRequest, UpdateCategoryRequest},
    repo::{self, Category},
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if (2..=50).contains(&name.chars().count()) {
        Ok(())
    } else {
        Err(ApiError::validation_errors(vec![
            "Name must be between 2 and 50 characters".to_string(),
        ]))
    }
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = repo::list(&state.db).await?;
    Ok(Json(categories))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, ApiError> {
    let category = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;
    Ok(Json(category))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let name = payload.name.unwrap_or_default();
    validate_name(&name)?;

    if repo::find_by_name(&state.db, &name).await?.is_some() {
        return Err(ApiError::Conflict(
            "Category with this name already exists".into(),
        ));
    }

    let category = repo::insert(&state.db, &name, payload.description.as_deref()).await?;

    info!(category_id = category.id, user_id = identity.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    if let Some(name) = &payload.name {
        validate_name(name)?;
    }

    let category = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;

    // re-check uniqueness only when the name actually changes
    let name = payload.name.unwrap_or_else(|| category.name.clone());
    if name != category.name && repo::find_by_name(&state.db, &name).await?.is_some() {
        warn!(category_id = id, "rename to taken category name");
        return Err(ApiError::Conflict(
            "Category with this name already exists".into(),
        ));
    }

    let updated = repo::update(
        &state.db,
        id,
        &name,
        payload.description.is_some(),
        payload.description.as_ref().and_then(|o| o.as_deref()),
    )
    .await?;

    info!(category_id = id, user_id = identity.id, "category updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;

    repo::delete(&state.db, id).await?;

    info!(category_id = id, user_id = identity.id, "category deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Category deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_bounds() {
        assert!(validate_name("ab").is_ok());
        assert!(validate_name(&"x".repeat(50)).is_ok());
        assert!(validate_name("a").is_err());
        assert!(validate_name(&"x".repeat(51)).is_err());
        assert!(validate_name("").is_err());
    }
}
