use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::{
    dto::{
        CreatePostRequest, OwnPost, PageQuery, PaginationMeta, PostDetails, PostListResponse,
        SearchQuery, UpdatePostRequest,
    },
    repo,
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/search", get(search_posts))
        .route("/posts/category/:category_id", get(category_posts))
        .route("/posts/:id", get(get_post))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/user", get(user_posts))
        .route("/posts/:id", put(update_post).delete(delete_post))
}

fn is_valid_url(url: &str) -> bool {
    lazy_static! {
        static ref URL_RE: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
    }
    URL_RE.is_match(url)
}

/// Boundary validation for create and update alike: title 3-255 chars,
/// non-empty content, and a URL-shaped featured image when one is given.
/// Returns the validated owned title/content.
fn validate_post_fields(
    title: Option<String>,
    content: Option<String>,
    featured_image: Option<&str>,
) -> Result<(String, String), ApiError> {
    let title = title.unwrap_or_default();
    let content = content.unwrap_or_default();

    let mut errors = Vec::new();
    if !(3..=255).contains(&title.chars().count()) {
        errors.push("Title must be between 3 and 255 characters".to_string());
    }
    if content.is_empty() {
        errors.push("Content is required".to_string());
    }
    if let Some(url) = featured_image {
        if !is_valid_url(url) {
            errors.push("Featured image must be a valid URL".to_string());
        }
    }
    if errors.is_empty() {
        Ok((title, content))
    } else {
        Err(ApiError::validation_errors(errors))
    }
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = params.page();
    let limit = params.limit();
    let rows = repo::list(&state.db, limit, params.offset()).await?;
    let total = repo::count(&state.db).await?;
    Ok(Json(PostListResponse {
        posts: rows.into_iter().map(PostDetails::from).collect(),
        pagination: PaginationMeta::new(total, page, limit),
    }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostDetails>, ApiError> {
    let row = repo::get_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostDetails>), ApiError> {
    let (title, content) =
        validate_post_fields(payload.title, payload.content, payload.featured_image.as_deref())?;

    let id = repo::insert(
        &state.db,
        identity.id,
        &title,
        &content,
        payload.category_id,
        payload.featured_image.as_deref(),
    )
    .await?;

    // read-after-write for the enriched representation
    let row = repo::get_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    info!(post_id = id, user_id = identity.id, "post created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<PostDetails>, ApiError> {
    let (title, content) = validate_post_fields(
        payload.title,
        payload.content,
        payload.featured_image.as_ref().and_then(|o| o.as_deref()),
    )?;

    let post = repo::find_bare(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    if post.user_id != identity.id {
        warn!(post_id = id, user_id = identity.id, "update of foreign post rejected");
        return Err(ApiError::Forbidden(
            "You are not authorized to update this post".into(),
        ));
    }

    repo::update(
        &state.db,
        id,
        &title,
        &content,
        payload.category_id.is_some(),
        payload.category_id.flatten(),
        payload.featured_image.is_some(),
        payload.featured_image.as_ref().and_then(|o| o.as_deref()),
    )
    .await?;

    let row = repo::get_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    info!(post_id = id, user_id = identity.id, "post updated");
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let post = repo::find_bare(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    if post.user_id != identity.id {
        warn!(post_id = id, user_id = identity.id, "delete of foreign post rejected");
        return Err(ApiError::Forbidden(
            "You are not authorized to delete this post".into(),
        ));
    }

    repo::delete(&state.db, id).await?;

    info!(post_id = id, user_id = identity.id, "post deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Post deleted successfully"
    })))
}

#[instrument(skip(state))]
pub async fn user_posts(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<OwnPost>>, ApiError> {
    let rows = repo::list_by_owner(&state.db, identity.id).await?;
    Ok(Json(rows.into_iter().map(OwnPost::from).collect()))
}

#[instrument(skip(state))]
pub async fn category_posts(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Query(params): Query<PageQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = params.page();
    let limit = params.limit();
    let rows = repo::list_by_category(&state.db, category_id, limit, params.offset()).await?;
    let total = repo::count_by_category(&state.db, category_id).await?;
    Ok(Json(PostListResponse {
        posts: rows.into_iter().map(PostDetails::from).collect(),
        pagination: PaginationMeta::new(total, page, limit),
    }))
}

/// An absent or empty query is a 400, not an empty result set; a query with
/// no matches is an empty list, not an error.
#[instrument(skip(state))]
pub async fn search_posts(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<PostDetails>>, ApiError> {
    let q = params.q.unwrap_or_default();
    if q.is_empty() {
        return Err(ApiError::validation("Search query is required"));
    }
    let rows = repo::search(&state.db, &q).await?;
    Ok(Json(rows.into_iter().map(PostDetails::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_shapes() {
        assert!(is_valid_url("https://example.com/image.png"));
        assert!(is_valid_url("http://cdn.example.com/a/b?c=d"));
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url("example.com/no-scheme"));
        assert!(!is_valid_url("https://has spaces.com"));
    }

    #[test]
    fn valid_fields_pass_through() {
        let (title, content) = validate_post_fields(
            Some("A fine title".into()),
            Some("Some content".into()),
            Some("https://example.com/pic.jpg"),
        )
        .expect("valid input");
        assert_eq!(title, "A fine title");
        assert_eq!(content, "Some content");
    }

    #[test]
    fn short_title_is_rejected() {
        let err = validate_post_fields(Some("ab".into()), Some("content".into()), None)
            .unwrap_err();
        match err {
            ApiError::Validation { errors, .. } => {
                assert_eq!(
                    errors,
                    vec!["Title must be between 3 and 255 characters".to_string()]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn overlong_title_is_rejected() {
        let err = validate_post_fields(Some("x".repeat(256)), Some("content".into()), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[test]
    fn missing_fields_collect_all_errors() {
        let err = validate_post_fields(None, None, Some("not-a-url")).unwrap_err();
        match err {
            ApiError::Validation { errors, .. } => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_content_is_rejected() {
        let err =
            validate_post_fields(Some("A title".into()), Some(String::new()), None).unwrap_err();
        match err {
            ApiError::Validation { errors, .. } => {
                assert_eq!(errors, vec!["Content is required".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn update_payload_distinguishes_absent_from_null() {
        let keep: UpdatePostRequest =
            serde_json::from_str(r#"{"title": "Kept title", "content": "body"}"#).expect("parse");
        assert_eq!(keep.category_id, None);
        assert_eq!(keep.featured_image, None);

        let clear: UpdatePostRequest = serde_json::from_str(
            r#"{"title": "Kept title", "content": "body", "category_id": null, "featured_image": null}"#,
        )
        .expect("parse");
        assert_eq!(clear.category_id, Some(None));
        assert_eq!(clear.featured_image, Some(None));

        let set: UpdatePostRequest = serde_json::from_str(
            r#"{"title": "Kept title", "content": "body", "category_id": 3, "featured_image": "https://x.io/a.png"}"#,
        )
        .expect("parse");
        assert_eq!(set.category_id, Some(Some(3)));
        assert_eq!(set.featured_image, Some(Some("https://x.io/a.png".into())));
    }
}
