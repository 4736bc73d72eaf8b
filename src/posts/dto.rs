use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo::{OwnPostRow, PostDetailRow};
use crate::serde_util::deserialize_some;

/// Raw `page`/`limit` query strings, coerced with parse-or-default
/// semantics: anything that fails to parse falls back to the default, while
/// zero and negative values pass through untouched into the offset
/// arithmetic and the SQL binds. Long-standing behavior, kept as-is.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<i64>,
    pub featured_image: Option<String>,
}

/// Update payload. `title`/`content` are mandatory; the two nullable fields
/// are tri-state — absent leaves the column unchanged, an explicit `null`
/// clears it.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub featured_image: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct PostAuthor {
    pub id: i64,
    pub username: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostCategory {
    pub id: i64,
    pub name: String,
}

/// Fully enriched post: owner summary (inner join) plus category summary
/// (outer join, so `category` may be null).
#[derive(Debug, Serialize)]
pub struct PostDetails {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user: PostAuthor,
    pub category: Option<PostCategory>,
}

impl From<PostDetailRow> for PostDetails {
    fn from(row: PostDetailRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            featured_image: row.featured_image,
            category_id: row.category_id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: PostAuthor {
                id: row.user_id,
                username: row.author_username,
                profile_image: row.author_profile_image,
            },
            category: row
                .category_id
                .zip(row.category_name)
                .map(|(id, name)| PostCategory { id, name }),
        }
    }
}

/// Category-enriched only; the owner is the caller, so no author summary.
#[derive(Debug, Serialize)]
pub struct OwnPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub category: Option<PostCategory>,
}

impl From<OwnPostRow> for OwnPost {
    fn from(row: OwnPostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            featured_image: row.featured_image,
            category_id: row.category_id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category: row
                .category_id
                .zip(row.category_name)
                .map(|(id, name)| PostCategory { id, name }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub limit: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, current_page: i64, limit: i64) -> Self {
        // Math.ceil semantics; a degenerate limit never panics here, it
        // saturates on the cast.
        let total_pages = (total as f64 / limit as f64).ceil() as i64;
        Self {
            total,
            total_pages,
            current_page,
            limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostDetails>,
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let q = query(None, None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn non_numeric_params_fall_back_to_defaults() {
        let q = query(Some("abc"), Some("ten"));
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn second_page_of_five() {
        let q = query(Some("2"), Some("5"));
        assert_eq!(q.offset(), 5);
    }

    #[test]
    fn zero_and_negative_values_pass_through() {
        // inherited quirk: no clamping, the offset goes negative
        let q = query(Some("0"), Some("10"));
        assert_eq!(q.page(), 0);
        assert_eq!(q.offset(), -10);

        let q = query(Some("-3"), Some("10"));
        assert_eq!(q.offset(), -40);

        let q = query(Some("1"), Some("-5"));
        assert_eq!(q.limit(), -5);
    }

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(PaginationMeta::new(0, 1, 10).total_pages, 0);
        assert_eq!(PaginationMeta::new(10, 1, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(11, 2, 10).total_pages, 2);
        assert_eq!(PaginationMeta::new(10, 2, 5).total_pages, 2);
        assert_eq!(PaginationMeta::new(1, 1, 10).total_pages, 1);
    }

    #[test]
    fn degenerate_limit_does_not_panic() {
        let meta = PaginationMeta::new(3, 1, 0);
        assert!(meta.total_pages > 0);
    }

    #[test]
    fn pagination_meta_serializes_camel_case() {
        let json = serde_json::to_value(PaginationMeta::new(11, 2, 10)).expect("serialize");
        assert_eq!(json["total"], 11);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["limit"], 10);
    }

    fn detail_row(category: Option<(i64, &str)>) -> PostDetailRow {
        PostDetailRow {
            id: 1,
            title: "First".into(),
            content: "Body".into(),
            featured_image: None,
            category_id: category.map(|(id, _)| id),
            user_id: 9,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
            author_username: "writer".into(),
            author_profile_image: None,
            category_name: category.map(|(_, name)| name.to_string()),
        }
    }

    #[test]
    fn enrichment_includes_owner_and_category() {
        let details = PostDetails::from(detail_row(Some((4, "rust"))));
        assert_eq!(details.user.id, 9);
        assert_eq!(details.user.username, "writer");
        let category = details.category.expect("category present");
        assert_eq!(category.id, 4);
        assert_eq!(category.name, "rust");
    }

    #[test]
    fn uncategorized_post_has_null_category() {
        let details = PostDetails::from(detail_row(None));
        assert!(details.category.is_none());
        let json = serde_json::to_value(&details).expect("serialize");
        assert!(json["category"].is_null());
    }
}
