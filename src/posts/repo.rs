use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Bare post row, loaded ahead of mutations for the ownership check.
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Post joined with its owner (inner) and category (outer).
#[derive(Debug, Clone, FromRow)]
pub struct PostDetailRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_username: String,
    pub author_profile_image: Option<String>,
    pub category_name: Option<String>,
}

/// Post joined with its category only.
#[derive(Debug, Clone, FromRow)]
pub struct OwnPostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub category_name: Option<String>,
}

const DETAIL_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.featured_image, p.category_id, p.user_id,
           p.created_at, p.updated_at,
           u.username AS author_username,
           u.profile_image AS author_profile_image,
           c.name AS category_name
    FROM posts p
    JOIN users u ON u.id = p.user_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

pub async fn list(
    db: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, PostDetailRow>(&format!(
        "{DETAIL_SELECT} ORDER BY p.created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count(db: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(db)
        .await
}

pub async fn get_detail(db: &PgPool, id: i64) -> Result<Option<PostDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, PostDetailRow>(&format!("{DETAIL_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_bare(db: &PgPool, id: i64) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, content, featured_image, category_id, user_id,
               created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Inserts and returns the new id; the owner always comes from the
/// authenticated identity, never from client input. A dangling category_id
/// trips the foreign key and surfaces as a data-integrity error upstream.
pub async fn insert(
    db: &PgPool,
    owner_id: i64,
    title: &str,
    content: &str,
    category_id: Option<i64>,
    featured_image: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO posts (title, content, category_id, featured_image, user_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(category_id)
    .bind(featured_image)
    .bind(owner_id)
    .fetch_one(db)
    .await
}

/// Applies an owner-approved update. `set_category`/`set_featured` say
/// whether the caller supplied the field at all; a supplied NULL clears it.
pub async fn update(
    db: &PgPool,
    id: i64,
    title: &str,
    content: &str,
    set_category: bool,
    category_id: Option<i64>,
    set_featured: bool,
    featured_image: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE posts
        SET title = $2,
            content = $3,
            category_id = CASE WHEN $4 THEN $5 ELSE category_id END,
            featured_image = CASE WHEN $6 THEN $7 ELSE featured_image END,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .bind(set_category)
    .bind(category_id)
    .bind(set_featured)
    .bind(featured_image)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete(db: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list_by_owner(db: &PgPool, user_id: i64) -> Result<Vec<OwnPostRow>, sqlx::Error> {
    sqlx::query_as::<_, OwnPostRow>(
        r#"
        SELECT p.id, p.title, p.content, p.featured_image, p.category_id, p.user_id,
               p.created_at, p.updated_at,
               c.name AS category_name
        FROM posts p
        LEFT JOIN categories c ON c.id = p.category_id
        WHERE p.user_id = $1
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn list_by_category(
    db: &PgPool,
    category_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, PostDetailRow>(&format!(
        "{DETAIL_SELECT} WHERE p.category_id = $1 ORDER BY p.created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(category_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count_by_category(db: &PgPool, category_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE category_id = $1")
        .bind(category_id)
        .fetch_one(db)
        .await
}

/// Case-insensitive substring match on title or content, unpaginated.
/// `%`/`_` in the query keep their wildcard meaning, as they always have.
pub async fn search(db: &PgPool, q: &str) -> Result<Vec<PostDetailRow>, sqlx::Error> {
    let pattern = format!("%{q}%");
    sqlx::query_as::<_, PostDetailRow>(&format!(
        "{DETAIL_SELECT} WHERE p.title ILIKE $1 OR p.content ILIKE $1 ORDER BY p.created_at DESC"
    ))
    .bind(pattern)
    .fetch_all(db)
    .await
}
