use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn list(db: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM categories
        ORDER BY name ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM categories
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_by_name(db: &PgPool, name: &str) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM categories
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn insert(
    db: &PgPool,
    name: &str,
    description: Option<&str>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(db)
    .await
}

/// `set_description` says whether the caller supplied the field at all; a
/// supplied NULL clears it.
pub async fn update(
    db: &PgPool,
    id: i64,
    name: &str,
    set_description: bool,
    description: Option<&str>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $2,
            description = CASE WHEN $3 THEN $4 ELSE description END,
            updated_at = now()
        WHERE id = $1
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(set_description)
    .bind(description)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
