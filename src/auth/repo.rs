use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User record. Deliberately not `Serialize`: everything that leaves the
/// process goes through an explicit projection that has no secret field.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, bio, profile_image,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Register-time uniqueness probe: one lookup across both unique columns.
    pub async fn find_by_username_or_email(
        db: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, bio, profile_image,
                   created_at, updated_at
            FROM users
            WHERE username = $1 OR email = $2
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, bio, profile_image,
                      created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}
