use chrono::Utc;
use sqlx::error::ErrorKind;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::models::{NewUser, User};

pub type Result<T> = std::result::Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    /// A write was refused by a table constraint (unique, not-null, ...).
    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::CheckViolation => {
                    return RepoError::Integrity(db_err.message().to_string());
                }
                _ => {}
            }
        }
        RepoError::Database(err)
    }
}

pub async fn create_user_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: Option<&str>) -> Result<Option<User>> {
    // `email = NULL` never matches, so an absent email finds nobody.
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// All users in storage order (ascending id).
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// All users, most recently created first.
pub async fn list_users_newest_first(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Inserts a user inside a transaction and returns the assigned id.
///
/// On any failure the transaction is rolled back before the error is
/// returned.
pub async fn insert_user(pool: &SqlitePool, user: &NewUser) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (username, email, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user.username.as_deref())
    .bind(user.email.as_deref())
    .bind(Utc::now())
    .execute(&mut *tx)
    .await;

    let id = match inserted {
        Ok(result) => result.last_insert_rowid(),
        Err(err) => {
            tx.rollback().await?;
            return Err(err.into());
        }
    };

    tx.commit().await?;
    tracing::debug!(id, email = ?user.email, "user inserted");

    Ok(id)
}

/// Inserts the two fixture users used for local development.
pub async fn seed(pool: &SqlitePool) -> Result<()> {
    for (username, email) in [("test", "test@t.com"), ("test2", "test2@t.com")] {
        insert_user(pool, &NewUser::new(username, email)).await?;
    }
    Ok(())
}
