pub mod models;

use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use models::{NewUser, User};

/// Database connection wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Pool that connects on first use
    pub fn connect_lazy(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Insert an account. A taken username or email is a conflict.
    pub async fn create_user(&self, user: &NewUser) -> Result<Uuid, AppError> {
        let result: Result<(Uuid,), sqlx::Error> = sqlx::query_as(
            r#"INSERT INTO users (username, email, password_hash, salt) VALUES ($1, $2, $3, $4) RETURNING id"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.salt)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok((id,)) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                "Username or email already registered".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Find an account by username
    pub async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash, salt, created_at FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Store an uploaded sheet as JSON
    pub async fn save_excel(&self, data: &serde_json::Value) -> Result<Uuid, AppError> {
        let (id,): (Uuid,) =
            sqlx::query_as(r#"INSERT INTO excel_data (data) VALUES ($1) RETURNING id"#)
                .bind(data)
                .fetch_one(&self.pool)
                .await?;

        Ok(id)
    }
}
