// region:    --- Imports
use crate::auth;
use crate::error::ApiError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;
// endregion: --- Imports

// region:    --- Database Manager
pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
}

impl DatabaseManager {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Pool that has not connected yet. Used by tests that never reach the
    /// database.
    pub fn connect_lazy(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn get_pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs `f` inside a transaction, committing on `Ok` and rolling back on
    /// `Err`.
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// Creates the schema if it does not exist yet.
    pub async fn initialize_database(&self) -> Result<(), sqlx::Error> {
        let create_schema_sql = include_str!("../sql/01-create-schema.sql");
        self.execute_multi_query(create_schema_sql).await?;
        Ok(())
    }

    /// Executes the statements of a semicolon-separated script one by one.
    /// `CREATE TYPE` has no `IF NOT EXISTS`, so duplicate-object errors from
    /// a rerun are skipped.
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if query.is_empty() {
                continue;
            }
            if let Err(e) = sqlx::query(query).execute(&*self.pool).await {
                if is_duplicate_object(&e) {
                    continue;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Seeds the admin account and the default categories. Safe to rerun.
    pub async fn seed_defaults(
        &self,
        admin_email: &str,
        admin_password: &str,
    ) -> Result<(), ApiError> {
        let password_hash = auth::hash_password(admin_password)?;
        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (username, email, password_hash, role)
             VALUES ('admin', $1, $2, 'admin')
             ON CONFLICT (email) DO NOTHING
             RETURNING id",
        )
        .bind(admin_email)
        .bind(&password_hash)
        .fetch_optional(&*self.pool)
        .await?;
        if inserted.is_some() {
            info!("{:<12} --> Created admin user: {}", "Database", admin_email);
        }

        for (name, description) in DEFAULT_CATEGORIES {
            sqlx::query(
                "INSERT INTO categories (name, description)
                 VALUES ($1, $2)
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(name)
            .bind(description)
            .execute(&*self.pool)
            .await?;
        }
        Ok(())
    }
}

const DEFAULT_CATEGORIES: [(&str, &str); 6] = [
    (
        "Electronics",
        "Computers, phones, gadgets and electronic devices",
    ),
    (
        "Collectibles",
        "Rare items, antiques, and collectible memorabilia",
    ),
    (
        "Art & Crafts",
        "Paintings, sculptures, handmade items and artwork",
    ),
    (
        "Home & Garden",
        "Furniture, decor, tools and garden equipment",
    ),
    ("Fashion", "Clothing, accessories, shoes and fashion items"),
    (
        "Books & Media",
        "Books, movies, music and educational materials",
    ),
];

fn is_duplicate_object(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "42710")
        .unwrap_or(false)
}
// endregion: --- Database Manager
