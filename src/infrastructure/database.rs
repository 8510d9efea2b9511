//! Pooled SQLite connection

use di::inject;
use di::injectable;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

const DEFAULT_DATABASE_URL: &str = "sqlite:chat.db?mode=rwc";

/// Pool handed to every `DatabaseConnection` the container creates, when set.
///
/// `more-di` constructs services without arguments, so an already migrated
/// pool (or a test database) is installed here before the provider is built.
static INSTALLED_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);

pub struct DatabaseConnection {
    connection: SqlitePool,
}

#[injectable]
impl DatabaseConnection {
    #[inject]
    pub fn create() -> DatabaseConnection {
        if let Some(pool) = Self::installed_pool() {
            return DatabaseConnection { connection: pool };
        }

        dotenvy::dotenv().ok();
        let connection_string =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy(&connection_string)
            .expect("Cannot connect to database");

        DatabaseConnection { connection: pool }
    }
}

impl DatabaseConnection {
    /// Opens the pool and brings the schema up to date.
    pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(pool)
    }

    pub fn install_pool(pool: SqlitePool) {
        *INSTALLED_POOL.lock().unwrap_or_else(PoisonError::into_inner) = Some(pool);
    }

    pub fn set_test_pool(pool: SqlitePool) {
        Self::install_pool(pool);
    }

    pub fn clear_test_pool() {
        INSTALLED_POOL
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn installed_pool() -> Option<SqlitePool> {
        INSTALLED_POOL
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Deref for DatabaseConnection {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl DerefMut for DatabaseConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}
