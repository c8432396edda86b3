//! This module is responsible for reading, writing and managing the SQLite database.
//!
//! Each entity kind lives in its own table and has its own submodule with the queries for it.
//! Money is stored as TEXT (see [`Amount::to_sql`](crate::model::Amount)) so values come back
//! exactly as they were written.

mod bills;
mod budgets;
mod migrations;
mod pots;
mod seed;
mod transactions;

pub use seed::SeedCounts;

use crate::error::Res;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Opens a connection pool
    /// - Brings the schema up to date if it is older than this build
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let db = Self {
            pool: connect(path, false).await?,
        };

        let current = db.schema_version().await?;
        let latest = migrations::latest_version();
        if current > latest {
            bail!(
                "The database schema is at version {current} but this build only understands up \
                to version {latest}. Please upgrade fintrack."
            );
        }
        migrations::run(&db.pool, current, latest).await?;
        Ok(db)
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Creates the schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;

        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Unable to create the schema_version table")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .context("Unable to set the initial schema version")?;

        migrations::run(&pool, 0, migrations::latest_version()).await?;
        debug!("Created database at {}", path.display());
        Ok(Self { pool })
    }

    pub(crate) async fn schema_version(&self) -> Res<i32> {
        sqlx::query_scalar("SELECT version FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .context("Unable to read the schema version")
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn connect(path: &Path, create: bool) -> Res<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open the SQLite database at {}", path.display()))
}
