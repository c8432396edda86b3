//! Embedded schema migrations.
//!
//! Each schema version `NN` has two scripts next to this file:
//! - `migration_NN_up.sql` moves the schema from `NN-1` to `NN`
//! - `migration_NN_down.sql` moves the schema from `NN` back to `NN-1`

use crate::error::Res;
use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

struct Migration {
    version: i32,
    up: &'static str,
    down: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up: include_str!("migration_01_up.sql"),
    down: include_str!("migration_01_down.sql"),
}];

/// The newest schema version this build knows about.
pub(crate) fn latest_version() -> i32 {
    MIGRATIONS.iter().map(|m| m.version).max().unwrap_or(0)
}

fn find(version: i32) -> Res<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} not found"))
}

/// Moves the schema from version `from` to version `to`, upgrading or downgrading one version at
/// a time. Each step runs in its own SQL transaction together with its `schema_version` update.
///
/// Every script needed for the whole path is looked up before the first one runs.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Res<()> {
    if from == to {
        debug!("Schema already at version {to}");
        return Ok(());
    }
    check_path(from, to)?;

    if from < to {
        for version in (from + 1)..=to {
            debug!("Applying migration {version:02} (up)");
            apply(pool, find(version)?.up, version).await?;
        }
    } else {
        for version in ((to + 1)..=from).rev() {
            debug!("Applying migration {version:02} (down)");
            apply(pool, find(version)?.down, version - 1).await?;
        }
    }

    debug!("Schema is now at version {to}");
    Ok(())
}

async fn apply(pool: &SqlitePool, sql: &str, resulting_version: i32) -> Res<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Unable to begin a migration transaction")?;

    tx.execute(sql)
        .await
        .context("Unable to execute migration SQL")?;

    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(resulting_version)
        .execute(&mut *tx)
        .await
        .context("Unable to record the schema version")?;

    tx.commit()
        .await
        .context("Unable to commit the migration transaction")
}

fn check_path(from: i32, to: i32) -> Res<()> {
    let (low, high) = if from < to { (from + 1, to) } else { (to + 1, from) };
    for version in low..=high {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!("Cannot migrate from version {from} to {to}: migration {version} is missing");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn empty_db() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("migrate.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .unwrap();
        (dir, pool)
    }

    async fn version(pool: &SqlitePool) -> i32 {
        sqlx::query_scalar("SELECT version FROM schema_version")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn tables(pool: &SqlitePool) -> Vec<String> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' AND name != 'schema_version' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_up_creates_entity_tables() {
        let (_dir, pool) = empty_db().await;
        run(&pool, 0, 1).await.unwrap();
        assert_eq!(version(&pool).await, 1);
        assert_eq!(
            tables(&pool).await,
            vec!["budgets", "pots", "recurring_bills", "transactions"]
        );
    }

    #[tokio::test]
    async fn test_down_drops_entity_tables() {
        let (_dir, pool) = empty_db().await;
        run(&pool, 0, 1).await.unwrap();
        run(&pool, 1, 0).await.unwrap();
        assert_eq!(version(&pool).await, 0);
        assert!(tables(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_same_version_is_noop() {
        let (_dir, pool) = empty_db().await;
        run(&pool, 0, 1).await.unwrap();
        run(&pool, 1, 1).await.unwrap();
        assert_eq!(version(&pool).await, 1);
    }

    #[test]
    fn test_missing_migration_is_detected() {
        assert!(check_path(0, latest_version()).is_ok());
        assert!(check_path(latest_version(), 0).is_ok());
        assert!(check_path(0, latest_version() + 1).is_err());
    }
}
