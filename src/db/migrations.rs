//! Database initialization and schema migrations.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{debug, info};

/// Open (creating if needed) the SQLite database and bring its schema up to date.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { apply_pragmas(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    let applied = run_migrations(&pool).await?;
    info!(
        "Database ready at {} ({} schema statements applied)",
        db_path, applied
    );
    Ok(pool)
}

/// Apply `schema.sql`; every statement is idempotent.
async fn run_migrations(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    let mut applied = 0;
    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!("Applying schema statement: {}", trimmed.lines().next().unwrap_or(""));
        sqlx::query(trimmed).execute(pool).await?;
        applied += 1;
    }

    Ok(applied)
}

async fn apply_pragmas(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode reports the mode actually set
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    debug!("SQLite journal_mode: {}", journal_mode);

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn fresh_pool() -> (SqlitePool, String, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("nested")
            .join("commission.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (pool, db_path, temp_dir)
    }

    #[tokio::test]
    async fn test_init_db_creates_database_and_parent_dir() {
        let (pool, db_path, _temp) = fresh_pool().await;
        assert!(Path::new(&db_path).exists());

        let result: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let (pool, _path, _temp) = fresh_pool().await;

        let result: (String,) = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='rate_tiers'",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");
        assert_eq!(result.0, "rate_tiers");

        let result: (String,) =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name='offers'")
                .fetch_one(&pool)
                .await
                .expect("query failed");
        assert_eq!(result.0, "offers");
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let (pool, _path, _temp) = fresh_pool().await;

        let applied = run_migrations(&pool)
            .await
            .expect("second migration run failed");
        assert_eq!(applied, 4);

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('offers', 'rate_tiers')",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");
        assert_eq!(result.0, 2);
    }

    #[tokio::test]
    async fn test_pragmas_configured() {
        let (pool, _path, _temp) = fresh_pool().await;

        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        // WAL is best-effort; SQLite can fall back depending on the filesystem.
        assert!(
            matches!(result.0.as_str(), "wal" | "delete"),
            "unexpected journal_mode: {}",
            result.0
        );
    }
}
