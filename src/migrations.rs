use anyhow::Result;
use rusqlite::params;
use tokio_rusqlite::Connection;
use tracing::info;

#[derive(Debug)]
struct Migration {
    name: &'static str,
    version: i32,
    up: fn(&rusqlite::Connection) -> rusqlite::Result<()>,
}

impl Migration {
    fn new(
        name: &'static str,
        version: i32,
        up: fn(&rusqlite::Connection) -> rusqlite::Result<()>,
    ) -> Self {
        Self { name, version, up }
    }
}

pub async fn initialize_database(db: &Connection) -> Result<()> {
    db.call(|conn| {
        // Tab metadata: one row per tab, headers as a JSON array in column order
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tabs (
                name TEXT PRIMARY KEY,
                headers TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        // Tab rows: cells as a JSON array aligned with the tab's headers
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tab_rows (
                tab TEXT NOT NULL,
                position INTEGER NOT NULL,
                cells TEXT NOT NULL,
                PRIMARY KEY (tab, position)
            )",
            [],
        )?;

        Ok(())
    })
    .await?;

    run_migrations(db).await?;

    Ok(())
}

fn get_migrations() -> Vec<Migration> {
    vec![
        Migration::new("Add export runs table", 1, |conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS export_runs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    started_at INTEGER NOT NULL,
                    tabs_written INTEGER NOT NULL,
                    tabs_failed INTEGER NOT NULL,
                    warnings TEXT NOT NULL
                )",
                [],
            )?;
            Ok(())
        }),
        Migration::new("Add tab row index", 2, |conn| {
            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_tab_rows_tab ON tab_rows(tab, position)",
                [],
            )?;
            Ok(())
        }),
    ]
}

async fn run_migrations(db: &Connection) -> Result<()> {
    info!("Running database migrations...");

    db.call(|conn| Ok(apply_migrations(conn, get_migrations())?)).await?;

    info!("All database migrations completed successfully");
    Ok(())
}

/// Applies every migration not yet recorded. Each one runs in its own
/// transaction together with its bookkeeping row, so a failure rolls it back.
fn apply_migrations(
    conn: &mut rusqlite::Connection,
    migrations: Vec<Migration>,
) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            version INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            executed_at INTEGER NOT NULL
        )",
        [],
    )?;

    let executed_versions: Vec<i32> = {
        let mut stmt = conn.prepare("SELECT version FROM migrations ORDER BY version DESC")?;
        let versions = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        versions
    };

    for migration in migrations {
        if executed_versions.contains(&migration.version) {
            continue;
        }
        info!(
            "Running migration {} (version {})",
            migration.name, migration.version
        );

        let tx = conn.transaction()?;
        (migration.up)(&tx)?;
        tx.execute(
            "INSERT INTO migrations (version, name, executed_at) VALUES (?1, ?2, unixepoch())",
            params![&migration.version, &migration.name],
        )?;
        tx.commit()?;

        info!("Migration {} completed successfully", migration.version);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = Connection::open_in_memory().await.unwrap();
        initialize_database(&db).await.unwrap();
        initialize_database(&db).await.unwrap();

        let versions: Vec<i32> = db
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT version FROM migrations ORDER BY version")?;
                let versions = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(versions)
            })
            .await
            .unwrap();
        assert_eq!(versions, vec![1, 2]);
    }

    #[test]
    fn failed_migration_rolls_back() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        let broken = vec![Migration::new("Half applied", 1, |conn| {
            conn.execute("CREATE TABLE half_applied (id INTEGER)", [])?;
            conn.execute("INSERT INTO missing_table VALUES (1)", [])?;
            Ok(())
        })];

        assert!(apply_migrations(&mut conn, broken).is_err());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'half_applied'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
        let recorded: i64 = conn
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(recorded, 0);
        assert!(conn.is_autocommit());

        let fixed = vec![Migration::new("Half applied", 1, |conn| {
            conn.execute("CREATE TABLE half_applied (id INTEGER)", [])?;
            Ok(())
        })];
        apply_migrations(&mut conn, fixed).unwrap();
    }
}
