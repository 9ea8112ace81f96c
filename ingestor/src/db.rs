use crate::errors::{Error, Result};
use crate::model::{NewReading, Reading};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS sensor_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        temperature REAL NOT NULL,
        humidity REAL NOT NULL,
        air_quality REAL NOT NULL,
        timestamp TEXT NOT NULL
    )
    "#;

const CREATE_RECENCY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS sensor_data_recency ON sensor_data (timestamp, id)";

const SELECT_READINGS: &str = r#"
    SELECT id, temperature, humidity, air_quality, timestamp
    FROM sensor_data
    ORDER BY timestamp DESC, id DESC
    LIMIT ?
    "#;

/// Append-only store of sensor readings backed by SQLite.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if needed) the database and ensures the schema exists.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        busy_timeout: Duration,
    ) -> Result<Self> {
        info!("Connecting to database...");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(Error::StorageInit)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(Error::StorageInit)?;

        info!("Database connection established");
        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Idempotent: safe on every start, never touches existing rows.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(Error::StorageInit)?;
        sqlx::query(CREATE_RECENCY_INDEX)
            .execute(&self.pool)
            .await
            .map_err(Error::StorageInit)?;

        info!("Table \"sensor_data\" is ready");
        Ok(())
    }

    /// Inserts one reading and returns its assigned id.
    pub async fn append(&self, reading: &NewReading) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO sensor_data (temperature, humidity, air_quality, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.air_quality)
        .bind(&reading.timestamp)
        .execute(&self.pool)
        .await
        .map_err(Error::Write)?;

        let id = result.last_insert_rowid();
        debug!("Stored reading {} at {}", id, reading.timestamp);
        Ok(id)
    }

    /// Most recent reading by timestamp, highest id on ties.
    pub async fn latest(&self) -> Result<Option<Reading>> {
        sqlx::query_as::<_, Reading>(SELECT_READINGS)
            .bind(1_i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Read)
    }

    /// Up to `limit` readings, most recent first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<Reading>> {
        sqlx::query_as::<_, Reading>(SELECT_READINGS)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Read)
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sensor_data")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Read)
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}
