use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Postgres, Row, Transaction};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::StoreConfig;
use crate::database::fallback::FallbackDocument;
use crate::database::models::{Course, Entity, Student};
use crate::database::repository::RecordStore;
use crate::database::StoreError;

/// Counts written by a seed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub alunos: usize,
    pub cursos: usize,
}

/// Connection pool and schema bootstrap for the primary database
pub struct DatabaseManager {
    pool: PgPool,
    schema_ready: OnceCell<()>,
}

impl DatabaseManager {
    /// Build a pool without connecting; the first probe opens the connection.
    pub fn connect_lazy(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;

        Ok(Self {
            pool,
            schema_ready: OnceCell::new(),
        })
    }

    /// Pings the pool and makes sure both tables exist
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(classify)?;
        self.schema_ready.get_or_try_init(|| self.ensure_schema()).await?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for ddl in [create_table_sql::<Student>(), create_table_sql::<Course>()] {
            sqlx::query(&ddl).execute(&self.pool).await.map_err(classify)?;
        }
        info!("Primary schema ready (alunos, cursos)");
        Ok(())
    }

    /// Replace both tables with the contents of a fallback-shaped document, atomically.
    pub async fn seed(&self, document: &FallbackDocument) -> Result<SeedReport, StoreError> {
        let students = document.records::<Student>()?;
        let courses = document.records::<Course>()?;

        self.health_check().await?;

        let mut tx = self.pool.begin().await.map_err(classify)?;
        let alunos = replace_collection(&mut tx, &students).await?;
        let cursos = replace_collection(&mut tx, &courses).await?;
        tx.commit().await.map_err(classify)?;

        info!("Seeded primary database: {} alunos, {} cursos", alunos, cursos);
        Ok(SeedReport { alunos, cursos })
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed primary database pool");
    }
}

#[async_trait]
impl RecordStore for DatabaseManager {
    async fn list<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        let rows = sqlx::query(&select_all_sql::<E>())
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        rows.iter().map(decode_row::<E>).collect()
    }

    async fn insert<E: Entity>(&self, record: E) -> Result<E, StoreError> {
        let row = sqlx::query(&insert_sql::<E>())
            .bind(serde_json::to_value(&record)?)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| insert_error::<E>(e, record.id()))?;
        decode_row(&row)
    }

    async fn update<E: Entity>(&self, id: i64, patch: E::Patch) -> Result<E, StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let existing = sqlx::query(&select_for_update_sql::<E>())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound { label: E::LABEL, id })?;

        let mut record: E = decode_row(&existing)?;
        record.apply(patch);

        let row = sqlx::query(&update_sql::<E>())
            .bind(id)
            .bind(serde_json::to_value(&record)?)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify)?;
        tx.commit().await.map_err(classify)?;

        decode_row(&row)
    }

    async fn remove<E: Entity>(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(&delete_sql::<E>())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { label: E::LABEL, id });
        }
        Ok(())
    }
}

async fn replace_collection<E: Entity>(
    tx: &mut Transaction<'_, Postgres>,
    records: &[E],
) -> Result<usize, StoreError> {
    sqlx::query(&format!("DELETE FROM {}", quote_identifier(E::COLLECTION)))
        .execute(&mut **tx)
        .await
        .map_err(classify)?;

    let sql = insert_sql::<E>();
    for record in records {
        sqlx::query(&sql)
            .bind(serde_json::to_value(record)?)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| insert_error::<E>(e, record.id()))?;
    }
    Ok(records.len())
}

fn decode_row<E: Entity>(row: &PgRow) -> Result<E, StoreError> {
    let value: Value = row.try_get("row").map_err(classify)?;
    Ok(serde_json::from_value(value)?)
}

/// Connection-level failures mean "unreachable", everything else is a query problem.
fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Sqlx(other),
    }
}

fn insert_error<E: Entity>(err: sqlx::Error, id: i64) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict { label: E::LABEL, id },
        _ => classify(err),
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list<E: Entity>() -> String {
    E::FIELDS
        .iter()
        .map(|f| quote_identifier(f))
        .collect::<Vec<_>>()
        .join(", ")
}

fn create_table_sql<E: Entity>() -> String {
    let columns = E::FIELDS
        .iter()
        .map(|f| format!("{} TEXT NOT NULL", quote_identifier(f)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} (id BIGINT PRIMARY KEY, {})",
        quote_identifier(E::COLLECTION),
        columns
    )
}

fn select_all_sql<E: Entity>() -> String {
    format!(
        "SELECT row_to_json(t) AS row FROM {} t ORDER BY t.id",
        quote_identifier(E::COLLECTION)
    )
}

fn select_for_update_sql<E: Entity>() -> String {
    format!(
        "SELECT row_to_json(t) AS row FROM {} t WHERE t.id = $1 FOR UPDATE",
        quote_identifier(E::COLLECTION)
    )
}

// jsonb_populate_record maps JSON keys onto same-named columns, so the wire
// names ("Nome", "Sigla", ...) are the column names.
fn insert_sql<E: Entity>() -> String {
    let table = quote_identifier(E::COLLECTION);
    let columns = column_list::<E>();
    format!(
        "WITH inserted AS (\
            INSERT INTO {table} (id, {columns}) \
            SELECT id, {columns} FROM jsonb_populate_record(NULL::{table}, $1::jsonb) \
            RETURNING *\
        ) SELECT row_to_json(inserted) AS row FROM inserted"
    )
}

fn update_sql<E: Entity>() -> String {
    let table = quote_identifier(E::COLLECTION);
    let columns = column_list::<E>();
    format!(
        "WITH updated AS (\
            UPDATE {table} AS t SET ({columns}) = \
            (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $2::jsonb)) \
            WHERE t.id = $1 RETURNING t.*\
        ) SELECT row_to_json(updated) AS row FROM updated"
    )
}

fn delete_sql<E: Entity>() -> String {
    format!("DELETE FROM {} WHERE id = $1", quote_identifier(E::COLLECTION))
}
