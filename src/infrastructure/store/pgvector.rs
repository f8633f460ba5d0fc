//! PostgreSQL + pgvector document store
//!
//! Expected table layout:
//!
//! ```sql
//! CREATE TABLE <collection> (
//!     id TEXT PRIMARY KEY,
//!     document JSONB NOT NULL,
//!     <vector_path> vector(<dimensions>)
//! );
//! CREATE INDEX <vector_index_name> ON <collection>
//!     USING hnsw (<vector_path> vector_cosine_ops);
//! ```

use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, error, warn};

use crate::domain::analytics::{
    AnalyticsStore, CarrierStats, DailyCount, ReasonFrequency, ReasonTimeline,
};
use crate::domain::store::{DocumentStore, ScoredRecord, StoredDocument, VectorSearchQuery};
use crate::domain::DomainError;

const REASON: &str = "document #>> '{event,eventData,subTypeData,reason}'";
const CARRIER: &str = "document #>> '{event,eventData,carrier}'";
const STATUS: &str = "document #>> '{event,eventData,status}'";
const TIMESTAMP: &str = "document #>> '{event,timestamp}'";

/// Connection settings for the pgvector store
#[derive(Debug, Clone)]
pub struct PgvectorStoreConfig {
    pub uri: String,
    /// Overrides the database named in `uri` when non-empty
    pub database: String,
    pub collection: String,
    pub vector_path: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Returns true for plain SQL identifiers: a letter or underscore followed
/// by letters, digits or underscores, at most 63 bytes.
pub fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    first_ok && name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn pgvector_literal(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

fn to_count(value: i64) -> u64 {
    value.max(0) as u64
}

/// Read-only pgvector store over a JSONB event table
pub struct PgvectorDocumentStore {
    pool: PgPool,
    table: String,
    vector_column: String,
}

impl Debug for PgvectorDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgvectorDocumentStore")
            .field("table", &self.table)
            .field("vector_column", &self.vector_column)
            .finish()
    }
}

impl PgvectorDocumentStore {
    /// Wraps an existing pool; table and column names are interpolated into
    /// SQL and must pass [`is_safe_identifier`].
    pub fn new(
        pool: PgPool,
        table: impl Into<String>,
        vector_column: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let table = table.into();
        let vector_column = vector_column.into();

        for name in [&table, &vector_column] {
            if !is_safe_identifier(name) {
                return Err(DomainError::configuration(format!(
                    "'{}' is not a valid SQL identifier",
                    name
                )));
            }
        }

        Ok(Self {
            pool,
            table,
            vector_column,
        })
    }

    /// Opens the connection pool; called once at startup
    pub async fn connect(config: &PgvectorStoreConfig) -> Result<Self, DomainError> {
        let mut options = PgConnectOptions::from_str(&config.uri).map_err(|e| {
            DomainError::configuration(format!("Invalid store URI: {}", e))
        })?;
        if !config.database.is_empty() {
            options = options.database(&config.database);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| {
                DomainError::search_backend(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        Self::new(pool, &config.collection, &config.vector_path)
    }

    fn backend_error(operation: &str, e: sqlx::Error) -> DomainError {
        error!(operation = operation, error = %e, "Document store query failed");
        DomainError::search_backend(format!("{} failed: {}", operation, e))
    }

    async fn fetch_count(&self, query: &str, operation: &str) -> Result<u64, DomainError> {
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::backend_error(operation, e))?;

        Ok(to_count(row.get("count")))
    }

    /// Event time as a UTC timestamp, NULL when missing or not ISO-8601
    fn event_time_sql() -> String {
        format!(
            r"CASE WHEN {ts} ~ '^\d{{4}}-\d{{2}}-\d{{2}}T' THEN ({ts})::timestamptz END",
            ts = TIMESTAMP
        )
    }
}

#[async_trait]
impl DocumentStore for PgvectorDocumentStore {
    fn store_type(&self) -> &'static str {
        "pgvector"
    }

    async fn vector_search(
        &self,
        query: &VectorSearchQuery,
    ) -> Result<Vec<ScoredRecord>, DomainError> {
        debug!(
            index = %query.index_name,
            candidates = query.candidate_pool_size,
            limit = query.result_limit,
            "Running pgvector similarity query"
        );

        let sql = format!(
            r#"
            SELECT id, document, 1 - ({col} <=> $1::text::vector) AS score
            FROM {table}
            WHERE {col} IS NOT NULL
            ORDER BY {col} <=> $1::text::vector
            LIMIT $2
            "#,
            col = self.vector_column,
            table = self.table
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::backend_error("vector search", e))?;

        // Candidate pool maps onto the HNSW search breadth for this transaction
        sqlx::query("SELECT set_config('hnsw.ef_search', $1, true)")
            .bind(query.candidate_pool_size.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::backend_error("vector search", e))?;

        let rows = sqlx::query(&sql)
            .bind(pgvector_literal(&query.query_vector))
            .bind(i64::from(query.result_limit))
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| Self::backend_error("vector search", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::backend_error("vector search", e))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let score: f64 = row.get("score");
                ScoredRecord {
                    id: row.get("id"),
                    score: score as f32,
                    document: row.get("document"),
                }
            })
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<StoredDocument>, DomainError> {
        let sql = format!(
            "SELECT id, document, ({} IS NOT NULL) AS has_embedding FROM {} WHERE id = $1",
            self.vector_column, self.table
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::backend_error("document lookup", e))?;

        Ok(row.map(|row| StoredDocument {
            id: row.get("id"),
            document: row.get("document"),
            has_embedding: row.get("has_embedding"),
        }))
    }

    async fn count_documents(&self) -> Result<u64, DomainError> {
        let sql = format!("SELECT COUNT(*) AS count FROM {}", self.table);
        self.fetch_count(&sql, "document count").await
    }

    async fn count_embedded(&self) -> Result<u64, DomainError> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM {} WHERE {} IS NOT NULL",
            self.table, self.vector_column
        );
        self.fetch_count(&sql, "embedded count").await
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = %e, "pgvector health check failed");
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl AnalyticsStore for PgvectorDocumentStore {
    async fn top_reasons(&self, limit: u32) -> Result<Vec<ReasonFrequency>, DomainError> {
        let sql = format!(
            r#"
            SELECT {reason} AS reason,
                   COUNT(*) AS count,
                   COUNT(DISTINCT {carrier}) AS carrier_count,
                   COUNT(DISTINCT {status}) AS status_count
            FROM {table}
            WHERE COALESCE({reason}, '') <> ''
            GROUP BY 1
            ORDER BY count DESC, reason
            LIMIT $1
            "#,
            reason = REASON,
            carrier = CARRIER,
            status = STATUS,
            table = self.table
        );

        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::backend_error("top reasons", e))?;

        Ok(rows
            .into_iter()
            .map(|row| ReasonFrequency {
                reason: row.get("reason"),
                count: to_count(row.get("count")),
                carrier_count: to_count(row.get("carrier_count")),
                status_count: to_count(row.get("status_count")),
            })
            .collect())
    }

    async fn daily_counts(&self, limit: u32) -> Result<Vec<DailyCount>, DomainError> {
        let sql = format!(
            r#"
            SELECT day, COUNT(*) AS count
            FROM (
                SELECT (({at}) AT TIME ZONE 'UTC')::date AS day FROM {table}
            ) events
            WHERE day IS NOT NULL
            GROUP BY day
            ORDER BY day DESC
            LIMIT $1
            "#,
            at = Self::event_time_sql(),
            table = self.table
        );

        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::backend_error("daily counts", e))?;

        Ok(rows
            .into_iter()
            .map(|row| DailyCount {
                date: row.get("day"),
                count: to_count(row.get("count")),
            })
            .collect())
    }

    async fn reason_timelines(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ReasonTimeline>, DomainError> {
        let sql = format!(
            r#"
            WITH events AS (
                SELECT {reason} AS reason, {at} AS at FROM {table}
            ),
            recent AS (
                SELECT reason, (at AT TIME ZONE 'UTC')::date AS day
                FROM events
                WHERE at >= $1 AND COALESCE(reason, '') <> ''
            ),
            top AS (
                SELECT reason, COUNT(*) AS total
                FROM recent
                GROUP BY reason
                ORDER BY total DESC, reason
                LIMIT $2
            )
            SELECT r.reason, t.total, r.day, COUNT(*) AS count
            FROM recent r
            JOIN top t ON t.reason = r.reason
            GROUP BY r.reason, t.total, r.day
            ORDER BY t.total DESC, r.reason, r.day
            "#,
            reason = REASON,
            at = Self::event_time_sql(),
            table = self.table
        );

        let rows = sqlx::query(&sql)
            .bind(since)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::backend_error("reason timelines", e))?;

        Ok(group_timelines(rows))
    }

    async fn carrier_stats(&self, limit: u32) -> Result<Vec<CarrierStats>, DomainError> {
        let sql = format!(
            r#"
            SELECT {carrier} AS carrier,
                   COUNT(*) AS total_events,
                   COUNT(DISTINCT {reason}) AS unique_reason_count,
                   COUNT(DISTINCT {status}) AS unique_status_count
            FROM {table}
            WHERE COALESCE({carrier}, '') <> ''
            GROUP BY 1
            ORDER BY total_events DESC, carrier
            LIMIT $1
            "#,
            carrier = CARRIER,
            reason = REASON,
            status = STATUS,
            table = self.table
        );

        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::backend_error("carrier stats", e))?;

        Ok(rows
            .into_iter()
            .map(|row| CarrierStats {
                carrier: row.get("carrier"),
                total_events: to_count(row.get("total_events")),
                unique_reason_count: to_count(row.get("unique_reason_count")),
                unique_status_count: to_count(row.get("unique_status_count")),
            })
            .collect())
    }
}

/// Folds (reason, total, day, count) rows, already ordered by reason, into
/// one timeline per reason
fn group_timelines(rows: Vec<PgRow>) -> Vec<ReasonTimeline> {
    let mut timelines: Vec<ReasonTimeline> = Vec::new();

    for row in rows {
        let reason: String = row.get("reason");
        let day = DailyCount {
            date: row.get::<NaiveDate, _>("day"),
            count: to_count(row.get("count")),
        };

        match timelines.last_mut() {
            Some(current) if current.reason == reason => current.daily_counts.push(day),
            _ => timelines.push(ReasonTimeline {
                reason,
                total_count: to_count(row.get("total")),
                daily_counts: vec![day],
            }),
        }
    }

    timelines
}
