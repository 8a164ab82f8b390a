use async_trait::async_trait;
use jiff::Timestamp;
use kurteyt_core::record::epoch_seconds;
use kurteyt_core::repository::Result;
use kurteyt_core::{
    OgSettings, Page, PageRequest, PutCondition, ReadRepository, RecordChanges, RedirectType,
    Repository, ShortId, ShortUrlRecord, StorageError,
};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::{debug, trace};

const SCHEMA: &str = include_str!("../ddl/mysql/short_urls.sql");

const SELECT_COLUMNS: &str = "short_id, target_url, redirect_type, og_settings, \
     num_days_until_expire, ttl, created_at, updated_at";

/// MySQL implementation of the repository contract.
///
/// Deletes are hard deletes. Reads only return live records
/// (`ttl` in the future); an expired row is cleared out of the way by the
/// next conditional insert on the same id.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates the `short_urls` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("mysql schema is in place");
        Ok(())
    }
}

fn now_epoch() -> f64 {
    epoch_seconds(Timestamp::now())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn encode_og_settings(og_settings: Option<&OgSettings>) -> Result<Option<String>> {
    og_settings
        .map(|og| {
            serde_json::to_string(og).map_err(|e| {
                StorageError::Conversion(format!("failed to encode og settings: {e}"))
            })
        })
        .transpose()
}

fn record_from_row(row: &MySqlRow) -> Result<ShortUrlRecord> {
    let short_id: String = row.try_get("short_id").map_err(map_sqlx_error)?;
    let redirect_type: String = row.try_get("redirect_type").map_err(map_sqlx_error)?;
    let og_settings: Option<String> = row.try_get("og_settings").map_err(map_sqlx_error)?;
    let created_at: String = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: Option<String> = row.try_get("updated_at").map_err(map_sqlx_error)?;

    let short_id = ShortId::new(short_id)
        .map_err(|e| StorageError::InvalidData(format!("stored short id: {e}")))?;
    let redirect_type = redirect_type
        .parse::<RedirectType>()
        .map_err(StorageError::InvalidData)?;
    let og_settings = og_settings
        .map(|raw| serde_json::from_str::<OgSettings>(&raw))
        .transpose()
        .map_err(|e| StorageError::InvalidData(format!("stored og settings: {e}")))?;

    Ok(ShortUrlRecord {
        short_id,
        target_url: row.try_get("target_url").map_err(map_sqlx_error)?,
        redirect_type,
        og_settings,
        num_days_until_expire: row.try_get("num_days_until_expire").map_err(map_sqlx_error)?,
        ttl: row.try_get("ttl").map_err(map_sqlx_error)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: updated_at.as_deref().map(parse_timestamp).transpose()?,
    })
}

fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    raw.parse::<Timestamp>()
        .map_err(|e| StorageError::InvalidData(format!("invalid timestamp '{raw}': {e}")))
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, id: &ShortId) -> Result<Option<ShortUrlRecord>> {
        trace!(short_id = %id, "fetching record from mysql");

        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM short_urls WHERE short_id = ? AND ttl > ? LIMIT 1"
        ))
        .bind(id.as_str())
        .bind(now_epoch())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn scan(&self, request: PageRequest) -> Result<Page> {
        let start_after = request.start_after.as_ref().map(ShortId::as_str);
        let limit = request.limit as usize;

        // one extra row tells whether another page follows
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM short_urls
            WHERE ttl > ?
              AND (? IS NULL OR short_id > ?)
            ORDER BY short_id
            LIMIT ?
            "#
        ))
        .bind(now_epoch())
        .bind(start_after)
        .bind(start_after)
        .bind(request.limit as u64 + 1)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let has_more = rows.len() > limit;
        let records = rows
            .iter()
            .take(limit)
            .map(record_from_row)
            .collect::<Result<Vec<_>>>()?;
        let last_evaluated = if has_more {
            records.last().map(|record| record.short_id.clone())
        } else {
            None
        };

        Ok(Page {
            records,
            last_evaluated,
        })
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn put(&self, record: &ShortUrlRecord, condition: PutCondition) -> Result<()> {
        let og_settings = encode_og_settings(record.og_settings.as_ref())?;
        let verb = match condition {
            PutCondition::Always => "REPLACE",
            PutCondition::NotExists => "INSERT",
        };

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if condition == PutCondition::NotExists {
            // An expired row does not count as existing.
            sqlx::query("DELETE FROM short_urls WHERE short_id = ? AND ttl <= ?")
                .bind(record.short_id.as_str())
                .bind(now_epoch())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        let result = sqlx::query(&format!(
            r#"
            {verb} INTO short_urls
                (short_id, target_url, redirect_type, og_settings,
                 num_days_until_expire, ttl, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        ))
        .bind(record.short_id.as_str())
        .bind(&record.target_url)
        .bind(record.redirect_type.as_str())
        .bind(og_settings)
        .bind(record.num_days_until_expire)
        .bind(record.ttl)
        .bind(record.created_at.to_string())
        .bind(record.updated_at.map(|ts| ts.to_string()))
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                debug!(short_id = %record.short_id, "conditional insert lost to an existing row");
                return Err(StorageError::ConditionFailed(record.short_id.to_string()));
            }
            Err(err) => return Err(map_sqlx_error(err)),
        }

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn update(&self, id: &ShortId, changes: RecordChanges) -> Result<ShortUrlRecord> {
        let og_settings = encode_og_settings(changes.og_settings.as_ref())?;
        let now = now_epoch();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            UPDATE short_urls
            SET target_url = COALESCE(?, target_url),
                redirect_type = COALESCE(?, redirect_type),
                og_settings = COALESCE(?, og_settings),
                updated_at = ?
            WHERE short_id = ?
              AND ttl > ?
            "#,
        )
        .bind(changes.target_url.as_deref())
        .bind(changes.redirect_type.map(|rt| rt.as_str()))
        .bind(og_settings)
        .bind(changes.updated_at.to_string())
        .bind(id.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM short_urls WHERE short_id = ? AND ttl > ? LIMIT 1"
        ))
        .bind(id.as_str())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Err(StorageError::ConditionFailed(id.to_string()));
        };
        let record = record_from_row(&row)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(record)
    }

    async fn delete(&self, id: &ShortId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM short_urls WHERE short_id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
