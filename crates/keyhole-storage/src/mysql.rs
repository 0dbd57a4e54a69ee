use async_trait::async_trait;
use jiff::Timestamp;
use keyhole_core::store::Result;
use keyhole_core::{KeyStore, ReadKeyStore, ShortKey, StorageError, UrlMapping};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::{debug, info};

const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");

/// MySQL implementation of the key store contract.
///
/// The `short_key` column carries a unique index, so a losing writer in a
/// check-then-insert race gets [`StorageError::Conflict`] instead of a
/// duplicate row. URLs use a binary collation: lookups by URL are
/// byte-for-byte comparisons. Deletes remove the row, which frees the key.
#[derive(Debug, Clone)]
pub struct MySqlKeyStore {
    pool: MySqlPool,
}

impl MySqlKeyStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `url_mappings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        info!("url_mappings schema is in place");
        Ok(())
    }
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

fn row_to_mapping(row: &MySqlRow) -> Result<UrlMapping> {
    let key: String = row.try_get("short_key").map_err(map_sqlx_error)?;
    let url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let short_url: String = row.try_get("short_url").map_err(map_sqlx_error)?;

    let key = ShortKey::parse(&key).map_err(|e| StorageError::InvalidData(e.to_string()))?;

    Ok(UrlMapping {
        key,
        url,
        short_url,
    })
}

#[async_trait]
impl ReadKeyStore for MySqlKeyStore {
    async fn find_by_key(&self, key: &ShortKey) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT short_key, original_url, short_url
            FROM url_mappings
            WHERE short_key = ?
            LIMIT 1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT short_key, original_url, short_url
            FROM url_mappings
            WHERE original_url = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }
}

#[async_trait]
impl KeyStore for MySqlKeyStore {
    async fn insert(&self, mapping: UrlMapping) -> Result<UrlMapping> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (short_key, original_url, short_url, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(mapping.key.as_str())
        .bind(mapping.url.as_str())
        .bind(mapping.short_url.as_str())
        .bind(Timestamp::now().as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(key = %mapping.key, "inserted mapping");
                Ok(mapping)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(mapping.key.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete(&self, key: &ShortKey) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM url_mappings
            WHERE short_key = ?
            "#,
        )
        .bind(key.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_are_classified() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StorageError::InvalidData(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::Protocol("bad packet".to_string())),
            StorageError::Query(_)
        ));
    }

    #[test]
    fn schema_declares_unique_key() {
        assert!(SCHEMA.contains("UNIQUE KEY uk_url_mappings_short_key (short_key)"));
    }
}
