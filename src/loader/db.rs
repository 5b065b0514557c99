use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use sqlx::Row;

use super::{normalize_word, WordRecord};
use crate::error::DictError;

/// Timestamp layout used for bound window parameters and for decoding the
/// `updatetime` column.
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static ANY_DRIVERS: Lazy<()> = Lazy::new(sqlx::any::install_default_drivers);

/// Reads word rows from one configured table. The table must expose the word
/// field plus a timestamp-comparable `updatetime` column; that column is what
/// the incremental protocol keys on.
pub struct DbWordSource {
    pool: AnyPool,
    table: String,
    field: String,
}

impl DbWordSource {
    /// Validate identifiers and set up a lazy connection pool. No connection
    /// is established here; a broken URL or unreachable server surfaces on
    /// the first query and is contained to that refresh cycle.
    pub fn connect(url: &str, table: &str, field: &str) -> Result<Self, DictError> {
        validate_identifier(table)?;
        validate_identifier(field)?;
        Lazy::force(&ANY_DRIVERS);
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect_lazy(url)?;
        Ok(Self {
            pool,
            table: table.to_string(),
            field: field.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Unconditional full scan of the word column.
    pub async fn fetch_all(&self) -> Result<Vec<WordRecord>, DictError> {
        let sql = format!("SELECT {} FROM {}", self.field, self.table);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut words = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.try_get(0)?;
            if let Some(text) = normalize_word(&raw) {
                words.push(WordRecord::new(text));
            }
        }
        Ok(words)
    }

    /// Rows whose `updatetime` falls in `[low, high)`. The bounds are bound
    /// as parameters, never concatenated into the statement.
    pub async fn fetch_updated_between(
        &self,
        low: DateTime<Utc>,
        high: DateTime<Utc>,
    ) -> Result<Vec<WordRecord>, DictError> {
        let sql = format!(
            "SELECT {}, updatetime FROM {} WHERE updatetime >= ? AND updatetime < ?",
            self.field, self.table
        );
        let rows = sqlx::query(&sql)
            .bind(low.format(TS_FORMAT).to_string())
            .bind(high.format(TS_FORMAT).to_string())
            .fetch_all(&self.pool)
            .await?;
        let mut words = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.try_get(0)?;
            let Some(text) = normalize_word(&raw) else {
                continue;
            };
            let updated_at = row
                .try_get::<String, _>(1)
                .ok()
                .and_then(|ts| NaiveDateTime::parse_from_str(&ts, TS_FORMAT).ok())
                .map(|naive| naive.and_utc());
            words.push(WordRecord { text, updated_at });
        }
        Ok(words)
    }
}

/// Table and field names cannot be bound as parameters, so they are
/// restricted to plain identifiers.
fn validate_identifier(name: &str) -> Result<(), DictError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DictError::Config(format!(
            "invalid SQL identifier: {name:?}"
        )))
    }
}
