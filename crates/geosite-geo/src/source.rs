//! `SQLite` geo source.
//!
//! Reads the whole `Cities` table at startup. A load either returns every
//! record or fails; callers never see a partially read dataset.

use std::path::{Path, PathBuf};

use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};

use crate::record::{GeoRecord, split_zip_codes};

/// Query for all geo rows. Zip columns are cast because sources store them
/// as either TEXT or INTEGER.
const CITIES_QUERY: &str = "SELECT city_name, state_code, state_name, \
     CAST(main_zip_code AS TEXT) AS main_zip_code, \
     CAST(zip_codes AS TEXT) AS zip_codes \
     FROM Cities";

/// Error loading the geo source.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// Database could not be opened, queried, or decoded.
    #[error("Geo database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Database holds no city rows.
    #[error("Geo database {} contains no cities", .0.display())]
    Empty(PathBuf),
}

/// Load every geo record from a `SQLite` database.
///
/// The database is opened read-only and must contain a `Cities` table with
/// `city_name`, `state_code`, `state_name`, `main_zip_code` and `zip_codes`
/// (comma-separated) columns.
///
/// # Errors
///
/// Returns [`GeoError::Database`] if the file cannot be opened or any row fails
/// to decode, and [`GeoError::Empty`] if the table has no rows.
pub async fn load_sqlite(path: &Path) -> Result<Vec<GeoRecord>, GeoError> {
    let options = SqliteConnectOptions::new().filename(path).read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    let rows = sqlx::query(CITIES_QUERY).fetch_all(&pool).await;
    pool.close().await;

    let records = rows?
        .iter()
        .map(record_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(GeoError::Empty(path.to_path_buf()));
    }

    tracing::info!(path = %path.display(), records = records.len(), "Loaded geo source");
    Ok(records)
}

fn record_from_row(row: &SqliteRow) -> Result<GeoRecord, sqlx::Error> {
    let zip_codes: Option<String> = row.try_get("zip_codes")?;
    let main_zip_code: Option<String> = row.try_get("main_zip_code")?;

    Ok(GeoRecord {
        city_name: row.try_get("city_name")?,
        state_code: row.try_get("state_code")?,
        state_name: row.try_get("state_name")?,
        main_zip_code: main_zip_code.unwrap_or_default(),
        zip_codes: zip_codes.as_deref().map(split_zip_codes).unwrap_or_default(),
    })
}
