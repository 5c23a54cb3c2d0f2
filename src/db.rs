//! SQLite report store with Diesel ORM
//!
//! Reports are stored as key-value records: the full JSON document keyed
//! by report id, plus the few columns the listing endpoint sorts and
//! displays without decoding every payload.

use crate::model::{AnalysisReport, Language, ReportSummary};
use crate::schema::reports;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::path::Path;

// ============================================================================
// Diesel Models
// ============================================================================

/// Insertable report record
#[derive(Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport<'a> {
    pub id: &'a str,
    pub created_at_ms: i64,
    pub created_at: &'a str,
    pub target_category: &'a str,
    pub language: &'a str,
    pub has_competitor_data: i32,
    pub payload_json: &'a str,
}

/// Listing columns of a stored report (everything but the payload)
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = reports)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReportIndexRow {
    pub id: String,
    pub created_at_ms: i64,
    pub created_at: String,
    pub target_category: String,
    pub language: String,
    pub has_competitor_data: i32,
}

impl ReportIndexRow {
    fn into_summary(self) -> Result<ReportSummary> {
        let corrupt = |reason: String| DbError::Corrupt { id: self.id.clone(), reason };

        let timestamp = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| corrupt(e.to_string()))?
            .with_timezone(&Utc);
        let language: Language = self.language.parse().map_err(|e: crate::model::UnknownLanguage| corrupt(e.to_string()))?;

        Ok(ReportSummary {
            title: crate::model::report_title(timestamp, language),
            id: self.id,
            timestamp,
            has_competitor_data: self.has_competitor_data != 0,
            target_category: self.target_category,
            language,
        })
    }
}

// ============================================================================
// Database Connection
// ============================================================================

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Wait on a locked database instead of failing immediately; the server and
/// the batch importer write from several threads.
#[derive(Debug)]
struct BusyTimeout;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for BusyTimeout {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        diesel::sql_query("PRAGMA busy_timeout = 5000")
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Database connection wrapper with connection pool
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open database at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(&path_str);
        let pool = Pool::builder()
            .max_size(5)
            .connection_customizer(Box::new(BusyTimeout))
            .build(manager)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    fn get_conn(&self) -> Result<DbConn> {
        self.pool.get().map_err(|e| DbError::Connection(e.to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(r#"
            CREATE TABLE IF NOT EXISTS reports (
                id TEXT PRIMARY KEY NOT NULL,
                created_at_ms BIGINT NOT NULL,
                created_at TEXT NOT NULL,
                target_category TEXT NOT NULL,
                language TEXT NOT NULL,
                has_competitor_data INTEGER NOT NULL DEFAULT 0,
                payload_json TEXT NOT NULL
            )
        "#).execute(&mut conn)?;

        diesel::sql_query("CREATE INDEX IF NOT EXISTS idx_reports_created ON reports(created_at_ms)").execute(&mut conn)?;
        Ok(())
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Store a generated report. Reports are immutable, so an existing id
    /// is a query error rather than an update.
    pub fn insert_report(&self, report: &AnalysisReport) -> Result<()> {
        let mut conn = self.get_conn()?;
        let payload = serde_json::to_string(report)?;
        let created_at = report.timestamp.to_rfc3339();

        let new_report = NewReport {
            id: &report.id,
            created_at_ms: report.timestamp.timestamp_millis(),
            created_at: &created_at,
            target_category: &report.target_category,
            language: report.language.as_str(),
            has_competitor_data: if report.has_competitor_data { 1 } else { 0 },
            payload_json: &payload,
        };

        diesel::insert_into(reports::table)
            .values(&new_report)
            .execute(&mut conn)?;

        Ok(())
    }

    /// Fetch one stored report
    pub fn get_report(&self, id: &str) -> Result<Option<AnalysisReport>> {
        let mut conn = self.get_conn()?;

        let payload = reports::table
            .find(id)
            .select(reports::payload_json)
            .first::<String>(&mut conn)
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// All reports, most recently created first
    pub fn list_reports(&self) -> Result<Vec<ReportSummary>> {
        let mut conn = self.get_conn()?;

        let rows = reports::table
            .select(ReportIndexRow::as_select())
            .order((reports::created_at_ms.desc(), reports::id.desc()))
            .load::<ReportIndexRow>(&mut conn)?;

        rows.into_iter().map(ReportIndexRow::into_summary).collect()
    }

    pub fn count_reports(&self) -> Result<i64> {
        let mut conn = self.get_conn()?;
        let total: i64 = reports::table.count().get_result(&mut conn)?;
        Ok(total)
    }
}
