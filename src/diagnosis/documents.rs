use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{DiagnosisError, DocumentSource};
use crate::models::HealthDocument;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS health_records (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    extracted_text TEXT,
    record_type TEXT NOT NULL,
    date_recorded TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_health_records_user ON health_records(user_id);";

/// Health records stored in a local SQLite database.
///
/// The connection is shared behind a mutex and queried on the blocking pool.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, DiagnosisError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DiagnosisError::TaskFailed(e.to_string()))?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database, mostly for tests and demos.
    pub fn open_in_memory() -> Result<Self, DiagnosisError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, DiagnosisError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Store a document for `user_id`. Returns the generated record id.
    pub fn insert(&self, user_id: &str, doc: &HealthDocument) -> Result<Uuid, DiagnosisError> {
        let id = Uuid::new_v4();
        let created_at = Local::now().naive_local().format("%Y-%m-%d %H:%M:%S%.f").to_string();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO health_records
             (id, user_id, title, description, extracted_text, record_type, date_recorded, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id.to_string(),
                user_id,
                doc.title,
                doc.description,
                doc.extracted_text,
                doc.record_type,
                doc.date_recorded,
                created_at,
            ],
        )?;
        Ok(id)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DiagnosisError> {
        self.conn
            .lock()
            .map_err(|_| DiagnosisError::TaskFailed("document store lock poisoned".to_string()))
    }
}

fn query_recent(
    conn: &Connection,
    user_id: &str,
    limit: usize,
) -> Result<Vec<HealthDocument>, DiagnosisError> {
    let mut stmt = conn.prepare(
        "SELECT title, record_type, date_recorded, description, extracted_text
         FROM health_records
         WHERE user_id = ?1
         ORDER BY COALESCE(date_recorded, created_at) DESC, created_at DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![user_id, limit as i64], |row| {
        Ok(HealthDocument {
            title: row.get(0)?,
            record_type: row.get(1)?,
            date_recorded: row.get::<_, Option<NaiveDate>>(2)?,
            description: row.get(3)?,
            extracted_text: row.get(4)?,
        })
    })?;

    let mut documents = Vec::new();
    for row in rows {
        documents.push(row?);
    }
    Ok(documents)
}

#[async_trait]
impl DocumentSource for SqliteDocumentStore {
    async fn fetch_documents(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HealthDocument>, DiagnosisError> {
        let conn = self.conn.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| DiagnosisError::TaskFailed("document store lock poisoned".to_string()))?;
            query_recent(&guard, &user_id, limit)
        })
        .await
        .map_err(|e| DiagnosisError::TaskFailed(e.to_string()))?
    }
}
