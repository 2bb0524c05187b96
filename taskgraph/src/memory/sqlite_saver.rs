//! SQLite-backed checkpointer (feature `sqlite`).
//!
//! Table `checkpoints(run_id, idx, state, metadata, created_at)` with `(run_id, idx)`
//! as primary key. The next index is computed and inserted inside one transaction
//! while holding the connection mutex, so indices stay contiguous per run.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::checkpoint::{Checkpoint, CheckpointMetadata};
use super::checkpointer::{CheckpointError, Checkpointer};
use super::serializer::Serializer;

fn storage_err(e: rusqlite::Error) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

const SCHEMA: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;

     CREATE TABLE IF NOT EXISTS checkpoints (
         run_id TEXT NOT NULL,
         idx INTEGER NOT NULL,
         state BLOB NOT NULL,
         metadata TEXT NOT NULL,
         created_at TEXT NOT NULL,
         PRIMARY KEY (run_id, idx)
     );";

type Row = (i64, Vec<u8>, String, String);

/// Persistent checkpointer backed by a single SQLite file.
///
/// **Interaction**: Pass to `StateGraph::compile_with_checkpointer`; state is encoded with
/// the given [`Serializer`] (usually [`JsonSerializer`](super::JsonSerializer)).
pub struct SqliteSaver<S> {
    conn: Mutex<Connection>,
    serializer: Arc<dyn Serializer<S>>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(storage_err)?;
        Self::init(conn, serializer)
    }

    /// In-memory database; contents vanish when dropped.
    pub fn open_in_memory(serializer: Arc<dyn Serializer<S>>) -> Result<Self, CheckpointError> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::init(conn, serializer)
    }

    fn init(conn: Connection, serializer: Arc<dyn Serializer<S>>) -> Result<Self, CheckpointError> {
        conn.execute_batch(SCHEMA).map_err(storage_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            serializer,
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CheckpointError> {
        self.conn
            .lock()
            .map_err(|e| CheckpointError::Storage(e.to_string()))
    }

    fn decode(&self, run_id: &str, row: Row) -> Result<Checkpoint<S>, CheckpointError> {
        let (idx, state, metadata, created_at) = row;
        let metadata: CheckpointMetadata = serde_json::from_str(&metadata)
            .map_err(|e| CheckpointError::Serialization(e.to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| CheckpointError::Serialization(e.to_string()))?
            .with_timezone(&Utc);
        Ok(Checkpoint {
            run_id: run_id.to_string(),
            index: idx as u64,
            state: self.serializer.deserialize(&state)?,
            created_at,
            metadata,
        })
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn append(
        &self,
        run_id: &str,
        state: &S,
        metadata: CheckpointMetadata,
    ) -> Result<u64, CheckpointError> {
        let bytes = self.serializer.serialize(state)?;
        let metadata = serde_json::to_string(&metadata)
            .map_err(|e| CheckpointError::Serialization(e.to_string()))?;
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage_err)?;
        let next: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(idx) + 1, 0) FROM checkpoints WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .map_err(storage_err)?;
        tx.execute(
            "INSERT INTO checkpoints (run_id, idx, state, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, next, bytes, metadata, Utc::now().to_rfc3339()],
        )
        .map_err(storage_err)?;
        tx.commit().map_err(storage_err)?;
        Ok(next as u64)
    }

    async fn history(&self, run_id: &str) -> Result<Vec<Checkpoint<S>>, CheckpointError> {
        let rows: Vec<Row> = {
            let conn = self.lock()?;
            let mut stmt = conn
                .prepare(
                    "SELECT idx, state, metadata, created_at FROM checkpoints
                     WHERE run_id = ?1 ORDER BY idx ASC",
                )
                .map_err(storage_err)?;
            let mapped = stmt
                .query_map(params![run_id], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })
                .map_err(storage_err)?;
            let rows = mapped
                .collect::<Result<Vec<Row>, _>>()
                .map_err(storage_err)?;
            rows
        };
        rows.into_iter().map(|r| self.decode(run_id, r)).collect()
    }

    async fn get(&self, run_id: &str, index: u64) -> Result<Checkpoint<S>, CheckpointError> {
        let row: Option<Row> = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT idx, state, metadata, created_at FROM checkpoints
                 WHERE run_id = ?1 AND idx = ?2",
                params![run_id, index as i64],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(storage_err)?
        };
        match row {
            Some(r) => self.decode(run_id, r),
            None => Err(CheckpointError::NotFound {
                run_id: run_id.to_string(),
                index,
            }),
        }
    }

    async fn latest(&self, run_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let row: Option<Row> = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT idx, state, metadata, created_at FROM checkpoints
                 WHERE run_id = ?1 ORDER BY idx DESC LIMIT 1",
                params![run_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(storage_err)?
        };
        row.map(|r| self.decode(run_id, r)).transpose()
    }

    async fn list_runs(&self) -> Result<Vec<String>, CheckpointError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT run_id FROM checkpoints ORDER BY run_id")
            .map_err(storage_err)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(storage_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_err)?;
        Ok(ids)
    }
}
