use crate::model::{Assignment, Case};
use anyhow::Context;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Metadata row for one recorded run.
#[derive(Debug, Clone)]
pub struct RunRow {
    pub id: i64,
    pub run_uuid: String,
    pub name: String,
    pub started_at: String,
    pub status: String,
}

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(super::schema::DDL)?;
        Ok(())
    }

    pub fn create_run(&self, run_uuid: &str, name: &str) -> anyhow::Result<i64> {
        let started_at = now_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO runs(run_uuid, name, started_at, status) VALUES (?1, ?2, ?3, ?4)",
            params![run_uuid, name, started_at, "running"],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn finalize_run(&self, run_id: i64, status: &str) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE runs SET status=?1 WHERE id=?2",
            params![status, run_id],
        )?;
        Ok(())
    }

    pub fn insert_case(&self, run_id: i64, case: &Case) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cases(run_id, case_id, inputs_json, outputs_json, msg, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                case.id,
                serde_json::to_string(&case.inputs)?,
                serde_json::to_string(&case.outputs)?,
                case.msg,
                now_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent runs first.
    pub fn list_runs(&self, limit: u32) -> anyhow::Result<Vec<RunRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, run_uuid, name, started_at, status
             FROM runs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(RunRow {
                id: row.get(0)?,
                run_uuid: row.get(1)?,
                name: row.get(2)?,
                started_at: row.get(3)?,
                status: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Cases of one run, in the order they were recorded. Capture lists
    /// are not persisted; returned cases carry inputs, outputs, and the
    /// failure annotation.
    pub fn fetch_run_cases(&self, run_id: i64) -> anyhow::Result<Vec<Case>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT c.case_id, c.inputs_json, c.outputs_json, c.msg, r.run_uuid
             FROM cases c JOIN runs r ON c.run_id = r.id
             WHERE c.run_id = ?1
             ORDER BY c.id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut out = Vec::new();
        for r in rows {
            let (case_id, inputs_json, outputs_json, msg, run_uuid) = r?;
            let inputs: Vec<Assignment> =
                serde_json::from_str(&inputs_json).context("corrupt inputs_json")?;
            let outputs: Vec<Assignment> =
                serde_json::from_str(&outputs_json).context("corrupt outputs_json")?;
            out.push(Case {
                id: case_id,
                parent_id: Some(run_uuid),
                inputs,
                capture: Vec::new(),
                outputs,
                msg,
            });
        }
        Ok(out)
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
