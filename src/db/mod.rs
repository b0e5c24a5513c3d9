//! Lookup log storage.
//!
//! Records site visits, successful lookups and requests for content the corpus
//! does not have. Nothing in the lookup path depends on these writes; see
//! [`LookupLog`] for the best-effort wrapper the API uses.

mod log;
mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::*;

pub use log::LookupLog;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Location used when no explicit path is configured.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "codethesaurus")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("lookups.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Site visits
    // ============================================================

    pub fn record_visit(&self, url: &str, user_agent: &str, referer: &str) -> Result<SiteVisit> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO site_visits (id, url, user_agent, referer, date_time)
             VALUES (?, ?, ?, ?, ?)",
            (id.to_string(), url, user_agent, referer, now.to_rfc3339()),
        )?;

        Ok(SiteVisit {
            id,
            url: url.to_string(),
            user_agent: user_agent.to_string(),
            referer: referer.to_string(),
            date_time: now,
        })
    }

    pub fn visit_count(&self) -> Result<i64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count = conn.query_row("SELECT COUNT(*) FROM site_visits", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_visits(&self) -> Result<Vec<SiteVisit>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, url, user_agent, referer, date_time
             FROM site_visits ORDER BY date_time",
        )?;

        let visits = stmt
            .query_map([], |row| {
                Ok(SiteVisit {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    url: row.get(1)?,
                    user_agent: row.get(2)?,
                    referer: row.get(3)?,
                    date_time: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(visits)
    }

    // ============================================================
    // Lookups
    // ============================================================

    pub fn record_lookup(&self, visit_id: Uuid, input: CreateLookupInput) -> Result<LookupData> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO lookups (id, site_visit_id, entry1, version1, entry2, version2, structure, date_time)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                visit_id.to_string(),
                &input.entry1,
                &input.version1,
                &input.entry2,
                &input.version2,
                &input.structure,
                now.to_rfc3339(),
            ),
        )?;

        Ok(LookupData {
            id,
            visit_id,
            entry1: input.entry1,
            version1: input.version1,
            entry2: input.entry2,
            version2: input.version2,
            structure: input.structure,
            date_time: now,
        })
    }

    pub fn lookup_count(&self) -> Result<i64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count = conn.query_row("SELECT COUNT(*) FROM lookups", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_lookups(&self) -> Result<Vec<LookupData>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, site_visit_id, entry1, version1, entry2, version2, structure, date_time
             FROM lookups ORDER BY date_time",
        )?;

        let lookups = stmt
            .query_map([], |row| {
                Ok(LookupData {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    visit_id: parse_uuid(row.get::<_, String>(1)?),
                    entry1: row.get(2)?,
                    version1: row.get(3)?,
                    entry2: row.get(4)?,
                    version2: row.get(5)?,
                    structure: row.get(6)?,
                    date_time: parse_datetime(row.get::<_, String>(7)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lookups)
    }

    // ============================================================
    // Missing items
    // ============================================================

    pub fn record_missing(
        &self,
        visit_id: Uuid,
        item_type: MissingItemKind,
        item_value: &str,
        entry_context: Option<&str>,
    ) -> Result<MissingLookup> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO missing_lookups (id, site_visit_id, item_type, item_value, entry_context, date_time)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                visit_id.to_string(),
                item_type.as_str(),
                item_value,
                entry_context,
                now.to_rfc3339(),
            ),
        )?;

        Ok(MissingLookup {
            id,
            visit_id,
            item_type,
            item_value: item_value.to_string(),
            entry_context: entry_context.map(str::to_string),
            date_time: now,
        })
    }

    pub fn missing_items(&self) -> Result<Vec<MissingLookup>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, site_visit_id, item_type, item_value, entry_context, date_time
             FROM missing_lookups ORDER BY date_time, rowid",
        )?;

        let items = stmt
            .query_map([], |row| {
                let item_type: String = row.get(2)?;
                Ok(MissingLookup {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    visit_id: parse_uuid(row.get::<_, String>(1)?),
                    item_type: MissingItemKind::from_str(&item_type)
                        .unwrap_or(MissingItemKind::Concept),
                    item_value: row.get(3)?,
                    entry_context: row.get(4)?,
                    date_time: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
