use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use url::Url;

use crate::error::{Result, ShortcutsError};
use crate::match_type::{DocumentType, MatchType, PageTransition};
use crate::models::{MatchCore, Shortcut, ShortcutId};
use crate::suggestion::classifications_from_string;

/// Durable home of shortcuts. Every call happens on the persistence worker.
pub trait ShortcutStore: Send {
    fn initialize(&mut self) -> Result<()>;
    fn load_all(&mut self) -> Result<HashMap<ShortcutId, Shortcut>>;
    fn add(&mut self, shortcut: &Shortcut) -> Result<()>;
    fn update(&mut self, shortcut: &Shortcut) -> Result<()>;
    fn delete_by_ids(&mut self, ids: &[ShortcutId]) -> Result<()>;
    /// Removes every record whose destination equals `url`.
    fn delete_by_url(&mut self, url: &str) -> Result<()>;
    fn delete_by_url_prefix(&mut self, url_prefix: &str) -> Result<()>;
    fn delete_all(&mut self) -> Result<()>;
}

const SHORTCUT_COLUMNS: &str = "id, text, fill_into_edit, url, document_type, contents, \
     contents_class, description, description_class, transition, type, keyword, \
     last_access_time, number_of_hits";

/// SQLite-backed store. The database file is opened by `initialize`.
pub struct SqliteShortcutStore {
    path: PathBuf,
    conn: Option<Connection>,
}

impl std::fmt::Debug for SqliteShortcutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteShortcutStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteShortcutStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: None,
        }
    }

    /// Opens and migrates immediately.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.as_ref().ok_or_else(not_initialized)?;
        f(conn)
    }

    fn with_tx<T>(
        &mut self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let conn = self.conn.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS omni_box_shortcuts (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                fill_into_edit TEXT NOT NULL,
                url TEXT NOT NULL,
                document_type INTEGER NOT NULL DEFAULT 0,
                contents TEXT NOT NULL,
                contents_class TEXT NOT NULL,
                description TEXT NOT NULL,
                description_class TEXT NOT NULL,
                transition INTEGER NOT NULL,
                type INTEGER NOT NULL,
                keyword TEXT NOT NULL,
                last_access_time INTEGER NOT NULL,
                number_of_hits INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_omni_box_shortcuts_url
            ON omni_box_shortcuts(url);
            ",
        )?;
        Ok(())
    }

    fn write(&self, shortcut: &Shortcut, upsert: bool) -> Result<()> {
        let verb = if upsert { "INSERT OR REPLACE" } else { "INSERT" };
        let core = &shortcut.match_core;
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "{verb} INTO omni_box_shortcuts({SHORTCUT_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                ),
                params![
                    shortcut.id.to_string(),
                    shortcut.text,
                    core.fill_into_edit,
                    core.destination_url.as_str(),
                    core.document_type.as_i32(),
                    core.contents,
                    core.contents_class,
                    core.description,
                    core.description_class,
                    i64::from(core.transition.raw()),
                    core.match_type.as_i32(),
                    core.keyword,
                    shortcut.last_access_time.timestamp_micros(),
                    i64::from(shortcut.number_of_hits),
                ],
            )?;
            Ok(())
        })
    }
}

impl ShortcutStore for SqliteShortcutStore {
    fn initialize(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.path)?;
        Self::migrate(&conn)?;
        #[cfg(unix)]
        harden_sqlite_permissions(&self.path)?;
        self.conn = Some(conn);
        Ok(())
    }

    fn load_all(&mut self) -> Result<HashMap<ShortcutId, Shortcut>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SHORTCUT_COLUMNS} FROM omni_box_shortcuts"
            ))?;
            let rows = stmt.query_map([], RawShortcutRow::from_row)?;

            let mut out = HashMap::new();
            for row in rows {
                let raw = row?;
                match raw.decode() {
                    Ok(shortcut) => {
                        out.insert(shortcut.id, shortcut);
                    }
                    Err(err) => {
                        tracing::warn!(
                            id = %raw.id,
                            error = %err,
                            "skipping undecodable shortcut row"
                        );
                    }
                }
            }
            Ok(out)
        })
    }

    fn add(&mut self, shortcut: &Shortcut) -> Result<()> {
        self.write(shortcut, false)
    }

    fn update(&mut self, shortcut: &Shortcut) -> Result<()> {
        self.write(shortcut, true)
    }

    fn delete_by_ids(&mut self, ids: &[ShortcutId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.with_tx(|tx| {
            let mut stmt = tx.prepare("DELETE FROM omni_box_shortcuts WHERE id = ?1")?;
            for id in ids {
                stmt.execute(params![id.to_string()])?;
            }
            Ok(())
        })
    }

    fn delete_by_url(&mut self, url: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM omni_box_shortcuts WHERE url = ?1", params![url])?;
            Ok(())
        })
    }

    fn delete_by_url_prefix(&mut self, url_prefix: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM omni_box_shortcuts WHERE substr(url, 1, length(?1)) = ?1",
                params![url_prefix],
            )?;
            Ok(())
        })
    }

    fn delete_all(&mut self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM omni_box_shortcuts", [])?;
            Ok(())
        })
    }
}

fn not_initialized() -> ShortcutsError {
    ShortcutsError::Internal("shortcut store used before initialize".to_string())
}

struct RawShortcutRow {
    id: String,
    text: String,
    fill_into_edit: String,
    url: String,
    document_type: i32,
    contents: String,
    contents_class: String,
    description: String,
    description_class: String,
    transition: i64,
    match_type: i32,
    keyword: String,
    last_access_time: i64,
    number_of_hits: i64,
}

impl RawShortcutRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            text: row.get(1)?,
            fill_into_edit: row.get(2)?,
            url: row.get(3)?,
            document_type: row.get(4)?,
            contents: row.get(5)?,
            contents_class: row.get(6)?,
            description: row.get(7)?,
            description_class: row.get(8)?,
            transition: row.get(9)?,
            match_type: row.get(10)?,
            keyword: row.get(11)?,
            last_access_time: row.get(12)?,
            number_of_hits: row.get(13)?,
        })
    }

    fn decode(&self) -> Result<Shortcut> {
        let id = self
            .id
            .parse::<ShortcutId>()
            .map_err(|err| ShortcutsError::Validation(format!("invalid shortcut id: {err}")))?;
        let match_type = MatchType::from_i32(self.match_type).ok_or_else(|| {
            ShortcutsError::Validation(format!("unknown match type: {}", self.match_type))
        })?;
        let transition = u32::try_from(self.transition).map_err(|_| {
            ShortcutsError::Validation(format!("invalid transition: {}", self.transition))
        })?;
        classifications_from_string(&self.contents_class)?;
        classifications_from_string(&self.description_class)?;
        let last_access_time = DateTime::<Utc>::from_timestamp_micros(self.last_access_time)
            .ok_or_else(|| {
                ShortcutsError::Validation(format!(
                    "invalid last access time: {}",
                    self.last_access_time
                ))
            })?;

        Ok(Shortcut {
            id,
            text: self.text.clone(),
            match_core: MatchCore {
                fill_into_edit: self.fill_into_edit.clone(),
                destination_url: Url::parse(&self.url)?,
                document_type: DocumentType::from_i32(self.document_type).unwrap_or_default(),
                contents: self.contents.clone(),
                contents_class: self.contents_class.clone(),
                description: self.description.clone(),
                description_class: self.description_class.clone(),
                transition: PageTransition::from_raw(transition),
                match_type,
                keyword: self.keyword.clone(),
            },
            last_access_time,
            number_of_hits: u32::try_from(self.number_of_hits).unwrap_or(u32::MAX),
        })
    }
}

#[cfg(unix)]
fn harden_sqlite_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for suffix in ["", "-wal", "-shm"] {
        let mut os = path.as_os_str().to_os_string();
        os.push(suffix);
        let candidate = PathBuf::from(os);
        if candidate.exists() {
            std::fs::set_permissions(candidate, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    Ok(())
}
