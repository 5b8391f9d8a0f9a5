//! SQLite-backed menu store.
//!
//! One table, `menus`, with `UNIQUE(date, meal_type)`. Writes go through
//! `INSERT ... ON CONFLICT DO UPDATE`, so repeated or overlapping runs converge
//! on a single row per key and the row keeps its `id`.

use crate::domain::model::{MealType, MenuEntry, StoredMenu};
use crate::domain::ports::MenuRepository;
use crate::utils::error::{EtlError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS menus (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        date      TEXT NOT NULL,
        meal_type TEXT NOT NULL,
        menu_text TEXT NOT NULL,
        UNIQUE(date, meal_type)
    );
";

const UPSERT: &str = "
    INSERT INTO menus (date, meal_type, menu_text)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(date, meal_type) DO UPDATE SET menu_text = excluded.menu_text
";

/// `ORDER BY` clause matching the extractor's date-then-meal ordering.
fn schedule_order_clause() -> String {
    let ranked = [MealType::Breakfast, MealType::Lunch, MealType::Dinner]
        .iter()
        .map(|meal| format!("WHEN '{}' THEN {}", meal.label(), meal.rank()))
        .collect::<Vec<_>>()
        .join(" ");
    let other = MealType::Other(String::new()).rank();
    format!("ORDER BY date, CASE meal_type {ranked} ELSE {other} END, meal_type")
}

pub struct SqliteMenuRepository {
    conn: Mutex<Connection>,
}

impl SqliteMenuRepository {
    /// Opens (or creates) the database file. Parent directories are created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        tracing::debug!("Opened menu database at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| EtlError::Internal {
            message: "menu database lock poisoned".to_string(),
        })
    }

    fn query_rows(&self, sql: &str, day: Option<&str>) -> Result<Vec<StoredMenu>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<StoredMenu> {
            Ok(StoredMenu {
                id: row.get(0)?,
                date: row.get(1)?,
                meal_type: row.get(2)?,
                menu_text: row.get(3)?,
            })
        };
        let rows = match day {
            Some(day) => stmt
                .query_map(params![format!("{day}%")], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
    }

    /// Current `menu_text` for a key, if stored.
    pub fn find(&self, date: &str, meal_type: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let text = conn
            .query_row(
                "SELECT menu_text FROM menus WHERE date = ?1 AND meal_type = ?2",
                params![date, meal_type],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM menus", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl MenuRepository for SqliteMenuRepository {
    fn initialize(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!("✅ Menu database ready");
        Ok(())
    }

    fn save(&self, entries: &[MenuEntry]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut saved = 0;
        {
            let mut stmt = tx.prepare(UPSERT)?;
            for entry in entries {
                match stmt.execute(params![
                    entry.date.as_str(),
                    entry.meal_type.label(),
                    entry.menu_text
                ]) {
                    Ok(_) => saved += 1,
                    // SQLite already rolled the whole batch back; nothing left to commit.
                    Err(e) if tx.is_autocommit() => {
                        tracing::error!(
                            "Menu batch aborted at {} {}: {}",
                            entry.date,
                            entry.meal_type,
                            e
                        );
                        return Err(e.into());
                    }
                    Err(e) => tracing::warn!(
                        "Failed to save menu {} {}: {}",
                        entry.date,
                        entry.meal_type,
                        e
                    ),
                }
            }
        }
        tx.commit()?;
        tracing::info!("💾 Saved {} of {} menu entries", saved, entries.len());
        Ok(saved)
    }

    fn read_all(&self) -> Result<Vec<StoredMenu>> {
        let sql = format!(
            "SELECT id, date, meal_type, menu_text FROM menus {}",
            schedule_order_clause()
        );
        self.query_rows(&sql, None)
    }

    fn read_day(&self, day: &str) -> Result<Vec<StoredMenu>> {
        let sql = format!(
            "SELECT id, date, meal_type, menu_text FROM menus WHERE date LIKE ?1 {}",
            schedule_order_clause()
        );
        self.query_rows(&sql, Some(day))
    }
}
