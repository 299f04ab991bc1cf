//! Forward-only schema migrations.
//!
//! Scripts live in the migrations directory as `NNN_description.sql` and are
//! applied in version order. A script and its `schema_migrations` row commit
//! in one transaction, so a failing script leaves the schema untouched.

use rusqlite::{params, Connection, Transaction};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{NexuError, Result};

const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

/// One migration script
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    /// File stem, e.g. `001_content_relations`
    pub name: String,
    sql: String,
}

impl Migration {
    /// Read a script from `path`
    ///
    /// # Returns
    ///
    /// `Ok(None)` for files without the `.sql` extension
    ///
    /// # Errors
    ///
    /// `NexuError::Config` when the file stem has no numeric version prefix
    fn from_path(path: &Path) -> Result<Option<Self>> {
        if path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
            return Ok(None);
        }

        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| NexuError::Config(format!("Invalid migration filename: {}", path.display())))?;
        let prefix = name.split_once('_').map_or(name, |(prefix, _)| prefix);
        let version = prefix
            .parse::<u32>()
            .map_err(|_| NexuError::Config(format!("Migration {} has no numeric version prefix", name)))?;

        Ok(Some(Self {
            version,
            name: name.to_string(),
            sql: fs::read_to_string(path)?,
        }))
    }

    fn apply(&self, tx: &Transaction<'_>) -> Result<()> {
        tx.execute_batch(&self.sql).map_err(|source| NexuError::Migration {
            name: self.name.clone(),
            source,
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![self.version, self.name],
        )?;
        Ok(())
    }
}

fn load_migrations(dir: &Path) -> Result<Vec<Migration>> {
    let mut by_version = BTreeMap::new();

    for entry in fs::read_dir(dir)? {
        let Some(migration) = Migration::from_path(&entry?.path())? else {
            continue;
        };
        match by_version.entry(migration.version) {
            Entry::Occupied(existing) => {
                let existing: &Migration = existing.get();
                return Err(NexuError::Config(format!(
                    "Migrations {} and {} share version {}",
                    existing.name, migration.name, migration.version
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(migration);
            }
        }
    }

    Ok(by_version.into_values().collect())
}

/// Applied migrations as `(version, name)`, oldest first
///
/// # Errors
///
/// Fails if `schema_migrations` does not exist yet
pub fn applied_migrations(conn: &Connection) -> Result<Vec<(u32, String)>> {
    let mut stmt = conn.prepare("SELECT version, name FROM schema_migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Scripts in `dir` that are not recorded as applied, in version order
pub fn pending_migrations(conn: &Connection, dir: &Path) -> Result<Vec<Migration>> {
    conn.execute_batch(CREATE_MIGRATIONS_TABLE)?;
    let applied: HashSet<u32> = applied_migrations(conn)?
        .into_iter()
        .map(|(version, _)| version)
        .collect();

    Ok(load_migrations(dir)?
        .into_iter()
        .filter(|migration| !applied.contains(&migration.version))
        .collect())
}

/// Bring the schema up to date with the scripts in `dir`
///
/// # Returns
///
/// The number of scripts applied by this call
///
/// # Errors
///
/// `NexuError::Migration` names the script that failed; earlier scripts stay applied
pub fn run_migrations(conn: &mut Connection, dir: &Path) -> Result<usize> {
    let pending = pending_migrations(conn, dir)?;

    for migration in &pending {
        log::info!("Applying migration {} (version {})", migration.name, migration.version);
        let tx = conn.transaction()?;
        migration.apply(&tx)?;
        tx.commit()?;
    }

    if pending.is_empty() {
        log::debug!("Schema is up to date");
    }
    Ok(pending.len())
}
