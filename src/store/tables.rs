//! Tabular backends for the placement store.
//!
//! Every persisted structure is a small table of text fields: the champion
//! roster, the placement matrix and the recorded-match ledger. The on-disk
//! encoding is plain comma separated values without quoting, so fields may
//! never contain commas, quotes or line breaks.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;

pub type Table = Vec<Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    ChampionNames,
    Placements { team_count: usize },
    RecordedMatches { team_count: usize },
}

impl TableKind {
    pub fn filename(&self) -> String {
        match self {
            TableKind::ChampionNames => "champion_names.csv".to_string(),
            TableKind::Placements { team_count } => format!("champion_placements_team{}.csv", team_count),
            TableKind::RecordedMatches { team_count } => format!("recorded_games_team{}.csv", team_count),
        }
    }
}

pub trait TableStore {
    /// `None` when the table has never been written or is empty.
    fn read(&self, kind: TableKind) -> Result<Option<Table>, StoreError>;

    fn write(&mut self, kind: TableKind, table: &Table) -> Result<(), StoreError>;
}

/// Whether a value can be written as a field without quoting.
pub fn is_plain_field(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(|c| c == ',' || c == '"' || c.is_control())
}

/// One CSV file per table inside a data directory.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CsvDirectory { root: root.into() }
    }

    pub fn path_of(&self, kind: TableKind) -> PathBuf {
        self.root.join(kind.filename())
    }

    fn encode(kind: TableKind, table: &Table) -> Result<String, StoreError> {
        let mut out = String::new();
        for row in table {
            if let Some(bad) = row.iter().find(|field| !is_plain_field(field)) {
                return Err(StoreError::Parse {
                    table: kind.filename(),
                    reason: format!("field '{}' cannot be encoded", bad),
                });
            }
            out.push_str(&row.join(","));
            out.push('\n');
        }
        Ok(out)
    }

    fn decode(content: &str) -> Table {
        content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|line| line.split(',').map(str::to_string).collect())
            .collect()
    }
}

impl TableStore for CsvDirectory {
    fn read(&self, kind: TableKind) -> Result<Option<Table>, StoreError> {
        let path = self.path_of(kind);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let table = Self::decode(&content);
        Ok(if table.is_empty() { None } else { Some(table) })
    }

    fn write(&mut self, kind: TableKind, table: &Table) -> Result<(), StoreError> {
        let content = Self::encode(kind, table)?;
        fs::create_dir_all(&self.root)?;

        let path = self.path_of(kind);
        let tmp = tmp_path(&path);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;

        debug!("Wrote {} rows to {:?}", table.len(), path);
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Tables held in memory only. Used for dry runs, seeded from another store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    tables: HashMap<TableKind, Table>,
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the given tables out of `source`.
    pub fn snapshot_of(source: &dyn TableStore, kinds: &[TableKind]) -> Result<Self, StoreError> {
        let mut tables = HashMap::new();
        for &kind in kinds {
            if let Some(table) = source.read(kind)? {
                tables.insert(kind, table);
            }
        }
        Ok(MemoryTables { tables })
    }
}

impl TableStore for MemoryTables {
    fn read(&self, kind: TableKind) -> Result<Option<Table>, StoreError> {
        Ok(self.tables.get(&kind).filter(|t| !t.is_empty()).cloned())
    }

    fn write(&mut self, kind: TableKind, table: &Table) -> Result<(), StoreError> {
        self.tables.insert(kind, table.clone());
        Ok(())
    }
}
