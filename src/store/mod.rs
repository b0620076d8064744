//! Persistent placement store.
//!
//! Three tables back the store:
//! - the champion roster (`champion_names.csv`), shared by every team count
//! - the placement matrix for one team count
//! - the ledger of match ids already counted in that matrix
//!
//! Only one writer may use a store at a time.

pub mod ledger;
pub mod matrix;
pub mod tables;

use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::ArenaFormat;
use crate::error::StoreError;
use crate::model::{Champion, Match, MatchId};

pub use ledger::Ledger;
pub use matrix::PlacementMatrix;
pub use tables::{CsvDirectory, MemoryTables, TableKind, TableStore};

/// What `apply` did with a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Recorded,
    AlreadyRecorded,
}

pub struct PlacementStore {
    tables: Box<dyn TableStore>,
    team_count: usize,
    roster: Vec<Champion>,
    matrix: PlacementMatrix,
    ledger: Ledger,
}

impl PlacementStore {
    /// Reads and validates all three tables. A missing or empty matrix is
    /// treated as all zeros over the roster.
    pub fn open(tables: Box<dyn TableStore>, format: ArenaFormat) -> Result<Self, StoreError> {
        let team_count = format.team_count;
        let roster = read_roster(tables.as_ref())?;

        let placements = TableKind::Placements { team_count };
        let matrix = match tables.read(placements)? {
            Some(table) => load_matrix(&table, team_count, &roster, &placements.filename())?,
            None => PlacementMatrix::empty(team_count, roster.iter().cloned()),
        };

        let ledger = Ledger::from_table(tables.read(TableKind::RecordedMatches { team_count })?);

        info!(
            "Opened placement store: {} champions, {} recorded matches ({} teams)",
            roster.len(),
            ledger.len(),
            team_count
        );

        Ok(PlacementStore {
            tables,
            team_count,
            roster,
            matrix,
            ledger,
        })
    }

    pub fn open_dir(dir: &std::path::Path, format: ArenaFormat) -> Result<Self, StoreError> {
        Self::open(Box::new(CsvDirectory::new(dir)), format)
    }

    pub fn team_count(&self) -> usize {
        self.team_count
    }

    pub fn matrix(&self) -> &PlacementMatrix {
        &self.matrix
    }

    pub fn roster(&self) -> &[Champion] {
        &self.roster
    }

    pub fn recorded_match_ids(&self) -> &HashSet<MatchId> {
        self.ledger.ids()
    }

    pub fn is_recorded(&self, id: &str) -> bool {
        self.ledger.contains(id)
    }

    /// Counts `m` once. Replaying an id that is already in the ledger changes
    /// nothing and reports `AlreadyRecorded`.
    ///
    /// The ledger is persisted before the matrix, so an interrupted write can
    /// lose a sample but never count one twice.
    pub fn apply(&mut self, m: &Match) -> Result<ApplyOutcome, StoreError> {
        if self.ledger.contains(m.id()) {
            info!("Match {} already recorded, data is not saved", m.id());
            return Ok(ApplyOutcome::AlreadyRecorded);
        }

        let mut matrix = self.matrix.clone();
        matrix.record(m)?;

        let mut ledger = self.ledger.clone();
        ledger.insert(m.id().to_string());

        self.tables
            .write(TableKind::RecordedMatches { team_count: self.team_count }, &ledger.to_table())?;
        self.ledger = ledger;

        self.tables
            .write(TableKind::Placements { team_count: self.team_count }, &matrix.to_table())?;
        self.matrix = matrix;

        Ok(ApplyOutcome::Recorded)
    }

    /// Registers a new champion in the roster and gives it a zero row and
    /// zero columns in the matrix.
    pub fn add_champion(&mut self, champion: Champion) -> Result<(), StoreError> {
        if !tables::is_plain_field(champion.name()) || champion.name().contains('_') {
            return Err(StoreError::InvalidName(champion.name().to_string()));
        }
        if self.roster.binary_search(&champion).is_ok() {
            return Err(StoreError::AlreadyExists(champion.name().to_string()));
        }

        let mut matrix = self.matrix.clone();
        let at = matrix.insert_champion(champion.clone())?;
        let mut roster = self.roster.clone();
        roster.insert(at, champion.clone());

        self.tables.write(TableKind::ChampionNames, &roster_table(&roster))?;
        self.roster = roster;
        self.tables
            .write(TableKind::Placements { team_count: self.team_count }, &matrix.to_table())?;
        self.matrix = matrix;

        info!("Added champion '{}' at position {}", champion, at);
        Ok(())
    }

    /// Zeroes every count and forgets every recorded match.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        let matrix = self.matrix.zeroed();
        self.tables
            .write(TableKind::Placements { team_count: self.team_count }, &matrix.to_table())?;
        self.matrix = matrix;

        let ledger = Ledger::new();
        self.tables
            .write(TableKind::RecordedMatches { team_count: self.team_count }, &ledger.to_table())?;
        self.ledger = ledger;

        warn!(
            "Reset placement store for {} teams ({} champions)",
            self.team_count,
            self.roster.len()
        );
        Ok(())
    }
}

fn read_roster(tables: &dyn TableStore) -> Result<Vec<Champion>, StoreError> {
    let Some(table) = tables.read(TableKind::ChampionNames)? else {
        return Ok(Vec::new());
    };

    let mut roster: Vec<Champion> = table
        .iter()
        .flatten()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(Champion::of)
        .collect();
    roster.sort();
    roster.dedup();
    Ok(roster)
}

/// Parses a persisted matrix. The roster is shared by every team count, so a
/// matrix written before champions were added under another team count holds
/// a sorted subset of the roster; the missing champions are grown in as zeros.
fn load_matrix(
    table: &tables::Table,
    team_count: usize,
    roster: &[Champion],
    source: &str,
) -> Result<PlacementMatrix, StoreError> {
    let persisted: Vec<Champion> = table
        .iter()
        .skip(1)
        .filter_map(|row| row.first())
        .map(|name| Champion::of(name))
        .collect();

    let is_older_roster =
        persisted.len() < roster.len() && persisted.iter().all(|c| roster.binary_search(c).is_ok());
    if !is_older_roster {
        return PlacementMatrix::from_table(table, team_count, roster, source);
    }

    let mut matrix = PlacementMatrix::from_table(table, team_count, &persisted, source)?;
    for champion in roster {
        if matrix.index_of(champion).is_none() {
            matrix.insert_champion(champion.clone())?;
        }
    }
    info!(
        "Grew {} from {} to {} champions to match the roster",
        source,
        persisted.len(),
        matrix.len()
    );
    Ok(matrix)
}

fn roster_table(roster: &[Champion]) -> tables::Table {
    vec![roster.iter().map(|c| c.name().to_string()).collect()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::arena_match::Team;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn seeded_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("champion_names.csv"), format!("{}\n", names.join(","))).unwrap();
        dir
    }

    fn duo_match(id: &str, duos: &[(&str, &str)], scoreboard: &[usize]) -> Match {
        let teams = duos
            .iter()
            .map(|(a, b)| Team::new(Champion::of(a), Champion::of(b)))
            .collect();
        Match::new(id, teams, scoreboard.to_vec()).unwrap()
    }

    #[test]
    fn test_open_empty_directory() {
        let dir = TempDir::new().unwrap();
        let store = PlacementStore::open_dir(dir.path(), ArenaFormat::new(8)).unwrap();
        assert_eq!(store.matrix().len(), 0);
        assert!(store.recorded_match_ids().is_empty());
    }

    #[test]
    fn test_missing_matrix_is_zero_over_roster() {
        let dir = seeded_dir(&["zed", "ahri", "lux"]);
        let store = PlacementStore::open_dir(dir.path(), ArenaFormat::new(4)).unwrap();
        let names: Vec<&str> = store.matrix().champions().iter().map(Champion::name).collect();
        assert_eq!(names, ["ahri", "lux", "zed"]);
        assert_eq!(store.matrix().total(), 0);
    }

    #[test]
    fn test_apply_persists_and_reopens() {
        let dir = seeded_dir(&["a", "b", "c", "d"]);
        let mut store = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();

        let outcome = store.apply(&duo_match("EUW1_1", &[("a", "b"), ("c", "d")], &[1, 2])).unwrap();
        assert_eq!(outcome, ApplyOutcome::Recorded);

        let reopened = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        assert_eq!(reopened.matrix(), store.matrix());
        assert!(reopened.is_recorded("EUW1_1"));
        assert_eq!(reopened.matrix().cell(&Champion::of("d"), &Champion::of("c"), 2), 1);
    }

    #[test]
    fn test_replay_is_a_byte_identical_no_op() {
        let dir = seeded_dir(&["a", "b", "c", "d"]);
        let mut store = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        let m = duo_match("EUW1_1", &[("a", "b"), ("c", "d")], &[1, 2]);
        store.apply(&m).unwrap();

        let matrix_path = dir.path().join("champion_placements_team2.csv");
        let ledger_path = dir.path().join("recorded_games_team2.csv");
        let matrix_before = fs::read(&matrix_path).unwrap();
        let ledger_before = fs::read(&ledger_path).unwrap();
        let state_before = store.matrix().clone();

        assert_eq!(store.apply(&m).unwrap(), ApplyOutcome::AlreadyRecorded);

        assert_eq!(fs::read(&matrix_path).unwrap(), matrix_before);
        assert_eq!(fs::read(&ledger_path).unwrap(), ledger_before);
        assert_eq!(store.matrix(), &state_before);
        assert_eq!(store.recorded_match_ids().len(), 1);
    }

    #[test]
    fn test_unknown_champion_leaves_store_untouched() {
        let dir = seeded_dir(&["a", "b", "c"]);
        let mut store = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();

        let result = store.apply(&duo_match("EUW1_9", &[("a", "b"), ("c", "new")], &[1, 2]));

        assert!(matches!(result, Err(StoreError::UnknownChampion(_))));
        assert!(!store.is_recorded("EUW1_9"));
        assert!(!dir.path().join("recorded_games_team2.csv").exists());
    }

    #[test]
    fn test_add_champion_updates_roster_and_matrix() {
        let dir = seeded_dir(&["ahri", "zed", "lux", "vi"]);
        let mut store = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        store.apply(&duo_match("m1", &[("ahri", "zed"), ("lux", "vi")], &[1, 2])).unwrap();

        store.add_champion(Champion::of("Kai Sa")).unwrap();

        let roster = fs::read_to_string(dir.path().join("champion_names.csv")).unwrap();
        assert_eq!(roster, "ahri,kaisa,lux,vi,zed\n");
        let reopened = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        assert_eq!(reopened.matrix().len(), 5);
        assert_eq!(reopened.matrix().cell(&Champion::of("zed"), &Champion::of("ahri"), 1), 1);

        assert!(matches!(
            store.add_champion(Champion::of("kaisa")),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            store.add_champion(Champion::of("bad,name")),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_champion_added_under_other_team_count_grows_on_open() {
        let dir = seeded_dir(&["a", "b", "c", "d"]);
        let mut duos = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        duos.apply(&duo_match("m1", &[("a", "b"), ("c", "d")], &[1, 2])).unwrap();

        let mut quads = PlacementStore::open_dir(dir.path(), ArenaFormat::new(4)).unwrap();
        quads.reset().unwrap();
        quads.add_champion(Champion::of("e")).unwrap();

        let mut reopened = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        let names: Vec<&str> = reopened.matrix().champions().iter().map(Champion::name).collect();
        assert_eq!(names, ["a", "b", "c", "d", "e"]);
        assert_eq!(reopened.matrix().cell(&Champion::of("a"), &Champion::of("b"), 1), 1);
        assert_eq!(reopened.matrix().cell(&Champion::of("d"), &Champion::of("c"), 2), 1);
        assert_eq!(reopened.matrix().total(), 4);
        assert!(reopened.is_recorded("m1"));

        reopened.apply(&duo_match("m2", &[("e", "a"), ("b", "c")], &[1, 2])).unwrap();
        let again = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        assert_eq!(again.matrix().cell(&Champion::of("a"), &Champion::of("e"), 1), 1);
        assert_eq!(again.matrix().total(), 8);
    }

    #[test]
    fn test_matrix_with_unregistered_champion_is_rejected() {
        let dir = seeded_dir(&["a", "b"]);
        fs::write(
            dir.path().join("champion_placements_team2.csv"),
            "champion_names,a_1,a_2,x_1,x_2\na,0,0,0,0\nx,0,0,0,0\n",
        )
        .unwrap();

        let result = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2));
        assert!(matches!(result, Err(StoreError::ShapeMismatch(_))));
    }

    #[test]
    fn test_nunu_aliases_share_one_row() {
        let dir = seeded_dir(&["nunu&willump", "ahri", "zed", "lux"]);
        let mut store = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();

        store.apply(&duo_match("m1", &[("Nunu", "ahri"), ("zed", "lux")], &[1, 2])).unwrap();
        store
            .apply(&duo_match("m2", &[("Nunu & Willump", "ahri"), ("zed", "lux")], &[2, 1]))
            .unwrap();

        let matrix = store.matrix();
        assert_eq!(matrix.len(), 4);
        let nunu = Champion::of("nunu&willump");
        let row = matrix.index_of(&nunu).unwrap();
        assert_eq!(matrix.row_at(row).iter().sum::<u64>(), 2);
        assert_eq!(matrix.cell(&nunu, &Champion::of("ahri"), 1), 1);
        assert_eq!(matrix.cell(&nunu, &Champion::of("ahri"), 2), 1);
        assert_eq!(matrix.cell(&Champion::of("ahri"), &nunu, 2), 1);
    }

    #[test]
    fn test_reset_clears_counts_and_ledger() {
        let dir = seeded_dir(&["a", "b", "c", "d"]);
        let mut store = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        store.apply(&duo_match("m1", &[("a", "b"), ("c", "d")], &[2, 1])).unwrap();

        store.reset().unwrap();

        let reopened = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2)).unwrap();
        assert_eq!(reopened.matrix().total(), 0);
        assert_eq!(reopened.matrix().len(), 4);
        assert!(reopened.recorded_match_ids().is_empty());
    }

    #[test]
    fn test_corrupt_shape_is_rejected_on_open() {
        let dir = seeded_dir(&["a", "b"]);
        fs::write(
            dir.path().join("champion_placements_team2.csv"),
            "champion_names,a_1,a_2\na,0,0\n",
        )
        .unwrap();

        let result = PlacementStore::open_dir(dir.path(), ArenaFormat::new(2));
        assert!(matches!(result, Err(StoreError::ShapeMismatch(_))));
    }

    #[test]
    fn test_memory_tables_back_a_store() {
        let mut tables = MemoryTables::new();
        tables
            .write(TableKind::ChampionNames, &vec![vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()]])
            .unwrap();
        let mut store = PlacementStore::open(Box::new(tables), ArenaFormat::new(2)).unwrap();
        store.apply(&duo_match("m1", &[("a", "b"), ("c", "d")], &[2, 1])).unwrap();
        assert_eq!(store.matrix().total(), 4);
    }
}
