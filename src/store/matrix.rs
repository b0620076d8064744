use crate::error::StoreError;
use crate::model::{Champion, Match};

use super::tables::Table;

/// Label of the first header cell; the rest of the header is `<teammate>_<placement>`.
const ROW_LABEL_HEADER: &str = "champion_names";

/// Symmetric counts of (champion, teammate, placement).
///
/// Champions are kept sorted by canonical name. Cell `(row, teammate, p)`
/// lives at `(row * n + teammate) * team_count + (p - 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementMatrix {
    team_count: usize,
    champions: Vec<Champion>,
    cells: Vec<u64>,
}

impl PlacementMatrix {
    pub fn empty(team_count: usize, champions: impl IntoIterator<Item = Champion>) -> Self {
        let mut champions: Vec<Champion> = champions.into_iter().collect();
        champions.sort();
        champions.dedup();
        let n = champions.len();

        PlacementMatrix {
            team_count,
            champions,
            cells: vec![0; n * n * team_count],
        }
    }

    /// Same champions, every count back to zero.
    pub fn zeroed(&self) -> Self {
        Self::empty(self.team_count, self.champions.iter().cloned())
    }

    pub fn team_count(&self) -> usize {
        self.team_count
    }

    pub fn champions(&self) -> &[Champion] {
        &self.champions
    }

    pub fn len(&self) -> usize {
        self.champions.len()
    }

    pub fn index_of(&self, champion: &Champion) -> Option<usize> {
        self.champions.binary_search(champion).ok()
    }

    fn offset(&self, row: usize, teammate: usize) -> usize {
        (row * self.len() + teammate) * self.team_count
    }

    /// Counts for `row` teamed with `teammate`, indexed by placement - 1.
    pub fn placements_at(&self, row: usize, teammate: usize) -> &[u64] {
        let start = self.offset(row, teammate);
        &self.cells[start..start + self.team_count]
    }

    /// Every column of one row, teammates in sorted order.
    pub fn row_at(&self, row: usize) -> &[u64] {
        let start = self.offset(row, 0);
        &self.cells[start..start + self.len() * self.team_count]
    }

    #[cfg(test)]
    /// Count of `champion` finishing `placement` while teamed with `teammate`.
    /// Unknown champions and out of range placements read as zero.
    pub fn cell(&self, champion: &Champion, teammate: &Champion, placement: usize) -> u64 {
        match (self.index_of(champion), self.index_of(teammate)) {
            (Some(row), Some(col)) if (1..=self.team_count).contains(&placement) => {
                self.placements_at(row, col)[placement - 1]
            }
            _ => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().sum()
    }

    /// Adds one match. Nothing is touched unless every team can be recorded.
    pub fn record(&mut self, m: &Match) -> Result<(), StoreError> {
        if m.team_count() != self.team_count {
            return Err(StoreError::TeamCountMismatch {
                id: m.id().to_string(),
                expected: self.team_count,
                found: m.team_count(),
            });
        }

        let mut updates = Vec::with_capacity(m.team_count());
        for (team, placement) in m.standings() {
            let [first, second] = team.champions();
            let a = self
                .index_of(first)
                .ok_or_else(|| StoreError::UnknownChampion(first.name().to_string()))?;
            let b = self
                .index_of(second)
                .ok_or_else(|| StoreError::UnknownChampion(second.name().to_string()))?;
            updates.push((a, b, placement));
        }

        for (a, b, placement) in updates {
            let ab = self.offset(a, b) + placement - 1;
            let ba = self.offset(b, a) + placement - 1;
            self.cells[ab] += 1;
            self.cells[ba] += 1;
        }
        Ok(())
    }

    /// Inserts a zero row and zero columns for `champion` at its sorted position.
    pub fn insert_champion(&mut self, champion: Champion) -> Result<usize, StoreError> {
        let at = match self.champions.binary_search(&champion) {
            Ok(_) => return Err(StoreError::AlreadyExists(champion.name().to_string())),
            Err(at) => at,
        };

        let old_n = self.len();
        let new_n = old_n + 1;
        let t = self.team_count;
        let mut cells = vec![0; new_n * new_n * t];

        // Old index -> new index, skipping the inserted slot.
        let shift = |i: usize| if i >= at { i + 1 } else { i };
        for row in 0..old_n {
            for teammate in 0..old_n {
                let from = (row * old_n + teammate) * t;
                let to = (shift(row) * new_n + shift(teammate)) * t;
                cells[to..to + t].copy_from_slice(&self.cells[from..from + t]);
            }
        }

        self.champions.insert(at, champion);
        self.cells = cells;
        Ok(at)
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.len() * self.team_count + 1);
        header.push(ROW_LABEL_HEADER.to_string());
        for champion in &self.champions {
            for placement in 1..=self.team_count {
                header.push(format!("{}_{}", champion.name(), placement));
            }
        }
        header
    }

    pub fn to_table(&self) -> Table {
        let mut table = Vec::with_capacity(self.len() + 1);
        table.push(self.header());
        for (row, champion) in self.champions.iter().enumerate() {
            let mut line = Vec::with_capacity(self.len() * self.team_count + 1);
            line.push(champion.name().to_string());
            line.extend(self.row_at(row).iter().map(u64::to_string));
            table.push(line);
        }
        table
    }

    /// Parses a persisted table, checking it has exactly the shape implied by
    /// `roster` and `team_count`.
    pub fn from_table(table: &Table, team_count: usize, roster: &[Champion], source: &str) -> Result<Self, StoreError> {
        let mut matrix = Self::empty(team_count, roster.iter().cloned());

        let expected_columns = matrix.len() * team_count + 1;
        let (header, rows) = table
            .split_first()
            .ok_or_else(|| StoreError::ShapeMismatch(format!("{} has no header", source)))?;

        if header.len() != expected_columns {
            return Err(StoreError::ShapeMismatch(format!(
                "{} has {} columns, expected {} ({} champions x {} placements + 1)",
                source,
                header.len(),
                expected_columns,
                matrix.len(),
                team_count
            )));
        }
        if *header != matrix.header() {
            return Err(StoreError::ShapeMismatch(format!(
                "{} header does not match the champion roster",
                source
            )));
        }
        if rows.len() != matrix.len() {
            return Err(StoreError::ShapeMismatch(format!(
                "{} has {} rows, expected {}",
                source,
                rows.len(),
                matrix.len()
            )));
        }

        let row_width = expected_columns - 1;
        for (row, line) in rows.iter().enumerate() {
            let expected_label = matrix.champions[row].name().to_string();
            if line.first() != Some(&expected_label) {
                return Err(StoreError::ShapeMismatch(format!(
                    "{} row {} should be '{}'",
                    source,
                    row + 1,
                    expected_label
                )));
            }
            if line.len() != expected_columns {
                return Err(StoreError::Parse {
                    table: source.to_string(),
                    reason: format!("row '{}' has {} fields, expected {}", expected_label, line.len(), expected_columns),
                });
            }

            let start = row * row_width;
            for (i, field) in line[1..].iter().enumerate() {
                matrix.cells[start + i] = field.trim().parse().map_err(|_| StoreError::Parse {
                    table: source.to_string(),
                    reason: format!("'{}' in row '{}' is not a non-negative count", field, expected_label),
                })?;
            }
        }

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::arena_match::Team;
    use pretty_assertions::assert_eq;

    fn champs(names: &[&str]) -> Vec<Champion> {
        names.iter().map(|n| Champion::of(n)).collect()
    }

    fn duo_match(id: &str, duos: &[(&str, &str)], scoreboard: &[usize]) -> Match {
        let teams = duos
            .iter()
            .map(|(a, b)| Team::new(Champion::of(a), Champion::of(b)))
            .collect();
        Match::new(id, teams, scoreboard.to_vec()).unwrap()
    }

    #[test]
    fn test_two_team_scenario() {
        let mut matrix = PlacementMatrix::empty(2, champs(&["a", "b", "c", "d"]));
        matrix.record(&duo_match("m1", &[("a", "b"), ("c", "d")], &[1, 2])).unwrap();

        let [a, b, c, d]: [Champion; 4] = champs(&["a", "b", "c", "d"]).try_into().unwrap();
        assert_eq!(matrix.cell(&a, &b, 1), 1);
        assert_eq!(matrix.cell(&b, &a, 1), 1);
        assert_eq!(matrix.cell(&c, &d, 2), 1);
        assert_eq!(matrix.cell(&d, &c, 2), 1);
        assert_eq!(matrix.total(), 4);
        assert_eq!(matrix.cell(&a, &b, 2), 0);
        assert_eq!(matrix.cell(&a, &c, 1), 0);
    }

    #[test]
    fn test_symmetry_and_conservation() {
        let names = ["ahri", "jinx", "lux", "sett", "vi", "zed", "yuumi", "leona"];
        let mut matrix = PlacementMatrix::empty(4, champs(&names));
        let matches = [
            duo_match("1", &[("ahri", "jinx"), ("lux", "sett"), ("vi", "zed"), ("yuumi", "leona")], &[3, 1, 4, 2]),
            duo_match("2", &[("jinx", "ahri"), ("zed", "lux"), ("sett", "vi"), ("leona", "yuumi")], &[1, 2, 3, 4]),
            duo_match("3", &[("ahri", "zed"), ("lux", "yuumi"), ("vi", "jinx"), ("sett", "leona")], &[2, 4, 1, 3]),
        ];
        for m in &matches {
            matrix.record(m).unwrap();
        }

        for a in matrix.champions() {
            for b in matrix.champions() {
                for p in 1..=4 {
                    assert_eq!(matrix.cell(a, b, p), matrix.cell(b, a, p));
                }
            }
        }
        assert_eq!(matrix.total(), 2 * 4 * matches.len() as u64);

        // ahri appears in one team slot per match
        let ahri = matrix.index_of(&Champion::of("ahri")).unwrap();
        assert_eq!(matrix.row_at(ahri).iter().sum::<u64>(), 3);
        assert_eq!(matrix.cell(&Champion::of("ahri"), &Champion::of("jinx"), 1), 1);
        assert_eq!(matrix.cell(&Champion::of("ahri"), &Champion::of("jinx"), 3), 1);
    }

    #[test]
    fn test_record_is_all_or_nothing() {
        let mut matrix = PlacementMatrix::empty(2, champs(&["a", "b", "c"]));
        let before = matrix.clone();

        let result = matrix.record(&duo_match("m", &[("a", "b"), ("c", "x")], &[1, 2]));
        assert!(matches!(result, Err(StoreError::UnknownChampion(name)) if name == "x"));
        assert_eq!(matrix, before);

        let result = matrix.record(&duo_match("m", &[("a", "b")], &[1]));
        assert!(matches!(result, Err(StoreError::TeamCountMismatch { expected: 2, found: 1, .. })));
        assert_eq!(matrix, before);
    }

    #[test]
    fn test_insert_champion_keeps_sorted_order_and_counts() {
        let mut matrix = PlacementMatrix::empty(2, champs(&["ahri", "lux", "zed", "vi"]));
        matrix.record(&duo_match("m", &[("ahri", "zed"), ("lux", "vi")], &[2, 1])).unwrap();
        let before = matrix.clone();

        let at = matrix.insert_champion(Champion::of("jinx")).unwrap();

        assert_eq!(at, 1);
        let names: Vec<&str> = matrix.champions().iter().map(Champion::name).collect();
        assert_eq!(names, ["ahri", "jinx", "lux", "vi", "zed"]);
        for a in before.champions() {
            for b in before.champions() {
                for p in 1..=2 {
                    assert_eq!(matrix.cell(a, b, p), before.cell(a, b, p));
                }
            }
        }
        let jinx = matrix.index_of(&Champion::of("jinx")).unwrap();
        assert!(matrix.row_at(jinx).iter().all(|&c| c == 0));
        assert_eq!(matrix.total(), before.total());
        assert_eq!(
            &matrix.header()[..5],
            &["champion_names", "ahri_1", "ahri_2", "jinx_1", "jinx_2"]
        );
    }

    #[test]
    fn test_insert_existing_champion_fails() {
        let mut matrix = PlacementMatrix::empty(4, champs(&["ahri"]));
        assert!(matches!(
            matrix.insert_champion(Champion::of("Ahri")),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_table_round_trip_and_shape_checks() {
        let roster = champs(&["a", "b", "c", "d"]);
        let mut matrix = PlacementMatrix::empty(2, roster.clone());
        matrix.record(&duo_match("m", &[("a", "c"), ("b", "d")], &[2, 1])).unwrap();

        let table = matrix.to_table();
        assert_eq!(table[0].len(), 4 * 2 + 1);
        assert_eq!(PlacementMatrix::from_table(&table, 2, &roster, "t").unwrap(), matrix);

        let shorter_roster = champs(&["a", "b", "c"]);
        assert!(matches!(
            PlacementMatrix::from_table(&table, 2, &shorter_roster, "t"),
            Err(StoreError::ShapeMismatch(_))
        ));
        assert!(matches!(
            PlacementMatrix::from_table(&table, 4, &roster, "t"),
            Err(StoreError::ShapeMismatch(_))
        ));

        let mut negative = table.clone();
        negative[1][1] = "-1".to_string();
        assert!(matches!(
            PlacementMatrix::from_table(&negative, 2, &roster, "t"),
            Err(StoreError::Parse { .. })
        ));

        let mut repeated_row = table.clone();
        repeated_row.insert(2, repeated_row[1].clone());
        assert!(matches!(
            PlacementMatrix::from_table(&repeated_row, 2, &roster, "t"),
            Err(StoreError::ShapeMismatch(_))
        ));

        let mut swapped = table;
        swapped.swap(1, 2);
        assert!(matches!(
            PlacementMatrix::from_table(&swapped, 2, &roster, "t"),
            Err(StoreError::ShapeMismatch(_))
        ));
    }
}
