use std::fmt;

/// Raw names the API emits that belong to an already known champion.
/// Nunu is reported both as "Nunu" and as "Nunu & Willump".
const ALIASES: &[(&str, &str)] = &[("nunu", "nunu&willump")];

/// Canonical identity of a playable champion: the lowercase name with
/// whitespace removed and known aliases folded together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Champion(String);

impl Champion {
    pub fn of(raw_name: &str) -> Self {
        let name: String = raw_name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match ALIASES.iter().find(|(alias, _)| *alias == name) {
            Some((_, canonical)) => Champion((*canonical).to_string()),
            None => Champion(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Champion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_spaces() {
        assert_eq!(Champion::of("Miss Fortune").name(), "missfortune");
        assert_eq!(Champion::of("KSante"), Champion::of("ksante"));
    }

    #[test]
    fn test_nunu_aliases_resolve_to_one_champion() {
        assert_eq!(Champion::of("nunu"), Champion::of("nunu&willump"));
        assert_eq!(Champion::of("Nunu").name(), "nunu&willump");
        assert_eq!(Champion::of("Nunu & Willump").name(), "nunu&willump");
    }

    #[test]
    fn test_ordering_is_by_name() {
        let mut champions = vec![Champion::of("Zed"), Champion::of("Ahri"), Champion::of("Lux")];
        champions.sort();
        let names: Vec<&str> = champions.iter().map(Champion::name).collect();
        assert_eq!(names, ["ahri", "lux", "zed"]);
    }
}
