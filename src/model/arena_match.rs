use std::fmt;

use crate::api::models::{MatchDto, ParticipantDto};
use crate::error::MalformedPayload;

use super::champion::Champion;

pub type MatchId = String;
pub type PlayerId = String;

/// A duo. Identity does not depend on order, but the order is kept so the
/// store can update both directions of the pairing.
#[derive(Debug, Clone)]
pub struct Team {
    champions: [Champion; 2],
}

impl Team {
    pub fn new(first: Champion, second: Champion) -> Self {
        Team {
            champions: [first, second],
        }
    }

    pub fn first(&self) -> &Champion {
        &self.champions[0]
    }

    pub fn second(&self) -> &Champion {
        &self.champions[1]
    }

    pub fn champions(&self) -> &[Champion; 2] {
        &self.champions
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        (self.first() == other.first() && self.second() == other.second())
            || (self.first() == other.second() && self.second() == other.first())
    }
}

impl Eq for Team {}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.first(), self.second())
    }
}

/// One finished Arena game: every duo with its final placement.
#[derive(Debug, Clone)]
pub struct Match {
    id: MatchId,
    teams: Vec<Team>,
    scoreboard: Vec<usize>,
}

impl Match {
    /// Builds a match from typed parts. `scoreboard[i]` is the placement of
    /// `teams[i]` and must be a permutation of `1..=teams.len()`.
    pub fn new(id: impl Into<MatchId>, teams: Vec<Team>, scoreboard: Vec<usize>) -> Result<Self, MalformedPayload> {
        check_scoreboard(&scoreboard, teams.len())?;
        Ok(Match {
            id: id.into(),
            teams,
            scoreboard,
        })
    }

    pub fn from_payload(raw: &MatchDto) -> Result<Self, MalformedPayload> {
        let participants = &raw.info.participants;
        if participants.is_empty() {
            return Err(MalformedPayload::NoParticipants);
        }
        if participants.len() % 2 != 0 {
            return Err(MalformedPayload::OddParticipantCount(participants.len()));
        }

        let team_count = participants.len() / 2;
        let mut slots: Vec<Vec<&ParticipantDto>> = vec![Vec::with_capacity(2); team_count];
        for participant in participants {
            let id = participant.player_subteam_id;
            if id < 1 || id as usize > team_count {
                return Err(MalformedPayload::SubteamOutOfRange { id, team_count });
            }
            slots[id as usize - 1].push(participant);
        }

        let mut teams = Vec::with_capacity(team_count);
        let mut placements = Vec::with_capacity(team_count);
        for (index, slot) in slots.iter().enumerate() {
            let id = index + 1;
            let [first, second] = slot.as_slice() else {
                return Err(MalformedPayload::WrongTeamSize { id, count: slot.len() });
            };
            if first.placement != second.placement {
                return Err(MalformedPayload::ConflictingPlacement { id });
            }

            let team = Team::new(Champion::of(&first.champion_name), Champion::of(&second.champion_name));
            if team.first() == team.second() {
                return Err(MalformedPayload::DuplicateChampion { id });
            }
            teams.push(team);
            placements.push(first.placement);
        }

        let scoreboard = placements
            .iter()
            .map(|&p| usize::try_from(p).ok().filter(|&p| p >= 1 && p <= team_count))
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(|| MalformedPayload::InvalidScoreboard(placements.clone()))?;

        Match::new(raw.metadata.match_id.clone(), teams, scoreboard)
            .map_err(|_| MalformedPayload::InvalidScoreboard(placements))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    #[cfg(test)]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    #[cfg(test)]
    pub fn scoreboard(&self) -> &[usize] {
        &self.scoreboard
    }

    /// Each team paired with its placement.
    pub fn standings(&self) -> impl Iterator<Item = (&Team, usize)> {
        self.teams.iter().zip(self.scoreboard.iter().copied())
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match({}", self.id)?;
        for (team, placement) in self.standings() {
            write!(f, ", #{} {}", placement, team)?;
        }
        write!(f, ")")
    }
}

fn check_scoreboard(scoreboard: &[usize], team_count: usize) -> Result<(), MalformedPayload> {
    let mut seen = vec![false; team_count];
    let valid = scoreboard.len() == team_count
        && scoreboard.iter().all(|&placement| {
            placement >= 1 && placement <= team_count && !std::mem::replace(&mut seen[placement - 1], true)
        });

    if valid {
        Ok(())
    } else {
        Err(MalformedPayload::InvalidScoreboard(
            scoreboard.iter().map(|&p| p as i64).collect(),
        ))
    }
}
