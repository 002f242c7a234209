use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{MatchRecord, TeamProfile};

/// Rate reported for a venue the team has never played at.
const UNPLAYED_VENUE_RATE: f64 = 0.5;

#[derive(Debug, Default, Clone, Copy)]
struct VenueTally {
    games: u32,
    wins: u32,
    goals: u64,
}

impl VenueTally {
    fn record(&mut self, scored: u32, conceded: u32) {
        self.games += 1;
        self.goals += u64::from(scored);
        if scored > conceded {
            self.wins += 1;
        }
    }

    fn win_rate(&self) -> f64 {
        if self.games == 0 {
            UNPLAYED_VENUE_RATE
        } else {
            self.wins as f64 / self.games as f64
        }
    }

    fn mean_goals(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.goals as f64 / self.games as f64
        }
    }
}

/// Team id to profile table produced by [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TeamProfiles(BTreeMap<String, TeamProfile>);

impl TeamProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookup. `None` means the team never appeared in the history.
    pub fn get(&self, team: &str) -> Option<&TeamProfile> {
        self.0.get(team)
    }

    /// Profile used when `team` plays at home, or the home-role default.
    pub fn home_profile(&self, team: &str) -> TeamProfile {
        self.get(team).copied().unwrap_or(TeamProfile::HOME_DEFAULT)
    }

    /// Profile used when `team` plays away, or the away-role default.
    pub fn away_profile(&self, team: &str) -> TeamProfile {
        self.get(team).copied().unwrap_or(TeamProfile::AWAY_DEFAULT)
    }

    /// Team ids in sorted order.
    pub fn team_ids(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TeamProfile)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TeamProfile)> for TeamProfiles {
    fn from_iter<I: IntoIterator<Item = (String, TeamProfile)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build a profile for every team appearing in `history`.
///
/// `avg_goals_scored` is the unweighted mean of the home and away scoring
/// averages, with an unplayed venue contributing 0. For teams with very
/// uneven home/away counts this differs from the overall goals-per-game.
pub fn aggregate(history: &[MatchRecord]) -> TeamProfiles {
    let mut tallies: BTreeMap<&str, (VenueTally, VenueTally)> = BTreeMap::new();

    for record in history {
        tallies
            .entry(record.home_team.as_str())
            .or_default()
            .0
            .record(record.home_goals, record.away_goals);
        tallies
            .entry(record.away_team.as_str())
            .or_default()
            .1
            .record(record.away_goals, record.home_goals);
    }

    tallies
        .into_iter()
        .map(|(team, (home, away))| {
            let profile = TeamProfile {
                home_win_rate: home.win_rate(),
                away_win_rate: away.win_rate(),
                avg_goals_scored: (home.mean_goals() + away.mean_goals()) / 2.0,
            };
            (team.to_string(), profile)
        })
        .collect()
}
