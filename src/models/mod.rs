use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One finished fixture from the match history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl MatchRecord {
    pub fn new(
        date: NaiveDate,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home_goals: u32,
        away_goals: u32,
    ) -> Self {
        Self {
            date,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_goals,
            away_goals,
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_goals(self.home_goals, self.away_goals)
    }
}

/// Per-team summary derived from the match history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub home_win_rate: f64,
    pub away_win_rate: f64,
    pub avg_goals_scored: f64,
}

impl TeamProfile {
    /// Stand-in for an unknown team playing at home.
    pub const HOME_DEFAULT: TeamProfile = TeamProfile {
        home_win_rate: 0.5,
        away_win_rate: 0.3,
        avg_goals_scored: 1.5,
    };

    /// Stand-in for an unknown team playing away.
    pub const AWAY_DEFAULT: TeamProfile = TeamProfile {
        home_win_rate: 0.4,
        away_win_rate: 0.3,
        avg_goals_scored: 1.2,
    };
}

/// Match result class. The discriminants are the training label encoding and
/// the slot order of every probability vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    HomeWin = 0,
    Draw = 1,
    AwayWin = 2,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin];

    pub fn from_goals(home_goals: u32, away_goals: u32) -> Self {
        match home_goals.cmp(&away_goals) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::AwayWin,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Outcome::ALL.get(index).copied()
    }
}

/// Ordered model input:
/// `[home_win_rate, away_win_rate, avg_goals_home, avg_goals_away, home_advantage]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector(pub [f64; FeatureVector::LEN]);

impl FeatureVector {
    pub const LEN: usize = 5;

    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }
}

/// Three-way outcome distribution for a single fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub confidence: f64,
}

impl Prediction {
    /// Returned while no model has been trained.
    pub const FALLBACK: Prediction = Prediction {
        home_win: 0.33,
        draw: 0.33,
        away_win: 0.34,
        confidence: 0.5,
    };

    pub fn probabilities(&self) -> [f64; 3] {
        [self.home_win, self.draw, self.away_win]
    }

    pub fn most_likely(&self) -> Outcome {
        let probs = self.probabilities();
        let mut best = 0;
        for (i, p) in probs.iter().enumerate() {
            if *p > probs[best] {
                best = i;
            }
        }
        Outcome::ALL[best]
    }
}

/// Summary of one training call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub trained: bool,
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Label counts over the full history, in `Outcome` order.
    pub label_counts: [usize; 3],
}

// API request/response types

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_advantage: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub home_team: String,
    pub away_team: String,
    pub prediction: Prediction,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
