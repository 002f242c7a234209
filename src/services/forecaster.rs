use crate::config::AppConfig;
use crate::data::recent_matches;
use crate::models::{MatchRecord, PredictResponse, TeamProfile, TrainingReport};
use crate::services::{aggregate, OutcomePredictor, TeamProfiles};

/// History, derived profile table and trained predictor, kept together so a
/// retrain swaps all three at once.
pub struct Forecaster {
    history: Vec<MatchRecord>,
    profiles: TeamProfiles,
    predictor: OutcomePredictor,
}

impl Forecaster {
    /// Aggregate `history` once and train once on it.
    pub fn build(history: Vec<MatchRecord>, config: &AppConfig) -> (Self, TrainingReport) {
        let profiles = aggregate(&history);
        let mut predictor =
            OutcomePredictor::with_forest(config.forest_config()).with_test_fraction(config.test_fraction);
        let report = predictor.train_with_report(&history, &profiles);

        tracing::info!(
            "Model trained with accuracy: {:.2} ({} teams, {} matches)",
            report.accuracy,
            profiles.len(),
            history.len()
        );

        (
            Self {
                history,
                profiles,
                predictor,
            },
            report,
        )
    }

    /// No history, untrained model.
    pub fn empty() -> Self {
        Self {
            history: Vec::new(),
            profiles: TeamProfiles::new(),
            predictor: OutcomePredictor::new(),
        }
    }

    pub fn teams(&self) -> Vec<String> {
        self.profiles.team_ids()
    }

    pub fn team_profile(&self, team: &str) -> Option<&TeamProfile> {
        self.profiles.get(team)
    }

    pub fn recent_matches(&self, n: usize) -> &[MatchRecord] {
        recent_matches(&self.history, n)
    }

    pub fn predictor(&self) -> &OutcomePredictor {
        &self.predictor
    }

    /// Unknown teams fall back to their role default.
    pub fn predict(&self, home_team: &str, away_team: &str, home_advantage: bool) -> PredictResponse {
        PredictResponse {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            prediction: self
                .predictor
                .predict_fixture(&self.profiles, home_team, away_team, home_advantage),
        }
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_sample_history;
    use crate::models::Prediction;

    #[test]
    fn test_empty_forecaster() {
        let f = Forecaster::empty();
        assert!(f.teams().is_empty());
        assert!(f.team_profile("Team A").is_none());
        assert_eq!(f.predict("Team A", "Team B", true).prediction, Prediction::FALLBACK);
    }

    #[test]
    fn test_build_from_sample() {
        let history = generate_sample_history(100, 42).unwrap();
        let (f, report) = Forecaster::build(history, &AppConfig::default());

        assert!(report.trained);
        assert_eq!(report.total_rows, 100);
        assert_eq!(report.test_rows, 20);
        assert_eq!(f.teams().len(), 5);
        assert_eq!(f.recent_matches(10).len(), 10);

        let response = f.predict("Team A", "Somewhere FC", true);
        assert_eq!(response.away_team, "Somewhere FC");
        let p = response.prediction;
        assert!((p.home_win + p.draw + p.away_win - 1.0).abs() < 1e-6);
    }
}
