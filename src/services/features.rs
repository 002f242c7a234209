use crate::models::{FeatureVector, MatchRecord, Outcome, TeamProfile};
use crate::services::TeamProfiles;

impl FeatureVector {
    /// Home rate and scoring come from `home`, away rate and scoring from `away`.
    pub fn from_profiles(home: &TeamProfile, away: &TeamProfile, home_advantage: bool) -> Self {
        FeatureVector([
            home.home_win_rate,
            away.away_win_rate,
            home.avg_goals_scored,
            away.avg_goals_scored,
            if home_advantage { 1.0 } else { 0.0 },
        ])
    }
}

/// One feature vector and label per history row. Teams missing from
/// `profiles` get their role default; historical rows count as home-advantaged.
pub fn build_training_set(
    history: &[MatchRecord],
    profiles: &TeamProfiles,
) -> (Vec<FeatureVector>, Vec<Outcome>) {
    history
        .iter()
        .map(|record| {
            let home = profiles.home_profile(&record.home_team);
            let away = profiles.away_profile(&record.away_team);
            (
                FeatureVector::from_profiles(&home, &away, true),
                record.outcome(),
            )
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregate;
    use chrono::NaiveDate;

    #[test]
    fn test_feature_layout() {
        let home = TeamProfile {
            home_win_rate: 0.7,
            away_win_rate: 0.1,
            avg_goals_scored: 2.0,
        };
        let away = TeamProfile {
            home_win_rate: 0.2,
            away_win_rate: 0.4,
            avg_goals_scored: 0.9,
        };
        let fv = FeatureVector::from_profiles(&home, &away, true);
        assert_eq!(fv.0, [0.7, 0.4, 2.0, 0.9, 1.0]);

        let neutral = FeatureVector::from_profiles(&home, &away, false);
        assert_eq!(neutral.get(4), 0.0);
    }

    #[test]
    fn test_training_set_uses_role_defaults() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let history = vec![MatchRecord::new(date, "Leeds", "Hull", 0, 1)];
        let (features, labels) = build_training_set(&history, &TeamProfiles::new());

        assert_eq!(labels, vec![Outcome::AwayWin]);
        assert_eq!(features[0].0, [0.5, 0.3, 1.5, 1.2, 1.0]);
    }

    #[test]
    fn test_training_set_uses_profiles() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let history = vec![
            MatchRecord::new(date, "Leeds", "Hull", 2, 2),
            MatchRecord::new(date, "Hull", "Leeds", 3, 0),
        ];
        let profiles = aggregate(&history);
        let (features, labels) = build_training_set(&history, &profiles);

        assert_eq!(labels, vec![Outcome::Draw, Outcome::HomeWin]);
        let leeds = profiles.get("Leeds").unwrap();
        let hull = profiles.get("Hull").unwrap();
        assert_eq!(features[0].get(0), leeds.home_win_rate);
        assert_eq!(features[0].get(1), hull.away_win_rate);
        assert_eq!(features[0].get(2), leeds.avg_goals_scored);
        assert_eq!(features[0].get(3), hull.avg_goals_scored);
    }
}
