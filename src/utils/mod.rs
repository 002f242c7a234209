use crate::models::Outcome;

/// Convert probability to fair decimal odds
pub fn probability_to_odds(probability: f64) -> f64 {
    if probability <= 0.0 || probability >= 1.0 {
        return 1000.0; // Very high odds for impossible/certain events
    }
    1.0 / probability
}

/// Normalize probabilities to sum to 1.0
pub fn normalize_probabilities(probs: Vec<f64>) -> Vec<f64> {
    let sum: f64 = probs.iter().sum();
    if sum == 0.0 {
        return probs;
    }
    probs.iter().map(|p| p / sum).collect()
}

/// Fraction of predictions that match the true label exactly.
/// A missing prediction counts as wrong.
pub fn accuracy_score(truth: &[Outcome], predicted: &[Option<Outcome>]) -> f64 {
    let total = truth.len().min(predicted.len());
    if total == 0 {
        return 0.0;
    }

    let correct = truth
        .iter()
        .zip(predicted.iter())
        .filter(|(t, p)| p.as_ref() == Some(*t))
        .count();

    correct as f64 / total as f64
}

/// Validate team name format
pub fn validate_team_name(name: &str) -> bool {
    !name.trim().is_empty() && name.len() <= 100
}

/// Closest known team names to `query`, best first.
pub fn suggest_teams<'a, I>(query: &str, teams: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let query = query.to_lowercase();
    let mut scored: Vec<(f64, &String)> = teams
        .into_iter()
        .map(|team| (strsim::jaro_winkler(&query, &team.to_lowercase()), team))
        .filter(|(score, _)| *score >= 0.7)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(limit).map(|(_, t)| t.clone()).collect()
}

/// Format a probability as a percentage string
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_to_odds() {
        assert_eq!(probability_to_odds(0.5), 2.0);
        assert_eq!(probability_to_odds(0.25), 4.0);
        assert!(probability_to_odds(0.0) > 100.0);
    }

    #[test]
    fn test_normalize_probabilities() {
        let probs = vec![0.4, 0.3, 0.2];
        let normalized = normalize_probabilities(probs);
        let sum: f64 = normalized.iter().sum();
        assert!((sum - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_accuracy_score() {
        let truth = [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin, Outcome::Draw];
        let predicted = [
            Some(Outcome::HomeWin),
            Some(Outcome::AwayWin),
            Some(Outcome::AwayWin),
            None,
        ];
        assert_eq!(accuracy_score(&truth, &predicted), 0.5);
        assert_eq!(accuracy_score(&[], &[]), 0.0);
    }

    #[test]
    fn test_validate_team_name() {
        assert!(validate_team_name("Arsenal"));
        assert!(!validate_team_name("   "));
        assert!(!validate_team_name(&"x".repeat(101)));
    }

    #[test]
    fn test_suggest_teams() {
        let teams = vec![
            "Man City".to_string(),
            "Man United".to_string(),
            "Arsenal".to_string(),
        ];
        let suggestions = suggest_teams("man utd", &teams, 2);
        assert_eq!(suggestions.first().map(String::as_str), Some("Man United"));
        assert!(!suggestions.contains(&"Arsenal".to_string()));
    }
}
