use std::path::Path;

use anyhow::Result;

use crate::config::AppConfig;
use crate::data::{generate_sample_history, load_configured_history, write_history_file};
use crate::models::Outcome;
use crate::services::Forecaster;
use crate::utils::{format_percent, probability_to_odds, suggest_teams};

fn load_and_train(config: &AppConfig) -> Result<Forecaster> {
    let history = load_configured_history(config)?;
    Ok(Forecaster::build(history, config).0)
}

pub fn train(config: &AppConfig) -> Result<()> {
    println!("🧠 Training on {}...", config.data_path.display());

    let history = load_configured_history(config)?;
    let (_, report) = Forecaster::build(history, config);

    if !report.trained {
        println!(
            "📭 Not enough data to train: {} matches (need at least {})",
            report.total_rows,
            crate::services::MIN_TRAINING_ROWS
        );
        return Ok(());
    }

    println!("✅ Model trained with accuracy: {:.2}", report.accuracy);
    println!(
        "   Train rows: {} | Test rows: {}",
        report.train_rows, report.test_rows
    );
    println!(
        "   Outcomes in history: Home {} | Draw {} | Away {}",
        report.label_counts[0], report.label_counts[1], report.label_counts[2]
    );

    Ok(())
}

pub fn predict(config: &AppConfig, home_team: &str, away_team: &str, neutral: bool) -> Result<()> {
    let forecaster = load_and_train(config)?;

    for team in [home_team, away_team] {
        if forecaster.team_profile(team).is_none() {
            println!("⚠️  '{}' not in history, using default profile", team);
        }
    }

    let response = forecaster.predict(home_team, away_team, !neutral);
    let p = response.prediction;

    println!("🔮 {} vs {}{}:", response.home_team, response.away_team, if neutral { " (neutral)" } else { "" });
    println!(
        "   Home win: {} | Draw: {} | Away win: {}",
        format_percent(p.home_win),
        format_percent(p.draw),
        format_percent(p.away_win)
    );
    println!(
        "   Fair odds: {:.2} | {:.2} | {:.2}",
        probability_to_odds(p.home_win),
        probability_to_odds(p.draw),
        probability_to_odds(p.away_win)
    );
    println!("   Confidence: {}", format_percent(p.confidence));

    let verdict = match p.most_likely() {
        Outcome::HomeWin => response.home_team.as_str(),
        Outcome::Draw => "Draw",
        Outcome::AwayWin => response.away_team.as_str(),
    };
    println!("   Most likely: {}", verdict);

    if !forecaster.predictor().is_trained() {
        println!("💡 Model is untrained, showing the no-knowledge prior.");
    }

    Ok(())
}

pub fn query_team(config: &AppConfig, team_name: &str) -> Result<()> {
    let history = load_configured_history(config)?;
    let profiles = crate::services::aggregate(&history);

    println!("🔍 Searching for team: {}", team_name);

    let Some(profile) = profiles.get(team_name) else {
        println!("❌ No team named '{}'", team_name);

        let ids = profiles.team_ids();
        let suggestions = suggest_teams(team_name, &ids, 5);
        if !suggestions.is_empty() {
            println!("\n💡 Did you mean:");
            for name in suggestions {
                println!("   • {}", name);
            }
        }
        return Ok(());
    };

    println!("📊 Team Details:");
    println!("   Home win rate: {}", format_percent(profile.home_win_rate));
    println!("   Away win rate: {}", format_percent(profile.away_win_rate));
    println!("   Avg goals scored: {:.2}", profile.avg_goals_scored);

    println!("\n📅 Recent Matches:");
    let recent: Vec<_> = history
        .iter()
        .rev()
        .filter(|m| m.home_team == team_name || m.away_team == team_name)
        .take(5)
        .collect();

    for m in recent {
        let is_home = m.home_team == team_name;
        let (opponent, scored, conceded) = if is_home {
            (&m.away_team, m.home_goals, m.away_goals)
        } else {
            (&m.home_team, m.away_goals, m.home_goals)
        };
        let result = if scored > conceded {
            "W"
        } else if scored < conceded {
            "L"
        } else {
            "D"
        };
        let venue = if is_home { "vs" } else { "at" };

        println!(
            "   {} {} {} ({}-{}) {}",
            m.date.format("%Y-%m-%d"),
            venue,
            opponent,
            m.home_goals,
            m.away_goals,
            result
        );
    }

    Ok(())
}

pub fn list_teams(config: &AppConfig) -> Result<()> {
    let history = load_configured_history(config)?;
    let profiles = crate::services::aggregate(&history);

    if profiles.is_empty() {
        println!("📭 No teams found in {}", config.data_path.display());
        return Ok(());
    }

    println!("🏆 {} teams:\n", profiles.len());
    for (team, profile) in profiles.iter() {
        println!(
            "   • {:<24} home {} | away {} | goals {:.2}",
            team,
            format_percent(profile.home_win_rate),
            format_percent(profile.away_win_rate),
            profile.avg_goals_scored
        );
    }

    Ok(())
}

pub fn recent_matches(config: &AppConfig, limit: usize) -> Result<()> {
    let history = load_configured_history(config)?;
    let recent = crate::data::recent_matches(&history, limit);

    if recent.is_empty() {
        println!("📭 No matches found");
        return Ok(());
    }

    println!("📅 Last {} matches:\n", recent.len());
    for m in recent {
        println!(
            "   {} {} {}-{} {}",
            m.date.format("%Y-%m-%d"),
            m.home_team,
            m.home_goals,
            m.away_goals,
            m.away_team
        );
    }

    Ok(())
}

pub fn write_sample(output: &Path, count: usize, seed: u64) -> Result<()> {
    let history = generate_sample_history(count, seed)?;
    write_history_file(output, &history)?;
    println!("✅ Wrote {} synthetic matches to {}", history.len(), output.display());
    Ok(())
}
