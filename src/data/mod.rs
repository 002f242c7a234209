pub mod sample;

pub use sample::generate_sample_history;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Writer};

use crate::config::AppConfig;
use crate::error::DataFormatError;
use crate::models::MatchRecord;

pub const DATE_COLUMN: &str = "Date";
pub const HOME_TEAM_COLUMN: &str = "HomeTeam";
pub const AWAY_TEAM_COLUMN: &str = "AwayTeam";
pub const HOME_GOALS_COLUMN: &str = "FTHG";
pub const AWAY_GOALS_COLUMN: &str = "FTAG";

// Two-digit years first: `%Y` would also accept "24" as the year 24.
const DATE_FORMATS: [&str; 3] = ["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d"];
const WRITE_DATE_FORMAT: &str = "%d/%m/%Y";
const SAMPLE_SIZE: usize = 100;
const SAMPLE_SEED: u64 = 42;

struct Columns {
    date: usize,
    home_team: usize,
    away_team: usize,
    home_goals: usize,
    away_goals: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, DataFormatError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(DataFormatError::MissingColumn(name))
        };
        Ok(Self {
            date: find(DATE_COLUMN)?,
            home_team: find(HOME_TEAM_COLUMN)?,
            away_team: find(AWAY_TEAM_COLUMN)?,
            home_goals: find(HOME_GOALS_COLUMN)?,
            away_goals: find(AWAY_GOALS_COLUMN)?,
        })
    }
}

fn field<'r>(
    record: &'r StringRecord,
    index: usize,
    row: usize,
    column: &'static str,
) -> Result<&'r str, DataFormatError> {
    match record.get(index).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DataFormatError::MissingField { row, column }),
    }
}

/// Parse a match date in any of the accepted layouts.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn parse_goals(value: &str, row: usize, column: &'static str) -> Result<u32, DataFormatError> {
    value.parse().map_err(|_| DataFormatError::InvalidGoals {
        row,
        column,
        value: value.to_string(),
    })
}

/// Parse a football-data style CSV (`Date,HomeTeam,AwayTeam,FTHG,FTAG`, extra
/// columns ignored) into a history sorted by date. Same-day fixtures keep
/// their file order.
pub fn parse_history<R: Read>(reader: R) -> Result<Vec<MatchRecord>, DataFormatError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::locate(reader.headers()?)?;
    let mut history = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;

        let raw_date = field(&record, columns.date, row, DATE_COLUMN)?;
        let date = parse_date(raw_date).ok_or_else(|| DataFormatError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;

        history.push(MatchRecord {
            date,
            home_team: field(&record, columns.home_team, row, HOME_TEAM_COLUMN)?.to_string(),
            away_team: field(&record, columns.away_team, row, AWAY_TEAM_COLUMN)?.to_string(),
            home_goals: parse_goals(
                field(&record, columns.home_goals, row, HOME_GOALS_COLUMN)?,
                row,
                HOME_GOALS_COLUMN,
            )?,
            away_goals: parse_goals(
                field(&record, columns.away_goals, row, AWAY_GOALS_COLUMN)?,
                row,
                AWAY_GOALS_COLUMN,
            )?,
        });
    }

    history.sort_by_key(|m| m.date);
    Ok(history)
}

pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<MatchRecord>, DataFormatError> {
    let file = File::open(path.as_ref())?;
    parse_history(file)
}

pub fn write_history<W: Write>(writer: W, history: &[MatchRecord]) -> Result<(), DataFormatError> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record([
        DATE_COLUMN,
        HOME_TEAM_COLUMN,
        AWAY_TEAM_COLUMN,
        HOME_GOALS_COLUMN,
        AWAY_GOALS_COLUMN,
    ])?;

    for m in history {
        writer.write_record([
            m.date.format(WRITE_DATE_FORMAT).to_string(),
            m.home_team.clone(),
            m.away_team.clone(),
            m.home_goals.to_string(),
            m.away_goals.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_history_file(
    path: impl AsRef<Path>,
    history: &[MatchRecord],
) -> Result<(), DataFormatError> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_history(File::create(path.as_ref())?, history)
}

/// Last `n` rows of the history.
pub fn recent_matches(history: &[MatchRecord], n: usize) -> &[MatchRecord] {
    &history[history.len().saturating_sub(n)..]
}

/// Load the configured history. When `sample_fallback` is on, a missing or
/// malformed file is replaced by a synthetic history instead of failing.
pub fn load_configured_history(config: &AppConfig) -> anyhow::Result<Vec<MatchRecord>> {
    match load_history(&config.data_path) {
        Ok(history) => {
            tracing::info!(
                "Loaded {} matches from {}",
                history.len(),
                config.data_path.display()
            );
            Ok(history)
        }
        Err(e) if config.sample_fallback => {
            tracing::warn!(
                "Could not load {} ({}), using a synthetic sample history",
                config.data_path.display(),
                e
            );
            generate_sample_history(SAMPLE_SIZE, SAMPLE_SEED)
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("loading match history from {}", config.data_path.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Div,Date,HomeTeam,AwayTeam,FTHG,FTAG,FTR
E0,12/08/2023,Burnley,Man City,0,3,A
E0,11/08/2023,Arsenal,Forest,2,1,H
E0,12/08/2023,Everton,Fulham,0,1,A
";

    #[test]
    fn test_parse_sorts_by_date() {
        let history = parse_history(CSV.as_bytes()).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].home_team, "Arsenal");
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2023, 8, 11).unwrap());
        // same date keeps file order
        assert_eq!(history[1].home_team, "Burnley");
        assert_eq!(history[2].home_team, "Everton");
        assert_eq!(history[1].away_goals, 3);
    }

    #[test]
    fn test_missing_column() {
        let err = parse_history("Date,HomeTeam,AwayTeam,FTHG\n01/01/2024,A,B,1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DataFormatError::MissingColumn("FTAG")));
    }

    #[test]
    fn test_bad_date() {
        let err = parse_history("Date,HomeTeam,AwayTeam,FTHG,FTAG\nyesterday,A,B,1,0\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DataFormatError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn test_negative_goals() {
        let csv = "Date,HomeTeam,AwayTeam,FTHG,FTAG\n01/01/2024,A,B,1,0\n02/01/2024,B,A,-1,0\n";
        let err = parse_history(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataFormatError::InvalidGoals { row: 2, column: "FTHG", .. }
        ));
    }

    #[test]
    fn test_empty_team() {
        let csv = "Date,HomeTeam,AwayTeam,FTHG,FTAG\n01/01/2024, ,B,1,0\n";
        let err = parse_history(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataFormatError::MissingField { row: 1, column: "HomeTeam" }
        ));
    }

    #[test]
    fn test_alternate_date_formats() {
        assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("29/02/24"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("31/02/2024"), None);
    }

    #[test]
    fn test_write_then_parse() {
        let history = parse_history(CSV.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_history(&mut buf, &history).unwrap();
        assert_eq!(parse_history(buf.as_slice()).unwrap(), history);
    }

    #[test]
    fn test_recent_matches() {
        let history = parse_history(CSV.as_bytes()).unwrap();
        assert_eq!(recent_matches(&history, 2).len(), 2);
        assert_eq!(recent_matches(&history, 2)[1].home_team, "Everton");
        assert_eq!(recent_matches(&history, 10).len(), 3);
        assert!(recent_matches(&[], 5).is_empty());
    }

    #[test]
    fn test_configured_fallback() {
        let config = AppConfig {
            data_path: "/nonexistent/matches.csv".into(),
            sample_fallback: true,
            ..AppConfig::default()
        };
        assert_eq!(load_configured_history(&config).unwrap().len(), SAMPLE_SIZE);

        let strict = AppConfig {
            sample_fallback: false,
            ..config
        };
        assert!(load_configured_history(&strict).is_err());
    }
}
