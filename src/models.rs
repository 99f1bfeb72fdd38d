// src/models.rs

use chrono::NaiveDate;
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

use crate::error::TrainlogError;

/// A player account. Passwords are stored as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum LogType {
    #[default]
    Daily,
    /// Present in the schema, not offered by the `log` command by default.
    Tactical,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Daily => "daily",
            LogType::Tactical => "tactical",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = TrainlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(LogType::Daily),
            "tactical" => Ok(LogType::Tactical),
            other => Err(TrainlogError::InvalidInput(format!("Unknown log type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Location {
    #[default]
    Outdoor,
    Indoor,
    Home,
    Other,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Outdoor => "outdoor",
            Location::Indoor => "indoor",
            Location::Home => "home",
            Location::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Location::Outdoor => "Outdoor field",
            Location::Indoor => "Indoor field",
            Location::Home => "Home",
            Location::Other => "Other",
        }
    }

    /// Unrecognised stored values fall back to the default, like an unset form field.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "outdoor" => Location::Outdoor,
            "indoor" => Location::Indoor,
            "home" => Location::Home,
            "other" => Location::Other,
            _ => Location::default(),
        }
    }
}

/// Five-step scale shared by intensity and satisfaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Level {
    Highest,
    High,
    #[default]
    Medium,
    Low,
    Lowest,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Highest => "highest",
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
            Level::Lowest => "lowest",
        }
    }

    pub fn from_stored(s: &str) -> Self {
        match s {
            "highest" => Level::Highest,
            "high" => Level::High,
            "medium" => Level::Medium,
            "low" => Level::Low,
            "lowest" => Level::Lowest,
            _ => Level::default(),
        }
    }
}

/// One training session entry, unique per (username, date, log_type).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingLog {
    pub username: String,
    pub date: NaiveDate,
    pub log_type: LogType,
    pub duration: i64,
    pub location: Location,
    pub intensity: Level,
    pub satisfaction: Level,
    pub gudan_content: String,
    pub p_swing: i64,
    pub p_live: i64,
    pub p_defense: i64,
    pub p_pitching: i64,
    pub p_running: i64,
    pub p_hanging: i64,
    pub p_etc: String,
    pub coach_feedback: String,
    pub self_good: String,
    pub self_bad: String,
    pub promise: String,
    pub memo: String,
    pub tactical_image: String,
}

impl TrainingLog {
    /// An empty entry with the same defaults a fresh form starts from.
    pub fn new(username: &str, date: NaiveDate, log_type: LogType) -> Self {
        Self {
            username: username.to_string(),
            date,
            log_type,
            duration: 0,
            location: Location::default(),
            intensity: Level::default(),
            satisfaction: Level::default(),
            gudan_content: String::new(),
            p_swing: 0,
            p_live: 0,
            p_defense: 0,
            p_pitching: 0,
            p_running: 0,
            p_hanging: 0,
            p_etc: String::new(),
            coach_feedback: String::new(),
            self_good: String::new(),
            self_bad: String::new(),
            promise: String::new(),
            memo: String::new(),
            tactical_image: String::new(),
        }
    }

    pub fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn metric(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Duration => self.duration,
            Metric::Swing => self.p_swing,
            Metric::Live => self.p_live,
            Metric::Defense => self.p_defense,
            Metric::Pitching => self.p_pitching,
            Metric::Running => self.p_running,
            Metric::Hanging => self.p_hanging,
        }
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::GudanContent => &self.gudan_content,
            TextField::Etc => &self.p_etc,
            TextField::CoachFeedback => &self.coach_feedback,
            TextField::SelfGood => &self.self_good,
            TextField::SelfBad => &self.self_bad,
            TextField::Promise => &self.promise,
            TextField::Memo => &self.memo,
        }
    }

    pub fn set_text(&mut self, field: TextField, value: String) {
        let slot = match field {
            TextField::GudanContent => &mut self.gudan_content,
            TextField::Etc => &mut self.p_etc,
            TextField::CoachFeedback => &mut self.coach_feedback,
            TextField::SelfGood => &mut self.self_good,
            TextField::SelfBad => &mut self.self_bad,
            TextField::Promise => &mut self.promise,
            TextField::Memo => &mut self.memo,
        };
        *slot = value;
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(s: &str) -> crate::error::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
        TrainlogError::InvalidInput(format!("Invalid date '{}'. Use YYYY-MM-DD.", s))
    })
}

/// Numeric fields the dashboard can chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Metric {
    #[default]
    Duration,
    Swing,
    Live,
    Defense,
    Pitching,
    Running,
    Hanging,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Duration,
        Metric::Swing,
        Metric::Live,
        Metric::Defense,
        Metric::Pitching,
        Metric::Running,
        Metric::Hanging,
    ];

    /// Column name in `training_logs`.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Duration => "duration",
            Metric::Swing => "p_swing",
            Metric::Live => "p_live",
            Metric::Defense => "p_defense",
            Metric::Pitching => "p_pitching",
            Metric::Running => "p_running",
            Metric::Hanging => "p_hanging",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Duration => "Total training time",
            Metric::Swing => "Practice swings",
            Metric::Live => "Live batting",
            Metric::Defense => "Defense drills",
            Metric::Pitching => "Pitching",
            Metric::Running => "Running",
            Metric::Hanging => "Bar hanging",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Swing => "reps",
            Metric::Pitching => "pitches",
            _ => "min",
        }
    }
}

/// Free-text fields editable through `trainlog note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextField {
    GudanContent,
    Etc,
    CoachFeedback,
    SelfGood,
    SelfBad,
    Promise,
    Memo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stored_enums_fall_back_to_defaults() {
        assert_eq!(Location::from_stored("stadium"), Location::Outdoor);
        assert_eq!(Level::from_stored(""), Level::Medium);
        assert_eq!(Level::from_stored("lowest"), Level::Lowest);
    }

    #[test]
    fn log_type_parses_stored_names() {
        assert_eq!("daily".parse::<LogType>().unwrap(), LogType::Daily);
        assert_eq!("tactical".parse::<LogType>().unwrap(), LogType::Tactical);
        assert!("weekly".parse::<LogType>().is_err());
    }

    #[test]
    fn metric_accessor_matches_column() {
        let mut log = TrainingLog::new("kim", parse_date("2024-06-03").unwrap(), LogType::Daily);
        log.p_swing = 50;
        log.p_hanging = 3;
        assert_eq!(log.metric(Metric::Swing), 50);
        assert_eq!(log.metric(Metric::Hanging), 3);
        assert_eq!(log.metric(Metric::Duration), 0);
        assert_eq!(Metric::Swing.column(), "p_swing");
    }

    #[test]
    fn set_text_targets_one_field() {
        let mut log = TrainingLog::new("kim", parse_date("2024-06-03").unwrap(), LogType::Daily);
        log.set_text(TextField::CoachFeedback, "Keep your elbow up".to_string());
        assert_eq!(log.text(TextField::CoachFeedback), "Keep your elbow up");
        assert_eq!(log.text(TextField::Memo), "");
    }

    #[test]
    fn parse_date_rejects_bad_format() {
        assert!(parse_date("2024/06/03").is_err());
        assert_eq!(parse_date(" 2024-06-03 ").unwrap().to_string(), "2024-06-03");
    }
}
