use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One research note as found on disk, before any parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub stock_code: String,
    pub version: u32,
    pub date: NaiveDate,
    pub path: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedReport {
    pub version: u32,
    pub date: NaiveDate,
    pub stock_name: Option<String>,
    pub prediction: PricePrediction,
    pub key_points: Vec<String>,
    pub risk_level: Option<RiskLevel>,
}

/// `v001`, `v012`, ... as shown in summary tables.
pub fn version_label(version: u32) -> String {
    format!("v{version:03}")
}

impl ParsedReport {
    pub fn key_viewpoint(&self) -> Option<&str> {
        self.key_points.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    pub target_price: Option<Price>,
    pub current_price: Option<Price>,
    pub direction: Direction,
    pub time_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub value: f64,
    /// Number as written in the report, e.g. `1,200.5`.
    pub text: String,
    pub unit: Option<String>,
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} {}", self.text, unit),
            None => f.write_str(&self.text),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Flat,
    #[default]
    Unknown,
}

impl Direction {
    pub fn is_known(self) -> bool {
        self != Direction::Unknown
    }

    pub fn label(self) -> Option<&'static str> {
        match self {
            Direction::Up => Some("看漲"),
            Direction::Down => Some("看跌"),
            Direction::Flat => Some("中性"),
            Direction::Unknown => None,
        }
    }
}

/// Ordinal risk rating; variants are declared low to high so `Ord` follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    MediumLow,
    Medium,
    MediumHigh,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "低",
            RiskLevel::MediumLow => "中低",
            RiskLevel::Medium => "中",
            RiskLevel::MediumHigh => "中高",
            RiskLevel::High => "高",
        }
    }
}
