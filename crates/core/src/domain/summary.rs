use super::report::{Direction, Price, RiskLevel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregated, chronologically ordered view over every report of one stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub report_count: usize,
    pub latest_date: Option<NaiveDate>,
    pub price_rows: Vec<PriceRow>,
    pub viewpoints: Vec<ViewpointEntry>,
    pub risk_rows: Vec<RiskRow>,
    pub trend: Option<Trend>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.report_count == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRow {
    pub version: u32,
    pub date: NaiveDate,
    pub target_price: Option<Price>,
    pub current_price: Option<Price>,
    pub direction: Direction,
    pub time_range: Option<String>,
    /// Percent move of the target against the last earlier report that had one.
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewpointEntry {
    pub version: u32,
    pub date: NaiveDate,
    /// First key point, the report's headline view.
    pub key_viewpoint: Option<String>,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRow {
    pub version: u32,
    pub date: NaiveDate,
    pub level: Option<RiskLevel>,
    pub movement: Option<RiskMovement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskMovement {
    Raised,
    Lowered,
    Unchanged,
}

impl RiskMovement {
    pub fn between(prev: RiskLevel, next: RiskLevel) -> Self {
        match next.cmp(&prev) {
            std::cmp::Ordering::Greater => RiskMovement::Raised,
            std::cmp::Ordering::Less => RiskMovement::Lowered,
            std::cmp::Ordering::Equal => RiskMovement::Unchanged,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskMovement::Raised => "上升",
            RiskMovement::Lowered => "下降",
            RiskMovement::Unchanged => "持平",
        }
    }
}

/// First-vs-last comparison; only present when there are at least two reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trend {
    pub direction: Option<DirectionTrend>,
    pub target_price: Option<TargetPriceTrend>,
    pub risk: Option<RiskTrend>,
}

impl Trend {
    pub fn is_empty(&self) -> bool {
        self.direction.is_none() && self.target_price.is_none() && self.risk.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionTrend {
    pub first: Direction,
    pub last: Direction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPriceTrend {
    pub first: Price,
    pub last: Price,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskTrend {
    pub first: RiskLevel,
    pub last: RiskLevel,
}
