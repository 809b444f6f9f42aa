use crate::domain::report::{ParsedReport, Price, RiskLevel};
use crate::domain::summary::{
    DirectionTrend, PriceRow, RiskMovement, RiskRow, RiskTrend, Summary, TargetPriceTrend, Trend,
    ViewpointEntry,
};

/// Builds the comparison tables for one stock.
///
/// Reports are re-sorted by version and date first, so the caller's order
/// does not matter.
pub fn aggregate(stock_code: &str, reports: &[ParsedReport]) -> Summary {
    let mut ordered: Vec<&ParsedReport> = reports.iter().collect();
    ordered.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.date.cmp(&b.date)));

    Summary {
        stock_code: stock_code.to_string(),
        stock_name: ordered.first().and_then(|r| r.stock_name.clone()),
        report_count: ordered.len(),
        latest_date: ordered.iter().map(|r| r.date).max(),
        price_rows: price_rows(&ordered),
        viewpoints: ordered
            .iter()
            .map(|r| ViewpointEntry {
                version: r.version,
                date: r.date,
                key_viewpoint: r.key_viewpoint().map(str::to_string),
                key_points: r.key_points.clone(),
            })
            .collect(),
        risk_rows: risk_rows(&ordered),
        trend: trend(&ordered),
    }
}

fn price_rows(ordered: &[&ParsedReport]) -> Vec<PriceRow> {
    let mut prev_target: Option<&Price> = None;
    let mut rows = Vec::with_capacity(ordered.len());

    for r in ordered {
        let p = &r.prediction;
        let change_pct = match (prev_target, p.target_price.as_ref()) {
            (Some(prev), Some(cur)) => price_change_pct(prev.value, cur.value),
            _ => None,
        };

        rows.push(PriceRow {
            version: r.version,
            date: r.date,
            target_price: p.target_price.clone(),
            current_price: p.current_price.clone(),
            direction: p.direction,
            time_range: p.time_range.clone(),
            change_pct,
        });

        if let Some(t) = p.target_price.as_ref() {
            prev_target = Some(t);
        }
    }

    rows
}

fn risk_rows(ordered: &[&ParsedReport]) -> Vec<RiskRow> {
    let mut prev: Option<RiskLevel> = None;
    ordered
        .iter()
        .map(|r| {
            let movement = match (prev, r.risk_level) {
                (Some(p), Some(cur)) => Some(RiskMovement::between(p, cur)),
                _ => None,
            };
            if r.risk_level.is_some() {
                prev = r.risk_level;
            }
            RiskRow {
                version: r.version,
                date: r.date,
                level: r.risk_level,
                movement,
            }
        })
        .collect()
}

fn trend(ordered: &[&ParsedReport]) -> Option<Trend> {
    if ordered.len() < 2 {
        return None;
    }
    let first = ordered.first()?;
    let last = ordered.last()?;

    let direction = (first.prediction.direction.is_known()
        && last.prediction.direction.is_known())
    .then(|| DirectionTrend {
        first: first.prediction.direction,
        last: last.prediction.direction,
    });

    let target_price = match (
        first.prediction.target_price.as_ref(),
        last.prediction.target_price.as_ref(),
    ) {
        (Some(a), Some(b)) => price_change_pct(a.value, b.value).map(|change_pct| TargetPriceTrend {
            first: a.clone(),
            last: b.clone(),
            change_pct,
        }),
        _ => None,
    };

    let risk = match (first.risk_level, last.risk_level) {
        (Some(a), Some(b)) => Some(RiskTrend { first: a, last: b }),
        _ => None,
    };

    Some(Trend {
        direction,
        target_price,
        risk,
    })
}

/// Percent move from `from` to `to`; `None` when `from` is zero.
pub fn price_change_pct(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    let pct = (to - from) / from * 100.0;
    pct.is_finite().then_some(pct)
}

/// `+12.50%`, `-3.00%`, `0.00%`.
pub fn format_change_pct(pct: f64) -> String {
    let sign = if pct > 0.0 { "+" } else { "" };
    format!("{sign}{pct:.2}%")
}
