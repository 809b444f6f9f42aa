pub mod decode;
pub mod error;
pub mod fields;
pub mod locator;
pub mod sections;

use crate::domain::report::{ParsedReport, Report};
use sections::{EXECUTIVE_SUMMARY, PRICE_PREDICTION, RISK_ASSESSMENT};

/// Extracts every known field from one report.
///
/// A missing section only blanks the fields it would have produced.
pub fn parse_report(report: &Report, max_key_points: usize) -> ParsedReport {
    let sections = sections::extract_sections(&report.text);
    tracing::debug!(
        version = report.version,
        sections = sections.len(),
        "extracted report sections"
    );

    for name in [EXECUTIVE_SUMMARY, PRICE_PREDICTION, RISK_ASSESSMENT] {
        if sections.get(name).is_none() {
            tracing::debug!(
                version = report.version,
                path = %report.path.display(),
                section = name,
                "section missing"
            );
        }
    }

    let prediction = sections
        .get(PRICE_PREDICTION)
        .map(fields::parse_price_prediction)
        .unwrap_or_default();

    let key_points = sections
        .get(EXECUTIVE_SUMMARY)
        .map(|s| fields::parse_key_points(s, max_key_points))
        .unwrap_or_default();

    let risk_level = sections
        .get(RISK_ASSESSMENT)
        .and_then(fields::parse_risk_level);

    ParsedReport {
        version: report.version,
        date: report.date,
        stock_name: sections::extract_stock_name(&report.text),
        prediction,
        key_points,
        risk_level,
    }
}

pub fn parse_reports(reports: &[Report], max_key_points: usize) -> Vec<ParsedReport> {
    reports
        .iter()
        .map(|r| parse_report(r, max_key_points))
        .collect()
}
