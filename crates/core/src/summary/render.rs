use super::aggregate::format_change_pct;
use crate::domain::report::version_label;
use crate::domain::summary::{Summary, Trend};
use anyhow::Context;
use std::fmt::Write as _;

pub const NO_REPORTS: &str = "尚未有研究報告。";
const MISSING: &str = "-";
const NO_KEY_POINTS: &str = "（未提取到關鍵觀點）";
const FOOTER: &str = "*此摘要由自動化腳本生成，如有疑問請查閱原始研究報告。*";

/// Renders the summary as a Markdown document.
///
/// Output depends only on `summary`; there is no wall-clock timestamp, so
/// unchanged reports always render byte-identical text.
pub fn render_markdown(summary: &Summary) -> String {
    let mut out = String::new();

    if summary.is_empty() {
        let _ = writeln!(out, "# {} 研究對比摘要", summary.stock_code);
        out.push('\n');
        let _ = writeln!(out, "{NO_REPORTS}");
        return out;
    }

    render_header(&mut out, summary);
    render_price_table(&mut out, summary);
    render_viewpoints(&mut out, summary);
    render_risk_table(&mut out, summary);
    render_trend(&mut out, summary.trend.as_ref());

    out.push_str(FOOTER);
    out.push('\n');
    out
}

pub fn render_json(summary: &Summary) -> anyhow::Result<String> {
    let mut s = serde_json::to_string_pretty(summary).context("serialize summary failed")?;
    s.push('\n');
    Ok(s)
}

fn render_header(out: &mut String, summary: &Summary) {
    match summary.stock_name.as_deref() {
        Some(name) => {
            let _ = writeln!(out, "# {} {} 研究對比摘要", summary.stock_code, name);
        }
        None => {
            let _ = writeln!(out, "# {} 研究對比摘要", summary.stock_code);
        }
    }
    out.push('\n');
    if let Some(date) = summary.latest_date {
        let _ = writeln!(out, "> **最新研究日期**：{date}  ");
    }
    let _ = writeln!(out, "> **研究報告數量**：{} 份", summary.report_count);
    section_break(out);
}

fn render_price_table(out: &mut String, summary: &Summary) {
    out.push_str("## 價格預測變化\n\n");
    out.push_str("| 版本 | 研究日期 | 目標價格 | 當前價格 | 預測方向 | 時間範圍 | 變化幅度 |\n");
    out.push_str("|------|---------|---------|---------|---------|---------|---------|\n");

    for row in &summary.price_rows {
        let cells = [
            version_label(row.version),
            row.date.to_string(),
            or_missing(row.target_price.as_ref().map(|p| p.to_string())),
            or_missing(row.current_price.as_ref().map(|p| p.to_string())),
            or_missing(row.direction.label().map(str::to_string)),
            or_missing(row.time_range.clone()),
            or_missing(row.change_pct.map(format_change_pct)),
        ];
        push_row(out, &cells);
    }

    section_break(out);
}

fn render_viewpoints(out: &mut String, summary: &Summary) {
    out.push_str("## 關鍵觀點演變\n\n");

    for entry in &summary.viewpoints {
        let _ = writeln!(out, "### {} - {}", version_label(entry.version), entry.date);
        out.push('\n');
        if entry.key_points.is_empty() {
            let _ = writeln!(out, "- {NO_KEY_POINTS}");
        } else {
            for point in &entry.key_points {
                let _ = writeln!(out, "- {point}");
            }
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
}

fn render_risk_table(out: &mut String, summary: &Summary) {
    out.push_str("## 風險評估變化\n\n");
    out.push_str("| 版本 | 研究日期 | 風險等級 | 變化 |\n");
    out.push_str("|------|---------|---------|------|\n");

    for row in &summary.risk_rows {
        let cells = [
            version_label(row.version),
            row.date.to_string(),
            or_missing(row.level.map(|l| l.label().to_string())),
            or_missing(row.movement.map(|m| m.label().to_string())),
        ];
        push_row(out, &cells);
    }

    section_break(out);
}

fn render_trend(out: &mut String, trend: Option<&Trend>) {
    out.push_str("## 趨勢分析\n\n");

    let Some(trend) = trend else {
        out.push_str("需要至少兩份報告才能進行趨勢分析。\n\n");
        out.push_str("---\n\n");
        return;
    };

    if trend.is_empty() {
        out.push_str("現有報告缺少可比較的欄位，無法判斷趨勢。\n\n");
    }

    if let Some(d) = &trend.direction {
        // Both ends are known here; `label` only returns None for Unknown.
        let first = d.first.label().unwrap_or(MISSING);
        let last = d.last.label().unwrap_or(MISSING);
        if d.first != d.last {
            let _ = writeln!(out, "**預測方向變化**：從「{first}」轉為「{last}」");
        } else {
            let _ = writeln!(out, "**預測方向**：維持「{last}」");
        }
        out.push('\n');
    }

    if let Some(t) = &trend.target_price {
        let _ = writeln!(
            out,
            "**目標價格變化**：從 {} 到 {}（{}）",
            t.first,
            t.last,
            format_change_pct(t.change_pct)
        );
        out.push('\n');
    }

    if let Some(r) = &trend.risk {
        if r.first != r.last {
            let _ = writeln!(
                out,
                "**風險等級變化**：從「{}」轉為「{}」",
                r.first.label(),
                r.last.label()
            );
        } else {
            let _ = writeln!(out, "**風險等級**：維持「{}」", r.last.label());
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
}

fn section_break(out: &mut String) {
    out.push_str("\n---\n\n");
}

fn or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING.to_string())
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&escape_cell(cell));
        out.push_str(" |");
    }
    out.push('\n');
}

/// Keeps a cell on one line and stops `|` from splitting it.
fn escape_cell(cell: &str) -> String {
    cell.replace(['\r', '\n'], " ").replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{Direction, ParsedReport, Price, PricePrediction, RiskLevel};
    use crate::summary::aggregate::aggregate;
    use chrono::NaiveDate;

    fn price(text: &str, value: f64) -> Option<Price> {
        Some(Price {
            value,
            text: text.to_string(),
            unit: Some("元".to_string()),
        })
    }

    fn report(
        version: u32,
        target: Option<Price>,
        direction: Direction,
        risk: Option<RiskLevel>,
    ) -> ParsedReport {
        ParsedReport {
            version,
            date: NaiveDate::from_ymd_opt(2024, version, 1).unwrap(),
            stock_name: Some("台積電".to_string()),
            prediction: PricePrediction {
                target_price: target,
                current_price: price("1,000", 1000.0),
                direction,
                time_range: Some("12 個月".to_string()),
            },
            key_points: vec![format!("觀點 {version}")],
            risk_level: risk,
        }
    }

    #[test]
    fn empty_summary_says_no_reports() {
        let md = render_markdown(&aggregate("AAPL", &[]));
        assert_eq!(md, "# AAPL 研究對比摘要\n\n尚未有研究報告。\n");
    }

    #[test]
    fn renders_tables_in_chronological_order() {
        let summary = aggregate(
            "2330",
            &[
                report(2, price("1,320", 1320.0), Direction::Up, Some(RiskLevel::High)),
                report(1, price("1,200", 1200.0), Direction::Up, Some(RiskLevel::Medium)),
            ],
        );
        let md = render_markdown(&summary);

        assert!(md.starts_with("# 2330 台積電 研究對比摘要\n"));
        assert!(md.contains("> **最新研究日期**：2024-02-01  \n"));
        assert!(md.contains("> **研究報告數量**：2 份\n"));
        assert!(md.contains(
            "| v001 | 2024-01-01 | 1,200 元 | 1,000 元 | 看漲 | 12 個月 | - |\n\
             | v002 | 2024-02-01 | 1,320 元 | 1,000 元 | 看漲 | 12 個月 | +10.00% |\n"
        ));
        assert!(md.contains("| v001 | 2024-01-01 | 中 | - |\n| v002 | 2024-02-01 | 高 | 上升 |\n"));
        let first = md.find("### v001 - 2024-01-01").unwrap();
        let second = md.find("### v002 - 2024-02-01").unwrap();
        assert!(first < second);
        assert!(md.contains("**預測方向**：維持「看漲」"));
        assert!(md.contains("**目標價格變化**：從 1,200 元 到 1,320 元（+10.00%）"));
        assert!(md.contains("**風險等級變化**：從「中」轉為「高」"));
        assert!(md.ends_with(&format!("{FOOTER}\n")));
    }

    #[test]
    fn missing_values_render_as_dash() {
        let mut r = report(1, None, Direction::Unknown, None);
        r.prediction.current_price = None;
        r.prediction.time_range = None;
        r.key_points.clear();
        let md = render_markdown(&aggregate("2330", &[r]));

        assert!(md.contains("| v001 | 2024-01-01 | - | - | - | - | - |\n"));
        assert!(md.contains(&format!("- {NO_KEY_POINTS}\n")));
        assert!(md.contains("需要至少兩份報告才能進行趨勢分析。"));
    }

    #[test]
    fn cells_are_escaped() {
        assert_eq!(escape_cell("3|6 個月\n以上"), "3\\|6 個月 以上");
    }

    #[test]
    fn json_output_is_stable() {
        let summary = aggregate("2330", &[report(1, price("1,200", 1200.0), Direction::Up, None)]);
        let a = render_json(&summary).unwrap();
        let b = render_json(&summary).unwrap();
        assert_eq!(a, b);

        let v: serde_json::Value = serde_json::from_str(&a).unwrap();
        assert_eq!(v["stock_code"], "2330");
        assert_eq!(v["price_rows"][0]["direction"], "up");
        assert_eq!(v["price_rows"][0]["target_price"]["value"], 1200.0);
        assert_eq!(v["viewpoints"][0]["key_viewpoint"], "觀點 1");
    }
}
