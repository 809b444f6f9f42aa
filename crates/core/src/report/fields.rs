//! Best-effort field extraction from section bodies.
//!
//! Labels may be wrapped in Markdown bold and followed by a half- or
//! full-width colon: `目標價格: 150`, `**目標價格**：1,200 元`. Anything that
//! does not match yields `None` / [`Direction::Unknown`].

use crate::domain::report::{Direction, Price, PricePrediction, RiskLevel};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_MAX_KEY_POINTS: usize = 5;

const LABEL_SEP: &str = r"(?:\*\*)?\s*[:：]\s*(?:\*\*)?\s*";
const NUMBER: &str = r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?";

static RE_TARGET: Lazy<Regex> = Lazy::new(|| price_regex("目標價格"));
static RE_CURRENT: Lazy<Regex> = Lazy::new(|| price_regex("當前價格"));
static RE_DIRECTION: Lazy<Regex> = Lazy::new(|| value_regex("預測方向"));
static RE_TIME_RANGE: Lazy<Regex> = Lazy::new(|| value_regex("時間範圍"));
static RE_OVERALL_RISK: Lazy<Regex> = Lazy::new(|| line_value_regex("整體風險等級"));
static RE_RISK: Lazy<Regex> = Lazy::new(|| line_value_regex("風險等級"));
static RE_BULLET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)、])\s+(?P<v>.+)$").expect("bullet regex")
});

fn price_regex(label: &str) -> Regex {
    Regex::new(&format!(
        r"{label}{LABEL_SEP}(?P<prefix>(?:[A-Z]{{1,3}})?[$¥€£])?\s*(?P<num>{NUMBER})(?P<rest>[^\n]*)"
    ))
    .expect("price regex")
}

fn value_regex(label: &str) -> Regex {
    Regex::new(&format!(r"{label}{LABEL_SEP}(?P<v>[^\n]+)")).expect("value regex")
}

/// Label at the start of a line or bullet, so `市場風險等級` never matches `風險等級`.
fn line_value_regex(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?m)^\s*(?:[-*+]\s*)?(?:\*\*)?{label}{LABEL_SEP}(?P<v>[^\n]+)"
    ))
    .expect("line value regex")
}

pub fn parse_price_prediction(section: &str) -> PricePrediction {
    let target_price = parse_target_price(section);
    let current_price = parse_current_price(section);

    let explicit = RE_DIRECTION
        .captures(section)
        .map(|c| parse_direction(&c["v"]))
        .unwrap_or_default();
    let direction = if explicit.is_known() {
        explicit
    } else {
        derive_direction(target_price.as_ref(), current_price.as_ref())
    };

    let time_range = RE_TIME_RANGE
        .captures(section)
        .and_then(|c| clean_inline(&c["v"]));

    PricePrediction {
        target_price,
        current_price,
        direction,
        time_range,
    }
}

pub fn parse_target_price(section: &str) -> Option<Price> {
    parse_price(&RE_TARGET, section)
}

pub fn parse_current_price(section: &str) -> Option<Price> {
    parse_price(&RE_CURRENT, section)
}

fn parse_price(re: &Regex, section: &str) -> Option<Price> {
    let caps = re.captures(section)?;
    let num = caps.name("num")?.as_str();
    let value = num.replace(',', "").parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }

    let prefix = caps.name("prefix").map(|m| m.as_str()).unwrap_or("");
    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
    if is_malformed_tail(rest) {
        return None;
    }

    Some(Price {
        value,
        text: format!("{prefix}{num}"),
        unit: unit_after_number(rest),
    })
}

/// `1,2000` matches as `1,200` followed by `0`; such numbers are unparsable.
fn is_malformed_tail(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some(',' | '.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn is_unit_char(c: char) -> bool {
    !c.is_whitespace()
        && !c.is_ascii_digit()
        && !matches!(
            c,
            '.' | ',' | '，' | '、' | ';' | '；' | '。' | ':' | '：' | '|' | '*' | '(' | ')' | '（'
                | '）'
        )
}

/// `" 元，預計..."` -> `元`; `", 當前價格: 120"` -> none.
fn unit_after_number(rest: &str) -> Option<String> {
    let rest = rest.trim_start();
    let end = rest
        .char_indices()
        .find(|&(_, c)| !is_unit_char(c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let unit = &rest[..end];
    if unit.is_empty() {
        return None;
    }

    // A token followed by a colon is the next label, not a unit.
    let after = rest[end..].trim_start_matches(|c: char| c.is_whitespace() || c == '*');
    if after.starts_with(':') || after.starts_with('：') {
        return None;
    }

    Some(unit.to_string())
}

const UP_WORDS: &[&str] = &["看漲", "上漲", "看多", "bullish", "up"];
const DOWN_WORDS: &[&str] = &["看跌", "下跌", "看空", "bearish", "down"];
const FLAT_WORDS: &[&str] = &["中性", "持平", "盤整", "neutral", "flat"];

/// Maps a direction value to [`Direction`]; the keyword that appears first wins.
pub fn parse_direction(value: &str) -> Direction {
    let lower = value.to_lowercase();
    let mut best: Option<(usize, Direction)> = None;

    for (words, dir) in [
        (UP_WORDS, Direction::Up),
        (DOWN_WORDS, Direction::Down),
        (FLAT_WORDS, Direction::Flat),
    ] {
        for word in words {
            if let Some(pos) = find_keyword(&lower, word) {
                if best.map_or(true, |(p, _)| pos < p) {
                    best = Some((pos, dir));
                }
            }
        }
    }

    best.map(|(_, d)| d).unwrap_or(Direction::Unknown)
}

// ASCII keywords must stand alone so `up` does not match `upside`.
fn find_keyword(haystack: &str, word: &str) -> Option<usize> {
    if !word.is_ascii() {
        return haystack.find(word);
    }

    haystack.match_indices(word).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

pub fn derive_direction(target: Option<&Price>, current: Option<&Price>) -> Direction {
    match (target, current) {
        (Some(t), Some(c)) => match t.value.partial_cmp(&c.value) {
            Some(std::cmp::Ordering::Greater) => Direction::Up,
            Some(std::cmp::Ordering::Less) => Direction::Down,
            Some(std::cmp::Ordering::Equal) => Direction::Flat,
            None => Direction::Unknown,
        },
        _ => Direction::Unknown,
    }
}

/// Overall rating (`整體風險等級`); a bare `風險等級` line is used only when it is absent.
pub fn parse_risk_level(section: &str) -> Option<RiskLevel> {
    let caps = RE_OVERALL_RISK
        .captures(section)
        .or_else(|| RE_RISK.captures(section))?;
    classify_risk(&caps["v"])
}

fn classify_risk(value: &str) -> Option<RiskLevel> {
    let value = value.trim_start_matches(|c: char| c.is_whitespace() || c == '*');
    let run: String = value
        .chars()
        .take_while(|c| matches!(c, '低' | '中' | '高'))
        .collect();

    match run.as_str() {
        "低" => return Some(RiskLevel::Low),
        "中低" => return Some(RiskLevel::MediumLow),
        "中" => return Some(RiskLevel::Medium),
        "中高" => return Some(RiskLevel::MediumHigh),
        "高" => return Some(RiskLevel::High),
        "" => {}
        _ => return None,
    }

    let norm = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
    // Longest names first so `medium-high` is not read as `medium`.
    [
        ("medium-high", RiskLevel::MediumHigh),
        ("medium-low", RiskLevel::MediumLow),
        ("medium", RiskLevel::Medium),
        ("low", RiskLevel::Low),
        ("high", RiskLevel::High),
    ]
    .into_iter()
    .find(|(name, _)| norm.starts_with(name))
    .map(|(_, level)| level)
}

/// Bullet items of the executive summary, capped at `max`.
///
/// Falls back to the first sentence of the first plain paragraph line when
/// the section has no bullets.
pub fn parse_key_points(section: &str, max: usize) -> Vec<String> {
    let bullets: Vec<String> = section
        .lines()
        .filter_map(|line| RE_BULLET.captures(line))
        .filter_map(|c| clean_inline(&c["v"]))
        .take(max)
        .collect();

    if !bullets.is_empty() || max == 0 {
        return bullets;
    }

    section
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with(['#', '|', '>', '-']))
        .and_then(|l| clean_inline(first_sentence(l)))
        .into_iter()
        .collect()
}

fn first_sentence(line: &str) -> &str {
    match line.char_indices().find(|&(_, c)| matches!(c, '。' | '！' | '？')) {
        Some((i, c)) => &line[..i + c.len_utf8()],
        None => line,
    }
}

fn clean_inline(s: &str) -> Option<String> {
    let cleaned = s.replace("**", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
