use std::collections::BTreeMap;

pub const EXECUTIVE_SUMMARY: &str = "執行摘要";
pub const PRICE_PREDICTION: &str = "定價預測";
pub const RISK_ASSESSMENT: &str = "風險評估";

/// Level-2 (`## `) sections of a report, keyed by heading text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    inner: BTreeMap<String, String>,
}

impl Sections {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Splits report text on `## ` headings.
///
/// Text before the first heading is dropped. A repeated heading keeps the
/// later body. Never fails: text with no headings simply has no sections.
pub fn extract_sections(text: &str) -> Sections {
    let mut inner = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some(name) = current.take() {
                inner.insert(name, body.join("\n").trim().to_string());
            }
            current = Some(heading.trim().to_string());
            body.clear();
        } else if current.is_some() {
            body.push(line);
        }
    }

    if let Some(name) = current {
        inner.insert(name, body.join("\n").trim().to_string());
    }

    Sections { inner }
}

/// Stock name from the level-1 title, e.g. `# 2330 台積電 研究報告` -> `台積電`.
pub fn extract_stock_name(text: &str) -> Option<String> {
    let title = text.lines().find_map(|l| l.strip_prefix("# "))?;
    title.split_whitespace().nth(1).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "# 2330 台積電 研究報告\n\
intro line\n\
## 執行摘要\n\
- 先進製程需求強勁\n\
\n\
## 定價預測\n\
目標價格：1,200 元\n\
### 細節\n\
當前價格：1,000 元\n\
## 風險評估\n\
整體風險等級：中\n";

    #[test]
    fn splits_on_level_two_headings() {
        let s = extract_sections(REPORT);
        assert_eq!(s.len(), 3);
        assert_eq!(s.get(EXECUTIVE_SUMMARY), Some("- 先進製程需求強勁"));
        assert_eq!(
            s.get(PRICE_PREDICTION),
            Some("目標價格：1,200 元\n### 細節\n當前價格：1,000 元")
        );
        assert_eq!(s.get(RISK_ASSESSMENT), Some("整體風險等級：中"));
    }

    #[test]
    fn text_without_headings_has_no_sections() {
        let s = extract_sections("目標價格: 150\n#not a heading\n##also not");
        assert!(s.is_empty());
    }

    #[test]
    fn repeated_heading_keeps_last_body() {
        let s = extract_sections("## 定價預測\nfirst\n## 定價預測\nsecond\n");
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(PRICE_PREDICTION), Some("second"));
    }

    #[test]
    fn handles_crlf_line_endings() {
        let s = extract_sections("## 風險評估\r\n整體風險等級：高\r\n");
        assert_eq!(s.get(RISK_ASSESSMENT), Some("整體風險等級：高"));
    }

    #[test]
    fn stock_name_comes_from_title() {
        assert_eq!(extract_stock_name(REPORT).as_deref(), Some("台積電"));
        assert_eq!(extract_stock_name("## 執行摘要\n"), None);
        assert_eq!(extract_stock_name("# AAPL\n"), None);
    }
}
