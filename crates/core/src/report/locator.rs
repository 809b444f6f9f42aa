use crate::config::Settings;
use crate::domain::report::Report;
use crate::report::decode::decode_report_bytes;
use crate::report::error::StockDirNotFound;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use encoding_rs::UTF_8;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

pub const RESEARCH_DIR: &str = "research";

static RE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"v(\d+)").expect("version regex"));
static RE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("date regex"));

pub trait ReportSource {
    /// Where the summary for `stock_code` is written.
    fn stock_dir(&self, stock_code: &str) -> PathBuf;

    /// All reports for `stock_code`, in chronological order.
    fn load_reports(&self, stock_code: &str) -> Result<Vec<Report>>;
}

/// Reads `<stocks_dir>/<code>/research/v*.md`.
#[derive(Debug, Clone)]
pub struct FsReportSource {
    stocks_dir: PathBuf,
}

impl FsReportSource {
    pub fn new(stocks_dir: impl Into<PathBuf>) -> Self {
        Self {
            stocks_dir: stocks_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.stocks_dir())
    }

    pub fn stocks_dir(&self) -> &Path {
        &self.stocks_dir
    }

    fn read_report(
        &self,
        stock_code: &str,
        path: PathBuf,
        version: u32,
        date: NaiveDate,
    ) -> Report {
        let text = match std::fs::read(&path) {
            Ok(bytes) => {
                let decoded = decode_report_bytes(&bytes);
                if decoded.encoding != UTF_8 || decoded.lossy {
                    tracing::warn!(
                        path = %path.display(),
                        encoding = decoded.encoding.name(),
                        lossy = decoded.lossy,
                        "report is not clean UTF-8; decoded best-effort"
                    );
                }
                decoded.text
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read report; treating as empty"
                );
                String::new()
            }
        };

        Report {
            stock_code: stock_code.to_string(),
            version,
            date,
            path,
            text,
        }
    }
}

impl ReportSource for FsReportSource {
    fn stock_dir(&self, stock_code: &str) -> PathBuf {
        self.stocks_dir.join(stock_code)
    }

    fn load_reports(&self, stock_code: &str) -> Result<Vec<Report>> {
        let stock_dir = self.stock_dir(stock_code);
        if !stock_dir.is_dir() {
            return Err(StockDirNotFound {
                stock_code: stock_code.to_string(),
                path: stock_dir,
            }
            .into());
        }

        let research_dir = stock_dir.join(RESEARCH_DIR);
        if !research_dir.is_dir() {
            tracing::info!(stock_code, path = %research_dir.display(), "no research directory");
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&research_dir)
            .with_context(|| format!("failed to list {}", research_dir.display()))?;

        let mut reports = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to list {}", research_dir.display()))?;
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_report_file_name(file_name) || !path.is_file() {
                continue;
            }

            match parse_report_file_name(file_name) {
                Ok((version, date)) => {
                    reports.push(self.read_report(stock_code, path, version, date));
                }
                Err(reason) => {
                    tracing::warn!(path = %path.display(), reason, "skipping report file");
                }
            }
        }

        sort_chronologically(&mut reports);
        tracing::info!(stock_code, reports = reports.len(), "located research reports");
        Ok(reports)
    }
}

/// `v*.md`
pub fn is_report_file_name(name: &str) -> bool {
    name.starts_with('v') && name.ends_with(".md")
}

/// `v003_2024-06-30.md` -> `(3, 2024-06-30)`; the error names what is wrong.
pub fn parse_report_file_name(name: &str) -> Result<(u32, NaiveDate), &'static str> {
    let version = RE_VERSION
        .captures(name)
        .map(|c| c[1].to_string())
        .ok_or("file name has no version number")?;
    let version = version
        .parse::<u32>()
        .map_err(|_| "version number is out of range")?;

    let date = RE_DATE
        .captures(name)
        .map(|c| c[1].to_string())
        .ok_or("file name has no research date")?;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| "research date is not a valid calendar date")?;

    Ok((version, date))
}

/// Version, then research date, then path; directory order is never trusted.
pub fn sort_chronologically(reports: &mut [Report]) {
    reports.sort_by(|a, b| {
        a.version
            .cmp(&b.version)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.path.cmp(&b.path))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &[u8]) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn parses_version_and_date_from_file_name() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(parse_report_file_name("v003_2024-06-30.md"), Ok((3, d)));
        assert_eq!(parse_report_file_name("v12-2024-06-30-draft.md"), Ok((12, d)));
        assert_eq!(
            parse_report_file_name("v003.md"),
            Err("file name has no research date")
        );
        assert_eq!(
            parse_report_file_name("v003_2024-13-40.md"),
            Err("research date is not a valid calendar date")
        );
        assert_eq!(
            parse_report_file_name("notes_2024-06-30.md"),
            Err("file name has no version number")
        );
    }

    #[test]
    fn oversized_version_is_reported_as_out_of_range() {
        assert_eq!(
            parse_report_file_name("v99999999999_2024-06-30.md"),
            Err("version number is out of range")
        );
    }

    #[test]
    fn matches_only_v_markdown_files() {
        assert!(is_report_file_name("v001_2024-01-01.md"));
        assert!(!is_report_file_name("V001_2024-01-01.md"));
        assert!(!is_report_file_name("v001_2024-01-01.txt"));
        assert!(!is_report_file_name("summary.md"));
    }

    #[test]
    fn loads_reports_in_version_order() {
        let tmp = tempfile::tempdir().unwrap();
        let research = tmp.path().join("2330").join(RESEARCH_DIR);
        fs::create_dir_all(&research).unwrap();
        write(&research, "v10_2024-09-01.md", b"ten");
        write(&research, "v2_2024-03-01.md", b"two");
        write(&research, "v001_2024-01-01.md", b"one");
        write(&research, "v005.md", b"no date");
        write(&research, "readme.md", b"ignored");

        let source = FsReportSource::new(tmp.path());
        let reports = source.load_reports("2330").unwrap();

        let versions: Vec<u32> = reports.iter().map(|r| r.version).collect();
        assert_eq!(versions, vec![1, 2, 10]);
        assert_eq!(reports[0].text, "one");
        assert_eq!(reports[2].stock_code, "2330");
    }

    #[test]
    fn missing_research_dir_is_empty_not_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("AAPL")).unwrap();

        let source = FsReportSource::new(tmp.path());
        assert!(source.load_reports("AAPL").unwrap().is_empty());
    }

    #[test]
    fn missing_stock_dir_is_typed_error() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FsReportSource::new(tmp.path());

        let err = source.load_reports("NOPE").unwrap_err();
        let typed = err.downcast_ref::<StockDirNotFound>().unwrap();
        assert_eq!(typed.stock_code, "NOPE");
    }

    #[test]
    fn sort_breaks_version_ties_by_date() {
        let mk = |version, day, name: &str| Report {
            stock_code: "X".to_string(),
            version,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            path: PathBuf::from(name),
            text: String::new(),
        };
        let mut reports = vec![mk(2, 5, "b"), mk(1, 9, "a"), mk(2, 3, "c")];
        sort_chronologically(&mut reports);

        let order: Vec<_> = reports.iter().map(|r| r.path.to_str().unwrap()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
    }
}
