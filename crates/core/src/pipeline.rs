use crate::domain::summary::Summary;
use crate::report::fields::DEFAULT_MAX_KEY_POINTS;
use crate::report::locator::ReportSource;
use crate::summary::OutputFormat;
use anyhow::{ensure, Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub format: OutputFormat,
    /// Overrides the format's default file name.
    pub file_name: Option<String>,
    pub max_key_points: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            file_name: None,
            max_key_points: DEFAULT_MAX_KEY_POINTS,
        }
    }
}

impl GenerateOptions {
    pub fn file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .unwrap_or_else(|| self.format.default_file_name())
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedSummary {
    pub summary: Summary,
    pub content: String,
    pub output_path: PathBuf,
}

/// Locates, parses, aggregates and renders every report for one stock.
pub fn generate(
    source: &dyn ReportSource,
    stock_code: &str,
    opts: &GenerateOptions,
) -> Result<GeneratedSummary> {
    validate_stock_code(stock_code)?;
    let file_name = opts.file_name();
    ensure!(
        !file_name.trim().is_empty() && !file_name.contains(['/', '\\']),
        "output file name must be a plain file name (got {file_name:?})"
    );

    let reports = source.load_reports(stock_code)?;
    if reports.is_empty() {
        tracing::warn!(stock_code, "no research reports found");
    }

    let parsed = crate::report::parse_reports(&reports, opts.max_key_points);
    let summary = crate::summary::aggregate(stock_code, &parsed);
    let content = opts.format.render(&summary)?;

    Ok(GeneratedSummary {
        summary,
        content,
        output_path: source.stock_dir(stock_code).join(file_name),
    })
}

pub fn write_summary(generated: &GeneratedSummary) -> Result<()> {
    std::fs::write(&generated.output_path, &generated.content)
        .with_context(|| format!("failed to write {}", generated.output_path.display()))?;
    tracing::info!(
        path = %generated.output_path.display(),
        reports = generated.summary.report_count,
        bytes = generated.content.len(),
        "summary written"
    );
    Ok(())
}

fn validate_stock_code(stock_code: &str) -> Result<()> {
    let code = stock_code.trim();
    ensure!(!code.is_empty(), "stock code must be non-empty");
    ensure!(code == stock_code, "stock code must not have surrounding whitespace");
    ensure!(
        !code.contains(['/', '\\']) && code != "." && code != "..",
        "stock code must not be a path (got {stock_code:?})"
    );
    Ok(())
}
