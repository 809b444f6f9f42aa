pub mod aggregate;
pub mod render;

pub use aggregate::aggregate;
pub use render::{render_json, render_markdown};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn default_file_name(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "summary.md",
            OutputFormat::Json => "summary.json",
        }
    }

    pub fn render(self, summary: &crate::domain::summary::Summary) -> anyhow::Result<String> {
        match self {
            OutputFormat::Markdown => Ok(render_markdown(summary)),
            OutputFormat::Json => render_json(summary),
        }
    }
}
