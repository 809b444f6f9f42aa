pub mod domain;
pub mod pipeline;
pub mod report;
pub mod summary;

pub mod config {
    use std::path::PathBuf;

    pub const DEFAULT_STOCKS_DIR: &str = "stocks";

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub stocks_dir: Option<String>,
        pub summary_file_name: Option<String>,
        pub max_key_points: Option<usize>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                stocks_dir: non_empty_var("STOCKS_DIR"),
                summary_file_name: non_empty_var("SUMMARY_FILE_NAME"),
                max_key_points: std::env::var("SUMMARY_MAX_KEY_POINTS")
                    .ok()
                    .and_then(|s| s.trim().parse::<usize>().ok()),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn stocks_dir(&self) -> PathBuf {
            PathBuf::from(self.stocks_dir.as_deref().unwrap_or(DEFAULT_STOCKS_DIR))
        }

        pub fn max_key_points(&self) -> usize {
            self.max_key_points
                .unwrap_or(crate::report::fields::DEFAULT_MAX_KEY_POINTS)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

}
