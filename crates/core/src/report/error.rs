use std::fmt;
use std::path::PathBuf;

/// The stock directory itself is missing, so there is nowhere to write a summary.
#[derive(Debug, Clone)]
pub struct StockDirNotFound {
    pub stock_code: String,
    pub path: PathBuf,
}

impl fmt::Display for StockDirNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stock directory not found (stock={}): {}",
            self.stock_code,
            self.path.display()
        )
    }
}

impl std::error::Error for StockDirNotFound {}
