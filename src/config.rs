use std::path::{Path, PathBuf};

use thiserror::Error;

/// Output path used when none is given.
pub const DEFAULT_OUTPUT: &str = "output.mbtiles";

/// Tiles read and written per transaction when none is given.
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("output path {} is the same file as the input", path.display())]
    OutputIsInput { path: PathBuf },
}

/// Everything one optimization run needs.
///
/// ```
/// use tinytiles::RunConfig;
///
/// let config = RunConfig::new("in.mbtiles", "style.json")
///     .with_output("small.mbtiles")
///     .with_keep_layers("^water$")
///     .with_gzipped(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub style: PathBuf,
    pub output: PathBuf,
    pub keep_layers: Option<String>,
    pub keep_attributes: Option<String>,
    pub gzipped: bool,
    pub batch_size: usize,
}

impl RunConfig {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, style: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            style: style.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            keep_layers: None,
            keep_attributes: None,
            gzipped: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// An empty pattern leaves the override unset.
    #[must_use]
    pub fn with_keep_layers(mut self, pattern: impl Into<String>) -> Self {
        self.keep_layers = non_empty(pattern.into());
        self
    }

    /// An empty pattern leaves the override unset.
    #[must_use]
    pub fn with_keep_attributes(mut self, pattern: impl Into<String>) -> Self {
        self.keep_attributes = non_empty(pattern.into());
        self
    }

    #[must_use]
    pub fn with_gzipped(mut self, gzipped: bool) -> Self {
        self.gzipped = gzipped;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Check settings that do not depend on file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero batch size or an output path that
    /// names the input file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if same_file(&self.input, &self.output) {
            return Err(ConfigError::OutputIsInput {
                path: self.output.clone(),
            });
        }
        Ok(())
    }
}

fn non_empty(pattern: String) -> Option<String> {
    (!pattern.is_empty()).then_some(pattern)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
