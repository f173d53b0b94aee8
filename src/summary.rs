use std::fmt;
use std::path::PathBuf;

use crate::NameSet;

/// What one run removed and how much smaller the archive got.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub dropped_layers: NameSet,
    pub dropped_attributes: NameSet,
    pub tiles: u64,
    pub input_size: u64,
    pub output_size: u64,
    pub output: PathBuf,
}

impl RunSummary {
    /// Size reduction as a percentage of the input. Negative if the output
    /// grew; zero for an empty input.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reduction_percent(&self) -> f64 {
        if self.input_size == 0 {
            return 0.0;
        }
        let input = self.input_size as f64;
        (input - self.output_size as f64) / input * 100.0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Removed layers: {}", self.dropped_layers.join(", "))?;
        writeln!(f, "Removed attributes: {}", self.dropped_attributes.join(", "))?;
        writeln!(f, "Tiles rewritten: {}", self.tiles)?;
        writeln!(f, "Input file size: {} bytes", self.input_size)?;
        writeln!(f, "Output file size: {} bytes", self.output_size)?;
        writeln!(f, "MBTiles reduced by {:.2}%", self.reduction_percent())?;
        write!(f, "File output at: {}", self.output.display())
    }
}
