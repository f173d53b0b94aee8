pub mod archive;
mod config;
mod error;
pub mod parse;
mod pipeline;
pub mod rewrite;
mod summary;
pub mod tile;
mod types;

pub use config::{ConfigError, DEFAULT_BATCH_SIZE, DEFAULT_OUTPUT, RunConfig};
pub use error::TinyTilesError;
pub use pipeline::{Progress, run};
pub use summary::RunSummary;
pub use types::{
    ALWAYS_KEPT_PREFIXES, ComparisonOp, DropLog, KeepPatterns, LayerDescriptor, Literal,
    LogicalOp, NameSet, Operator, PatternError, Predicate, RetentionPolicy, StyleModel,
};
