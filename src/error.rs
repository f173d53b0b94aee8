use thiserror::Error;

use crate::archive::StoreError;
use crate::config::ConfigError;
use crate::parse::StyleError;
use crate::rewrite::MetadataError;
use crate::tile::CodecError;
use crate::PatternError;

/// Unified error type covering style parsing, archive access and tile rewriting.
///
/// Returned by [`run()`](crate::run) and
/// [`StyleModel::from_file()`](crate::StyleModel::from_file).
#[derive(Debug, Error)]
pub enum TinyTilesError {
    #[error("failed to read style {}", path.display())]
    ReadStyle {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to rewrite tile {zoom}/{column}/{row}")]
    Tile {
        zoom: i64,
        column: i64,
        row: i64,
        source: CodecError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
