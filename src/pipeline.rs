//! One optimization run: style scan, policy, metadata rewrite, batched tile
//! rewrite and publication of the output archive.

use tracing::{debug, info};

use crate::archive::{MbTiles, MetadataRow, StagedOutput, TileRecord};
use crate::rewrite::{rewrite_metadata_entry, rewrite_tile};
use crate::{KeepPatterns, RetentionPolicy, RunConfig, RunSummary, StyleModel, TinyTilesError};

/// Receives tile progress during [`run`]. Every method defaults to doing nothing.
pub trait Progress {
    /// Called once with the number of tiles about to be rewritten.
    fn start(&mut self, _total: u64) {}

    /// Called after each committed batch with the number of tiles in it.
    fn advance(&mut self, _tiles: u64) {}

    fn finish(&mut self) {}
}

impl Progress for () {}

/// Produce a reduced copy of `config.input` at `config.output`.
///
/// The output is assembled in a staging file and moved into place only after
/// every batch has been written. On error the destination is left as it was.
///
/// # Errors
///
/// Returns [`TinyTilesError`] for an invalid configuration, an unreadable or
/// malformed style, an invalid override pattern, a malformed metadata schema
/// document, an undecodable tile or any archive I/O failure.
pub fn run(config: &RunConfig, progress: &mut dyn Progress) -> Result<RunSummary, TinyTilesError> {
    config.validate()?;

    info!(style = %config.style.display(), "scanning style for layers and attributes in use");
    let style = StyleModel::from_file(&config.style)?;
    debug!(%style, "style scanned");

    let patterns = KeepPatterns::new(
        config.keep_layers.as_deref(),
        config.keep_attributes.as_deref(),
    )?;
    let mut policy = RetentionPolicy::new(&style, patterns);

    let input = MbTiles::open_read_only(&config.input)?;
    let staged = StagedOutput::copy_from(&config.input, &config.output)?;
    let mut output = MbTiles::open(staged.path())?;
    output.clear()?;

    info!("rewriting metadata");
    let metadata = input
        .metadata()?
        .into_iter()
        .map(|row| {
            let value = rewrite_metadata_entry(&row.name, row.value, &mut policy)?;
            Ok::<_, TinyTilesError>(MetadataRow {
                name: row.name,
                value,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    output.insert_metadata(&metadata)?;

    let total = input.tile_count()?;
    info!(total, batch_size = config.batch_size, gzipped = config.gzipped, "rewriting tiles");
    progress.start(total);

    let mut offset = 0_u64;
    loop {
        let page = input.tiles_page(offset, config.batch_size)?;
        if page.is_empty() {
            break;
        }
        let batch = page
            .into_iter()
            .map(|tile| rewrite_record(tile, config.gzipped, &mut policy))
            .collect::<Result<Vec<_>, _>>()?;
        output.insert_tiles(&batch)?;

        let written = batch.len() as u64;
        offset += written;
        progress.advance(written);
        debug!(offset, total, "batch committed");
    }
    progress.finish();

    info!("vacuuming output");
    output.vacuum()?;
    output.close()?;
    let published = staged.publish()?;

    let drops = policy.into_drops();
    let summary = RunSummary {
        dropped_layers: drops.layers,
        dropped_attributes: drops.attributes,
        tiles: offset,
        input_size: std::fs::metadata(&config.input)?.len(),
        output_size: std::fs::metadata(&published)?.len(),
        output: published,
    };
    info!(
        dropped_layers = summary.dropped_layers.len(),
        dropped_attributes = summary.dropped_attributes.len(),
        reduction = %format!("{:.2}%", summary.reduction_percent()),
        "run complete"
    );
    Ok(summary)
}

fn rewrite_record(
    tile: TileRecord,
    gzipped: bool,
    policy: &mut RetentionPolicy,
) -> Result<TileRecord, TinyTilesError> {
    let tile_data =
        rewrite_tile(&tile.tile_data, gzipped, policy).map_err(|source| TinyTilesError::Tile {
            zoom: tile.zoom_level,
            column: tile.tile_column,
            row: tile.tile_row,
            source,
        })?;
    Ok(TileRecord { tile_data, ..tile })
}
