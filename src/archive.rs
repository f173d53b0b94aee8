//! MBTiles archive access.
//!
//! Only the `metadata` and `tiles` tables are touched. Tiles are read in pages
//! ordered by zoom, column and row, and written one transaction per batch.

use std::fs::File;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("archive database error")]
    Sqlite(#[from] rusqlite::Error),

    #[error("archive file error at {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_owned(),
            source,
        }
    }
}

/// One row of the `metadata` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    pub name: String,
    pub value: String,
}

/// One row of the `tiles` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRecord {
    pub zoom_level: i64,
    pub tile_column: i64,
    pub tile_row: i64,
    pub tile_data: Vec<u8>,
}

/// An open MBTiles database.
#[derive(Debug)]
pub struct MbTiles {
    conn: Connection,
}

impl MbTiles {
    /// Open an existing archive for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened as a database.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Open an existing archive for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened as a database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Create an archive with the standard MBTiles schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS metadata (name TEXT, value TEXT);
             CREATE UNIQUE INDEX IF NOT EXISTS name ON metadata (name);
             CREATE TABLE IF NOT EXISTS tiles (
                 zoom_level INTEGER,
                 tile_column INTEGER,
                 tile_row INTEGER,
                 tile_data BLOB
             );
             CREATE UNIQUE INDEX IF NOT EXISTS tile_index
                 ON tiles (zoom_level, tile_column, tile_row);",
        )?;
        Ok(Self { conn })
    }

    /// Every metadata row, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on query failure.
    pub fn metadata(&self) -> Result<Vec<MetadataRow>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT name, value FROM metadata")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MetadataRow {
                    name: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Insert metadata rows in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any insert or the commit fails.
    pub fn insert_metadata(&mut self, rows: &[MetadataRow]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO metadata (name, value) VALUES (?1, ?2)")?;
            for row in rows {
                stmt.execute(params![row.name, row.value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] on query failure.
    pub fn tile_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Up to `limit` tiles starting at `offset` in (zoom, column, row) order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on query failure.
    pub fn tiles_page(&self, offset: u64, limit: usize) -> Result<Vec<TileRecord>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT zoom_level, tile_column, tile_row, tile_data FROM tiles
             ORDER BY zoom_level, tile_column, tile_row
             LIMIT ?1 OFFSET ?2",
        )?;
        #[allow(clippy::cast_possible_wrap)]
        let page = stmt
            .query_map(params![limit as i64, offset as i64], |row| {
                Ok(TileRecord {
                    zoom_level: row.get(0)?,
                    tile_column: row.get(1)?,
                    tile_row: row.get(2)?,
                    tile_data: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(page)
    }

    /// Insert a batch of tiles in one transaction. Nothing from the batch is
    /// stored if any insert fails.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any insert or the commit fails.
    pub fn insert_tiles(&mut self, tiles: &[TileRecord]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for tile in tiles {
                stmt.execute(params![
                    tile.zoom_level,
                    tile.tile_column,
                    tile.tile_row,
                    tile.tile_data
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete all metadata and tiles, then reclaim the space.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on statement failure.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch("DELETE FROM metadata; DELETE FROM tiles;")?;
        self.vacuum()
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] on statement failure.
    pub fn vacuum(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    /// Close the connection, surfacing any error from finalizing it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if SQLite fails to close cleanly.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }
}

/// An output archive built in a temporary file next to its destination and
/// moved into place only by [`publish`](Self::publish). Dropping it unpublished
/// removes the temporary file and leaves the destination untouched.
#[derive(Debug)]
pub struct StagedOutput {
    file: NamedTempFile,
    dest: PathBuf,
}

impl StagedOutput {
    /// Stage a byte copy of `source`, so page size and other database settings
    /// carry over to the output.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the copy cannot be made.
    pub fn copy_from(source: &Path, dest: &Path) -> Result<Self, StoreError> {
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::Builder::new()
            .prefix(".tinytiles-")
            .suffix(".mbtiles")
            .tempfile_in(dir)
            .map_err(StoreError::io(dir))?;
        let mut input = File::open(source).map_err(StoreError::io(source))?;
        std::io::copy(&mut input, file.as_file_mut()).map_err(StoreError::io(file.path()))?;
        file.as_file().sync_all().map_err(StoreError::io(file.path()))?;
        Ok(Self {
            file,
            dest: dest.to_owned(),
        })
    }

    /// Path of the staged file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Atomically move the staged file to its destination, replacing any file
    /// already there.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the rename fails.
    pub fn publish(self) -> Result<PathBuf, StoreError> {
        let dest = self.dest;
        self.file
            .persist(&dest)
            .map_err(|e| StoreError::Io {
                path: dest.clone(),
                source: e.error,
            })?;
        Ok(dest)
    }
}
