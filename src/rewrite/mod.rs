//! Applying a [`RetentionPolicy`](crate::RetentionPolicy) to archive contents.

mod metadata;
mod tile;

pub use metadata::{MetadataError, SCHEMA_KEY, rewrite_metadata_entry, rewrite_metadata_json};
pub use tile::{rewrite_layers, rewrite_tile};
