//! Vector tile payload codec.
//!
//! Tiles are decoded in two steps so callers can skip layers cheaply:
//! [`decode_raw`] yields the protobuf message and [`Layer::from_proto`] turns a
//! single layer into features.

mod geometry;
mod model;
pub mod proto;

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use prost::Message;
use thiserror::Error;

pub use geometry::{Bound, Coord, Geometry, Polygon, Ring};
pub use model::{Feature, LAYER_VERSION, Layer, PropertyValue};

/// Tile extent written into every rewritten layer.
pub const DEFAULT_EXTENT: u32 = 4096;

/// Rewritten layers are clipped to one extent of buffer around the tile.
pub const CLIP_BOUND: Bound = Bound {
    min: Coord {
        x: -4096.0,
        y: -4096.0,
    },
    max: Coord {
        x: 8191.0,
        y: 8191.0,
    },
};

/// Decimal places geometry coordinates are rounded to.
pub const COORD_PRECISION: i32 = 6;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("tile payload is not a valid vector tile")]
    Decode(#[from] prost::DecodeError),

    #[error("gzip stream error")]
    Gzip(#[from] std::io::Error),

    #[error("malformed feature in layer '{layer}': {reason}")]
    Feature { layer: String, reason: &'static str },
}

/// Decode a payload into its protobuf message, gunzipping first if asked.
///
/// # Errors
///
/// Returns [`CodecError`] if decompression or protobuf decoding fails.
pub fn decode_raw(data: &[u8], gzipped: bool) -> Result<proto::Tile, CodecError> {
    if gzipped {
        let mut buf = Vec::new();
        GzDecoder::new(data).read_to_end(&mut buf)?;
        Ok(proto::Tile::decode(buf.as_slice())?)
    } else {
        Ok(proto::Tile::decode(data)?)
    }
}

/// Decode a payload into layers of features.
///
/// # Errors
///
/// Returns [`CodecError`] if the payload or any feature is malformed.
pub fn decode(data: &[u8], gzipped: bool) -> Result<Vec<Layer>, CodecError> {
    decode_raw(data, gzipped)?
        .layers
        .iter()
        .map(Layer::from_proto)
        .collect()
}

/// Encode layers into a payload, gzipping if asked.
///
/// # Errors
///
/// Returns [`CodecError::Gzip`] if compression fails.
pub fn encode(layers: &[Layer], gzipped: bool) -> Result<Vec<u8>, CodecError> {
    let tile = proto::Tile {
        layers: layers.iter().map(Layer::to_proto).collect(),
    };
    let bytes = tile.encode_to_vec();
    if !gzipped {
        return Ok(bytes);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&bytes)?;
    Ok(encoder.finish()?)
}
