use crate::RetentionPolicy;
use crate::tile::{self, CLIP_BOUND, COORD_PRECISION, CodecError, Feature, LAYER_VERSION, Layer};

/// Filter a decoded tile down to the layers and attributes the policy keeps.
///
/// Rejected layers are skipped before their features are decoded. Kept features
/// have their coordinates rounded, and every kept layer is clipped to
/// [`CLIP_BOUND`].
///
/// # Errors
///
/// Returns [`CodecError`] if a kept layer's features are malformed.
pub fn rewrite_layers(
    tile: &tile::proto::Tile,
    policy: &mut RetentionPolicy,
) -> Result<Vec<Layer>, CodecError> {
    let mut out = Vec::with_capacity(tile.layers.len());
    for raw in &tile.layers {
        if !policy.should_keep_layer(&raw.name) {
            continue;
        }
        let layer = Layer::from_proto(raw)?;
        let features = layer
            .features
            .into_iter()
            .map(|feature| retain_properties(feature, policy))
            .collect();

        let mut kept = Layer {
            name: layer.name,
            version: LAYER_VERSION,
            extent: layer.extent,
            features,
        };
        kept.clip(&CLIP_BOUND);
        out.push(kept);
    }
    Ok(out)
}

fn retain_properties(feature: Feature, policy: &mut RetentionPolicy) -> Feature {
    Feature {
        id: feature.id,
        geometry: feature.geometry.round(COORD_PRECISION),
        properties: feature
            .properties
            .into_iter()
            .filter(|(key, _)| policy.should_keep_attribute(key))
            .collect(),
    }
}

/// Decode a stored payload, filter it, and encode the result with the same
/// compression.
///
/// # Errors
///
/// Returns [`CodecError`] if the payload cannot be decoded or re-encoded.
pub fn rewrite_tile(
    data: &[u8],
    gzipped: bool,
    policy: &mut RetentionPolicy,
) -> Result<Vec<u8>, CodecError> {
    let raw = tile::decode_raw(data, gzipped)?;
    let layers = rewrite_layers(&raw, policy)?;
    tile::encode(&layers, gzipped)
}
