use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::RetentionPolicy;

/// Metadata row holding the layer schema document.
pub const SCHEMA_KEY: &str = "json";

#[derive(Debug, Error)]
#[error("metadata 'json' entry is not a valid layer schema document")]
pub struct MetadataError(#[from] serde_json::Error);

#[derive(Debug, Serialize, Deserialize)]
struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vector_layers: Option<Vec<VectorLayer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tilestats: Option<TileStats>,
    #[serde(flatten)]
    extra: Map<String, Json>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VectorLayer {
    id: String,
    #[serde(default)]
    fields: Map<String, Json>,
    #[serde(flatten)]
    extra: Map<String, Json>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TileStats {
    #[serde(rename = "layerCount", default, skip_serializing_if = "Option::is_none")]
    layer_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layers: Option<Vec<TileStatsLayer>>,
    #[serde(flatten)]
    extra: Map<String, Json>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TileStatsLayer {
    layer: String,
    #[serde(rename = "attributeCount", default, skip_serializing_if = "Option::is_none")]
    attribute_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<Vec<TileStatsAttribute>>,
    #[serde(flatten)]
    extra: Map<String, Json>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TileStatsAttribute {
    attribute: String,
    #[serde(flatten)]
    extra: Map<String, Json>,
}

/// Rewrite one metadata value. Only the [`SCHEMA_KEY`] entry changes.
///
/// # Errors
///
/// Returns [`MetadataError`] if the schema entry is not a valid document.
pub fn rewrite_metadata_entry(
    name: &str,
    value: String,
    policy: &mut RetentionPolicy,
) -> Result<String, MetadataError> {
    if name == SCHEMA_KEY {
        rewrite_metadata_json(&value, policy)
    } else {
        Ok(value)
    }
}

/// Prune a layer schema document so it lists only kept layers and fields.
///
/// Layers left without fields are kept. A `tilestats` section, when present,
/// is pruned the same way and its counts are updated.
///
/// # Errors
///
/// Returns [`MetadataError`] if `input` is not a valid schema document.
pub fn rewrite_metadata_json(
    input: &str,
    policy: &mut RetentionPolicy,
) -> Result<String, MetadataError> {
    let mut doc: SchemaDocument = serde_json::from_str(input)?;

    if let Some(layers) = doc.vector_layers.as_mut() {
        layers.retain(|layer| policy.should_keep_layer(&layer.id));
        for layer in layers.iter_mut() {
            layer.fields.retain(|field, _| policy.should_keep_attribute(field));
        }
    }

    if let Some(layers) = doc.tilestats.as_mut().and_then(|s| s.layers.as_mut()) {
        layers.retain(|layer| policy.should_keep_layer(&layer.layer));
        for layer in layers.iter_mut() {
            if let Some(attributes) = layer.attributes.as_mut() {
                attributes.retain(|a| policy.should_keep_attribute(&a.attribute));
                if layer.attribute_count.is_some() {
                    layer.attribute_count = Some(attributes.len() as u64);
                }
            }
        }
    }
    if let Some(stats) = doc.tilestats.as_mut() {
        if let (Some(count), Some(layers)) = (stats.layer_count.as_mut(), stats.layers.as_ref()) {
            *count = layers.len() as u64;
        }
    }

    Ok(serde_json::to_string(&doc)?)
}
