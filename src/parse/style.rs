use serde::Deserialize;
use serde_json::Value as Json;

use crate::{LayerDescriptor, StyleModel};

use super::error::StyleError;
use super::filter::predicate;

#[derive(Debug, Deserialize)]
struct StyleDocument {
    layers: Vec<StyleLayer>,
}

#[derive(Debug, Deserialize)]
struct StyleLayer {
    id: String,
    #[serde(rename = "source-layer", default)]
    source_layer: Option<String>,
    #[serde(default)]
    filter: Option<Json>,
}

pub(crate) fn style(input: &str) -> Result<StyleModel, StyleError> {
    let doc: StyleDocument = serde_json::from_str(input)?;

    let layers = doc
        .layers
        .into_iter()
        .map(|layer| {
            let filter = layer
                .filter
                .as_ref()
                .map(predicate)
                .transpose()
                .map_err(|source| StyleError::Filter {
                    layer: layer.id.clone(),
                    source,
                })?;
            Ok::<_, StyleError>(LayerDescriptor {
                id: layer.id,
                source_layer: layer.source_layer,
                filter,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StyleModel::new(layers))
}
