use std::fmt;

use super::filter::Predicate;
use super::name_set::NameSet;

/// One entry of a style's `layers` list.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub id: String,
    /// Tile layer this style layer draws from. Absent for layers such as
    /// `background` that draw no tile data.
    pub source_layer: Option<String>,
    pub filter: Option<Predicate>,
}

impl LayerDescriptor {
    #[must_use]
    pub fn new(id: &str, source_layer: Option<&str>, filter: Option<Predicate>) -> Self {
        Self {
            id: id.to_owned(),
            source_layer: source_layer.map(str::to_owned),
            filter,
        }
    }
}

/// A parsed style: its layers plus the source-layer and attribute names they
/// reference, computed once at construction.
#[derive(Debug, Clone, Default)]
pub struct StyleModel {
    layers: Vec<LayerDescriptor>,
    source_layers: NameSet,
    fields: NameSet,
}

impl StyleModel {
    #[must_use]
    pub fn new(layers: Vec<LayerDescriptor>) -> Self {
        let mut source_layers = NameSet::new();
        let mut fields = NameSet::new();
        for layer in &layers {
            if let Some(name) = &layer.source_layer {
                source_layers.insert(name);
            }
            if let Some(filter) = &layer.filter {
                filter.collect_fields(&mut fields);
            }
        }
        Self {
            layers,
            source_layers,
            fields,
        }
    }

    /// Parse a style document. See [`crate::parse::parse_style`].
    ///
    /// # Errors
    ///
    /// Returns [`StyleError`](crate::parse::StyleError) if the document or any
    /// layer filter is malformed.
    pub fn from_json(input: &str) -> Result<Self, crate::parse::StyleError> {
        crate::parse::parse_style(input)
    }

    /// Read and parse a style file.
    ///
    /// # Errors
    ///
    /// Returns [`TinyTilesError`](crate::TinyTilesError) on I/O or parse failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::TinyTilesError> {
        let path = path.as_ref();
        let input =
            std::fs::read_to_string(path).map_err(|source| crate::TinyTilesError::ReadStyle {
                path: path.to_owned(),
                source,
            })?;
        Ok(Self::from_json(&input)?)
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    /// Source-layer names referenced by any style layer.
    #[must_use]
    pub fn source_layers(&self) -> &NameSet {
        &self.source_layers
    }

    /// Attribute names referenced by any style layer's filter.
    #[must_use]
    pub fn fields(&self) -> &NameSet {
        &self.fields
    }
}

impl fmt::Display for StyleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StyleModel({} layers, {} source layers, {} fields)",
            self.layers.len(),
            self.source_layers.len(),
            self.fields.len(),
        )
    }
}
