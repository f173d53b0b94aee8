use std::collections::HashMap;
use std::fmt;

use super::CodecError;
use super::geometry::{self, Bound, Geometry};
use super::proto;

/// Version written into every encoded layer.
pub const LAYER_VERSION: u32 = 2;

/// A feature attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Float(f32),
    Double(f64),
    Int(i64),
    UInt(u64),
    SInt(i64),
    Bool(bool),
}

/// Hashable identity of a [`PropertyValue`], used to share entries in a
/// layer's value table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ValueKey {
    String(String),
    Float(u32),
    Double(u64),
    Int(i64),
    UInt(u64),
    SInt(i64),
    Bool(bool),
}

impl PropertyValue {
    fn from_proto(value: &proto::Value) -> Option<Self> {
        if let Some(v) = &value.string_value {
            Some(PropertyValue::String(v.clone()))
        } else if let Some(v) = value.float_value {
            Some(PropertyValue::Float(v))
        } else if let Some(v) = value.double_value {
            Some(PropertyValue::Double(v))
        } else if let Some(v) = value.int_value {
            Some(PropertyValue::Int(v))
        } else if let Some(v) = value.uint_value {
            Some(PropertyValue::UInt(v))
        } else if let Some(v) = value.sint_value {
            Some(PropertyValue::SInt(v))
        } else {
            value.bool_value.map(PropertyValue::Bool)
        }
    }

    fn to_proto(&self) -> proto::Value {
        let mut out = proto::Value::default();
        match self {
            PropertyValue::String(v) => out.string_value = Some(v.clone()),
            PropertyValue::Float(v) => out.float_value = Some(*v),
            PropertyValue::Double(v) => out.double_value = Some(*v),
            PropertyValue::Int(v) => out.int_value = Some(*v),
            PropertyValue::UInt(v) => out.uint_value = Some(*v),
            PropertyValue::SInt(v) => out.sint_value = Some(*v),
            PropertyValue::Bool(v) => out.bool_value = Some(*v),
        }
        out
    }

    fn key(&self) -> ValueKey {
        match self {
            PropertyValue::String(v) => ValueKey::String(v.clone()),
            PropertyValue::Float(v) => ValueKey::Float(v.to_bits()),
            PropertyValue::Double(v) => ValueKey::Double(v.to_bits()),
            PropertyValue::Int(v) => ValueKey::Int(*v),
            PropertyValue::UInt(v) => ValueKey::UInt(*v),
            PropertyValue::SInt(v) => ValueKey::SInt(*v),
            PropertyValue::Bool(v) => ValueKey::Bool(*v),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_owned())
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(v) => write!(f, "\"{v}\""),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Double(v) => write!(f, "{v}"),
            PropertyValue::Int(v) | PropertyValue::SInt(v) => write!(f, "{v}"),
            PropertyValue::UInt(v) => write!(f, "{v}"),
            PropertyValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// One decoded feature. Properties keep their tag order.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<u64>,
    pub geometry: Geometry,
    pub properties: Vec<(String, PropertyValue)>,
}

impl Feature {
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.push((key.to_owned(), value.into()));
        self
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// One decoded tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub version: u32,
    pub extent: u32,
    pub features: Vec<Feature>,
}

impl Layer {
    #[must_use]
    pub fn new(name: &str, features: Vec<Feature>) -> Self {
        Self {
            name: name.to_owned(),
            version: LAYER_VERSION,
            extent: super::DEFAULT_EXTENT,
            features,
        }
    }

    /// Decode a protobuf layer into features.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Feature`] if a tag or geometry stream is malformed.
    pub fn from_proto(layer: &proto::Layer) -> Result<Self, CodecError> {
        let fail = |reason: &'static str| CodecError::Feature {
            layer: layer.name.clone(),
            reason,
        };

        let values = layer
            .values
            .iter()
            .map(|v| PropertyValue::from_proto(v).ok_or_else(|| fail("value has no type")))
            .collect::<Result<Vec<_>, _>>()?;

        let mut features = Vec::with_capacity(layer.features.len());
        for feature in &layer.features {
            if feature.tags.len() % 2 != 0 {
                return Err(fail("odd number of tags"));
            }
            let properties = feature
                .tags
                .chunks_exact(2)
                .map(|pair| {
                    let key = layer
                        .keys
                        .get(pair[0] as usize)
                        .ok_or_else(|| fail("key index out of range"))?;
                    let value = values
                        .get(pair[1] as usize)
                        .ok_or_else(|| fail("value index out of range"))?;
                    Ok((key.clone(), value.clone()))
                })
                .collect::<Result<Vec<_>, CodecError>>()?;

            let kind = feature
                .r#type
                .and_then(|t| proto::GeomType::try_from(t).ok())
                .unwrap_or(proto::GeomType::Unknown);
            let geometry = geometry::decode(kind, &feature.geometry).map_err(fail)?;

            features.push(Feature {
                id: feature.id,
                geometry,
                properties,
            });
        }

        Ok(Self {
            name: layer.name.clone(),
            version: layer.version,
            extent: layer.extent.unwrap_or(super::DEFAULT_EXTENT),
            features,
        })
    }

    /// Build the protobuf layer, sharing key and value table entries.
    /// Features whose geometry encodes to nothing are left out.
    #[must_use]
    pub fn to_proto(&self) -> proto::Layer {
        let mut keys: Vec<String> = Vec::new();
        let mut key_index: HashMap<&str, u32> = HashMap::new();
        let mut values: Vec<proto::Value> = Vec::new();
        let mut value_index: HashMap<ValueKey, u32> = HashMap::new();
        let mut features = Vec::with_capacity(self.features.len());

        for feature in &self.features {
            let Some((kind, commands)) = geometry::encode(&feature.geometry) else {
                continue;
            };
            let mut tags = Vec::with_capacity(feature.properties.len() * 2);
            for (key, value) in &feature.properties {
                let k = *key_index.entry(key.as_str()).or_insert_with(|| {
                    keys.push(key.clone());
                    table_index(keys.len())
                });
                let v = *value_index.entry(value.key()).or_insert_with(|| {
                    values.push(value.to_proto());
                    table_index(values.len())
                });
                tags.push(k);
                tags.push(v);
            }
            features.push(proto::Feature {
                id: feature.id,
                tags,
                r#type: Some(kind as i32),
                geometry: commands,
            });
        }

        proto::Layer {
            version: self.version,
            name: self.name.clone(),
            features,
            keys,
            values,
            extent: Some(self.extent),
        }
    }

    /// Clip every feature to `bound`, dropping features left without geometry.
    pub fn clip(&mut self, bound: &Bound) {
        for feature in &mut self.features {
            feature.geometry = feature.geometry.clip(bound);
        }
        self.features.retain(|f| !f.geometry.is_empty());
    }
}

#[allow(clippy::cast_possible_truncation)]
fn table_index(len: usize) -> u32 {
    (len - 1) as u32
}
