use std::fmt;

use serde_json::Value as Json;

/// Operand values carried by a comparison filter.
///
/// Literals are stored structurally and never interpreted: the filter engine only
/// cares about which fields a filter touches, not what it compares them to.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// JSON `null`.
    Null,
    /// A boolean value.
    Bool(bool),
    /// An integral number that fits in 64 signed bits.
    Int(i64),
    /// Any other number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A nested array of literals.
    Array(Vec<Literal>),
    /// A nested object, keys in document order.
    Object(Vec<(String, Literal)>),
}

impl Literal {
    /// Whether this literal is a nested array or object.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        matches!(self, Literal::Array(_) | Literal::Object(_))
    }
}

impl From<&Json> for Literal {
    fn from(value: &Json) -> Self {
        match value {
            Json::Null => Literal::Null,
            Json::Bool(b) => Literal::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Literal::Int(i),
                None => Literal::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Literal::String(s.clone()),
            Json::Array(items) => Literal::Array(items.iter().map(Literal::from).collect()),
            Json::Object(map) => Literal::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Literal::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_owned())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(v) => write!(f, "{v}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::String(v) => write_json_str(f, v),
            Literal::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Literal::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_json_str(f, key)?;
                    write!(f, ": {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Write `s` as a JSON string literal, quoted and escaped.
pub(crate) fn write_json_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}
