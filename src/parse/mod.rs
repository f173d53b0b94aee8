mod error;
mod filter;
mod style;

pub use error::{FilterError, StyleError};

use crate::{Predicate, StyleModel};

/// Parse a filter already decoded from JSON into a [`Predicate`].
///
/// The first array element names the operator. Comparison operators take a
/// field name and any number of literals; `all`, `any` and `none` take nested
/// filters.
///
/// # Errors
///
/// Returns [`FilterError`] if the document does not follow the filter grammar.
pub fn parse_filter(doc: &serde_json::Value) -> Result<Predicate, FilterError> {
    filter::predicate(doc)
}

/// Parse a filter from JSON text.
///
/// # Errors
///
/// Returns [`FilterError`] if the text is not JSON or not a valid filter.
pub fn parse_filter_str(input: &str) -> Result<Predicate, FilterError> {
    let doc: serde_json::Value = serde_json::from_str(input)?;
    filter::predicate(&doc)
}

/// Parse a style document into a [`StyleModel`].
///
/// # Errors
///
/// Returns [`StyleError`] if the `layers` list is absent or malformed, or if any
/// layer's filter fails to parse.
pub fn parse_style(input: &str) -> Result<StyleModel, StyleError> {
    style::style(input)
}
