use serde_json::Value as Json;
use thiserror::Error;

use crate::{ComparisonOp, LogicalOp};

/// A style filter that does not follow the filter grammar.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("malformed filter json")]
    Json(#[from] serde_json::Error),

    #[error("filter must be an array, got {found}")]
    NotAnArray { found: &'static str },

    #[error("filter array is empty")]
    Empty,

    #[error("filter operator must be a string, got {found}")]
    OperatorNotString { found: &'static str },

    #[error("unknown filter operator '{op}'")]
    UnknownOperator { op: String },

    #[error("'{op}' filter is missing its field operand")]
    MissingField { op: ComparisonOp },

    #[error("'{op}' filter field operand must be a string, got {found}")]
    FieldNotString { op: ComparisonOp, found: &'static str },

    #[error("operand {index} of '{op}' filter is invalid")]
    InChild {
        op: LogicalOp,
        index: usize,
        source: Box<FilterError>,
    },
}

impl FilterError {
    /// The innermost error, following nested logical operands down.
    #[must_use]
    pub fn root_cause(&self) -> &FilterError {
        match self {
            FilterError::InChild { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// A style document that cannot be turned into a [`StyleModel`](crate::StyleModel).
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("malformed style document")]
    Json(#[from] serde_json::Error),

    #[error("invalid filter on style layer '{layer}'")]
    Filter { layer: String, source: FilterError },
}

pub(crate) fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn unknown_operator_message() {
        let err = FilterError::UnknownOperator { op: "xor".into() };
        assert_eq!(err.to_string(), "unknown filter operator 'xor'");
    }

    #[test]
    fn field_not_string_message() {
        let err = FilterError::FieldNotString {
            op: ComparisonOp::Eq,
            found: "array",
        };
        assert_eq!(
            err.to_string(),
            "'==' filter field operand must be a string, got array"
        );
    }

    #[test]
    fn missing_field_message() {
        let err = FilterError::MissingField {
            op: ComparisonOp::Has,
        };
        assert_eq!(err.to_string(), "'has' filter is missing its field operand");
    }

    #[test]
    fn nested_error_chain() {
        let err = FilterError::InChild {
            op: LogicalOp::All,
            index: 2,
            source: Box::new(FilterError::Empty),
        };
        assert_eq!(err.to_string(), "operand 2 of 'all' filter is invalid");
        assert_eq!(err.source().unwrap().to_string(), "filter array is empty");
        assert!(matches!(err.root_cause(), FilterError::Empty));
    }

    #[test]
    fn style_filter_message() {
        let err = StyleError::Filter {
            layer: "roads".into(),
            source: FilterError::Empty,
        };
        assert_eq!(err.to_string(), "invalid filter on style layer 'roads'");
        assert!(err.source().is_some());
    }

    #[test]
    fn json_kinds() {
        assert_eq!(json_kind(&serde_json::json!(null)), "null");
        assert_eq!(json_kind(&serde_json::json!({})), "object");
        assert_eq!(json_kind(&serde_json::json!(1.5)), "number");
    }
}
