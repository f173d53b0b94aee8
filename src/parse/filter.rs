use serde_json::Value as Json;

use crate::{ComparisonOp, Literal, LogicalOp, Operator, Predicate};

use super::error::{FilterError, json_kind};

// -- Filters ----------------------------------------------------------------

/// `[op, ...]` where `op` picks the family by name alone.
pub(crate) fn predicate(doc: &Json) -> Result<Predicate, FilterError> {
    let items = doc.as_array().ok_or(FilterError::NotAnArray {
        found: json_kind(doc),
    })?;
    let (head, operands) = items.split_first().ok_or(FilterError::Empty)?;
    let name = head.as_str().ok_or(FilterError::OperatorNotString {
        found: json_kind(head),
    })?;

    match Operator::lookup(name) {
        Some(Operator::Comparison(op)) => comparison(op, operands),
        Some(Operator::Logical(op)) => logical(op, operands),
        None => Err(FilterError::UnknownOperator {
            op: name.to_owned(),
        }),
    }
}

// -- Comparison family: [op, field, literal...] -----------------------------

fn comparison(op: ComparisonOp, operands: &[Json]) -> Result<Predicate, FilterError> {
    let (field, values) = operands
        .split_first()
        .ok_or(FilterError::MissingField { op })?;
    let field = field.as_str().ok_or(FilterError::FieldNotString {
        op,
        found: json_kind(field),
    })?;

    Ok(Predicate::Comparison {
        op,
        field: field.to_owned(),
        values: values.iter().map(Literal::from).collect(),
    })
}

// -- Logical family: [op, filter...] ----------------------------------------

fn logical(op: LogicalOp, operands: &[Json]) -> Result<Predicate, FilterError> {
    let children = operands
        .iter()
        .enumerate()
        .map(|(i, sub)| {
            predicate(sub).map_err(|e| FilterError::InChild {
                op,
                // position within the document array, operator included
                index: i + 1,
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Predicate::Logical { op, children })
}
