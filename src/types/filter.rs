use std::fmt;

use super::literal::{Literal, write_json_str};
use super::name_set::NameSet;

/// Operators whose second element names the feature attribute they inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    At,
    NotHas,
    IndexOf,
    Slice,
    GlobalState,
    Get,
    Has,
    Length,
    Case,
    Match,
    Coalesce,
}

/// Operators whose operands are themselves filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    All,
    Any,
    None,
}

/// A recognized filter operator, classified by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Comparison(ComparisonOp),
    Logical(LogicalOp),
}

/// Every operator name the parser accepts. Classification is by name only; the
/// shape of the operands never changes an operator's family.
const OPERATORS: &[(&str, Operator)] = &[
    ("==", Operator::Comparison(ComparisonOp::Eq)),
    ("!=", Operator::Comparison(ComparisonOp::Neq)),
    (">", Operator::Comparison(ComparisonOp::Gt)),
    ("<", Operator::Comparison(ComparisonOp::Lt)),
    (">=", Operator::Comparison(ComparisonOp::Gte)),
    ("<=", Operator::Comparison(ComparisonOp::Lte)),
    ("in", Operator::Comparison(ComparisonOp::In)),
    ("!in", Operator::Comparison(ComparisonOp::NotIn)),
    ("at", Operator::Comparison(ComparisonOp::At)),
    ("!has", Operator::Comparison(ComparisonOp::NotHas)),
    ("index-of", Operator::Comparison(ComparisonOp::IndexOf)),
    ("slice", Operator::Comparison(ComparisonOp::Slice)),
    ("global-state", Operator::Comparison(ComparisonOp::GlobalState)),
    ("get", Operator::Comparison(ComparisonOp::Get)),
    ("has", Operator::Comparison(ComparisonOp::Has)),
    ("length", Operator::Comparison(ComparisonOp::Length)),
    ("case", Operator::Comparison(ComparisonOp::Case)),
    ("match", Operator::Comparison(ComparisonOp::Match)),
    ("coalesce", Operator::Comparison(ComparisonOp::Coalesce)),
    ("all", Operator::Logical(LogicalOp::All)),
    ("any", Operator::Logical(LogicalOp::Any)),
    ("none", Operator::Logical(LogicalOp::None)),
];

impl Operator {
    /// Look up an operator by its style-document name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Operator> {
        OPERATORS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|&(_, op)| op)
    }

    /// The operator's name as written in a style document.
    #[must_use]
    pub fn name(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| *op == self)
            .map_or("?", |&(name, _)| name)
    }
}

impl ComparisonOp {
    #[must_use]
    pub fn name(self) -> &'static str {
        Operator::Comparison(self).name()
    }
}

impl LogicalOp {
    #[must_use]
    pub fn name(self) -> &'static str {
        Operator::Logical(self).name()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed style filter.
///
/// Filters are never evaluated against features here; the tree is kept only so
/// the attribute names it may inspect can be extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison {
        op: ComparisonOp,
        /// Attribute inspected by the operator. Empty when there is none.
        field: String,
        values: Vec<Literal>,
    },
    Logical {
        op: LogicalOp,
        children: Vec<Predicate>,
    },
}

impl Predicate {
    #[must_use]
    pub fn compare(op: ComparisonOp, field: &str, values: Vec<Literal>) -> Predicate {
        Predicate::Comparison {
            op,
            field: field.to_owned(),
            values,
        }
    }

    #[must_use]
    pub fn all(children: Vec<Predicate>) -> Predicate {
        Predicate::Logical {
            op: LogicalOp::All,
            children,
        }
    }

    #[must_use]
    pub fn any(children: Vec<Predicate>) -> Predicate {
        Predicate::Logical {
            op: LogicalOp::Any,
            children,
        }
    }

    #[must_use]
    pub fn none(children: Vec<Predicate>) -> Predicate {
        Predicate::Logical {
            op: LogicalOp::None,
            children,
        }
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        match self {
            Predicate::Comparison { op, .. } => Operator::Comparison(*op),
            Predicate::Logical { op, .. } => Operator::Logical(*op),
        }
    }

    /// Every non-empty attribute name referenced anywhere in this tree.
    #[must_use]
    pub fn fields(&self) -> NameSet {
        let mut out = NameSet::new();
        self.collect_fields(&mut out);
        out
    }

    /// Add the attribute names referenced by this tree to `out`.
    pub fn collect_fields(&self, out: &mut NameSet) {
        match self {
            Predicate::Comparison { field, .. } => {
                if !field.is_empty() {
                    out.insert(field);
                }
            }
            Predicate::Logical { children, .. } => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }

    /// Nesting depth; a single comparison has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Predicate::Comparison { .. } => 1,
            Predicate::Logical { children, .. } => {
                1 + children.iter().map(Predicate::depth).max().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison { op, field, values } => {
                write!(f, "[\"{op}\", ")?;
                write_json_str(f, field)?;
                for value in values {
                    write!(f, ", {value}")?;
                }
                write!(f, "]")
            }
            Predicate::Logical { op, children } => {
                write!(f, "[\"{op}\"")?;
                for child in children {
                    write!(f, ", {child}")?;
                }
                write!(f, "]")
            }
        }
    }
}
