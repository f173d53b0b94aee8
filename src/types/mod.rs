mod error;
mod filter;
mod literal;
mod name_set;
mod policy;
mod style;

pub use error::PatternError;
pub use filter::{ComparisonOp, LogicalOp, Operator, Predicate};
pub use literal::Literal;
pub use name_set::NameSet;
pub use policy::{ALWAYS_KEPT_PREFIXES, DropLog, KeepPatterns, RetentionPolicy};
pub use style::{LayerDescriptor, StyleModel};
