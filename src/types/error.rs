use thiserror::Error;

/// An always-keep override that is not a valid regular expression.
#[derive(Debug, Error)]
#[error("invalid --{option} pattern '{pattern}'")]
pub struct PatternError {
    pub option: &'static str,
    pub pattern: String,
    pub source: regex::Error,
}
