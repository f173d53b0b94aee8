use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::error::PatternError;
use super::name_set::NameSet;
use super::style::StyleModel;

/// Attribute prefixes kept regardless of the style, so localized `name:*`
/// variants and `ref*` labels survive.
pub const ALWAYS_KEPT_PREFIXES: [&str; 2] = ["name", "ref"];

/// User-supplied "always keep" overrides, compiled up front.
#[derive(Debug, Clone, Default)]
pub struct KeepPatterns {
    layers: Option<Regex>,
    attributes: Option<Regex>,
}

impl KeepPatterns {
    /// Compile the overrides. `None` and empty strings both mean "no override".
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for the first pattern that is not a valid regex.
    pub fn new(layers: Option<&str>, attributes: Option<&str>) -> Result<Self, PatternError> {
        Ok(Self {
            layers: compile("keep-layers", layers)?,
            attributes: compile("keep-attributes", attributes)?,
        })
    }

    #[must_use]
    pub fn keeps_layer(&self, name: &str) -> bool {
        self.layers.as_ref().is_some_and(|re| re.is_match(name))
    }

    #[must_use]
    pub fn keeps_attribute(&self, name: &str) -> bool {
        self.attributes.as_ref().is_some_and(|re| re.is_match(name))
    }
}

fn compile(option: &'static str, pattern: Option<&str>) -> Result<Option<Regex>, PatternError> {
    match pattern {
        None | Some("") => Ok(None),
        Some(p) => Regex::new(p).map(Some).map_err(|source| PatternError {
            option,
            pattern: p.to_owned(),
            source,
        }),
    }
}

/// Names a run has dropped, in the order they were first seen.
#[derive(Debug, Clone, Default)]
pub struct DropLog {
    pub layers: NameSet,
    pub attributes: NameSet,
}

impl DropLog {
    /// Merge another log into this one, keeping first-seen order.
    pub fn merge(&mut self, other: &DropLog) {
        self.layers.union_with(&other.layers);
        self.attributes.union_with(&other.attributes);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.attributes.is_empty()
    }
}

#[derive(Debug)]
struct Rules {
    layers: NameSet,
    fields: NameSet,
    patterns: KeepPatterns,
}

/// Keep/drop decisions for layers and attributes, plus the record of what was
/// dropped during one run.
///
/// Any single keep rule is enough to keep a name. Rejections are recorded once
/// per name in the policy's [`DropLog`].
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    rules: Arc<Rules>,
    drops: DropLog,
}

impl RetentionPolicy {
    #[must_use]
    pub fn new(style: &StyleModel, patterns: KeepPatterns) -> Self {
        Self {
            rules: Arc::new(Rules {
                layers: style.source_layers().clone(),
                fields: style.fields().clone(),
                patterns,
            }),
            drops: DropLog::default(),
        }
    }

    /// Decide whether a tile layer is kept, recording it as dropped if not.
    pub fn should_keep_layer(&mut self, name: &str) -> bool {
        if self.keeps_layer(name) {
            return true;
        }
        self.drops.layers.insert(name);
        false
    }

    /// Decide whether a feature attribute is kept, recording it as dropped if not.
    pub fn should_keep_attribute(&mut self, name: &str) -> bool {
        if self.keeps_attribute(name) {
            return true;
        }
        self.drops.attributes.insert(name);
        false
    }

    /// The layer decision without recording anything.
    #[must_use]
    pub fn keeps_layer(&self, name: &str) -> bool {
        self.rules.patterns.keeps_layer(name) || self.rules.layers.contains(name)
    }

    /// The attribute decision without recording anything.
    #[must_use]
    pub fn keeps_attribute(&self, name: &str) -> bool {
        ALWAYS_KEPT_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
            || self.rules.patterns.keeps_attribute(name)
            || self.rules.fields.contains(name)
    }

    #[must_use]
    pub fn drops(&self) -> &DropLog {
        &self.drops
    }

    #[must_use]
    pub fn into_drops(self) -> DropLog {
        self.drops
    }

    /// A policy sharing these rules with an empty drop log, for processing a
    /// partition of tiles independently. Merge its drops back with [`absorb`](Self::absorb).
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            rules: Arc::clone(&self.rules),
            drops: DropLog::default(),
        }
    }

    /// Merge the drops recorded by a forked policy.
    pub fn absorb(&mut self, drops: &DropLog) {
        self.drops.merge(drops);
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetentionPolicy({} layers, {} fields, {} dropped layers, {} dropped attributes)",
            self.rules.layers.len(),
            self.rules.fields.len(),
            self.drops.layers.len(),
            self.drops.attributes.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::filter::{ComparisonOp, Predicate};
    use crate::types::style::LayerDescriptor;

    fn roads_style() -> StyleModel {
        StyleModel::new(vec![LayerDescriptor::new(
            "roads",
            Some("roads"),
            Some(Predicate::compare(ComparisonOp::Eq, "class", vec!["motorway".into()])),
        )])
    }

    fn policy(layers: Option<&str>, attributes: Option<&str>) -> RetentionPolicy {
        RetentionPolicy::new(&roads_style(), KeepPatterns::new(layers, attributes).unwrap())
    }

    #[test]
    fn keeps_style_layer_and_drops_others() {
        let mut p = policy(None, None);
        assert!(p.should_keep_layer("roads"));
        assert!(!p.should_keep_layer("water"));
        assert_eq!(p.drops().layers.iter().collect::<Vec<_>>(), vec!["water"]);
    }

    #[test]
    fn layer_override_keeps_unreferenced_layer() {
        let mut p = policy(Some("^water$"), None);
        assert!(p.should_keep_layer("water"));
        assert!(!p.should_keep_layer("waterway"));
        assert!(p.drops().layers.contains("waterway"));
        assert!(!p.drops().layers.contains("water"));
    }

    #[test]
    fn override_pattern_is_unanchored() {
        let mut p = policy(None, Some("pop"));
        assert!(p.should_keep_attribute("population"));
        assert!(p.should_keep_attribute("is_pop_center"));
    }

    #[test]
    fn name_and_ref_prefixes_always_kept() {
        let mut p = policy(None, None);
        for attr in ["name", "name:en", "name_int", "ref", "ref:colour", "reference"] {
            assert!(p.should_keep_attribute(attr), "failed for {attr}");
        }
        assert!(p.drops().attributes.is_empty());
    }

    #[test]
    fn style_field_kept_other_attribute_dropped() {
        let mut p = policy(None, None);
        assert!(p.should_keep_attribute("class"));
        assert!(!p.should_keep_attribute("oneway"));
        assert_eq!(p.drops().attributes.iter().collect::<Vec<_>>(), vec!["oneway"]);
    }

    #[test]
    fn repeated_rejection_recorded_once() {
        let mut p = policy(None, None);
        assert!(!p.should_keep_attribute("oneway"));
        assert!(!p.should_keep_attribute("oneway"));
        assert!(!p.should_keep_layer("water"));
        assert!(!p.should_keep_layer("water"));
        assert_eq!(p.drops().attributes.len(), 1);
        assert_eq!(p.drops().layers.len(), 1);
    }

    #[test]
    fn pure_checks_do_not_record() {
        let p = policy(None, None);
        assert!(!p.keeps_layer("water"));
        assert!(!p.keeps_attribute("oneway"));
        assert!(p.drops().is_empty());
    }

    #[test]
    fn empty_override_means_unset() {
        let patterns = KeepPatterns::new(Some(""), Some("")).unwrap();
        assert!(!patterns.keeps_layer("anything"));
        assert!(!patterns.keeps_attribute("anything"));
    }

    #[test]
    fn malformed_override_rejected_eagerly() {
        let err = KeepPatterns::new(None, Some("(unclosed")).unwrap_err();
        assert_eq!(err.option, "keep-attributes");
        let err = KeepPatterns::new(Some("[z-a]"), None).unwrap_err();
        assert_eq!(err.option, "keep-layers");
    }

    #[test]
    fn fork_shares_rules_with_fresh_log() {
        let mut parent = policy(None, None);
        assert!(!parent.should_keep_layer("water"));

        let mut child = parent.fork();
        assert!(child.drops().is_empty());
        assert!(child.should_keep_layer("roads"));
        assert!(!child.should_keep_layer("landuse"));
        assert!(!child.should_keep_layer("water"));

        parent.absorb(child.drops());
        assert_eq!(
            parent.drops().layers.iter().collect::<Vec<_>>(),
            vec!["water", "landuse"]
        );
    }
}
