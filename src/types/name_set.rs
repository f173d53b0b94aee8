use std::collections::HashMap;

/// Insertion-ordered set of names.
///
/// Used for the layer and field names a style references and for the names a
/// run ends up dropping. Membership checks are hashed; iteration yields names in
/// the order they were first inserted.
#[derive(Debug, Clone, Default)]
pub struct NameSet {
    index: HashMap<String, usize>,
    names: Vec<String>,
}

impl NameSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name. Returns `true` if it was not already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_owned(), self.names.len());
        self.names.push(name.to_owned());
        true
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a name in discovery order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate names in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Add every name of `other` not already present, keeping `other`'s order.
    pub fn union_with(&mut self, other: &NameSet) {
        for name in other.iter() {
            self.insert(name);
        }
    }

    /// Names joined with `sep`, in discovery order.
    #[must_use]
    pub fn join(&self, sep: &str) -> String {
        self.names.join(sep)
    }
}

impl<S: AsRef<str>> FromIterator<S> for NameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = NameSet::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

impl<S: AsRef<str>> Extend<S> for NameSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name.as_ref());
        }
    }
}
