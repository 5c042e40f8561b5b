//! Domain models for hidden declarations and staged snapshots.

use std::collections::BTreeSet;

use indexmap::IndexMap;

/// Names of classes and methods currently redacted in the open file.
///
/// Membership is keyed by identifier only: hiding `Run` hides every method named `Run`, whichever
/// class declares it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenNames {
    classes: BTreeSet<String>,
    methods: BTreeSet<String>,
}

impl HiddenNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from explicit name lists.
    pub fn from_names<C, M>(classes: C, methods: M) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_class_hidden(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn is_method_hidden(&self, name: &str) -> bool {
        self.methods.contains(name)
    }

    /// Mark a class as hidden or visible. Returns `true` when the set changed.
    pub fn set_class_hidden(&mut self, name: &str, hidden: bool) -> bool {
        if hidden {
            self.classes.insert(name.to_owned())
        } else {
            self.classes.remove(name)
        }
    }

    /// Mark a method as hidden or visible. Returns `true` when the set changed.
    pub fn set_method_hidden(&mut self, name: &str, hidden: bool) -> bool {
        if hidden {
            self.methods.insert(name.to_owned())
        } else {
            self.methods.remove(name)
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.methods.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
        self.methods.clear();
    }
}

/// Snapshots of displayed files waiting to be exported, in staging order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedBundle {
    files: IndexMap<String, String>,
}

impl StagedBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot under `name`. Re-staging a name replaces its text but keeps its position.
    pub fn stage(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate `(file name, text)` pairs in staging order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
    }
}

impl<N, T> FromIterator<(N, T)> for StagedBundle
where
    N: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut bundle = StagedBundle::new();
        for (name, text) in iter {
            bundle.stage(name, text);
        }
        bundle
    }
}
