//! Path parameters bound during resolution.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

/// Mapping from dynamic segment name to the text it matched.
///
/// The map is allocated lazily; lookups of fully literal routes never touch
/// the heap for parameters.
#[derive(Debug, Clone, Default)]
pub struct Params {
    inner: Option<HashMap<String, String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.as_ref()?.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fold the bindings of `delta` into `self`.
    ///
    /// An empty `delta` is a no-op; if `self` is still empty it takes over
    /// `delta`'s storage instead of copying.
    pub fn merge(&mut self, delta: Params) {
        let Some(delta) = delta.inner.filter(|m| !m.is_empty()) else {
            return;
        };
        match &mut self.inner {
            Some(own) if !own.is_empty() => own.extend(delta),
            _ => self.inner = Some(delta),
        }
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Params {}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
