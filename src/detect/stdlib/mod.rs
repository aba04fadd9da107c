//! Standard library allow-list per ecosystem.
//!
//! Embedded lists cover the language's own modules. Extra names can be
//! layered on top from configuration; they never replace the embedded set.

use std::collections::{BTreeMap, BTreeSet};

use crate::registry::Ecosystem;

mod fallback;

/// Names that resolve without a package registry.
#[derive(Debug, Clone)]
pub struct StdlibAllowList {
    modules: BTreeMap<Ecosystem, BTreeSet<String>>,
}

impl Default for StdlibAllowList {
    fn default() -> Self {
        Self::embedded()
    }
}

impl StdlibAllowList {
    /// The embedded lists only.
    pub fn embedded() -> Self {
        let mut modules = BTreeMap::new();
        modules.insert(Ecosystem::PyPI, to_set(fallback::PYTHON));
        modules.insert(Ecosystem::Crates, to_set(fallback::RUST));
        Self { modules }
    }

    /// Add names to an ecosystem's list.
    pub fn extend<I, S>(&mut self, ecosystem: Ecosystem, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules
            .entry(ecosystem)
            .or_default()
            .extend(names.into_iter().map(Into::into));
    }

    /// Check if a top-level module is part of the standard library.
    pub fn contains(&self, ecosystem: Ecosystem, module: &str) -> bool {
        let top = module
            .split(|c| c == '.' || c == ':')
            .find(|s| !s.is_empty())
            .unwrap_or(module);
        self.modules
            .get(&ecosystem)
            .is_some_and(|set| set.contains(top))
    }

    /// Number of names known for an ecosystem.
    pub fn len(&self, ecosystem: Ecosystem) -> usize {
        self.modules.get(&ecosystem).map_or(0, BTreeSet::len)
    }
}

fn to_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_stdlib() {
        let list = StdlibAllowList::embedded();
        assert!(list.contains(Ecosystem::PyPI, "os"));
        assert!(list.contains(Ecosystem::PyPI, "os.path"));
        assert!(list.contains(Ecosystem::PyPI, "json"));
        assert!(list.contains(Ecosystem::PyPI, "pathlib"));
        assert!(list.contains(Ecosystem::PyPI, "__future__"));
        assert!(!list.contains(Ecosystem::PyPI, "requests"));
        assert!(!list.contains(Ecosystem::PyPI, "std"));
    }

    #[test]
    fn test_rust_stdlib() {
        let list = StdlibAllowList::embedded();
        assert!(list.contains(Ecosystem::Crates, "std"));
        assert!(list.contains(Ecosystem::Crates, "std::collections"));
        assert!(list.contains(Ecosystem::Crates, "alloc"));
        assert!(!list.contains(Ecosystem::Crates, "serde"));
    }

    #[test]
    fn test_extend() {
        let mut list = StdlibAllowList::embedded();
        let before = list.len(Ecosystem::PyPI);
        list.extend(Ecosystem::PyPI, ["_internal_vendor"]);
        assert!(list.contains(Ecosystem::PyPI, "_internal_vendor"));
        assert_eq!(list.len(Ecosystem::PyPI), before + 1);
    }
}
