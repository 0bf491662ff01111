//! Mapping module names to channel URIs.

use serde::{Deserialize, Serialize};

/// Places a module's resource at `root` + module path + `extension`.
///
/// The module's leading `/` is dropped, so with an empty root
/// `/com/intel/module` becomes `com/intel/module.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceLocator {
    /// URI prefix, e.g. `file:` or `file:/srv/perms`.
    pub root: String,

    /// Suffix including the dot, e.g. `.json`.
    pub extension: String,
}

impl ResourceLocator {
    pub fn new(root: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Default locator for permission manifests.
    pub fn manifests() -> Self {
        Self::new("", ".json")
    }

    /// Default locator for module artifacts.
    pub fn artifacts() -> Self {
        Self::new("", ".jar")
    }

    /// The URI of `module`'s resource.
    pub fn locate(&self, module: &str) -> String {
        let path = module.trim_start_matches('/');
        let separator = if self.root.is_empty() || self.root.ends_with(['/', ':']) {
            ""
        } else {
            "/"
        };
        format!("{}{}{}{}", self.root, separator, path, self.extension)
    }
}

impl Default for ResourceLocator {
    fn default() -> Self {
        Self::manifests()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate() {
        assert_eq!(ResourceLocator::manifests().locate("perm_file"), "perm_file.json");
        assert_eq!(
            ResourceLocator::manifests().locate("/com/intel/module"),
            "com/intel/module.json"
        );
        assert_eq!(
            ResourceLocator::new("file:", ".json").locate("/com/intel/module"),
            "file:com/intel/module.json"
        );
        assert_eq!(
            ResourceLocator::new("file:/srv/perms", ".json").locate("/m"),
            "file:/srv/perms/m.json"
        );
        assert_eq!(
            ResourceLocator::new("mem:/jars/", ".jar").locate("m"),
            "mem:/jars/m.jar"
        );
    }
}
