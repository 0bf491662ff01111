//! Verified, queryable permissions of one module.
//!
//! A [`ModulePermissions`] is only ever built from a manifest whose artifact
//! hash (and signature, when configured) has been checked. Grants are
//! indexed by action token; lookups then test target patterns in manifest
//! order.

use std::collections::HashMap;

use crate::manifest::PermissionsManifest;

/// Action token that matches every action.
pub const ANY_ACTION: &str = "*";

/// A target pattern. `*` matches any run of characters, `/` included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPattern {
    Exact(String),
    Glob(String),
}

impl TargetPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern.contains('*') {
            TargetPattern::Glob(pattern.to_string())
        } else {
            TargetPattern::Exact(pattern.to_string())
        }
    }

    /// The pattern as written in the manifest.
    pub fn as_str(&self) -> &str {
        match self {
            TargetPattern::Exact(p) | TargetPattern::Glob(p) => p,
        }
    }

    /// Case-sensitive match against a concrete target.
    pub fn matches(&self, target: &str) -> bool {
        match self {
            TargetPattern::Exact(p) => p == target,
            TargetPattern::Glob(p) => glob_match(p.as_bytes(), target.as_bytes()),
        }
    }
}

/// Wildcard match with single-star backtracking.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = star {
            // Let the last star absorb one more character.
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

#[derive(Debug, Clone)]
struct GrantEntry {
    target: TargetPattern,
    permission: String,
}

/// The authorization view of a verified manifest.
#[derive(Debug, Clone)]
pub struct ModulePermissions {
    module: String,
    hash_algorithm: String,
    module_hash: String,
    /// Lowercased action token -> indexes into `entries`, in manifest order.
    by_action: HashMap<String, Vec<usize>>,
    entries: Vec<GrantEntry>,
}

impl ModulePermissions {
    /// Project a manifest that already passed verification.
    pub(crate) fn verified(manifest: &PermissionsManifest) -> Self {
        let mut by_action: HashMap<String, Vec<usize>> = HashMap::new();
        let mut entries = Vec::with_capacity(manifest.grants.len());

        for grant in &manifest.grants {
            let index = entries.len();
            entries.push(GrantEntry {
                target: TargetPattern::parse(&grant.target),
                permission: grant.permission.clone(),
            });
            for token in grant.actions() {
                by_action
                    .entry(token.to_ascii_lowercase())
                    .or_default()
                    .push(index);
            }
        }

        Self {
            module: manifest.name.clone(),
            hash_algorithm: manifest.hash.hash_algorithm.clone(),
            module_hash: manifest.hash.module_jar_hash.clone(),
            by_action,
            entries,
        }
    }

    /// The module these permissions belong to, as named in the manifest.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Hash scheme the artifact was verified with.
    pub fn hash_algorithm(&self) -> &str {
        &self.hash_algorithm
    }

    /// Verified artifact digest, base64 exactly as in the manifest.
    pub fn module_hash(&self) -> &str {
        &self.module_hash
    }

    /// Whether some grant allows `action` on `target`.
    pub fn is_authorized(&self, action: &str, target: &str) -> bool {
        self.permission_class_for(action, target).is_some()
    }

    /// Permission class of the first grant allowing `action` on `target`.
    pub fn permission_class_for(&self, action: &str, target: &str) -> Option<&str> {
        let action = action.trim().to_ascii_lowercase();
        if action.is_empty() {
            return None;
        }

        let exact = self.by_action.get(&action).map(Vec::as_slice).unwrap_or(&[]);
        let wildcard = self.by_action.get(ANY_ACTION).map(Vec::as_slice).unwrap_or(&[]);

        let mut candidates: Vec<usize> = exact.iter().chain(wildcard).copied().collect();
        candidates.sort_unstable();
        candidates.dedup();

        candidates
            .into_iter()
            .map(|i| &self.entries[i])
            .find(|entry| entry.target.matches(target))
            .map(|entry| entry.permission.as_str())
    }

    /// Number of grants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest had no grants. Such a module is authorized for
    /// nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target patterns with their permission classes, in manifest order.
    pub fn targets(&self) -> impl Iterator<Item = (&TargetPattern, &str)> {
        self.entries
            .iter()
            .map(|entry| (&entry.target, entry.permission.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ModuleHash;
    use proptest::prelude::*;

    fn hash() -> ModuleHash {
        ModuleHash {
            hash_algorithm: "SHA256".into(),
            module_jar_hash: "AAAA".into(),
        }
    }

    fn permissions(grants: &[(&str, &str, &str)]) -> ModulePermissions {
        let mut builder = PermissionsManifest::builder("/com/intel/module", hash());
        for (action, target, permission) in grants {
            builder = builder.grant(*action, *target, *permission);
        }
        ModulePermissions::verified(&builder.build())
    }

    #[test]
    fn test_authorization_cases() {
        let perms = permissions(&[("subscribe,publish", "ndn:/intel/node", "ChannelPermission")]);

        assert!(perms.is_authorized("publish", "ndn:/intel/node"));
        assert!(perms.is_authorized("subscribe", "ndn:/intel/node"));
        assert!(!perms.is_authorized("delete", "ndn:/intel/node"));
        assert!(!perms.is_authorized("publish", "ndn:/other/node"));
    }

    #[test]
    fn test_action_matching_is_case_insensitive() {
        let perms = permissions(&[("Subscribe, PUBLISH", "ndn:/a", "P")]);
        assert!(perms.is_authorized("publish", "ndn:/a"));
        assert!(perms.is_authorized(" SUBSCRIBE ", "ndn:/a"));
        assert!(!perms.is_authorized("", "ndn:/a"));
    }

    #[test]
    fn test_target_matching_is_case_sensitive() {
        let perms = permissions(&[("publish", "ndn:/intel/node", "P")]);
        assert!(!perms.is_authorized("publish", "ndn:/Intel/node"));
        assert!(!perms.is_authorized("publish", "ndn:/intel/node/child"));
    }

    #[test]
    fn test_wildcards() {
        let perms = permissions(&[
            ("subscribe", "ndn:/intel/*", "Subscriber"),
            ("*", "ndn:/public/*/status", "Anything"),
        ]);

        assert!(perms.is_authorized("subscribe", "ndn:/intel/node/deep"));
        assert!(!perms.is_authorized("publish", "ndn:/intel/node"));
        assert_eq!(
            perms.permission_class_for("delete", "ndn:/public/node-7/status"),
            Some("Anything")
        );
        assert!(!perms.is_authorized("delete", "ndn:/public/node-7/health"));
    }

    #[test]
    fn test_first_matching_grant_wins() {
        let perms = permissions(&[
            ("publish", "ndn:/a/*", "Broad"),
            ("publish", "ndn:/a/b", "Narrow"),
        ]);
        assert_eq!(perms.permission_class_for("publish", "ndn:/a/b"), Some("Broad"));
    }

    #[test]
    fn test_empty_grants_authorize_nothing() {
        let perms = permissions(&[]);
        assert!(perms.is_empty());
        assert!(!perms.is_authorized("publish", "ndn:/intel/node"));
        assert!(!perms.is_authorized("*", "*"));
        assert_eq!(perms.module_hash(), "AAAA");
        assert_eq!(perms.hash_algorithm(), "SHA256");
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match(b"*", b""));
        assert!(glob_match(b"a*c", b"abbbc"));
        assert!(glob_match(b"a*b*c", b"axbyc"));
        assert!(glob_match(b"**", b"x"));
        assert!(!glob_match(b"a*c", b"abcd"));
        assert!(!glob_match(b"", b"a"));
    }

    proptest! {
        #[test]
        fn test_star_matches_any_suffix(prefix in "[a-z:/]{0,12}", suffix in "[a-z:/*]{0,12}") {
            let pattern = TargetPattern::parse(&format!("{prefix}*"));
            let target = format!("{prefix}{suffix}");
            prop_assert!(pattern.matches(&target));
        }

        #[test]
        fn test_exact_pattern_only_matches_itself(a in "[a-z/]{1,12}", b in "[a-z/]{1,12}") {
            let pattern = TargetPattern::parse(&a);
            prop_assert_eq!(pattern.matches(&b), a == b);
        }
    }
}
