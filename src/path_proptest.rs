//! Property-based tests for path identity functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{is_wildcard, normalize, relative_key, relative_path_from, resolve};
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    /// Strategy for a single path segment without separators or dots
    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,7}"
    }

    /// Strategy for a relative path of 1-4 segments
    fn relative_path() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..5).prop_map(|parts| parts.join("/"))
    }

    // ============================================================================
    // relative_key property tests
    // ============================================================================

    proptest! {
        /// Property: a relative reference and its absolute form map to the same key
        #[test]
        fn relative_and_absolute_references_share_a_key(
            dir in relative_path(),
            file in relative_path(),
        ) {
            let owner = PathBuf::from(format!("/{}/gitolite.conf", dir));
            let absolute = format!("/{}/{}", dir, file);
            prop_assert_eq!(relative_key(&owner, &file), relative_key(&owner, &absolute));
        }

        /// Property: relative references are never rewritten
        #[test]
        fn relative_key_keeps_relative_references(
            owner in relative_path(),
            file in relative_path(),
        ) {
            prop_assert_eq!(relative_key(Path::new(&owner), &file), file);
        }

        /// Property: relative_key is deterministic (same input = same output)
        #[test]
        fn relative_key_is_deterministic(dir in relative_path(), file in relative_path()) {
            let owner = PathBuf::from(format!("/{}/root.conf", dir));
            let reference = format!("/{}", file);
            prop_assert_eq!(
                relative_key(&owner, &reference),
                relative_key(&owner, &reference)
            );
        }
    }

    // ============================================================================
    // relative_path_from / resolve property tests
    // ============================================================================

    proptest! {
        /// Property: joining the base with the relative result gives back the path
        #[test]
        fn relative_path_from_round_trips(base in relative_path(), target in relative_path()) {
            let base = PathBuf::from(format!("/{}", base));
            let target = PathBuf::from(format!("/{}", target));
            let relative = relative_path_from(&target, &base).expect("both absolute");
            prop_assert_eq!(normalize(&base.join(relative)), normalize(&target));
        }

        /// Property: resolve under an absolute owner always yields an absolute path
        #[test]
        fn resolve_under_absolute_owner_is_absolute(dir in relative_path(), file in relative_path()) {
            let owner = PathBuf::from(format!("/{}/gitolite.conf", dir));
            let resolved = resolve(&owner, &file);
            prop_assert!(Path::new(&resolved).is_absolute());
        }

        /// Property: plain segment paths are never treated as wildcards
        #[test]
        fn plain_paths_are_not_wildcards(path in relative_path()) {
            prop_assert!(!is_wildcard(&path));
        }
    }
}
