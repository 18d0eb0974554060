//! Property tests for working-directory confinement.

mod common;

use grok_cli::PathGuard;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(common::proptest_config())]

    /// Any relative path built from ordinary components stays inside, existing or not.
    #[test]
    fn relative_paths_below_boundary_are_allowed(parts in prop::collection::vec(common::path_component(), 1..5)) {
        let dir = tempfile::tempdir().unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();
        let rel = parts.join("/");
        prop_assert!(guard.is_path_allowed(&rel));

        let abs = guard.boundary().join(&rel);
        prop_assert!(guard.is_path_allowed(abs.to_str().unwrap()));
    }

    /// Climbing one level more than the path descends always escapes.
    #[test]
    fn climbing_above_boundary_is_denied(
        parts in prop::collection::vec(common::path_component(), 0..4),
        tail in common::path_component(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();
        let mut rel = String::new();
        for p in &parts {
            rel.push_str(p);
            rel.push('/');
        }
        for _ in 0..=parts.len() {
            rel.push_str("../");
        }
        rel.push_str(&tail);
        prop_assert!(!guard.is_path_allowed(&rel), "{} should escape", rel);
    }

    /// Allowed arguments never produce a violation; a single escaping one always does.
    #[test]
    fn violation_tracks_the_escaping_argument(name in common::path_component()) {
        let dir = tempfile::tempdir().unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();

        let ok = json!({"path": format!("sub/{name}"), "content": name.clone()});
        prop_assert_eq!(guard.find_violation(&ok, &["path"]), None);

        let escape = format!("../{name}");
        let bad = json!({"path": "fine.txt", "extra": [escape.clone()]});
        prop_assert_eq!(guard.find_violation(&bad, &["path"]), Some(escape.as_str()));
    }
}
