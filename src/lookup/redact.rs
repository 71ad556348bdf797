//! Response redaction.
//!
//! Removes attribution fields ("credits", "developer", ...) that the upstream
//! embeds anywhere in its JSON. A key is dropped when its lowercased name
//! contains any denylist entry as a substring; the match is on keys only,
//! scalar values are never rewritten.
//!
//! The walk uses an explicit work stack instead of recursion, so nesting depth
//! is bounded by heap, not by the thread stack.

use serde_json::Value;

/// Substrings that mark a key for removal (matched case-insensitively).
pub const DENYLIST: [&str; 7] = [
    "credit",
    "credits",
    "author",
    "developer",
    "created_by",
    "powered_by",
    "api_by",
];

/// Does `key` match the denylist?
pub fn is_denied_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    DENYLIST.iter().any(|needle| lowered.contains(needle))
}

/// Strip denied keys from every object in `tree`, in place.
///
/// Returns the number of keys removed. Idempotent: a second pass removes
/// nothing.
pub fn redact(tree: &mut Value) -> usize {
    let mut removed = 0;
    let mut stack: Vec<&mut Value> = vec![tree];

    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                let before = map.len();
                map.retain(|key, _| !is_denied_key(key));
                removed += before - map.len();
                stack.extend(map.values_mut());
            }
            Value::Array(items) => stack.extend(items.iter_mut()),
            _ => {}
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_removes_keys_at_any_depth() {
        let mut tree = json!({
            "name": "alice",
            "Credits": "someone",
            "results": [
                {"email": "a@b.com", "api_developer": "x", "nested": {"Powered_By": "y", "keep": 1}},
                "plain string",
                [ {"AUTHOR": "z", "score": 2.5} ]
            ],
            "meta": {"created_by": "bot", "count": 3, "flag": true, "nothing": null}
        });

        let removed = redact(&mut tree);

        assert_eq!(removed, 5);
        assert_eq!(
            tree,
            json!({
                "name": "alice",
                "results": [
                    {"email": "a@b.com", "nested": {"keep": 1}},
                    "plain string",
                    [ {"score": 2.5} ]
                ],
                "meta": {"count": 3, "flag": true, "nothing": null}
            })
        );
    }

    #[test]
    fn test_values_are_never_inspected() {
        let mut tree = json!({"note": "credit card ending 1234", "by": "author unknown"});
        let expected = tree.clone();
        assert_eq!(redact(&mut tree), 0);
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_idempotent() {
        let mut tree = json!([{"credit": 1, "data": {"developer_note": 2, "ok": [1, 2, 3]}}]);
        redact(&mut tree);
        let once = tree.clone();
        assert_eq!(redact(&mut tree), 0);
        assert_eq!(tree, once);
    }

    #[test]
    fn test_scalars_untouched() {
        let mut scalar = json!("credits");
        assert_eq!(redact(&mut scalar), 0);
        assert_eq!(scalar, json!("credits"));
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut tree = json!({"leaf": true, "author": "x"});
        for _ in 0..50_000 {
            let mut parent = serde_json::Map::new();
            parent.insert("child".to_string(), tree);
            tree = Value::Object(parent);
        }
        assert_eq!(redact(&mut tree), 1);

        // Unwind iteratively; the recursive Drop of a 50k-deep Value would
        // overflow the test thread's stack.
        let mut current = tree;
        while let Value::Object(mut map) = current {
            current = map.remove("child").unwrap_or(Value::Null);
        }
    }
}
