//! Path-addressed operations over the managed JSON document.
//!
//! # Data Flow
//! ```text
//! "/apps/web/replicas"
//!     → Path::parse (split once at the boundary)
//!     → get / merge / append / replace / delete against serde_json::Value
//!     → bool outcome; type mismatches are failures, never panics
//! ```
//!
//! # Design Decisions
//! - The document is a plain `serde_json::Value`; no wrapper type
//! - Sequences are append-only: no index addressing, descending through a
//!   sequence by key fails
//! - Edits are the closed `EditOp` vocabulary so the guarded write path
//!   applies a value, not an arbitrary callback

use serde_json::{Map, Value};

/// A parsed slash-delimited address into the document.
///
/// Empty segments are dropped, so `"/a//b/"` and `"a/b"` address the same
/// node. The empty path addresses the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Returns the node at `path`, or `None` if it does not exist.
pub fn get<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut node = doc;
    for seg in path.segments() {
        node = node.as_object()?.get(seg)?;
    }
    Some(node)
}

fn get_mut<'a>(doc: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let mut node = doc;
    for seg in segments {
        node = match node {
            Value::Object(map) => map.get_mut(seg)?,
            _ => return None,
        };
    }
    Some(node)
}

/// True if the node at `path` is an object or a sequence.
///
/// The root is always considered composite: structural edits against the
/// whole document are legal even before it holds one.
pub fn is_composite(doc: &Value, path: &Path) -> bool {
    if path.is_root() {
        return true;
    }
    matches!(get(doc, path), Some(Value::Object(_)) | Some(Value::Array(_)))
}

/// True if the node at `path` is specifically an object.
pub fn is_object(doc: &Value, path: &Path) -> bool {
    matches!(get(doc, path), Some(Value::Object(_)))
}

/// Merges `object`'s keys into the object at `path`.
///
/// Keys in `object` overwrite same-named keys; other keys are preserved.
/// Fails if `path` does not resolve to an object.
pub fn merge(doc: &mut Value, path: &Path, object: &Map<String, Value>) -> bool {
    let Some(target) = get_mut(doc, path.segments()).and_then(Value::as_object_mut) else {
        return false;
    };
    for (key, value) in object {
        target.insert(key.clone(), value.clone());
    }
    true
}

// Walks to the slot at `path`, creating missing intermediate objects.
// A freshly created (or explicitly null) slot comes back as Null. Fails
// when the walk descends into a non-object node.
fn ensure_slot<'a>(doc: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut node = doc;
    for seg in path.segments() {
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => map.entry(seg.clone()).or_insert(Value::Null),
            _ => return None,
        };
    }
    Some(node)
}

/// Appends `value` to the sequence at `path`.
///
/// A missing node becomes a new one-element sequence, with any missing
/// ancestor objects created along the way. An existing non-sequence node
/// is a failure.
pub fn append(doc: &mut Value, path: &Path, value: Value) -> bool {
    match ensure_slot(doc, path) {
        Some(Value::Array(seq)) => {
            seq.push(value);
            true
        }
        Some(slot @ Value::Null) => {
            *slot = Value::Array(vec![value]);
            true
        }
        _ => false,
    }
}

/// Replaces the node at `path` with `value` wholesale, creating missing
/// intermediate objects. Fails only when the path traverses a node that
/// cannot hold children.
pub fn replace(doc: &mut Value, path: &Path, value: Value) -> bool {
    match ensure_slot(doc, path) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

/// Removes the node at `path`; fails if it does not exist. Deleting the
/// root resets the whole document.
pub fn delete(doc: &mut Value, path: &Path) -> bool {
    let Some((last, parents)) = path.segments().split_last() else {
        *doc = Value::Null;
        return true;
    };
    get_mut(doc, parents)
        .and_then(Value::as_object_mut)
        .and_then(|obj| obj.remove(last))
        .is_some()
}

/// One structural edit against the document.
///
/// The guarded write path applies exactly one of these per mutation
/// attempt; a `false` outcome means the target path did not resolve to
/// the node type the edit requires, and the document may be discarded.
#[derive(Debug, Clone)]
pub enum EditOp {
    Merge { path: Path, object: Map<String, Value> },
    Append { path: Path, value: Value },
    Replace { path: Path, value: Value },
    Delete { path: Path },
}

impl EditOp {
    pub fn apply(&self, doc: &mut Value) -> bool {
        match self {
            EditOp::Merge { path, object } => merge(doc, path, object),
            EditOp::Append { path, value } => append(doc, path, value.clone()),
            EditOp::Replace { path, value } => replace(doc, path, value.clone()),
            EditOp::Delete { path } => delete(doc, path),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            EditOp::Merge { path, .. }
            | EditOp::Append { path, .. }
            | EditOp::Replace { path, .. }
            | EditOp::Delete { path } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_parse() {
        assert!(Path::parse("").is_root());
        assert!(Path::parse("/").is_root());
        assert_eq!(Path::parse("/a/b").segments(), ["a", "b"]);
        assert_eq!(Path::parse("a//b/").segments(), ["a", "b"]);
        assert_eq!(Path::parse("/a/b").to_string(), "/a/b");
    }

    #[test]
    fn test_get() {
        let doc = json!({"a": {"b": [1, 2]}});
        assert_eq!(get(&doc, &Path::parse("/a/b")), Some(&json!([1, 2])));
        assert_eq!(get(&doc, &Path::root()), Some(&doc));
        assert_eq!(get(&doc, &Path::parse("/a/missing")), None);
        // No index addressing into sequences
        assert_eq!(get(&doc, &Path::parse("/a/b/0")), None);
    }

    #[test]
    fn test_predicates() {
        let doc = json!({"obj": {}, "seq": [], "num": 7});
        assert!(is_composite(&doc, &Path::parse("/obj")));
        assert!(is_composite(&doc, &Path::parse("/seq")));
        assert!(!is_composite(&doc, &Path::parse("/num")));
        assert!(!is_composite(&doc, &Path::parse("/missing")));
        assert!(is_composite(&doc, &Path::root())); // root is always composite
        assert!(is_object(&doc, &Path::parse("/obj")));
        assert!(!is_object(&doc, &Path::parse("/seq")));
    }

    #[test]
    fn test_merge_overwrites_and_preserves() {
        let mut doc = json!({"a": {"keep": 1, "swap": 2}});
        let patch = json!({"swap": 3, "new": 4});
        assert!(merge(&mut doc, &Path::parse("/a"), patch.as_object().unwrap()));
        assert_eq!(doc, json!({"a": {"keep": 1, "swap": 3, "new": 4}}));
    }

    #[test]
    fn test_merge_on_non_object_fails_without_mutation() {
        let mut doc = json!({"a": [1], "b": 2});
        let before = doc.clone();
        let patch = json!({"x": 1});
        let patch = patch.as_object().unwrap();
        assert!(!merge(&mut doc, &Path::parse("/a"), patch));
        assert!(!merge(&mut doc, &Path::parse("/b"), patch));
        assert!(!merge(&mut doc, &Path::parse("/missing"), patch));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_append_to_existing_sequence() {
        let mut doc = json!({"list": ["a"]});
        assert!(append(&mut doc, &Path::parse("/list"), json!("b")));
        assert_eq!(doc, json!({"list": ["a", "b"]}));
    }

    #[test]
    fn test_append_creates_sequence_and_ancestors() {
        let mut doc = json!({});
        assert!(append(&mut doc, &Path::parse("/a/b/list"), json!("x")));
        assert_eq!(doc, json!({"a": {"b": {"list": ["x"]}}}));
    }

    #[test]
    fn test_append_to_scalar_fails() {
        let mut doc = json!({"a": 1});
        assert!(!append(&mut doc, &Path::parse("/a"), json!("x")));
        assert!(!append(&mut doc, &Path::parse("/a/deeper"), json!("x")));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn test_replace() {
        let mut doc = json!({"a": 1});
        assert!(replace(&mut doc, &Path::parse("/a"), json!(2)));
        assert_eq!(doc, json!({"a": 2}));
        assert!(replace(&mut doc, &Path::parse("/b/c"), json!(true)));
        assert_eq!(doc, json!({"a": 2, "b": {"c": true}}));
        // Whole-document replacement through the root path
        assert!(replace(&mut doc, &Path::root(), json!([1])));
        assert_eq!(doc, json!([1]));
        // Cannot descend into a scalar
        let mut doc = json!({"a": 1});
        assert!(!replace(&mut doc, &Path::parse("/a/b"), json!(2)));
    }

    #[test]
    fn test_delete() {
        let mut doc = json!({"a": {"b": 1}, "c": 2});
        assert!(delete(&mut doc, &Path::parse("/a/b")));
        assert_eq!(doc, json!({"a": {}, "c": 2}));
        assert!(!delete(&mut doc, &Path::parse("/a/b")));
        assert!(!delete(&mut doc, &Path::parse("/nope")));
        assert!(delete(&mut doc, &Path::root()));
        assert_eq!(doc, Value::Null);
    }

    #[test]
    fn test_edit_op_apply() {
        let mut doc = json!({"a": {}});
        let op = EditOp::Merge {
            path: Path::parse("/a"),
            object: json!({"k": "v"}).as_object().unwrap().clone(),
        };
        assert!(op.apply(&mut doc));
        assert_eq!(doc, json!({"a": {"k": "v"}}));

        let op = EditOp::Delete { path: Path::parse("/a/k") };
        assert!(op.apply(&mut doc));
        assert_eq!(op.path().to_string(), "/a/k");
    }
}
