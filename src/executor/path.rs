//! Persistent error-reporting paths (spec §4.6 "Error model").
//!
//! A path is extended by pushing a new frame and cloning the `Rc` handle to
//! the parent -- cheap to share across every sibling future in a selection
//! set, since only the leaf that eventually produces an error ever walks it
//! back to the root.

use std::rc::Rc;

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

struct PathNode {
    segment: PathSegment,
    parent: Option<Rc<PathNode>>,
}

/// An immutable path from the response root to the current field/list index.
#[derive(Clone, Debug, Default)]
pub struct ResponsePath(Option<Rc<PathNode>>);

impl ResponsePath {
    pub fn root() -> Self {
        ResponsePath(None)
    }

    pub fn push_key(&self, key: impl Into<String>) -> Self {
        ResponsePath(Some(Rc::new(PathNode {
            segment: PathSegment::Key(key.into()),
            parent: self.0.clone(),
        })))
    }

    pub fn push_index(&self, index: usize) -> Self {
        ResponsePath(Some(Rc::new(PathNode {
            segment: PathSegment::Index(index),
            parent: self.0.clone(),
        })))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn to_vec(&self) -> Vec<PathSegment> {
        let mut segments = Vec::new();
        let mut node = self.0.clone();
        while let Some(n) = node {
            segments.push(n.segment.clone());
            node = n.parent.clone();
        }
        segments.reverse();
        segments
    }
}

impl PartialEq for ResponsePath {
    fn eq(&self, other: &Self) -> bool {
        self.to_vec() == other.to_vec()
    }
}
impl Eq for ResponsePath {}

impl PartialOrd for ResponsePath {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResponsePath {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_vec().iter().map(path_segment_key).collect::<Vec<_>>()
            .cmp(&other.to_vec().iter().map(path_segment_key).collect::<Vec<_>>())
    }
}

fn path_segment_key(segment: &PathSegment) -> String {
    match segment {
        PathSegment::Key(k) => k.clone(),
        PathSegment::Index(i) => format!("{i:020}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_path_in_order() {
        let root = ResponsePath::root();
        let path = root.push_key("user").push_key("pets").push_index(2).push_key("name");
        assert_eq!(
            path.to_vec(),
            vec![
                PathSegment::Key("user".into()),
                PathSegment::Key("pets".into()),
                PathSegment::Index(2),
                PathSegment::Key("name".into()),
            ]
        );
    }

    #[test]
    fn sibling_paths_do_not_interfere() {
        let base = ResponsePath::root().push_key("user");
        let a = base.push_key("a");
        let b = base.push_key("b");
        assert_ne!(a.to_vec(), b.to_vec());
        assert_eq!(base.to_vec(), vec![PathSegment::Key("user".into())]);
    }
}
