//! # Debug paths.
//!
//! A [`DebugPath`] is the ordered `{id, component_type, component_name}` chain
//! from the root to a node. It is built once when the node attaches, by copying
//! the parent's chain and appending one entry, and never changes afterwards.

use std::fmt;
use std::sync::Arc;

/// One entry of a [`DebugPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugNode {
    /// Sibling-unique id assigned by the parent (the root is `0`).
    pub id: u64,
    /// Free-form component type label (`"eventLoop"`, `"timer"`, ...).
    pub component_type: Arc<str>,
    /// Free-form component name label.
    pub component_name: Arc<str>,
}

/// Immutable root-to-node lineage.
///
/// Cheap to clone (shared slice). Rendered as component names joined by `->`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugPath {
    nodes: Arc<[DebugNode]>,
}

impl DebugPath {
    /// Creates the single-entry path of a root node.
    pub fn root(name: impl Into<Arc<str>>, component_type: impl Into<Arc<str>>) -> Self {
        Self {
            nodes: Arc::new([DebugNode {
                id: 0,
                component_type: component_type.into(),
                component_name: name.into(),
            }]),
        }
    }

    /// Returns a new path: a copy of `self` extended with one child entry.
    ///
    /// `self` is left untouched.
    pub fn child(
        &self,
        id: u64,
        name: impl Into<Arc<str>>,
        component_type: impl Into<Arc<str>>,
    ) -> Self {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend(self.nodes.iter().cloned());
        nodes.push(DebugNode {
            id,
            component_type: component_type.into(),
            component_name: name.into(),
        });
        Self {
            nodes: nodes.into(),
        }
    }

    /// Entries, root first.
    pub fn nodes(&self) -> &[DebugNode] {
        &self.nodes
    }

    /// The entry describing the node itself.
    pub fn leaf(&self) -> &DebugNode {
        // A path always holds at least the root entry.
        &self.nodes[self.nodes.len() - 1]
    }

    /// Number of edges from the root (`0` for the root itself).
    pub fn depth(&self) -> usize {
        self.nodes.len() - 1
    }
}

impl fmt::Display for DebugPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str("->")?;
            }
            f.write_str(&node.component_name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_copies_parent_lineage() {
        let root = DebugPath::root("root", "root");
        let a = root.child(0, "loop", "eventLoop");
        let b = a.child(3, "timer3", "intervalTimer");

        assert_eq!(root.depth(), 0);
        assert_eq!(a.depth(), 1);
        assert_eq!(b.nodes().len(), 3);
        assert_eq!(b.leaf().id, 3);
        assert_eq!(&*b.leaf().component_type, "intervalTimer");
        assert_eq!(b.to_string(), "root->loop->timer3");
        // Parent path is not affected by extension.
        assert_eq!(a.to_string(), "root->loop");
    }
}
