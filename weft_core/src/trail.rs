// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root-to-node paths through the scene DAG.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::node::NodeId;

/// An ordered path of nodes from a root down to a leaf node.
///
/// Because a node may have several parents, the trail (not the node) is the
/// unit of rendered identity: every distinct trail to a node becomes its own
/// [instance](crate::display::Display::instances_of).
///
/// Alongside the nodes, a trail remembers the child index taken at each step.
/// Indices are a lookup hint and can go stale when siblings are reordered, so
/// equality, ordering and hashing consider the node sequence only.
#[derive(Clone)]
pub struct Trail {
    nodes: Vec<NodeId>,
    indices: Vec<u32>,
}

impl Trail {
    /// Returns the single-node trail rooted at `root`.
    #[must_use]
    pub fn root(root: NodeId) -> Self {
        Self {
            nodes: alloc::vec![root],
            indices: Vec::new(),
        }
    }

    /// Returns this trail extended by `child`, reached as child number
    /// `index` of the current leaf.
    #[must_use]
    pub fn with_child(&self, child: NodeId, index: u32) -> Self {
        debug_assert!(
            !self.contains(child),
            "trail already contains {child:?}; the scene has a cycle"
        );
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(child);
        let mut indices = Vec::with_capacity(self.indices.len() + 1);
        indices.extend_from_slice(&self.indices);
        indices.push(index);
        Self { nodes, indices }
    }

    /// Returns the trail one step shorter, or `None` for a root trail.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.nodes.len() < 2 {
            return None;
        }
        Some(Self {
            nodes: self.nodes[..self.nodes.len() - 1].to_vec(),
            indices: self.indices[..self.indices.len() - 1].to_vec(),
        })
    }

    /// The nodes from root to leaf.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The child index taken at each step; one shorter than [`nodes`](Self::nodes).
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The last node of the trail.
    #[must_use]
    pub fn leaf(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// The first node of the trail.
    #[must_use]
    pub fn root_node(&self) -> NodeId {
        self.nodes[0]
    }

    /// Number of nodes on the trail (always at least one).
    #[must_use]
    #[expect(clippy::len_without_is_empty, reason = "a trail is never empty")]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether `node` lies on this trail.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns whether this trail is a strict prefix of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.nodes.len() < other.nodes.len() && other.nodes.starts_with(&self.nodes)
    }
}

impl PartialEq for Trail {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for Trail {}

impl PartialOrd for Trail {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Trail {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nodes.cmp(&other.nodes)
    }
}

impl Hash for Trail {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nodes.hash(state);
    }
}

impl fmt::Debug for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Trail[")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{}", node.index())?;
        }
        f.write_str("]")
    }
}
