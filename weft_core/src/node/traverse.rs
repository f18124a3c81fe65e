// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge iteration utilities.

use core::slice;

use super::id::NodeId;
use super::store::NodeStore;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    edges: slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, edges: &'a [u32]) -> Self {
        Self {
            store,
            edges: edges.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.edges.next().map(|&idx| self.store.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.edges.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        self.edges.next_back().map(|&idx| self.store.id_at(idx))
    }
}

/// An iterator over the parents of a node.
///
/// Parent order is unspecified. Created by [`NodeStore::parents`].
#[derive(Debug)]
pub struct Parents<'a> {
    store: &'a NodeStore,
    edges: slice::Iter<'a, u32>,
}

impl<'a> Parents<'a> {
    pub(crate) fn new(store: &'a NodeStore, edges: &'a [u32]) -> Self {
        Self {
            store,
            edges: edges.iter(),
        }
    }
}

impl Iterator for Parents<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.edges.next().map(|&idx| self.store.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.edges.size_hint()
    }
}

impl ExactSizeIterator for Parents<'_> {}
