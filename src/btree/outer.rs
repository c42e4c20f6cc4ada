//! Outer-tree internal node: routes between up to 340 children (leaves or
//! deeper internals) using up to 339 sorted separator keys (§4.3).
//!
//! Shaped after [`crate::cl::internal::ClInternal`] one level up: same
//! insert-at-split-point / remove-at / split / merge / borrow contract, just
//! sized for a 4 KiB page instead of a 64 B cache line, and routing to a
//! [`ChildRef`] (which may itself be another internal, or a leaf page /
//! superpage) rather than a same-page CL-slot index.

use crate::config::{OUTER_MAX_CHILDREN, OUTER_MAX_SEPS, OUTER_MIN_SEPS};
use crate::simd;

/// A reference to an outer-tree child: a deeper internal node, or a leaf
/// (a [`crate::page::LeafPage`] under the default/fence/eytzinger hierarchies,
/// or a [`crate::superpage::Superpage`] under the superpage hierarchy — a
/// tree uses exactly one leaf variant for its whole lifetime). Every variant
/// carries a [`Slab`](crate::alloc::Slab) id, not a pointer — see `alloc.rs`
/// for why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRef {
    Internal(u32),
    Leaf(u32),
    Superpage(u32),
}

#[derive(Debug, Clone)]
pub struct OuterInternal {
    seps: Vec<i32>,
    children: Vec<ChildRef>,
}

impl OuterInternal {
    pub fn new(left: ChildRef, right: ChildRef, separator: i32) -> Self {
        Self {
            seps: vec![separator],
            children: vec![left, right],
        }
    }

    pub fn nseps(&self) -> usize {
        self.seps.len()
    }

    pub fn seps(&self) -> &[i32] {
        &self.seps
    }

    pub fn children(&self) -> &[ChildRef] {
        &self.children
    }

    pub fn is_full(&self) -> bool {
        self.seps.len() >= OUTER_MAX_SEPS
    }

    pub fn underflows(&self) -> bool {
        self.seps.len() < OUTER_MIN_SEPS
    }

    /// Index of the child to descend into for `key`.
    pub fn child_index(&self, key: i32) -> usize {
        simd::upper_bound(&self.seps, key)
    }

    pub fn child_at(&self, idx: usize) -> ChildRef {
        self.children[idx]
    }

    pub fn replace_child(&mut self, idx: usize, child: ChildRef) {
        self.children[idx] = child;
    }

    pub fn replace_separator(&mut self, idx: usize, key: i32) {
        self.seps[idx] = key;
    }

    /// Insert a new `(separator, right_child)` pair produced by splitting
    /// the child at `child_idx`. Caller must ensure `!is_full()`.
    pub fn insert_split(&mut self, child_idx: usize, separator: i32, new_right_child: ChildRef) {
        debug_assert!(!self.is_full());
        self.seps.insert(child_idx, separator);
        self.children.insert(child_idx + 1, new_right_child);
    }

    /// Remove the child at `child_idx` together with the separator that
    /// routes to it (the one to its left, or to its right if `child_idx`
    /// is the leftmost child).
    pub fn remove_child(&mut self, child_idx: usize) {
        let sep_idx = if child_idx == 0 { 0 } else { child_idx - 1 };
        self.seps.remove(sep_idx);
        self.children.remove(child_idx);
    }

    /// Insert `(sep, child)` at the front, shifting everything right. Used
    /// when borrowing a child from a right sibling during rebalance.
    pub fn prepend(&mut self, sep: i32, child: ChildRef) {
        debug_assert!(!self.is_full());
        self.seps.insert(0, sep);
        self.children.insert(0, child);
    }

    /// Append `other`'s separators and children after `self`'s, pulling
    /// `sep` down from the parent as the boundary separator.
    pub fn merge(&mut self, sep: i32, other: &OuterInternal) {
        debug_assert!(self.seps.len() + 1 + other.seps.len() <= OUTER_MAX_SEPS);
        self.seps.push(sep);
        self.seps.extend_from_slice(&other.seps);
        self.children.extend_from_slice(&other.children);
    }

    /// Split a full internal node. `self` keeps the left half; the median
    /// separator is promoted to the caller, and the right half is returned
    /// as a new sibling.
    pub fn split(&mut self) -> (i32, OuterInternal) {
        debug_assert!(self.is_full());
        let mid = self.seps.len() / 2;
        let promoted = self.seps[mid];

        let right_seps = self.seps.split_off(mid + 1);
        self.seps.truncate(mid);
        let right_children = self.children.split_off(mid + 1);

        (
            promoted,
            OuterInternal {
                seps: right_seps,
                children: right_children,
            },
        )
    }

    /// Bottom-up construction from a sequence of `(child, first_key)` pairs
    /// (used by the outer tree's top-level `bulk_load`). `group[0].1` is not
    /// stored (it's this node's own separator one level up).
    pub fn from_group(group: &[(ChildRef, i32)]) -> Self {
        debug_assert!(group.len() >= 2 && group.len() <= OUTER_MAX_CHILDREN);
        let mut node = OuterInternal::new(group[0].0, group[1].0, group[1].1);
        for pair in &group[2..] {
            node.insert_split(node.nseps(), pair.1, pair.0);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_index_routes_correctly() {
        let mut node = OuterInternal::new(ChildRef::Leaf(0), ChildRef::Leaf(1), 50);
        node.insert_split(1, 100, ChildRef::Leaf(2));
        assert_eq!(node.child_index(10), 0);
        assert_eq!(node.child_index(50), 1);
        assert_eq!(node.child_index(75), 1);
        assert_eq!(node.child_index(100), 2);
        assert_eq!(node.child_index(200), 2);
    }

    #[test]
    fn split_preserves_order_and_promotes_median() {
        let mut node = OuterInternal::new(ChildRef::Leaf(0), ChildRef::Leaf(1), 10);
        for (i, sep) in (20..).step_by(10).take(400).enumerate() {
            node.insert_split(node.nseps(), sep, ChildRef::Leaf((i + 2) as u32));
        }
        assert!(node.is_full());
        let (promoted, right) = node.split();
        assert!(node.seps().last().copied().unwrap_or(i32::MIN) < promoted);
        assert!(right.seps().first().copied().unwrap_or(i32::MAX) > promoted);
        assert_eq!(node.nseps() + right.nseps() + 1, OUTER_MAX_SEPS);
    }
}
