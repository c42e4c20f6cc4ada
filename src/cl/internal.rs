//! CL-internal: a 64-byte cache-line node routing to up to 13 children,
//! each identified by its slot index within the owning page's CL-slot
//! array (so a single byte per child suffices — a page never has more
//! than 63 CL-slots).
//!
//! Byte layout:
//!
//! ```text
//! offset  size  field
//! 0       48    seps: [i32; 12], ascending, first `nseps` valid
//! 48      13    children: [u8; 13] CL-slot indices, first `nseps + 1` valid
//! 61      1     nseps: u8
//! 62      1     padding
//! 63      1     kind: u8 (1 = internal)
//! ```

use crate::config::{CL_INTERNAL_MAX_CHILDREN, CL_INTERNAL_MAX_SEPS, CL_INTERNAL_MIN_SEPS, CL_SIZE};
use crate::simd;

pub const KIND_INTERNAL: u8 = 1;
/// Sentinel marking an unused child slot.
pub const NO_CHILD: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClInternal {
    seps: [i32; CL_INTERNAL_MAX_SEPS],
    children: [u8; CL_INTERNAL_MAX_CHILDREN],
    nseps: usize,
}

impl ClInternal {
    pub fn new(left_child: u8, right_child: u8, separator: i32) -> Self {
        let mut children = [NO_CHILD; CL_INTERNAL_MAX_CHILDREN];
        children[0] = left_child;
        children[1] = right_child;
        let mut seps = [0i32; CL_INTERNAL_MAX_SEPS];
        seps[0] = separator;
        Self {
            seps,
            children,
            nseps: 1,
        }
    }

    pub fn nseps(&self) -> usize {
        self.nseps
    }

    pub fn seps(&self) -> &[i32] {
        &self.seps[..self.nseps]
    }

    pub fn children(&self) -> &[u8] {
        &self.children[..self.nseps + 1]
    }

    pub fn children_mut(&mut self) -> &mut [u8] {
        let n = self.nseps + 1;
        &mut self.children[..n]
    }

    pub fn is_full(&self) -> bool {
        self.nseps == CL_INTERNAL_MAX_SEPS
    }

    pub fn underflows(&self) -> bool {
        self.nseps < CL_INTERNAL_MIN_SEPS
    }

    /// Index of the child to descend into for `key`.
    pub fn child_index(&self, key: i32) -> usize {
        simd::upper_bound(self.seps(), key)
    }

    pub fn child_at(&self, idx: usize) -> u8 {
        self.children[idx]
    }

    /// Insert a new (separator, right_child) pair produced by splitting the
    /// child currently at `child_idx`. Caller must ensure `!is_full()`.
    pub fn insert_split(&mut self, child_idx: usize, separator: i32, new_right_child: u8) {
        debug_assert!(!self.is_full());
        for i in (child_idx..self.nseps).rev() {
            self.seps[i + 1] = self.seps[i];
        }
        self.seps[child_idx] = separator;
        for i in (child_idx + 1..=self.nseps + 1).rev() {
            self.children[i] = self.children[i - 1];
        }
        self.children[child_idx + 1] = new_right_child;
        self.nseps += 1;
    }

    /// Remove the child at `child_idx` together with the separator that
    /// routed to it (the separator to its left if it's not the leftmost
    /// child, otherwise the separator to its right).
    pub fn remove_child(&mut self, child_idx: usize) {
        let sep_idx = if child_idx == 0 { 0 } else { child_idx - 1 };
        for i in sep_idx..self.nseps - 1 {
            self.seps[i] = self.seps[i + 1];
        }
        for i in child_idx..self.nseps {
            self.children[i] = self.children[i + 1];
        }
        self.nseps -= 1;
    }

    pub fn replace_separator(&mut self, idx: usize, key: i32) {
        self.seps[idx] = key;
    }

    /// Insert `(sep, child)` at the front, shifting everything right. Used
    /// when borrowing a child from a right sibling during rebalance.
    pub fn prepend(&mut self, sep: i32, child: u8) {
        debug_assert!(!self.is_full());
        for i in (0..self.nseps).rev() {
            self.seps[i + 1] = self.seps[i];
        }
        self.seps[0] = sep;
        for i in (0..=self.nseps).rev() {
            self.children[i + 1] = self.children[i];
        }
        self.children[0] = child;
        self.nseps += 1;
    }

    /// Append `other`'s separators and children after `self`'s, pulling
    /// `sep` down from the parent as the boundary separator between them.
    pub fn merge(&mut self, sep: i32, other: &ClInternal) {
        debug_assert!(self.nseps + 1 + other.nseps <= CL_INTERNAL_MAX_SEPS);
        let orig_children = self.nseps + 1;
        self.seps[self.nseps] = sep;
        self.nseps += 1;
        for &s in other.seps() {
            self.seps[self.nseps] = s;
            self.nseps += 1;
        }
        for (i, &c) in other.children().iter().enumerate() {
            self.children[orig_children + i] = c;
        }
    }

    /// Split a full internal node in half. `self` keeps the left half plus
    /// the median-promoted separator is returned along with the new right
    /// sibling.
    pub fn split(&mut self) -> (i32, ClInternal) {
        debug_assert!(self.is_full());
        let mid = self.nseps / 2;
        let promoted = self.seps[mid];

        let mut right = ClInternal {
            seps: [0; CL_INTERNAL_MAX_SEPS],
            children: [NO_CHILD; CL_INTERNAL_MAX_CHILDREN],
            nseps: self.nseps - mid - 1,
        };
        right.seps[..right.nseps].copy_from_slice(&self.seps[mid + 1..self.nseps]);
        let nchildren_right = right.nseps + 1;
        right.children[..nchildren_right]
            .copy_from_slice(&self.children[mid + 1..mid + 1 + nchildren_right]);

        self.nseps = mid;
        (promoted, right)
    }

    pub fn to_bytes(&self) -> [u8; CL_SIZE] {
        let mut buf = [0u8; CL_SIZE];
        for (i, &s) in self.seps.iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&s.to_le_bytes());
        }
        buf[48..48 + CL_INTERNAL_MAX_CHILDREN].copy_from_slice(&self.children);
        buf[61] = self.nseps as u8;
        buf[63] = KIND_INTERNAL;
        buf
    }

    pub fn from_bytes(buf: &[u8; CL_SIZE]) -> Self {
        let mut seps = [0i32; CL_INTERNAL_MAX_SEPS];
        for (i, s) in seps.iter_mut().enumerate() {
            *s = i32::from_le_bytes(buf[i * 4..i * 4 + 4].try_into().unwrap());
        }
        let mut children = [NO_CHILD; CL_INTERNAL_MAX_CHILDREN];
        children.copy_from_slice(&buf[48..48 + CL_INTERNAL_MAX_CHILDREN]);
        Self {
            seps,
            children,
            nseps: buf[61] as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_index_routes_correctly() {
        let mut node = ClInternal::new(0, 1, 50);
        node.insert_split(1, 100, 2);
        // seps: [50, 100], children: [0, 1, 2]
        assert_eq!(node.child_index(10), 0);
        assert_eq!(node.child_index(50), 1);
        assert_eq!(node.child_index(75), 1);
        assert_eq!(node.child_index(100), 2);
        assert_eq!(node.child_index(200), 2);
    }

    #[test]
    fn split_preserves_order_and_promotes_median() {
        let mut node = ClInternal::new(0, 1, 10);
        for (i, sep) in (20..).step_by(10).take(11).enumerate() {
            node.insert_split(node.nseps(), sep, (i + 2) as u8);
        }
        assert!(node.is_full());
        let (promoted, right) = node.split();
        assert!(node.seps().last().copied().unwrap_or(i32::MIN) < promoted);
        assert!(right.seps().first().copied().unwrap_or(i32::MAX) > promoted);
        assert_eq!(node.nseps() + right.nseps() + 1, CL_INTERNAL_MAX_SEPS);
    }

    #[test]
    fn roundtrip_bytes() {
        let mut node = ClInternal::new(3, 4, 42);
        node.insert_split(1, 99, 5);
        let bytes = node.to_bytes();
        let back = ClInternal::from_bytes(&bytes);
        assert_eq!(node, back);
    }
}
