//! CL-leaf: the bottom of the nested hierarchy, a single 64-byte cache line
//! holding up to 15 sorted keys with no children.
//!
//! Byte layout (little-endian, matching the teacher's `PageHeader`
//! fixed-offset read/write style in `page/header.rs`, adapted from
//! big-endian file-on-disk fields to little-endian in-memory fields since
//! there is no cross-platform file format to preserve here):
//!
//! ```text
//! offset  size  field
//! 0       60    keys: [i32; 15], ascending, first `len` valid
//! 60      1     len: u8
//! 61      2     padding
//! 63      1     kind: u8 (0 = leaf; present so a page can tell slots apart
//!                          generically without external context)
//! ```

use crate::config::{CL_LEAF_MAX_KEYS, CL_LEAF_MIN_KEYS, CL_SIZE};
use crate::simd;

pub const KIND_LEAF: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClLeaf {
    keys: [i32; CL_LEAF_MAX_KEYS],
    len: usize,
}

impl ClLeaf {
    pub fn empty() -> Self {
        Self {
            keys: [0; CL_LEAF_MAX_KEYS],
            len: 0,
        }
    }

    pub fn from_sorted(keys: &[i32]) -> Self {
        debug_assert!(keys.len() <= CL_LEAF_MAX_KEYS);
        let mut buf = [0i32; CL_LEAF_MAX_KEYS];
        buf[..keys.len()].copy_from_slice(keys);
        Self {
            keys: buf,
            len: keys.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == CL_LEAF_MAX_KEYS
    }

    pub fn underflows(&self) -> bool {
        self.len < CL_LEAF_MIN_KEYS
    }

    pub fn keys(&self) -> &[i32] {
        &self.keys[..self.len]
    }

    pub fn first_key(&self) -> Option<i32> {
        self.keys.first().copied().filter(|_| self.len > 0)
    }

    pub fn last_key(&self) -> Option<i32> {
        if self.len == 0 {
            None
        } else {
            Some(self.keys[self.len - 1])
        }
    }

    pub fn contains(&self, key: i32) -> bool {
        simd::contains(self.keys(), key)
    }

    /// Index of the greatest key `<= query`, using a single SIMD compare at
    /// full register width over the (padded) key array.
    pub fn predecessor(&self, query: i32) -> Option<i32> {
        simd::predecessor_index(self.keys(), query).map(|i| self.keys[i])
    }

    /// Insert `key`, keeping the array sorted. Returns `false` (duplicate,
    /// no-op) if already present. Caller must check `is_full()` first —
    /// an insert into a full node is a logic error (PAGE_FULL is handled
    /// one level up by splitting before descending further).
    pub fn insert(&mut self, key: i32) -> bool {
        debug_assert!(!self.is_full());
        let ub = simd::upper_bound(self.keys(), key);
        if ub > 0 && self.keys[ub - 1] == key {
            return false;
        }
        for i in (ub..self.len).rev() {
            self.keys[i + 1] = self.keys[i];
        }
        self.keys[ub] = key;
        self.len += 1;
        true
    }

    /// Remove `key` if present. Returns `true` if it was removed.
    pub fn delete(&mut self, key: i32) -> bool {
        let ub = simd::upper_bound(self.keys(), key);
        if ub == 0 || self.keys[ub - 1] != key {
            return false;
        }
        let idx = ub - 1;
        for i in idx..self.len - 1 {
            self.keys[i] = self.keys[i + 1];
        }
        self.len -= 1;
        true
    }

    /// Split a full leaf in half, returning the right half (which the
    /// caller installs as a new sibling CL-slot). `self` retains the left
    /// half. The separator for the parent CL-internal node is the first
    /// key of the returned right half.
    pub fn split(&mut self) -> Self {
        debug_assert!(self.is_full());
        let mid = self.len / 2;
        let right = Self::from_sorted(&self.keys[mid..self.len]);
        self.len = mid;
        right
    }

    /// Redistribute one key from `self` into `left_sibling` (used when
    /// `left_sibling` underflows and `self` has keys to spare), or vice
    /// versa depending on call direction — always moves the boundary key.
    pub fn borrow_leftmost_into(&mut self, donor: &mut ClLeaf) {
        debug_assert!(!self.is_empty());
        let moved = self.keys[0];
        for i in 0..self.len - 1 {
            self.keys[i] = self.keys[i + 1];
        }
        self.len -= 1;
        donor.insert(moved);
    }

    pub fn borrow_rightmost_into(&mut self, donor: &mut ClLeaf) {
        debug_assert!(!self.is_empty());
        let moved = self.keys[self.len - 1];
        self.len -= 1;
        donor.insert(moved);
    }

    /// Merge `other` (which must sort entirely after `self`) into `self`.
    pub fn merge(&mut self, other: &ClLeaf) {
        debug_assert!(self.len + other.len <= CL_LEAF_MAX_KEYS);
        for &k in other.keys() {
            self.keys[self.len] = k;
            self.len += 1;
        }
    }

    pub fn to_bytes(&self) -> [u8; CL_SIZE] {
        let mut buf = [0u8; CL_SIZE];
        for (i, &k) in self.keys.iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&k.to_le_bytes());
        }
        buf[60] = self.len as u8;
        buf[63] = KIND_LEAF;
        buf
    }

    pub fn from_bytes(buf: &[u8; CL_SIZE]) -> Self {
        let mut keys = [0i32; CL_LEAF_MAX_KEYS];
        for (i, k) in keys.iter_mut().enumerate() {
            *k = i32::from_le_bytes(buf[i * 4..i * 4 + 4].try_into().unwrap());
        }
        Self {
            keys,
            len: buf[60] as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_sorted_and_rejects_duplicates() {
        let mut leaf = ClLeaf::empty();
        for k in [5, 1, 9, 3, 7] {
            assert!(leaf.insert(k));
        }
        assert_eq!(leaf.keys(), &[1, 3, 5, 7, 9]);
        assert!(!leaf.insert(5));
        assert_eq!(leaf.len(), 5);
    }

    #[test]
    fn delete_removes_and_reports_absence() {
        let mut leaf = ClLeaf::from_sorted(&[1, 3, 5, 7, 9]);
        assert!(leaf.delete(5));
        assert_eq!(leaf.keys(), &[1, 3, 7, 9]);
        assert!(!leaf.delete(5));
        assert!(!leaf.delete(100));
    }

    #[test]
    fn predecessor_search() {
        let leaf = ClLeaf::from_sorted(&[2, 4, 6, 8]);
        assert_eq!(leaf.predecessor(5), Some(4));
        assert_eq!(leaf.predecessor(8), Some(8));
        assert_eq!(leaf.predecessor(1), None);
        assert_eq!(leaf.predecessor(100), Some(8));
    }

    #[test]
    fn split_is_balanced_and_ordered() {
        let keys: Vec<i32> = (0..CL_LEAF_MAX_KEYS as i32).collect();
        let mut leaf = ClLeaf::from_sorted(&keys);
        assert!(leaf.is_full());
        let right = leaf.split();
        assert!(leaf.last_key().unwrap() < right.first_key().unwrap());
        assert_eq!(leaf.len() + right.len(), CL_LEAF_MAX_KEYS);
    }

    #[test]
    fn roundtrip_bytes() {
        let leaf = ClLeaf::from_sorted(&[1, 2, 3]);
        let bytes = leaf.to_bytes();
        let back = ClLeaf::from_bytes(&bytes);
        assert_eq!(leaf, back);
    }

    #[test]
    fn merge_concatenates() {
        let mut a = ClLeaf::from_sorted(&[1, 2, 3]);
        let b = ClLeaf::from_sorted(&[4, 5]);
        a.merge(&b);
        assert_eq!(a.keys(), &[1, 2, 3, 4, 5]);
    }
}
