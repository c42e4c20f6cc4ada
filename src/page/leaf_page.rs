//! Leaf page: a 4 KiB outer-tree leaf holding its own B+ sub-tree of
//! cache-line nodes.
//!
//! Grounded in the teacher's `SlottedPage` (`page/slotted.rs`) for the
//! general shape of a page that owns a slot array plus a header, but the
//! algorithms themselves implement this crate's own cache-line-nested
//! design: every insert/delete/search first locates a CL-slot within the
//! page's 63-slot array, descending the page's own small B+ tree of CL-leaf
//! and CL-internal nodes rather than a flat sorted cell array.

use crate::cl::{ClInternal, ClLeaf};
use crate::config::{CL_INTERNAL_MIN_SEPS, CL_LEAF_MIN_KEYS, CL_SIZE, PAGE_CL_SLOTS};
use crate::error::{MtError, Result};
use crate::page::header::{Layout, PageHeader, FENCE_CACHE_LEN, NONE_PAGE};

/// Outcome of inserting into a page.
pub enum InsertOutcome {
    Inserted,
    Duplicate,
    /// The page's CL-slot array is exhausted (or, under Eytzinger layout,
    /// the sub-tree would have to grow past height 1). The outer tree must
    /// split this page and retry.
    PageFull,
}

/// Outcome of deleting from a page.
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

enum ClInsertResult {
    Duplicate,
    Inserted,
    Split { separator: i32, new_slot: u8 },
}

enum ClDeleteResult {
    NotFound,
    Deleted { underflow: bool },
}

#[derive(Clone)]
pub struct LeafPage {
    header: PageHeader,
    slots: [[u8; CL_SIZE]; PAGE_CL_SLOTS],
}

impl LeafPage {
    pub fn new(layout: Layout) -> Self {
        let mut page = Self {
            header: PageHeader::new(layout),
            slots: [[0u8; CL_SIZE]; PAGE_CL_SLOTS],
        };
        page.write_leaf(0, &ClLeaf::empty());
        page.header.mark_slot_used(0);
        page.header.root_slot = 0;
        page.header.sub_height = 0;
        page
    }

    pub fn len(&self) -> usize {
        self.header.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.header.count == 0
    }

    pub fn next_page(&self) -> Option<u32> {
        (self.header.next_page != NONE_PAGE).then_some(self.header.next_page)
    }

    pub fn prev_page(&self) -> Option<u32> {
        (self.header.prev_page != NONE_PAGE).then_some(self.header.prev_page)
    }

    pub fn set_next_page(&mut self, id: Option<u32>) {
        self.header.next_page = id.unwrap_or(NONE_PAGE);
    }

    pub fn set_prev_page(&mut self, id: Option<u32>) {
        self.header.prev_page = id.unwrap_or(NONE_PAGE);
    }

    pub fn first_key(&self) -> Option<i32> {
        self.leftmost_key(self.header.root_slot, self.header.sub_height as usize)
    }

    fn leftmost_key(&self, slot: u8, height: usize) -> Option<i32> {
        if height == 0 {
            self.read_leaf(slot).first_key()
        } else {
            let node = self.read_internal(slot);
            self.leftmost_key(node.child_at(0), height - 1)
        }
    }

    // ---- slot management ----

    fn read_leaf(&self, slot: u8) -> ClLeaf {
        ClLeaf::from_bytes(&self.slots[slot as usize])
    }

    fn write_leaf(&mut self, slot: u8, leaf: &ClLeaf) {
        self.slots[slot as usize] = leaf.to_bytes();
    }

    fn read_internal(&self, slot: u8) -> ClInternal {
        ClInternal::from_bytes(&self.slots[slot as usize])
    }

    fn write_internal(&mut self, slot: u8, node: &ClInternal) {
        self.slots[slot as usize] = node.to_bytes();
    }

    fn alloc_slot(&mut self) -> Option<u8> {
        let slot = self.header.first_free_slot(PAGE_CL_SLOTS)?;
        self.header.mark_slot_used(slot);
        Some(slot as u8)
    }

    fn free_slot(&mut self, slot: u8) {
        self.header.mark_slot_free(slot as usize);
    }

    fn free_slots(&self) -> usize {
        PAGE_CL_SLOTS - self.header.free_bitmap.count_ones() as usize
    }

    // ---- search ----

    pub fn contains(&self, key: i32) -> bool {
        self.search_leaf(key).0.contains(key)
    }

    /// Greatest key `<= query` within this page's CL sub-tree, or `None` if
    /// every key here is greater (the caller then falls back to the
    /// previous page).
    pub fn predecessor(&self, query: i32) -> Option<i32> {
        let (leaf, path) = self.search_leaf(query);
        if let Some(p) = leaf.predecessor(query) {
            return Some(p);
        }
        // The target CL-leaf had nothing `<= query`: walk back up the
        // recorded path until some step took a child other than the
        // leftmost, then the predecessor is the rightmost key of the
        // previous sibling subtree at that step.
        for &(slot, idx, height) in path.iter().rev() {
            if idx > 0 {
                let node = self.read_internal(slot);
                return self.rightmost_key(node.child_at(idx - 1), height);
            }
        }
        None
    }

    /// Descend to the CL-leaf that would hold `key`, returning it together
    /// with the path of (internal slot, child index taken, height of the
    /// child descended into) recorded on the way down, outermost first.
    fn search_leaf(&self, key: i32) -> (ClLeaf, Vec<(u8, usize, usize)>) {
        let mut path = Vec::new();
        let mut slot = self.header.root_slot;
        let mut height = self.header.sub_height as usize;
        if self.header.layout == Layout::Fence && self.header.fence_len > 0 && height > 0 {
            let idx =
                crate::simd::upper_bound(&self.header.fence_keys[..self.header.fence_len as usize], key);
            let root = self.read_internal(slot);
            height -= 1;
            path.push((slot, idx, height));
            slot = root.child_at(idx);
        }
        loop {
            if height == 0 {
                return (self.read_leaf(slot), path);
            }
            let node = self.read_internal(slot);
            let idx = node.child_index(key);
            height -= 1;
            path.push((slot, idx, height));
            slot = node.child_at(idx);
        }
    }

    /// Greatest key in the CL-leaf reached by always taking the rightmost
    /// child from `slot` (at `height` above the leaf level).
    fn rightmost_key(&self, slot: u8, height: usize) -> Option<i32> {
        if height == 0 {
            self.read_leaf(slot).last_key()
        } else {
            let node = self.read_internal(slot);
            self.rightmost_key(node.child_at(node.nseps()), height - 1)
        }
    }

    // ---- insert ----

    pub fn insert(&mut self, key: i32) -> InsertOutcome {
        // Duplicate detection must precede the room check: a duplicate key
        // is always a no-op, even in a page with no slack left to spare.
        if self.contains(key) {
            return InsertOutcome::Duplicate;
        }

        let height = self.header.sub_height as usize;
        // Conservative worst case: one new slot per level on the descent
        // path, plus one more if the root itself splits.
        if self.free_slots() < height + 2 {
            return InsertOutcome::PageFull;
        }
        if self.header.layout == Layout::Eytzinger && self.would_overgrow() {
            return InsertOutcome::PageFull;
        }

        match self.insert_rec(self.header.root_slot, height, key) {
            ClInsertResult::Duplicate => InsertOutcome::Duplicate,
            ClInsertResult::Inserted => {
                self.header.count += 1;
                self.after_structural_change();
                InsertOutcome::Inserted
            }
            ClInsertResult::Split {
                separator,
                new_slot,
            } => {
                let new_root = match self.alloc_slot() {
                    Some(s) => s,
                    None => return InsertOutcome::PageFull,
                };
                let node = ClInternal::new(self.header.root_slot, new_slot, separator);
                self.write_internal(new_root, &node);
                self.header.root_slot = new_root;
                self.header.sub_height += 1;
                self.header.count += 1;
                self.after_structural_change();
                InsertOutcome::Inserted
            }
        }
    }

    /// Eytzinger layout is only valid while sub-height <= 1; this reports
    /// whether performing the pending insert would need to exceed that.
    fn would_overgrow(&self) -> bool {
        // A split at sub_height == 1 would need to promote to sub_height
        // == 2, which Eytzinger disallows; force a page split instead.
        self.header.sub_height >= 1
            && self
                .read_internal(self.header.root_slot)
                .is_full()
    }

    fn insert_rec(&mut self, slot: u8, height: usize, key: i32) -> ClInsertResult {
        if height == 0 {
            return self.insert_leaf(slot, key);
        }
        let mut node = self.read_internal(slot);
        let child_idx = node.child_index(key);
        let child_slot = node.child_at(child_idx);
        let result = self.insert_rec(child_slot, height - 1, key);
        match result {
            ClInsertResult::Duplicate => ClInsertResult::Duplicate,
            ClInsertResult::Inserted => ClInsertResult::Inserted,
            ClInsertResult::Split {
                separator,
                new_slot,
            } => {
                if !node.is_full() {
                    node.insert_split(child_idx, separator, new_slot);
                    self.write_internal(slot, &node);
                    ClInsertResult::Inserted
                } else {
                    let (promoted, mut right) = node.split();
                    let mid = node.nseps();
                    if child_idx <= mid {
                        node.insert_split(child_idx, separator, new_slot);
                    } else {
                        right.insert_split(child_idx - mid - 1, separator, new_slot);
                    }
                    self.write_internal(slot, &node);
                    let right_slot = self
                        .alloc_slot()
                        .expect("CL-slot budget was reserved before descent");
                    self.write_internal(right_slot, &right);
                    ClInsertResult::Split {
                        separator: promoted,
                        new_slot: right_slot,
                    }
                }
            }
        }
    }

    fn insert_leaf(&mut self, slot: u8, key: i32) -> ClInsertResult {
        let mut leaf = self.read_leaf(slot);
        if leaf.contains(key) {
            return ClInsertResult::Duplicate;
        }
        if !leaf.is_full() {
            leaf.insert(key);
            self.write_leaf(slot, &leaf);
            return ClInsertResult::Inserted;
        }
        let mut right = leaf.split();
        let separator = right.first_key().unwrap();
        if key < separator {
            leaf.insert(key);
        } else {
            right.insert(key);
        }
        self.write_leaf(slot, &leaf);
        let new_slot = self
            .alloc_slot()
            .expect("CL-slot budget was reserved before descent");
        self.write_leaf(new_slot, &right);
        ClInsertResult::Split {
            separator,
            new_slot,
        }
    }

    // ---- delete ----

    pub fn delete(&mut self, key: i32) -> DeleteOutcome {
        let height = self.header.sub_height as usize;
        match self.delete_rec(self.header.root_slot, height, key) {
            ClDeleteResult::NotFound => DeleteOutcome::NotFound,
            ClDeleteResult::Deleted { .. } => {
                self.header.count -= 1;
                self.collapse_root_if_needed();
                self.after_structural_change();
                DeleteOutcome::Deleted
            }
        }
    }

    fn collapse_root_if_needed(&mut self) {
        while self.header.sub_height > 0 {
            let root = self.read_internal(self.header.root_slot);
            if root.nseps() > 0 {
                break;
            }
            let only_child = root.child_at(0);
            self.free_slot(self.header.root_slot);
            self.header.root_slot = only_child;
            self.header.sub_height -= 1;
        }
    }

    fn delete_rec(&mut self, slot: u8, height: usize, key: i32) -> ClDeleteResult {
        if height == 0 {
            let mut leaf = self.read_leaf(slot);
            if !leaf.delete(key) {
                return ClDeleteResult::NotFound;
            }
            let underflow = leaf.underflows();
            self.write_leaf(slot, &leaf);
            return ClDeleteResult::Deleted { underflow };
        }

        let mut node = self.read_internal(slot);
        let child_idx = node.child_index(key);
        let child_slot = node.child_at(child_idx);
        match self.delete_rec(child_slot, height - 1, key) {
            ClDeleteResult::NotFound => ClDeleteResult::NotFound,
            ClDeleteResult::Deleted { underflow } => {
                if underflow {
                    self.rebalance_child(&mut node, child_idx, height - 1);
                }
                let still_underflows = node.underflows();
                self.write_internal(slot, &node);
                ClDeleteResult::Deleted {
                    underflow: still_underflows,
                }
            }
        }
    }

    /// Fix an underflowing child at `child_idx` in `node`, preferring to
    /// redistribute from (then merge with) the left sibling, falling back
    /// to the right sibling when there is no left one.
    fn rebalance_child(&mut self, node: &mut ClInternal, child_idx: usize, child_height: usize) {
        let has_left = child_idx > 0;
        let child_slot = node.child_at(child_idx);

        if has_left {
            let left_slot = node.child_at(child_idx - 1);
            if child_height == 0 {
                let mut left = self.read_leaf(left_slot);
                let mut child = self.read_leaf(child_slot);
                if left.len() > CL_LEAF_MIN_KEYS {
                    left.borrow_rightmost_into(&mut child);
                    let new_sep = child.first_key().unwrap();
                    self.write_leaf(left_slot, &left);
                    self.write_leaf(child_slot, &child);
                    node.replace_separator(child_idx - 1, new_sep);
                } else {
                    left.merge(&child);
                    self.write_leaf(left_slot, &left);
                    self.free_slot(child_slot);
                    node.remove_child(child_idx);
                }
            } else {
                let mut left = self.read_internal(left_slot);
                let mut child = self.read_internal(child_slot);
                if left.nseps() > CL_INTERNAL_MIN_SEPS {
                    let old_sep = node.seps()[child_idx - 1];
                    let l_last_child = left.children()[left.nseps()];
                    let l_last_sep = left.seps()[left.nseps() - 1];
                    left.remove_child(left.nseps());
                    child.prepend(old_sep, l_last_child);
                    self.write_internal(left_slot, &left);
                    self.write_internal(child_slot, &child);
                    node.replace_separator(child_idx - 1, l_last_sep);
                } else {
                    let sep = node.seps()[child_idx - 1];
                    left.merge(sep, &child);
                    self.write_internal(left_slot, &left);
                    self.free_slot(child_slot);
                    node.remove_child(child_idx);
                }
            }
            return;
        }

        // No left sibling: child_idx == 0, use the right sibling instead.
        let right_slot = node.child_at(child_idx + 1);
        if child_height == 0 {
            let mut child = self.read_leaf(child_slot);
            let mut right = self.read_leaf(right_slot);
            if right.len() > CL_LEAF_MIN_KEYS {
                right.borrow_leftmost_into(&mut child);
                let new_sep = right.first_key().unwrap();
                self.write_leaf(child_slot, &child);
                self.write_leaf(right_slot, &right);
                node.replace_separator(child_idx, new_sep);
            } else {
                child.merge(&right);
                self.write_leaf(child_slot, &child);
                self.free_slot(right_slot);
                node.remove_child(child_idx + 1);
            }
        } else {
            let mut child = self.read_internal(child_slot);
            let mut right = self.read_internal(right_slot);
            if right.nseps() > CL_INTERNAL_MIN_SEPS {
                let old_sep = node.seps()[child_idx];
                let r_first_child = right.children()[0];
                let r_first_sep = right.seps()[0];
                right.remove_child(0);
                child.insert_split(child.nseps(), old_sep, r_first_child);
                self.write_internal(child_slot, &child);
                self.write_internal(right_slot, &right);
                node.replace_separator(child_idx, r_first_sep);
            } else {
                let sep = node.seps()[child_idx];
                child.merge(sep, &right);
                self.write_internal(child_slot, &child);
                self.free_slot(right_slot);
                node.remove_child(child_idx + 1);
            }
        }
    }

    // ---- bulk structural operations ----

    /// In-order traversal of every key in the page's CL sub-tree.
    pub fn extract_sorted(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.header.count as usize);
        self.extract_rec(self.header.root_slot, self.header.sub_height as usize, &mut out);
        out
    }

    fn extract_rec(&self, slot: u8, height: usize, out: &mut Vec<i32>) {
        if height == 0 {
            out.extend_from_slice(self.read_leaf(slot).keys());
            return;
        }
        let node = self.read_internal(slot);
        for &child in node.children() {
            self.extract_rec(child, height - 1, out);
        }
    }

    /// Rebuild this page's whole CL sub-tree from a sorted, duplicate-free
    /// key slice, bottom-up. Used for fresh pages, post-split halves, and
    /// `bulk_load`.
    pub fn rebuild_from_sorted(&mut self, keys: &[i32]) {
        self.slots = [[0u8; CL_SIZE]; PAGE_CL_SLOTS];
        self.header.free_bitmap = 0;
        self.header.count = keys.len() as u16;

        if keys.is_empty() {
            let slot = self.alloc_slot().unwrap();
            self.write_leaf(slot, &ClLeaf::empty());
            self.header.root_slot = slot;
            self.header.sub_height = 0;
            self.after_structural_change();
            return;
        }

        // Leaf level: pack close to full, leaving the last chunk possibly
        // smaller, mirroring a classic bottom-up bulk load.
        let leaf_cap = crate::config::CL_LEAF_MAX_KEYS;
        let mut level: Vec<(u8, i32)> = Vec::new(); // (slot, first_key)
        let mut i = 0;
        while i < keys.len() {
            let end = (i + leaf_cap).min(keys.len());
            let leaf = ClLeaf::from_sorted(&keys[i..end]);
            let slot = self.alloc_slot().expect("page sized to fit its own bulk_load input");
            let first = leaf.first_key().unwrap();
            self.write_leaf(slot, &leaf);
            level.push((slot, first));
            i = end;
        }

        let mut height = 0usize;
        while level.len() > 1 {
            let child_cap = crate::config::CL_INTERNAL_MAX_CHILDREN;
            let mut next_level = Vec::new();
            let mut j = 0;
            for size in even_group_sizes(level.len(), child_cap) {
                let group = &level[j..j + size];
                let built = build_internal(group);
                let slot = self
                    .alloc_slot()
                    .expect("page sized to fit its own bulk_load input");
                let first_key = group[0].1;
                self.write_internal(slot, &built);
                next_level.push((slot, first_key));
                j += size;
            }
            level = next_level;
            height += 1;
        }

        self.header.root_slot = level[0].0;
        self.header.sub_height = height;
        self.after_structural_change();
    }

    fn after_structural_change(&mut self) {
        if self.header.layout == Layout::Fence {
            self.sync_fence_cache();
        }
        if self.header.layout == Layout::Eytzinger {
            self.repack_eytzinger();
        }
    }

    fn sync_fence_cache(&mut self) {
        if self.header.sub_height == 0 {
            self.header.fence_len = 0;
            return;
        }
        let root = self.read_internal(self.header.root_slot);
        let n = root.nseps().min(FENCE_CACHE_LEN);
        self.header.fence_keys[..n].copy_from_slice(&root.seps()[..n]);
        self.header.fence_len = n as u8;
    }

    /// Re-lay the CL sub-tree into dense breadth-first slot order: root at
    /// slot 0, its children at slots 1..=k. Only meaningful (and only
    /// called) while `sub_height <= 1`.
    fn repack_eytzinger(&mut self) {
        if self.header.sub_height > 1 {
            return;
        }
        if self.header.sub_height == 0 {
            if self.header.root_slot != 0 {
                let leaf = self.read_leaf(self.header.root_slot);
                self.free_slot(self.header.root_slot);
                self.write_leaf(0, &leaf);
                self.header.mark_slot_used(0);
                self.header.root_slot = 0;
            }
            return;
        }

        let root = self.read_internal(self.header.root_slot);
        let children: Vec<ClLeaf> = root.children().iter().map(|&s| self.read_leaf(s)).collect();
        let mut new_root = root;

        self.slots = [[0u8; CL_SIZE]; PAGE_CL_SLOTS];
        self.header.free_bitmap = 0;

        for (i, leaf) in children.iter().enumerate() {
            let slot = (i + 1) as u8;
            self.write_leaf(slot, leaf);
            self.header.mark_slot_used(slot as usize);
        }
        for (i, child_slot) in new_root.children_mut().iter_mut().enumerate() {
            *child_slot = (i + 1) as u8;
        }
        self.write_internal(0, &new_root);
        self.header.mark_slot_used(0);
        self.header.root_slot = 0;
    }

    /// Split this page in half. `self` keeps the lower half (rebuilt
    /// in-place); the upper half is returned as a new page of the same
    /// layout, along with its first key (the separator the outer tree
    /// installs between the two pages).
    pub fn split(&mut self) -> (LeafPage, i32) {
        let all = self.extract_sorted();
        let mid = all.len() / 2;
        self.rebuild_from_sorted(&all[..mid]);
        let mut right = LeafPage::new(self.header.layout);
        right.rebuild_from_sorted(&all[mid..]);
        let separator = right.first_key().expect("split half is never empty");
        (right, separator)
    }

    /// Build a page directly from sorted, duplicate-free input (used by
    /// the outer tree's top-level `bulk_load`).
    pub fn bulk_load(layout: Layout, keys: &[i32]) -> Self {
        let mut page = LeafPage::new(layout);
        page.rebuild_from_sorted(keys);
        page
    }

    /// Verify this page's CL sub-tree against I1/I4/I5: the header's key
    /// count matches what's actually in the leaves, keys are strictly
    /// ascending, and no non-root CL-node underflows. Debug-only
    /// introspection, mirroring the teacher's `debug_get` trace — see
    /// [`crate::btree::Tree::validate`].
    pub fn validate(&self) -> Result<()> {
        let keys = self.extract_sorted();
        if keys.len() != self.header.count as usize {
            return Err(MtError::corruption(format!(
                "page key count {} does not match header count {}",
                keys.len(),
                self.header.count
            )));
        }
        if !keys.windows(2).all(|w| w[0] < w[1]) {
            return Err(MtError::corruption("page keys are not strictly ascending"));
        }
        self.validate_occupancy(self.header.root_slot, self.header.sub_height as usize, true)
    }

    fn validate_occupancy(&self, slot: u8, height: usize, is_root: bool) -> Result<()> {
        if height == 0 {
            let leaf = self.read_leaf(slot);
            if !is_root && leaf.underflows() {
                return Err(MtError::corruption(format!(
                    "non-root CL-leaf at slot {slot} holds {} keys, below minimum {CL_LEAF_MIN_KEYS}",
                    leaf.len()
                )));
            }
            return Ok(());
        }
        let node = self.read_internal(slot);
        if !is_root && node.underflows() {
            return Err(MtError::corruption(format!(
                "non-root CL-internal at slot {slot} holds {} separators, below minimum {CL_INTERNAL_MIN_SEPS}",
                node.nseps()
            )));
        }
        for &child in node.children() {
            self.validate_occupancy(child, height - 1, false)?;
        }
        Ok(())
    }
}

/// Split `n` items into groups of size `[2, cap]` as evenly as possible,
/// so bottom-up construction never produces a trailing group of exactly
/// one child (which `build_internal` cannot turn into a valid node).
/// Requires `n >= 2`.
pub(crate) fn even_group_sizes(n: usize, cap: usize) -> Vec<usize> {
    debug_assert!(n >= 2);
    if n <= cap {
        return vec![n];
    }
    let num_groups = n.div_ceil(cap);
    let base = n / num_groups;
    let rem = n % num_groups;
    (0..num_groups)
        .map(|i| if i < rem { base + 1 } else { base })
        .collect()
}

/// Build a CL-internal node from a group of `(child_slot, first_key)`
/// pairs produced during bottom-up bulk construction. `group[0].1` is the
/// group's own first key (used by the caller as this node's separator in
/// the level above) and is not stored inside the node itself.
fn build_internal(group: &[(u8, i32)]) -> ClInternal {
    debug_assert!(group.len() >= 2);
    let mut node = ClInternal::new(group[0].0, group[1].0, group[1].1);
    for pair in &group[2..] {
        node.insert_split(node.nseps(), pair.1, pair.0);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of(page: &LeafPage) -> Vec<i32> {
        page.extract_sorted()
    }

    #[test]
    fn insert_search_delete_roundtrip() {
        let mut page = LeafPage::new(Layout::Default);
        let input: Vec<i32> = (0..500).map(|i| i * 7).collect();
        for &k in &input {
            matches!(page.insert(k), InsertOutcome::Inserted);
        }
        assert_eq!(page.len(), input.len());
        for &k in &input {
            assert!(page.contains(k));
        }
        assert!(!page.contains(3));

        let mut sorted = keys_of(&page);
        sorted.sort_unstable();
        assert_eq!(sorted, input);

        for &k in input.iter().step_by(2) {
            matches!(page.delete(k), DeleteOutcome::Deleted);
        }
        assert_eq!(page.len(), input.len() / 2);
        for (i, &k) in input.iter().enumerate() {
            assert_eq!(page.contains(k), i % 2 == 1);
        }
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut page = LeafPage::new(Layout::Default);
        assert!(matches!(page.insert(5), InsertOutcome::Inserted));
        assert!(matches!(page.insert(5), InsertOutcome::Duplicate));
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn predecessor_search() {
        let mut page = LeafPage::new(Layout::Default);
        for k in [10, 20, 30, 40, 50] {
            page.insert(k);
        }
        assert_eq!(page.predecessor(25), Some(20));
        assert_eq!(page.predecessor(50), Some(50));
        assert_eq!(page.predecessor(5), None);
    }

    #[test]
    fn bulk_load_then_extract_matches_input() {
        let mut page = LeafPage::new(Layout::Default);
        let input: Vec<i32> = (0..800).collect();
        page.rebuild_from_sorted(&input);
        assert_eq!(page.len(), input.len());
        assert_eq!(keys_of(&page), input);
        for &k in input.iter().step_by(37) {
            assert!(page.contains(k));
        }
    }

    #[test]
    fn predecessor_crosses_cl_subtree_after_delete() {
        // Fill one CL-leaf past its capacity so the CL sub-tree splits and
        // promotes a separator, then delete the key the separator was
        // copied from. The stale separator must not hide the predecessor
        // sitting in the now-adjacent CL-leaf on the other side of it.
        let mut page = LeafPage::new(Layout::Default);
        for k in 0..=20 {
            page.insert(k);
        }
        assert!(matches!(page.delete(7), DeleteOutcome::Deleted));
        assert_eq!(page.predecessor(7), Some(6));
        assert_eq!(page.predecessor(20), Some(20));
        assert_eq!(page.predecessor(-1), None);
    }

    #[test]
    fn fence_layout_matches_default_semantics() {
        let mut page = LeafPage::new(Layout::Fence);
        let input: Vec<i32> = (0..400).map(|i| i * 3).collect();
        for &k in &input {
            page.insert(k);
        }
        for &k in &input {
            assert!(page.contains(k));
        }
        assert_eq!(page.predecessor(2), Some(0));
    }

    #[test]
    fn eytzinger_layout_matches_default_semantics() {
        let mut page = LeafPage::new(Layout::Eytzinger);
        let input: Vec<i32> = (0..100).map(|i| i * 5).collect();
        for &k in &input {
            if matches!(page.insert(k), InsertOutcome::PageFull) {
                break;
            }
        }
        for &k in keys_of(&page).iter() {
            assert!(page.contains(k));
        }
    }
}
