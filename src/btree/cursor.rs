//! Forward iteration over the outer tree's in-order leaf chain.
//!
//! Mirrors the teacher's own `Cursor` shape (a small buffer plus a pointer
//! to "where next") but walks [`PageRef`]s threaded through [`Tree`]'s slabs
//! instead of re-fetching pages from a buffer pool.

use super::tree::{PageRef, Tree};

/// Iterates ascending keys `>= start` to the end of the tree.
pub struct Cursor<'a> {
    tree: &'a Tree,
    buffer: Vec<i32>,
    pos: usize,
    next: Option<PageRef>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tree: &'a Tree, start: i32) -> Self {
        let page = tree.page_ref_for(start);
        let buffer = tree.page_keys(&page);
        let pos = buffer.partition_point(|&k| k < start);
        let next = tree.next_page_ref(&page);
        Self {
            tree,
            buffer,
            pos,
            next,
        }
    }

    fn advance_page(&mut self) -> bool {
        match self.next.take() {
            Some(page) => {
                self.buffer = self.tree.page_keys(&page);
                self.pos = 0;
                self.next = self.tree.next_page_ref(&page);
                true
            }
            None => false,
        }
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        loop {
            if self.pos < self.buffer.len() {
                let key = self.buffer[self.pos];
                self.pos += 1;
                return Some(key);
            }
            if !self.advance_page() {
                return None;
            }
        }
    }
}
