/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::VecDeque;

/// Ordered set of resident pages, identified by their page number.
///
/// The head is the next eviction candidate. All storage is allocated up front,
/// so none of the operations allocate as long as at most `capacity` pages are queued.
pub struct EvictionQueue {
    pages: VecDeque<u32>,
    capacity: usize,
}

impl EvictionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            pages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `page` at the tail
    pub fn enqueue(&mut self, page: u32) {
        debug_assert!(
            self.pages.len() < self.capacity,
            "eviction queue is full (capacity: {})",
            self.capacity
        );
        debug_assert!(!self.contains(page), "page {} is already queued", page);

        self.pages.push_back(page);
    }

    /// Removes and returns the head
    pub fn dequeue(&mut self) -> Option<u32> {
        self.pages.pop_front()
    }

    /// Removes and returns the first page for which `is_pinned` returns `false`.
    ///
    /// Pinned pages in front of it are moved to the tail keeping their relative order.
    /// Returns `None` if every queued page is pinned.
    pub fn dequeue_unpinned<F: FnMut(u32) -> bool>(&mut self, mut is_pinned: F) -> Option<u32> {
        for _ in 0..self.pages.len() {
            let page = self.pages.pop_front()?;
            if !is_pinned(page) {
                return Some(page);
            }

            // give it another round
            self.pages.push_back(page);
        }

        None
    }

    /// Removes `page` wherever it is in the queue.
    ///
    /// Returns `true` if it was queued.
    pub fn remove(&mut self, page: u32) -> bool {
        match self.pages.iter().position(|curr| *curr == page) {
            Some(index) => {
                self.pages.remove(index);
                true
            }
            None => false,
        }
    }

    /// Moves `page` to the tail, marking it as the most recently used one
    pub fn move_to_tail(&mut self, page: u32) {
        if self.remove(page) {
            self.pages.push_back(page);
        } else {
            self.enqueue(page);
        }
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Iterates from head to tail
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }
}

#[cfg(test)]
mod test {
    use super::EvictionQueue;

    #[test]
    fn test_queue_fifo_order() {
        let mut queue = EvictionQueue::new(4);
        assert!(queue.is_empty());

        for page in [10, 11, 12] {
            queue.enqueue(page);
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dequeue(), Some(10));
        assert_eq!(queue.dequeue(), Some(11));

        queue.enqueue(13);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![12, 13]);
        assert_eq!(queue.dequeue(), Some(12));
        assert_eq!(queue.dequeue(), Some(13));
        assert_eq!(queue.dequeue(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_remove_and_move() {
        let mut queue = EvictionQueue::new(4);
        for page in [1, 2, 3, 4] {
            queue.enqueue(page);
        }

        assert!(queue.remove(2));
        assert!(!queue.remove(2));
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![1, 3, 4]);

        queue.move_to_tail(1);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![3, 4, 1]);

        // not queued yet: simply appended
        queue.move_to_tail(9);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![3, 4, 1, 9]);
    }

    #[test]
    fn test_queue_dequeue_unpinned() {
        let mut queue = EvictionQueue::new(4);
        for page in [1, 2, 3] {
            queue.enqueue(page);
        }

        // 1 and 2 are pinned, so they are skipped and rotated to the tail
        assert_eq!(queue.dequeue_unpinned(|page| page < 3), Some(3));
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![1, 2]);

        // everything pinned
        assert_eq!(queue.dequeue_unpinned(|_| true), None);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![1, 2]);

        assert_eq!(queue.dequeue_unpinned(|_| false), Some(1));
        assert_eq!(EvictionQueue::new(2).dequeue_unpinned(|_| false), None);
    }
}
