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

use super::{EvictionModule, EvictionQueue};

/// Single queue LRU approximation.
///
/// Every access that the manager gets to see (loading, upgrading and refreshing after a
/// reclaim sweep) moves the page to the tail, so the head is always the page whose last
/// observed access is the oldest one.
pub struct LruEvictionModule {
    queue: EvictionQueue,
}

impl EvictionModule for LruEvictionModule {
    const RECLAIM_SWEEPS: bool = true;

    fn new(capacity: usize) -> Self {
        Self {
            queue: EvictionQueue::new(capacity),
        }
    }

    fn page_loaded(&mut self, page: u32) {
        self.queue.enqueue(page);
    }

    fn page_upgraded(&mut self, page: u32) {
        self.queue.move_to_tail(page);
    }

    fn page_refreshed(&mut self, page: u32) {
        self.queue.move_to_tail(page);
    }

    fn select_victim<F: FnMut(u32) -> bool>(&mut self, is_pinned: F) -> Option<u32> {
        self.queue.dequeue_unpinned(is_pinned)
    }

    fn for_each_resident<F: FnMut(u32)>(&self, mut f: F) {
        self.queue.iter().for_each(|page| f(page));
    }

    fn resident_count(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod test {
    use super::LruEvictionModule;
    use crate::modules::eviction::{
        test::{test_eviction_loading_order, test_eviction_skips_pinned},
        EvictionModule,
    };

    #[test]
    fn test_lru_loading_order() {
        test_eviction_loading_order::<LruEvictionModule>();
    }

    #[test]
    fn test_lru_skips_pinned() {
        test_eviction_skips_pinned::<LruEvictionModule>();
    }

    #[test]
    fn test_lru_refresh_moves_to_tail() {
        let mut module = LruEvictionModule::new(3);
        for page in [1, 2, 3] {
            module.page_loaded(page);
        }

        module.page_refreshed(1);
        module.page_upgraded(2);

        assert_eq!(module.select_victim(|_| false), Some(3));
        assert_eq!(module.select_victim(|_| false), Some(1));
        assert_eq!(module.select_victim(|_| false), Some(2));
    }
}
