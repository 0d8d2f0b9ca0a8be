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

/// Two queue FIFO eviction.
///
/// Read only pages wait in the read queue, writable pages in the write queue.
/// Victims are taken from the read queue first, as they are clean and can be dropped
/// without any write back. Only if the read queue is empty the write queue is used.
pub struct FifoEvictionModule {
    read_queue: EvictionQueue,
    write_queue: EvictionQueue,
}

impl EvictionModule for FifoEvictionModule {
    const RECLAIM_SWEEPS: bool = false;

    fn new(capacity: usize) -> Self {
        Self {
            read_queue: EvictionQueue::new(capacity),
            write_queue: EvictionQueue::new(capacity),
        }
    }

    fn page_loaded(&mut self, page: u32) {
        self.read_queue.enqueue(page);
    }

    fn page_upgraded(&mut self, page: u32) {
        self.read_queue.remove(page);
        self.write_queue.enqueue(page);
    }

    fn page_refreshed(&mut self, _page: u32) {
        // no sweeps, so there is nothing to refresh
    }

    fn select_victim<F: FnMut(u32) -> bool>(&mut self, mut is_pinned: F) -> Option<u32> {
        self.read_queue
            .dequeue_unpinned(&mut is_pinned)
            .or_else(|| self.write_queue.dequeue_unpinned(&mut is_pinned))
    }

    fn for_each_resident<F: FnMut(u32)>(&self, mut f: F) {
        self.read_queue
            .iter()
            .chain(self.write_queue.iter())
            .for_each(|page| f(page));
    }

    fn resident_count(&self) -> usize {
        self.read_queue.len() + self.write_queue.len()
    }
}
