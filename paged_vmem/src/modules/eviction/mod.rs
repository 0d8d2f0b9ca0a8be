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

mod fifo;
mod lru;
mod queue;

pub use fifo::FifoEvictionModule;
pub use lru::LruEvictionModule;
pub use queue::EvictionQueue;

/// Decides which resident page has to leave when no free frame is left.
///
/// Pages are identified by their page number inside of the logical space.
/// The virtual memory manager notifies the module about every state change of a page.
///
/// **Note**: All functions are called from within the fault handler with the global lock held,
/// so they must not allocate (preallocate everything in `new`).
pub trait EvictionModule: Send {
    /// If `true`, reclaim sweeps revoke the access to every resident page
    /// so that the next access refreshes its position (see [`EvictionModule::for_each_resident`]).
    const RECLAIM_SWEEPS: bool;

    /// Creates a new module that tracks up to `capacity` resident pages.
    fn new(capacity: usize) -> Self;

    /// `page` was mapped in with read access
    fn page_loaded(&mut self, page: u32);

    /// `page` was resident with read access and is writable now
    fn page_upgraded(&mut self, page: u32);

    /// `page` was accessed again after a reclaim sweep revoked its access
    fn page_refreshed(&mut self, page: u32);

    /// Selects and removes the page that is evicted next.
    ///
    /// Pages for which `is_pinned` returns `true` must not be selected.
    /// Returns `None` if there is no page that could be evicted.
    fn select_victim<F: FnMut(u32) -> bool>(&mut self, is_pinned: F) -> Option<u32>;

    /// Calls `f` for every tracked page
    fn for_each_resident<F: FnMut(u32)>(&self, f: F);

    /// Number of tracked pages
    fn resident_count(&self) -> usize;
}
