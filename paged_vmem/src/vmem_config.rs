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

use std::time::Duration;

use crate::address_mapping::MAX_LOGICAL_SIZE;

/// Which pages are written to the swap storage when they are evicted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBackPolicy {
    /// Only pages that were written to since they were loaded
    DirtyOnly,
    /// Every evicted page, even if it is unchanged
    Everything,
}

/// Configuration of a [`crate::VirtualMem`]
#[derive(Debug, Clone)]
pub struct VirtualMemConfig {
    /// Size of the logical space in bytes (including the page table metadata pages).
    ///
    /// Has to be a multiple of the page size and at most 4 GiB.
    pub logical_size: usize,

    /// Number of frames that are available for data pages and page tables
    /// (the page directory and the first page table have frames of their own).
    pub resident_frames: usize,

    pub write_back: WriteBackPolicy,

    /// How often the reclaim ticker revokes access to all resident pages.
    ///
    /// `None` disables the ticker. It is only started for eviction modules that use sweeps.
    pub reclaim_interval: Option<Duration>,
}

impl Default for VirtualMemConfig {
    fn default() -> Self {
        Self {
            logical_size: MAX_LOGICAL_SIZE,
            resident_frames: 16,
            write_back: WriteBackPolicy::DirtyOnly,
            reclaim_interval: Some(Duration::from_millis(100)),
        }
    }
}
