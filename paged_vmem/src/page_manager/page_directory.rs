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

//! Access to the page directory and the page tables.
//!
//! Both live inside of frames of the [`FramePool`] and are only ever accessed
//! through the frame view, never through the logical space.

use super::frame_pool::{FramePool, DIRECTORY_FRAME, FIRST_TABLE_FRAME};
use crate::address_mapping::{LogicalAddress, PageTableEntry, ENTRIES_PER_TABLE};

/// Entry for tables and for the directory: present, writable, pinned and accessed
const fn metadata_entry(frame: u32) -> PageTableEntry {
    PageTableEntry::new(frame, true, true, true, true, false, false)
}

/// Sets up the page directory and the pinned page table for `directory_index`,
/// which is the table of the first data page.
///
/// If that table covers the start of the logical space, its first two entries
/// describe the directory and the table itself.
pub(crate) fn init_tables(pool: &mut FramePool, directory_index: usize) {
    let directory = pool.table_mut(DIRECTORY_FRAME);
    directory.fill(PageTableEntry::EMPTY);
    directory[directory_index] = metadata_entry(FIRST_TABLE_FRAME);

    let first_table = pool.table_mut(FIRST_TABLE_FRAME);
    first_table.fill(PageTableEntry::EMPTY);
    if directory_index == 0 {
        first_table[0] = metadata_entry(DIRECTORY_FRAME);
        first_table[1] = metadata_entry(FIRST_TABLE_FRAME);
    }
}

/// Frame of the page table for `directory_index`, if there is one
#[inline]
pub(crate) fn table_frame(pool: &FramePool, directory_index: usize) -> Option<u32> {
    let entry = pool.table(DIRECTORY_FRAME)[directory_index];
    entry.is_present().then(|| entry.frame())
}

/// Stores a fresh page table in `frame` and registers it in the directory
pub(crate) fn install_table(pool: &mut FramePool, directory_index: usize, frame: u32) {
    debug_assert!(table_frame(pool, directory_index).is_none());

    pool.table_mut(frame).fill(PageTableEntry::EMPTY);
    pool.table_mut(DIRECTORY_FRAME)[directory_index] = metadata_entry(frame);
}

/// Entry of the page at `addr`.
///
/// Returns `None` if there is no page table for this address yet.
#[inline]
pub(crate) fn entry(pool: &FramePool, addr: LogicalAddress) -> Option<PageTableEntry> {
    let t = addr.translate();
    let frame = table_frame(pool, t.directory_index)?;
    Some(pool.table(frame)[t.table_index])
}

#[inline]
pub(crate) fn entry_mut(pool: &mut FramePool, addr: LogicalAddress) -> Option<&mut PageTableEntry> {
    let t = addr.translate();
    let frame = table_frame(pool, t.directory_index)?;
    Some(&mut pool.table_mut(frame)[t.table_index])
}

/// Calls `f` for every present page, in address order
pub(crate) fn for_each_present<F: FnMut(LogicalAddress, PageTableEntry)>(pool: &FramePool, mut f: F) {
    for directory_index in 0..ENTRIES_PER_TABLE {
        let table = match table_frame(pool, directory_index) {
            Some(frame) => pool.table(frame),
            None => continue,
        };

        for (table_index, entry) in table.iter().enumerate() {
            if entry.is_present() {
                let page = (directory_index * ENTRIES_PER_TABLE + table_index) as u32;
                f(LogicalAddress::from_page_number(page), *entry);
            }
        }
    }
}
