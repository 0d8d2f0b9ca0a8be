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

//! Translation of logical addresses and encoding of page directory/page table entries.
//!
//! A logical address is the byte offset of an address inside of the reserved logical space.
//! It is split up into three parts:
//!
//! |Bits  |Usage|
//! |------|-----|
//! |31..22|index into the page directory|
//! |21..12|index into the page table|
//! |11..0 |offset inside of the page|

use core::{fmt, mem::size_of};
use static_assertions::{assert_eq_size, const_assert, const_assert_eq};

/// Size of a page and of a frame in bytes
pub const PAGE_SIZE: usize = 4096;

/// Number of entries inside of the page directory and inside of every page table
pub const ENTRIES_PER_TABLE: usize = 1024;

pub(crate) const OFFSET_BITS: u32 = 12;
pub(crate) const INDEX_BITS: u32 = 10;
const OFFSET_MASK: u32 = (1 << OFFSET_BITS) - 1;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// Maximum size of the logical space that can be described by one page directory
pub const MAX_LOGICAL_SIZE: usize = ENTRIES_PER_TABLE * ENTRIES_PER_TABLE * PAGE_SIZE;

// the whole 32 bit logical space has to be addressable
const_assert!(usize::BITS >= 64);

// a page table has to fill exactly one frame
assert_eq_size!(PageTableEntry, u32);
const_assert_eq!(PAGE_SIZE, 1 << OFFSET_BITS);
const_assert_eq!(ENTRIES_PER_TABLE * size_of::<PageTableEntry>(), PAGE_SIZE);

/// Result of [`LogicalAddress::translate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub directory_index: usize,
    pub table_index: usize,
    pub offset: usize,
}

/// Byte offset of an address relative to the start of the logical space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct LogicalAddress(u32);

impl LogicalAddress {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn from_page_number(page: u32) -> Self {
        Self(page << OFFSET_BITS)
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Splits this address up into its page directory index, page table index and offset
    #[inline]
    pub const fn translate(&self) -> Translation {
        Translation {
            directory_index: ((self.0 >> (OFFSET_BITS + INDEX_BITS)) & INDEX_MASK) as usize,
            table_index: ((self.0 >> OFFSET_BITS) & INDEX_MASK) as usize,
            offset: (self.0 & OFFSET_MASK) as usize,
        }
    }

    /// Number of the page this address belongs to (directory and table index combined)
    #[inline]
    pub const fn page_number(&self) -> u32 {
        self.0 >> OFFSET_BITS
    }

    /// First address of the page this address belongs to
    #[inline]
    pub const fn page_start(&self) -> LogicalAddress {
        Self(self.0 & !OFFSET_MASK)
    }
}

impl fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translate();
        write!(
            f,
            "{:#010x} (pd={}, pt={}, offset={})",
            self.0, t.directory_index, t.table_index, t.offset
        )
    }
}

const PRESENT: u32 = 1 << 0;
const WRITE: u32 = 1 << 1;
const PINNED: u32 = 1 << 3;
const ACCESSED: u32 = 1 << 5;
const DIRTY: u32 = 1 << 6;
const LRU: u32 = 1 << 7;
const FLAG_MASK: u32 = OFFSET_MASK;

/*
The bit usage of an entry is as follows:
|Bit  |Usage|
0      Present (a frame is behind this page or page table)
1      Read/Write (0: read only, 1: writable)
2      [Unused]
3      Pinned (never evicted)
4      [Unused]
5      Accessed (page was loaded at least once, so the swap file holds its content)
6      Dirty (written since it was loaded)
7      LRU (access was revoked by a reclaim sweep)
8-11   [Unused]
12-31  Frame number
*/

/// One entry of the page directory or of a page table
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct PageTableEntry(u32);

macro_rules! generate_functions {
    ($bit: ident, $get_name: ident, $set_name: ident) => {
        #[inline]
        pub const fn $get_name(&self) -> bool {
            self.0 & $bit != 0
        }

        #[inline]
        pub fn $set_name(&mut self, val: bool) {
            if val {
                self.0 |= $bit;
            } else {
                self.0 &= !$bit;
            }
        }
    };
}

impl PageTableEntry {
    /// An entry that is not present
    pub const EMPTY: PageTableEntry = PageTableEntry(0);

    /// Encodes a new entry.
    ///
    /// `frame` has to fit into 20 bits.
    pub const fn new(
        frame: u32,
        present: bool,
        write: bool,
        pinned: bool,
        accessed: bool,
        dirty: bool,
        lru: bool,
    ) -> Self {
        debug_assert!(frame < (1 << (32 - OFFSET_BITS)));

        let mut raw = frame << OFFSET_BITS;
        if present {
            raw |= PRESENT;
        }
        if write {
            raw |= WRITE;
        }
        if pinned {
            raw |= PINNED;
        }
        if accessed {
            raw |= ACCESSED;
        }
        if dirty {
            raw |= DIRTY;
        }
        if lru {
            raw |= LRU;
        }

        Self(raw)
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Frame number stored in the high bits.
    ///
    /// Only meaningful if the entry is present.
    #[inline]
    pub const fn frame(&self) -> u32 {
        self.0 >> OFFSET_BITS
    }

    #[inline]
    pub fn set_frame(&mut self, frame: u32) {
        debug_assert!(frame < (1 << (32 - OFFSET_BITS)));
        self.0 = (frame << OFFSET_BITS) | (self.0 & FLAG_MASK);
    }

    generate_functions!(PRESENT, is_present, set_present);
    generate_functions!(WRITE, is_writable, set_writable);
    generate_functions!(PINNED, is_pinned, set_pinned);
    generate_functions!(ACCESSED, is_accessed, set_accessed);
    generate_functions!(DIRTY, is_dirty, set_dirty);
    generate_functions!(LRU, is_lru, set_lru);
}

impl fmt::Debug for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageTableEntry")
            .field("frame", &self.frame())
            .field("present", &self.is_present())
            .field("write", &self.is_writable())
            .field("pinned", &self.is_pinned())
            .field("accessed", &self.is_accessed())
            .field("dirty", &self.is_dirty())
            .field("lru", &self.is_lru())
            .finish()
    }
}
