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

mod first_fit;
mod locked;

pub use first_fit::{BlockInfo, FirstFitHeap, BLOCK_ALIGN, HEADER_SIZE, MIN_BLOCK_SIZE};
pub use locked::LockedFirstFitHeap;

use core::fmt;

/// Reasons why a heap operation was rejected.
///
/// The heap is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// Zero sized requests are not supported
    ZeroSize,
    /// There is no free block that is large enough
    OutOfMemory,
    /// The pointer does not belong to the managed range
    OutOfRange,
    /// The pointer is not the start of an allocated block (or it was already released)
    InvalidPointer,
    /// The requested size overflows
    SizeOverflow,
}

impl HeapError {
    /// Static description, usable where formatting could allocate
    pub const fn message(&self) -> &'static str {
        match self {
            HeapError::ZeroSize => "zero sized allocations are not supported",
            HeapError::OutOfMemory => "not enough free memory available",
            HeapError::OutOfRange => "pointer is outside of the heap",
            HeapError::InvalidPointer => "pointer is not the start of an allocated block",
            HeapError::SizeOverflow => "requested size overflows",
        }
    }
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for HeapError {}
