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

use core::{
    mem::size_of,
    ptr::{self, null_mut, NonNull},
};

use memoffset::offset_of;
use static_assertions::const_assert;

use super::HeapError;
use crate::util::padding_needed_for;

/// Size of the header in front of every allocated block.
///
/// The header stores the total block size (header included), not the usable size.
/// The usable size is always `block size - HEADER_SIZE`, see [`FirstFitHeap::usable_size`].
pub const HEADER_SIZE: usize = size_of::<u32>();

/// Every block size is a multiple of this and every returned pointer is aligned to it
pub const BLOCK_ALIGN: usize = 8;

/// Smallest block the heap ever creates.
///
/// If a split would leave less than this behind, the whole free block is granted.
pub const MIN_BLOCK_SIZE: usize = 2 * size_of::<FreeBlockHeader>();

/// Offsets are stored as `u32`, so the heap can never manage more than this
const MAX_HEAP_SIZE: usize = u32::MAX as usize & !(BLOCK_ALIGN - 1);

/// Marks the end of the free list
const NONE: u32 = u32::MAX;

/// Header of a free block.
///
/// The `size` field overlaps with the header of an allocated block,
/// so the size of a block can be read without knowing whether it is free.
#[repr(C)]
#[derive(Clone, Copy)]
struct FreeBlockHeader {
    /// total size of this block in bytes
    size: u32,
    /// offset of the next free block or `NONE`
    next: u32,
}

const_assert!(size_of::<FreeBlockHeader>() <= MIN_BLOCK_SIZE);
const_assert!(MIN_BLOCK_SIZE % BLOCK_ALIGN == 0);

/// One entry of [`FirstFitHeap::blocks`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Offset of the block relative to the heap base
    pub offset: usize,
    /// Total block size including the header
    pub size: usize,
    pub free: bool,
}

/// First fit allocator with an address ordered free list.
///
/// All bookkeeping lives inside of the managed range itself.
/// Blocks are addressed by their offset relative to `base`, which is chosen
/// so that every payload (`base + offset + HEADER_SIZE`) is aligned to [`BLOCK_ALIGN`].
///
/// This type never allocates or logs, so it can be used as (part of) the global allocator.
pub struct FirstFitHeap {
    base: *mut u8,
    size: u32,
    head: u32,
}

// the heap exclusively owns its range
unsafe impl Send for FirstFitHeap {}

impl FirstFitHeap {
    /// Creates a heap without any memory. Use [`FirstFitHeap::init`] to hand it a range.
    pub const fn empty() -> Self {
        Self {
            base: null_mut(),
            size: 0,
            head: NONE,
        }
    }

    /// Initializes the heap with the memory area `[start, start+size)`.
    ///
    /// Everything allocated from a previous range is forgotten.
    ///
    /// ### Safety
    ///
    /// The range has to be valid for reads and writes for as long as the heap is in use
    /// and must not be accessed by anything else in the meantime.
    pub unsafe fn init(&mut self, start: *mut u8, size: usize) {
        let padding = padding_needed_for(start as usize + HEADER_SIZE, BLOCK_ALIGN);
        let usable = size.saturating_sub(padding).min(MAX_HEAP_SIZE) & !(BLOCK_ALIGN - 1);

        self.base = start.wrapping_add(padding);

        if usable < MIN_BLOCK_SIZE {
            self.size = 0;
            self.head = NONE;
            return;
        }

        self.size = usable as u32;
        self.head = 0;
        self.write_free(
            0,
            FreeBlockHeader {
                size: self.size,
                next: NONE,
            },
        );
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.base.is_null()
    }

    /// Number of managed bytes (including block headers)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.size as usize
    }

    /// Is `ptr` inside of the managed range?
    #[inline]
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        let base = self.base as usize;

        self.size > 0 && addr >= base && addr - base < self.size as usize
    }

    /// Allocates a block with at least `size` usable bytes.
    ///
    /// The returned pointer is aligned to [`BLOCK_ALIGN`].
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, HeapError> {
        let required = Self::block_size_for(size)?;
        if required > self.size as usize {
            return Err(HeapError::OutOfMemory);
        }
        let required = required as u32;

        let mut prev = NONE;
        let mut curr = self.head;

        while curr != NONE {
            let block = unsafe { self.read_free(curr) };

            if block.size >= required {
                let granted = if (block.size - required) as usize >= MIN_BLOCK_SIZE {
                    // split: the rest stays in the list at the same position
                    let rest = curr + required;
                    unsafe {
                        self.write_free(
                            rest,
                            FreeBlockHeader {
                                size: block.size - required,
                                next: block.next,
                            },
                        )
                    };
                    self.set_link(prev, rest);

                    required
                } else {
                    self.set_link(prev, block.next);

                    block.size
                };

                unsafe {
                    self.set_block_size(curr, granted);
                    return Ok(NonNull::new_unchecked(
                        self.block_ptr(curr).add(HEADER_SIZE),
                    ));
                }
            }

            prev = curr;
            curr = block.next;
        }

        Err(HeapError::OutOfMemory)
    }

    /// Allocates `count * size` bytes and fills them with zeros.
    pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> Result<NonNull<u8>, HeapError> {
        let total = count.checked_mul(size).ok_or(HeapError::SizeOverflow)?;
        let ptr = self.allocate(total)?;

        unsafe { ptr::write_bytes(ptr.as_ptr(), 0, total) };

        Ok(ptr)
    }

    /// Releases the block that was returned by [`FirstFitHeap::allocate`].
    ///
    /// The block is merged with its free neighbours.
    pub fn release(&mut self, ptr: NonNull<u8>) -> Result<(), HeapError> {
        let offset = self.block_of(ptr)?;
        let mut size = unsafe { self.block_size(offset) };

        // find the free neighbours
        let mut prev = NONE;
        let mut next = self.head;
        while next != NONE && next < offset {
            prev = next;
            next = unsafe { self.read_free(next) }.next;
        }

        let mut after = next;
        if next != NONE && offset + size == next {
            let next_block = unsafe { self.read_free(next) };
            size += next_block.size;
            after = next_block.next;
        }

        if prev != NONE {
            let prev_size = unsafe { self.block_size(prev) };
            if prev + prev_size == offset {
                unsafe {
                    self.write_free(
                        prev,
                        FreeBlockHeader {
                            size: prev_size + size,
                            next: after,
                        },
                    )
                };
                return Ok(());
            }
        }

        unsafe { self.write_free(offset, FreeBlockHeader { size, next: after }) };
        self.set_link(prev, offset);

        Ok(())
    }

    /// Moves the allocation to a new block with at least `new_size` usable bytes.
    ///
    /// The content is copied up to the smaller of both sizes.
    /// If a new block cannot be allocated, the old one stays valid.
    pub fn reallocate(&mut self, ptr: NonNull<u8>, new_size: usize) -> Result<NonNull<u8>, HeapError> {
        let offset = self.block_of(ptr)?;
        let old_size = unsafe { self.block_size(offset) } as usize - HEADER_SIZE;

        let new_ptr = self.allocate(new_size)?;
        unsafe {
            // both blocks are allocated at this point, so they cannot overlap
            ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), old_size.min(new_size));
        }

        self.release(ptr)?;
        Ok(new_ptr)
    }

    /// Usable bytes of the allocated block at `ptr`
    pub fn usable_size(&self, ptr: NonNull<u8>) -> Result<usize, HeapError> {
        let offset = self.block_of(ptr)?;
        Ok(unsafe { self.block_size(offset) } as usize - HEADER_SIZE)
    }

    /// Sum of all free block sizes
    pub fn free_bytes(&self) -> usize {
        let mut total = 0;
        let mut curr = self.head;
        while curr != NONE {
            let block = unsafe { self.read_free(curr) };
            total += block.size as usize;
            curr = block.next;
        }

        total
    }

    /// Lists every block in address order
    pub fn blocks(&self) -> Vec<BlockInfo> {
        let mut blocks = vec![];
        let mut curr = 0;
        let mut next_free = self.head;

        while curr < self.size {
            let size = unsafe { self.block_size(curr) };
            let free = curr == next_free;
            if free {
                next_free = unsafe { self.read_free(curr) }.next;
            }

            blocks.push(BlockInfo {
                offset: curr as usize,
                size: size as usize,
                free,
            });

            if size == 0 {
                // corrupted, stop here instead of looping forever
                break;
            }
            curr += size;
        }

        blocks
    }

    fn block_size_for(size: usize) -> Result<usize, HeapError> {
        if size == 0 {
            return Err(HeapError::ZeroSize);
        }

        let total = size
            .checked_add(HEADER_SIZE + BLOCK_ALIGN - 1)
            .ok_or(HeapError::SizeOverflow)?
            & !(BLOCK_ALIGN - 1);

        Ok(total.max(MIN_BLOCK_SIZE))
    }

    /// Returns the offset of the allocated block that starts at `ptr`.
    ///
    /// The block chain is walked from the start of the heap, so only real block starts
    /// are accepted. Free blocks are recognized with the help of the (ordered) free list.
    fn block_of(&self, ptr: NonNull<u8>) -> Result<u32, HeapError> {
        let addr = ptr.as_ptr() as usize;
        let base = self.base as usize;
        if self.size == 0 || addr < base + HEADER_SIZE || addr - base >= self.size as usize {
            return Err(HeapError::OutOfRange);
        }

        let target = (addr - base - HEADER_SIZE) as u32;
        let mut curr = 0u32;
        let mut next_free = self.head;

        while curr < target {
            let size = unsafe { self.block_size(curr) };
            if curr == next_free {
                next_free = unsafe { self.read_free(curr) }.next;
            }

            curr = match curr.checked_add(size) {
                Some(next) if size > 0 => next,
                _ => return Err(HeapError::InvalidPointer),
            };
        }

        if curr != target || curr == next_free {
            // either in the middle of a block or the block is free already
            return Err(HeapError::InvalidPointer);
        }

        Ok(target)
    }

    fn set_link(&mut self, prev: u32, target: u32) {
        if prev == NONE {
            self.head = target;
        } else {
            unsafe { self.set_next(prev, target) };
        }
    }

    #[inline]
    unsafe fn block_ptr(&self, offset: u32) -> *mut u8 {
        debug_assert!(offset < self.size);
        self.base.add(offset as usize)
    }

    #[inline]
    unsafe fn read_free(&self, offset: u32) -> FreeBlockHeader {
        ptr::read(self.block_ptr(offset) as *const FreeBlockHeader)
    }

    #[inline]
    unsafe fn write_free(&mut self, offset: u32, block: FreeBlockHeader) {
        ptr::write(self.block_ptr(offset) as *mut FreeBlockHeader, block)
    }

    #[inline]
    unsafe fn block_size(&self, offset: u32) -> u32 {
        ptr::read(self.block_ptr(offset).add(offset_of!(FreeBlockHeader, size)) as *const u32)
    }

    #[inline]
    unsafe fn set_block_size(&mut self, offset: u32, size: u32) {
        ptr::write(
            self.block_ptr(offset).add(offset_of!(FreeBlockHeader, size)) as *mut u32,
            size,
        )
    }

    #[inline]
    unsafe fn set_next(&mut self, offset: u32, next: u32) {
        ptr::write(
            self.block_ptr(offset).add(offset_of!(FreeBlockHeader, next)) as *mut u32,
            next,
        )
    }
}
