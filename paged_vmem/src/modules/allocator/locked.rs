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
    alloc::{GlobalAlloc, Layout},
    ptr::{null_mut, NonNull},
};
use std::{
    alloc::System,
    sync::{Mutex, MutexGuard, PoisonError},
};

use super::{FirstFitHeap, HeapError, BLOCK_ALIGN};
use crate::util::{format_hex, write_stderr};

/// [`FirstFitHeap`] behind a mutex, usable as `#[global_allocator]`.
///
/// Until the heap is initialized (and for alignments above [`BLOCK_ALIGN`]) requests
/// are passed on to the system allocator. Memory is always released to the allocator it came from.
///
/// **Note**: If the heap lives inside of a `VirtualMem` range, make sure the range stays
/// mapped for as long as any allocation from it is alive.
pub struct LockedFirstFitHeap {
    inner: Mutex<FirstFitHeap>,
}

impl LockedFirstFitHeap {
    pub const fn empty() -> Self {
        Self {
            inner: Mutex::new(FirstFitHeap::empty()),
        }
    }

    /// Hands the range `[start, start+size)` to the heap.
    ///
    /// ### Safety
    ///
    /// See [`FirstFitHeap::init`].
    pub unsafe fn init(&self, start: *mut u8, size: usize) {
        self.lock().init(start, size)
    }

    pub fn lock(&self) -> MutexGuard<'_, FirstFitHeap> {
        // the heap is consistent after every operation, so a poisoned lock is fine
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

unsafe impl GlobalAlloc for LockedFirstFitHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() <= BLOCK_ALIGN {
            let mut heap = self.lock();
            if heap.is_initialized() {
                return heap
                    .allocate(layout.size())
                    .map_or(null_mut(), NonNull::as_ptr);
            }
        }

        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        {
            let mut heap = self.lock();
            if heap.contains(ptr) {
                if let Some(ptr) = NonNull::new(ptr) {
                    if let Err(err) = heap.release(ptr) {
                        report_rejected(b"release", ptr.as_ptr(), err);
                    }
                }
                return;
            }
        }

        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        {
            let mut heap = self.lock();
            if heap.contains(ptr) {
                return match NonNull::new(ptr) {
                    Some(ptr) => match heap.reallocate(ptr, new_size) {
                        Ok(new_ptr) => new_ptr.as_ptr(),
                        Err(err) => {
                            if matches!(err, HeapError::InvalidPointer | HeapError::OutOfRange) {
                                report_rejected(b"reallocation", ptr.as_ptr(), err);
                            }
                            null_mut()
                        }
                    },
                    None => null_mut(),
                };
            }
        }

        System.realloc(ptr, layout, new_size)
    }
}

/// Reports an operation on a pointer the heap does not know.
///
/// Runs inside of the global allocator, so nothing in here may allocate.
fn report_rejected(operation: &[u8], ptr: *mut u8, err: HeapError) {
    let mut buf = [0u8; 18];

    write_stderr(b"paged_vmem: rejected heap ");
    write_stderr(operation);
    write_stderr(b" at ");
    write_stderr(format_hex(ptr as usize, &mut buf));
    write_stderr(b": ");
    write_stderr(err.message().as_bytes());
    write_stderr(b"\n");
}
