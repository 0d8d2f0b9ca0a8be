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

use std::{
    io,
    os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd},
    slice,
};

use libc::{c_char, ftruncate, memfd_create, off_t, MFD_CLOEXEC};

use crate::{
    address_mapping::{PageTableEntry, ENTRIES_PER_TABLE, PAGE_SIZE},
    util::mmap_guard::MappedRegion,
};

/// Frame holding the page directory
pub(crate) const DIRECTORY_FRAME: u32 = 0;

/// Frame holding the first page table
pub(crate) const FIRST_TABLE_FRAME: u32 = 1;

const MEMFD_NAME: &[u8] = b"paged-vmem-frames\0";

/// The simulated physical memory.
///
/// All frames live inside of an anonymous in-memory file. The whole file is mapped once
/// (the frame view) which is how the manager reads and writes frame contents.
/// Logical pages are mapped onto the same file, so both mappings see the same bytes.
pub(crate) struct FramePool {
    // drop order: unmap the view before the file is closed
    view: MappedRegion,
    fd: OwnedFd,
    frame_count: u32,
    /// unused frames, the lowest frame number is on top
    free: Vec<u32>,
}

impl FramePool {
    /// Creates a pool with `frame_count` frames.
    ///
    /// The page directory frame and the first page table frame are reserved right away,
    /// so there have to be at least two frames.
    pub(crate) fn new(frame_count: u32) -> io::Result<Self> {
        debug_assert!(frame_count >= 2);

        let raw_fd = unsafe { memfd_create(MEMFD_NAME.as_ptr() as *const c_char, MFD_CLOEXEC) };
        if raw_fd < 0 {
            return Err(io::Error::last_os_error());
        }
        let fd = unsafe { OwnedFd::from_raw_fd(raw_fd) };

        let size = frame_count as usize * PAGE_SIZE;
        if unsafe { ftruncate(fd.as_raw_fd(), size as off_t) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let view = MappedRegion::map_shared(fd.as_raw_fd(), size)?;

        // reversed, so that pop() hands out the lowest frame first
        let mut free = Vec::with_capacity(frame_count as usize);
        free.extend((FIRST_TABLE_FRAME + 1..frame_count).rev());

        Ok(Self {
            view,
            fd,
            frame_count,
            free,
        })
    }

    #[inline]
    pub(crate) fn fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    #[cfg(test)]
    pub(crate) fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Byte offset of `frame` inside of the backing file
    #[inline]
    pub(crate) fn file_offset(&self, frame: u32) -> usize {
        debug_assert!(frame < self.frame_count);
        frame as usize * PAGE_SIZE
    }

    /// Takes an unused frame
    pub(crate) fn take(&mut self) -> Option<u32> {
        self.free.pop()
    }

    /// Hands `frame` back to the pool
    pub(crate) fn give_back(&mut self, frame: u32) {
        debug_assert!(frame > FIRST_TABLE_FRAME && frame < self.frame_count);
        debug_assert!(!self.free.contains(&frame));

        // capacity was reserved for every frame, so this never allocates
        self.free.push(frame);
    }

    #[cfg(test)]
    pub(crate) fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Content of `frame` as seen through the frame view
    pub(crate) fn frame(&self, frame: u32) -> &[u8] {
        assert!(frame < self.frame_count, "frame {} out of bounds", frame);
        unsafe {
            slice::from_raw_parts(
                self.view.as_ptr().add(self.file_offset(frame)),
                PAGE_SIZE,
            )
        }
    }

    pub(crate) fn frame_mut(&mut self, frame: u32) -> &mut [u8] {
        assert!(frame < self.frame_count, "frame {} out of bounds", frame);
        unsafe {
            slice::from_raw_parts_mut(
                self.view.as_ptr().add(self.file_offset(frame)),
                PAGE_SIZE,
            )
        }
    }

    /// Interprets `frame` as page directory or page table
    pub(crate) fn table(&self, frame: u32) -> &[PageTableEntry; ENTRIES_PER_TABLE] {
        let bytes = self.frame(frame);
        // frames are page aligned and PageTableEntry is a transparent u32
        unsafe { &*(bytes.as_ptr() as *const [PageTableEntry; ENTRIES_PER_TABLE]) }
    }

    pub(crate) fn table_mut(&mut self, frame: u32) -> &mut [PageTableEntry; ENTRIES_PER_TABLE] {
        let bytes = self.frame_mut(frame);
        unsafe { &mut *(bytes.as_mut_ptr() as *mut [PageTableEntry; ENTRIES_PER_TABLE]) }
    }
}

#[cfg(test)]
mod test {
    use std::ptr::{read_volatile, write_volatile};

    use libc::{PROT_READ, PROT_WRITE};

    use super::{FramePool, DIRECTORY_FRAME, FIRST_TABLE_FRAME};
    use crate::{
        address_mapping::{PageTableEntry, PAGE_SIZE},
        util::mmap_guard::{map_frame, MappedRegion},
    };

    #[test]
    fn test_free_frames() {
        let mut pool = FramePool::new(5).unwrap();
        assert_eq!(pool.frame_count(), 5);
        assert_eq!(pool.free_count(), 3);

        assert_eq!(pool.take(), Some(2));
        assert_eq!(pool.take(), Some(3));
        pool.give_back(2);
        assert_eq!(pool.take(), Some(2));
        assert_eq!(pool.take(), Some(4));
        assert_eq!(pool.take(), None);
        assert_ne!(DIRECTORY_FRAME, FIRST_TABLE_FRAME);
    }

    #[test]
    fn test_tables() {
        let mut pool = FramePool::new(3).unwrap();

        // fresh frames are zeroed
        assert!(pool.table(FIRST_TABLE_FRAME).iter().all(|e| !e.is_present()));

        pool.table_mut(FIRST_TABLE_FRAME)[3] =
            PageTableEntry::new(2, true, false, false, false, false, false);
        assert_eq!(pool.table(FIRST_TABLE_FRAME)[3].frame(), 2);

        // same bytes as the raw frame content
        let raw = u32::from_ne_bytes(pool.frame(FIRST_TABLE_FRAME)[12..16].try_into().unwrap());
        assert_eq!(raw, pool.table(FIRST_TABLE_FRAME)[3].raw());
    }

    #[test]
    fn test_shared_mapping() {
        let mut pool = FramePool::new(3).unwrap();
        let region = MappedRegion::reserve(4 * PAGE_SIZE).unwrap();
        let page = unsafe { region.as_ptr().add(PAGE_SIZE) };

        unsafe {
            map_frame(page, pool.fd(), pool.file_offset(2), PROT_READ | PROT_WRITE).unwrap();
            write_volatile(page.add(100), 0xAB);
        }
        assert_eq!(pool.frame(2)[100], 0xAB);

        pool.frame_mut(2)[101] = 0xCD;
        assert_eq!(unsafe { read_volatile(page.add(101)) }, 0xCD);
    }
}
