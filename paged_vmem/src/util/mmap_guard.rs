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

use core::ptr::{null_mut, NonNull};
use std::{io, os::fd::RawFd};

use libc::{
    c_int, c_void, mmap, mprotect, munmap, off_t, MAP_ANONYMOUS, MAP_FAILED, MAP_FIXED,
    MAP_NORESERVE, MAP_PRIVATE, MAP_SHARED, PROT_NONE, PROT_READ, PROT_WRITE,
};

use crate::address_mapping::PAGE_SIZE;

/// An owned `mmap` region. It is unmapped again once this guard is dropped.
pub(crate) struct MappedRegion {
    base: NonNull<u8>,
    size: usize,
}

impl MappedRegion {
    /// Reserves `size` bytes of address space without any storage behind it.
    ///
    /// Every access to the region faults until parts of it are replaced with [`map_frame`].
    pub(crate) fn reserve(size: usize) -> io::Result<Self> {
        Self::map(
            size,
            PROT_NONE,
            MAP_PRIVATE | MAP_ANONYMOUS | MAP_NORESERVE,
            -1,
        )
    }

    /// Maps `[0, size)` of the file `fd` readable and writable.
    ///
    /// The mapping is shared, so every other shared mapping of the same file sees the same bytes.
    pub(crate) fn map_shared(fd: RawFd, size: usize) -> io::Result<Self> {
        Self::map(size, PROT_READ | PROT_WRITE, MAP_SHARED, fd)
    }

    fn map(size: usize, prot: c_int, flags: c_int, fd: RawFd) -> io::Result<Self> {
        let base_ptr = unsafe { mmap(null_mut(), size, prot, flags, fd, 0) };
        if base_ptr == MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        let base = NonNull::new(base_ptr as *mut u8)
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "mmap returned a null pointer"))?;

        Ok(Self { base, size })
    }

    #[inline]
    pub(crate) fn start(&self) -> usize {
        self.base.as_ptr() as usize
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn contains(&self, addr: usize) -> bool {
        addr >= self.start() && addr - self.start() < self.size
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // this also removes every page that was mapped into the region with MAP_FIXED
        let code = unsafe { munmap(self.base.as_ptr() as *mut c_void, self.size) };

        if code != 0 {
            log::error!(
                "Could not unmap region at {:#x} ({} bytes): {}",
                self.start(),
                self.size,
                io::Error::last_os_error()
            );
        }
    }
}

unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

/// Maps one page of the file `fd` starting at `file_offset` to the fixed address `page`.
///
/// The previous mapping of `page` is replaced atomically.
///
/// ### Safety
///
/// `page` has to be page aligned and has to lie inside of a region owned by the caller.
pub(crate) unsafe fn map_frame(
    page: *mut u8,
    fd: RawFd,
    file_offset: usize,
    prot: c_int,
) -> io::Result<()> {
    let res = mmap(
        page as *mut c_void,
        PAGE_SIZE,
        prot,
        MAP_SHARED | MAP_FIXED,
        fd,
        file_offset as off_t,
    );

    if res == MAP_FAILED {
        return Err(io::Error::last_os_error());
    }

    debug_assert_eq!(res as *mut u8, page);
    Ok(())
}

/// Replaces the page at `page` with inaccessible anonymous memory, so that there
/// is no frame behind it anymore.
///
/// ### Safety
///
/// Same requirements as [`map_frame`].
pub(crate) unsafe fn unmap_frame(page: *mut u8) -> io::Result<()> {
    let res = mmap(
        page as *mut c_void,
        PAGE_SIZE,
        PROT_NONE,
        MAP_PRIVATE | MAP_ANONYMOUS | MAP_NORESERVE | MAP_FIXED,
        -1,
        0,
    );

    if res == MAP_FAILED {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// Changes the protection of the page at `page`.
///
/// ### Safety
///
/// Same requirements as [`map_frame`].
pub(crate) unsafe fn protect(page: *mut u8, prot: c_int) -> io::Result<()> {
    if mprotect(page as *mut c_void, PAGE_SIZE, prot) != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::MappedRegion;
    use crate::address_mapping::PAGE_SIZE;

    #[test]
    fn test_reserve_contains() {
        let region = MappedRegion::reserve(16 * PAGE_SIZE).unwrap();

        assert_eq!(region.size(), 16 * PAGE_SIZE);
        assert_eq!(region.start() % PAGE_SIZE, 0);
        assert!(region.contains(region.start()));
        assert!(region.contains(region.start() + 16 * PAGE_SIZE - 1));
        assert!(!region.contains(region.start() + 16 * PAGE_SIZE));
        assert!(!region.contains(region.start() - 1));
    }
}
