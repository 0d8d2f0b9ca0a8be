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

mod file_storage;

use std::io;

pub use file_storage::FileSwapStorageModule;

/// Storage that holds the content of every page that is not resident.
///
/// A page is stored at the byte offset equal to its offset inside of the logical space.
///
/// **Note**: `read` and `write` are called from within the fault handler.
/// Implementations must not allocate and must not use any locks that could be held by the faulting thread.
pub trait SwapStorageModule: Send {
    /// Reads the region `[offset, offset + dest.len())` into `dest`.
    ///
    /// If this call fails, it could be that already some data was written to `dest`.
    fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()>;

    /// Writes `src` back to the region `[offset, offset + src.len())`
    fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()>;

    /// Returns the maximum size in bytes of this storage
    ///
    /// **Although `read` and `write` won't throw any error, it is illegal to read/write across this border!**
    fn get_max_size(&self) -> usize;
}
