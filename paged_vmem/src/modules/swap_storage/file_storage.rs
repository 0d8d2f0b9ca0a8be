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
    fs::{remove_file, File},
    io::{self, Read, Seek, SeekFrom, Write},
    mem::ManuallyDrop,
    path::{Path, PathBuf},
};

use super::SwapStorageModule;

pub struct FileSwapStorageModule {
    /// underlying swap file
    file: ManuallyDrop<File>,

    /// path of file, save for deleting file later
    file_path: PathBuf,

    /// cached file size, so no `metadata` call necessary
    file_size: usize,
}

impl FileSwapStorageModule {
    /// Creates a new, empty swap file at `filepath` that is `size` bytes big.
    ///
    /// An existing file at this location is truncated. The file is sparse, so
    /// regions that were never written read back as zeros.
    pub fn new<P: AsRef<Path>>(filepath: P, size: usize) -> io::Result<Self> {
        let file_path = filepath.as_ref().to_path_buf();
        let file = File::options()
            .read(true)
            .write(true)
            .truncate(true)
            .create(true)
            .open(&file_path)?;

        file.set_len(size as u64)?;

        Ok(Self {
            file: ManuallyDrop::new(file),
            file_path,
            file_size: size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl SwapStorageModule for FileSwapStorageModule {
    fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()> {
        debug_assert!(
            offset + dest.len() <= self.file_size,
            "illegal access, offset: {}, len: {}, file_size: {}",
            offset,
            dest.len(),
            self.file_size
        );

        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(dest)
    }

    fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()> {
        debug_assert!(
            offset + src.len() <= self.file_size,
            "illegal access, offset: {}, len: {}, file_size: {}",
            offset,
            src.len(),
            self.file_size
        );

        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(src)
    }

    fn get_max_size(&self) -> usize {
        self.file_size
    }
}

impl Drop for FileSwapStorageModule {
    fn drop(&mut self) {
        // drop and close file before removing
        // note that after this call, file should never be accessed again...
        unsafe {
            ManuallyDrop::drop(&mut self.file);
        }

        if self.file_path.exists() {
            let _ = remove_file(&self.file_path);
        }
    }
}
