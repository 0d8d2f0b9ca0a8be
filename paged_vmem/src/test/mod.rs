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

use crate::{
    modules::{
        eviction::EvictionModule,
        swap_storage::{test::get_test_storage, FileSwapStorageModule},
    },
    VirtualMem, VirtualMemConfig, WriteBackPolicy, PAGE_SIZE,
};

mod reclaim;

pub(crate) const TEST_LOGICAL_SIZE: usize = 16 * 1024 * 1024;

pub(crate) fn get_test_vmem<E: EvictionModule + 'static>(
    test_name: &str,
    resident_frames: usize,
    write_back: WriteBackPolicy,
) -> VirtualMem<E, FileSwapStorageModule> {
    get_test_vmem_with(
        test_name,
        VirtualMemConfig {
            logical_size: TEST_LOGICAL_SIZE,
            resident_frames,
            write_back,
            reclaim_interval: None,
        },
    )
}

pub(crate) fn get_test_vmem_with<E: EvictionModule + 'static>(
    test_name: &str,
    config: VirtualMemConfig,
) -> VirtualMem<E, FileSwapStorageModule> {
    let _ = env_logger::builder().is_test(true).try_init();
    let storage = get_test_storage(test_name, config.logical_size);

    VirtualMem::new(config, storage).unwrap()
}

/// Start of data page `n`
pub(crate) fn page_ptr<E: EvictionModule, S: crate::modules::swap_storage::SwapStorageModule>(
    vmem: &VirtualMem<E, S>,
    n: usize,
) -> *mut u8 {
    unsafe { vmem.get_start().add(n * PAGE_SIZE) }
}

/// Numbers of all resident data pages, in ascending order
pub(crate) fn resident_page_numbers<E: EvictionModule, S: crate::modules::swap_storage::SwapStorageModule>(
    vmem: &VirtualMem<E, S>,
) -> Vec<usize> {
    vmem.resident_pages()
        .iter()
        .map(|page| (page.address - vmem.get_start() as usize) / PAGE_SIZE)
        .collect()
}
