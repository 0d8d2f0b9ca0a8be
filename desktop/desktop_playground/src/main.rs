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

use std::{error::Error, slice, time::Duration};

use env_logger::{Builder, Env};
use log::info;
use paged_vmem::{
    modules::{allocator::FirstFitHeap, swap_storage::FileSwapStorageModule},
    VirtualMem, VirtualMemConfig, WriteBackPolicy,
};
use rand::{rngs::SmallRng, RngCore, SeedableRng};

const LOGICAL_SIZE: usize = 64 * 1024 * 1024;
const ARRAYS: usize = 64;
const ARRAY_LEN: usize = 2048;

fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Info)
        .format_module_path(false)
        .init();

    let config = VirtualMemConfig {
        logical_size: LOGICAL_SIZE,
        resident_frames: 8,
        write_back: WriteBackPolicy::DirtyOnly,
        reclaim_interval: Some(Duration::from_millis(10)),
    };
    let storage = FileSwapStorageModule::new("/tmp/desktop_playground.swap", LOGICAL_SIZE)?;
    let vmem: VirtualMem = VirtualMem::new(config, storage)?;

    let mut heap = FirstFitHeap::empty();
    unsafe { heap.init(vmem.get_start(), vmem.get_size()) };
    info!("Heap capacity: {} bytes", heap.capacity());

    let mut rand = SmallRng::seed_from_u64(5446535461589659585);
    let mut arrays = Vec::with_capacity(ARRAYS);

    // fill much more memory than there are frames
    for _ in 0..ARRAYS {
        let ptr = heap.allocate_zeroed(ARRAY_LEN, 8)?.cast::<u64>();
        let values = unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), ARRAY_LEN) };
        values.iter_mut().for_each(|value| *value = rand.next_u64());
        arrays.push(ptr);
    }

    for ptr in arrays.iter() {
        let values = unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), ARRAY_LEN) };
        values.sort_unstable();
        if !values.windows(2).all(|pair| pair[0] <= pair[1]) {
            return Err("array is not sorted".into());
        }
    }

    for ptr in arrays.drain(..) {
        heap.release(ptr.cast())?;
    }
    info!("Heap blocks after release: {:?}", heap.blocks());

    println!("{}", serde_json::to_string_pretty(&vmem.statistics())?);
    println!("{}", serde_json::to_string_pretty(&vmem.resident_pages())?);

    Ok(())
}
