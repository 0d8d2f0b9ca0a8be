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

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::{
    address_mapping::{MAX_LOGICAL_SIZE, PAGE_SIZE},
    fault_access_point::{FaultTarget, FAULT_ACCESS_POINT},
    modules::{
        eviction::{EvictionModule, LruEvictionModule},
        swap_storage::{FileSwapStorageModule, SwapStorageModule},
    },
    page_manager::{metadata_pages_for, PageManager, ResidentPage, Statistics},
    reclaim_ticker::ReclaimTicker,
    util::get_page_size,
    vmem_config::VirtualMemConfig,
    vmem_error::VirtualMemError,
};

/// A logical address space that is backed by a handful of frames and a swap storage.
///
/// Every access to `[get_start(), get_start() + get_size())` is served transparently:
/// pages are loaded on their first access, become writable on their first write and are evicted
/// (and written back if needed) once the frames run out.
///
/// There can only be one `VirtualMem` per process at a time, as it owns the `SIGSEGV` handler.
///
/// **Note**: Do not touch the logical space from within the fault handler path
/// (e.g. from a custom [`SwapStorageModule`]).
pub struct VirtualMem<
    E: EvictionModule + 'static = LruEvictionModule,
    S: SwapStorageModule + 'static = FileSwapStorageModule,
> {
    shared: Arc<Mutex<PageManager<E, S>>>,
    start: usize,
    size: usize,
    ticker: Option<ReclaimTicker>,

    /// For test environment we want to wait until a new virtual memory can be created
    #[cfg(test)]
    _mutex_guard: MutexGuard<'static, ()>,
}

impl<E: EvictionModule + 'static, S: SwapStorageModule + 'static> VirtualMem<E, S> {
    /// Reserves the logical space, creates the frames and installs the fault handler.
    pub fn new(config: VirtualMemConfig, storage: S) -> Result<Self, VirtualMemError> {
        Self::validate(&config, &storage)?;

        // for test environment wait until the previous virtual memory is gone
        #[cfg(test)]
        let mutex_guard = crate::fault_access_point::ACTIVE_SPACE_MUTEX
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let manager = PageManager::<E, S>::new(&config, storage)?;
        let start = manager.data_start();
        let size = manager.data_size();

        let shared = Arc::new(Mutex::new(manager));
        FAULT_ACCESS_POINT.set(shared.clone())?;

        let ticker = match config.reclaim_interval {
            Some(interval) if E::RECLAIM_SWEEPS => {
                let target: Arc<dyn FaultTarget> = shared.clone();
                match ReclaimTicker::start(target, interval) {
                    Ok(ticker) => Some(ticker),
                    Err(err) => {
                        FAULT_ACCESS_POINT.unset();
                        return Err(VirtualMemError::Ticker(err));
                    }
                }
            }
            _ => None,
        };

        info!(
            "Created virtual memory: usable range {:#x}..{:#x} ({} pages), {} frames, reclaim ticker: {}",
            start,
            start + size,
            size / PAGE_SIZE,
            config.resident_frames,
            ticker.is_some()
        );

        Ok(Self {
            shared,
            start,
            size,
            ticker,

            #[cfg(test)]
            _mutex_guard: mutex_guard,
        })
    }

    fn validate(config: &VirtualMemConfig, storage: &S) -> Result<(), VirtualMemError> {
        let page_size = get_page_size();
        if page_size != PAGE_SIZE {
            return Err(VirtualMemError::UnsupportedPageSize(page_size));
        }

        if config.logical_size % PAGE_SIZE != 0 {
            return Err(VirtualMemError::InvalidConfig(
                "logical size has to be a multiple of the page size",
            ));
        }
        if config.logical_size > MAX_LOGICAL_SIZE {
            return Err(VirtualMemError::InvalidConfig(
                "logical size must not be larger than 4 GiB",
            ));
        }
        if config.logical_size <= metadata_pages_for(config.logical_size) * PAGE_SIZE {
            return Err(VirtualMemError::InvalidConfig(
                "logical size is too small to hold any data page",
            ));
        }
        if config.resident_frames < 2 {
            return Err(VirtualMemError::InvalidConfig(
                "at least two resident frames are required",
            ));
        }
        if config.resident_frames >= (1 << 20) - 2 {
            return Err(VirtualMemError::InvalidConfig(
                "frame numbers have to fit into a page table entry",
            ));
        }

        if storage.get_max_size() < config.logical_size {
            return Err(VirtualMemError::SwapTooSmall {
                required: config.logical_size,
                available: storage.get_max_size(),
            });
        }

        Ok(())
    }

    /// First usable address (after the page table metadata pages)
    #[inline]
    pub fn get_start(&self) -> *mut u8 {
        self.start as *mut u8
    }

    /// Number of usable bytes starting at [`VirtualMem::get_start`]
    #[inline]
    pub fn get_size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        addr >= self.start && addr - self.start < self.size
    }

    pub fn statistics(&self) -> Statistics {
        self.lock().statistics()
    }

    /// All resident data pages in address order
    pub fn resident_pages(&self) -> Vec<ResidentPage> {
        // allocate before locking: the allocation itself could fault
        let capacity = self.lock().resident_frames();
        let mut pages = Vec::with_capacity(capacity);
        self.lock().collect_resident(&mut pages);
        pages
    }

    /// Revokes the access to all unpinned resident pages right now.
    ///
    /// This is what the reclaim ticker does periodically. Returns the number of marked pages.
    pub fn reclaim_sweep(&self) -> usize {
        self.shared.reclaim_sweep()
    }

    /// Prevents the resident page containing `ptr` from being evicted
    pub fn pin(&self, ptr: *const u8) -> Result<(), VirtualMemError> {
        self.lock().set_pinned(ptr as usize, true)
    }

    pub fn unpin(&self, ptr: *const u8) -> Result<(), VirtualMemError> {
        self.lock().set_pinned(ptr as usize, false)
    }

    fn lock(&self) -> MutexGuard<'_, PageManager<E, S>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn get_inner(&self) -> MutexGuard<'_, PageManager<E, S>> {
        self.lock()
    }
}

impl<E: EvictionModule + 'static, S: SwapStorageModule + 'static> Drop for VirtualMem<E, S> {
    fn drop(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }

        // after this no fault can reach the manager anymore
        FAULT_ACCESS_POINT.unset();

        let stats = self.statistics();
        debug!(
            "Dropping virtual memory: {} faults, {} page ins, {} page outs, {} evictions",
            stats.faults, stats.page_ins, stats.page_outs, stats.evictions
        );
    }
}
