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

pub(crate) mod frame_pool;
pub(crate) mod page_directory;

use libc::{c_int, PROT_NONE, PROT_READ, PROT_WRITE};

use crate::{
    address_mapping::{LogicalAddress, PageTableEntry, ENTRIES_PER_TABLE, PAGE_SIZE},
    modules::{eviction::EvictionModule, swap_storage::SwapStorageModule},
    util::{
        ceil_div,
        mmap_guard::{map_frame, protect, unmap_frame, MappedRegion},
    },
    vmem_config::{VirtualMemConfig, WriteBackPolicy},
    vmem_error::{FaultError, VirtualMemError},
};
use frame_pool::FramePool;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Counters of everything the manager did so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Statistics {
    /// handled faults (without the rejected ones)
    pub faults: u64,
    /// pages read from the swap storage
    pub page_ins: u64,
    /// pages written to the swap storage
    pub page_outs: u64,
    pub evictions: u64,
    /// read only pages that became writable
    pub write_upgrades: u64,
    /// pages whose access was restored after a reclaim sweep
    pub lru_refreshes: u64,
    pub reclaim_sweeps: u64,
    /// page tables that were created (the pinned one is not counted)
    pub page_table_allocations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum PageAccess {
    Read,
    Write,
}

/// Snapshot of one resident data page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResidentPage {
    /// Start address of the page
    pub address: usize,
    pub frame: u32,
    pub access: PageAccess,
    pub dirty: bool,
    pub pinned: bool,
    /// access was revoked by a reclaim sweep and is restored on the next fault
    pub lru_marked: bool,
}

/// Owns the logical space, the frames and the page tables and moves pages in and out.
///
/// Nothing in here touches the logical space directly (all frame contents are accessed through
/// the frame view) and nothing allocates after construction, so it is safe to use from the fault handler.
pub(crate) struct PageManager<E: EvictionModule, S: SwapStorageModule> {
    region: MappedRegion,
    frames: FramePool,
    swap: S,
    eviction: E,
    write_back: WriteBackPolicy,

    /// pages at the start of the logical space that are reserved for the directory and the tables
    metadata_pages: u32,
    resident_frames: usize,
    stats: Statistics,
}

/// Number of pages that are reserved for the page directory and all page tables
pub(crate) fn metadata_pages_for(logical_size: usize) -> usize {
    1 + ceil_div(logical_size / PAGE_SIZE, ENTRIES_PER_TABLE)
}

impl<E: EvictionModule, S: SwapStorageModule> PageManager<E, S> {
    /// Creates a new manager. The configuration is expected to be validated already.
    pub(crate) fn new(config: &VirtualMemConfig, swap: S) -> Result<Self, VirtualMemError> {
        let region = MappedRegion::reserve(config.logical_size).map_err(VirtualMemError::Reserve)?;

        let metadata_pages = metadata_pages_for(config.logical_size);

        // the pinned table serves the first data page, which lies behind the first
        // table if the metadata pages fill it
        let mut frames = FramePool::new(config.resident_frames as u32 + 2)
            .map_err(VirtualMemError::FramePool)?;
        page_directory::init_tables(&mut frames, metadata_pages / ENTRIES_PER_TABLE);

        Ok(Self {
            region,
            frames,
            swap,
            eviction: E::new(config.resident_frames),
            write_back: config.write_back,
            metadata_pages: metadata_pages as u32,
            resident_frames: config.resident_frames,
            stats: Statistics::default(),
        })
    }

    /// First address after the metadata pages
    #[inline]
    pub(crate) fn data_start(&self) -> usize {
        self.region.start() + self.metadata_pages as usize * PAGE_SIZE
    }

    #[inline]
    pub(crate) fn data_size(&self) -> usize {
        self.region.size() - self.metadata_pages as usize * PAGE_SIZE
    }

    #[cfg(test)]
    pub(crate) fn reservation_contains(&self, addr: usize) -> bool {
        self.region.contains(addr)
    }

    #[inline]
    pub(crate) fn resident_frames(&self) -> usize {
        self.resident_frames
    }

    #[inline]
    pub(crate) fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Resolves a fault at the absolute address `addr`.
    ///
    /// Depending on the state of the page it is loaded, refreshed after a sweep or upgraded to write access.
    /// Faults for pages that are accessible already (another thread was faster) are ignored.
    pub(crate) fn handle_fault(&mut self, addr: usize) -> Result<(), FaultError> {
        if !self.region.contains(addr) {
            return Err(FaultError::OutsideReservation);
        }

        let page = LogicalAddress::new((addr - self.region.start()) as u32).page_start();
        if page.page_number() < self.metadata_pages {
            return Err(FaultError::MetadataRegion);
        }

        self.stats.faults += 1;

        let directory_index = page.translate().directory_index;
        if page_directory::table_frame(&self.frames, directory_index).is_none() {
            self.create_table(directory_index)?;
        }

        let entry = self.entry(page);
        if !entry.is_present() {
            self.load(page)
        } else if entry.is_lru() {
            self.refresh(page, entry)
        } else if !entry.is_writable() {
            self.upgrade(page, entry)
        } else {
            Ok(())
        }
    }

    /// Revokes the access to every unpinned resident page and sets its LRU flag.
    ///
    /// The next access to such a page faults and moves it to the tail of the eviction order.
    /// Returns the number of marked pages.
    pub(crate) fn reclaim_sweep(&mut self) -> usize {
        let start = self.region.as_ptr();
        let frames = &mut self.frames;
        let mut marked = 0;

        self.eviction.for_each_resident(|page_number| {
            let page = LogicalAddress::from_page_number(page_number);
            let entry = match page_directory::entry_mut(frames, page) {
                Some(entry) => entry,
                None => return,
            };

            if !entry.is_present() || entry.is_pinned() || entry.is_lru() {
                return;
            }

            let page_ptr = unsafe { start.add(page.raw() as usize) };
            if unsafe { protect(page_ptr, PROT_NONE) }.is_ok() {
                entry.set_lru(true);
                marked += 1;
            }
        });

        self.stats.reclaim_sweeps += 1;
        marked
    }

    /// Pins or unpins the resident page containing `addr`
    pub(crate) fn set_pinned(&mut self, addr: usize, pinned: bool) -> Result<(), VirtualMemError> {
        let page = self.data_page(addr)?;
        match page_directory::entry_mut(&mut self.frames, page) {
            Some(entry) if entry.is_present() => {
                entry.set_pinned(pinned);
                Ok(())
            }
            _ => Err(VirtualMemError::PageNotResident),
        }
    }

    /// Entry of the page containing `addr`, if it has a page table
    #[cfg(test)]
    pub(crate) fn entry_of(&self, addr: usize) -> Result<Option<PageTableEntry>, VirtualMemError> {
        let page = self.data_page(addr)?;
        Ok(page_directory::entry(&self.frames, page))
    }

    /// Appends all resident data pages to `pages` (in address order)
    pub(crate) fn collect_resident(&self, pages: &mut Vec<ResidentPage>) {
        let start = self.region.start();
        let metadata_pages = self.metadata_pages;

        page_directory::for_each_present(&self.frames, |page, entry| {
            if page.page_number() < metadata_pages {
                return;
            }

            pages.push(ResidentPage {
                address: start + page.raw() as usize,
                frame: entry.frame(),
                access: if entry.is_writable() {
                    PageAccess::Write
                } else {
                    PageAccess::Read
                },
                dirty: entry.is_dirty(),
                pinned: entry.is_pinned(),
                lru_marked: entry.is_lru(),
            });
        });
    }

    /// Number of resident data pages
    #[cfg(test)]
    pub(crate) fn resident_count(&self) -> usize {
        self.eviction.resident_count()
    }

    fn data_page(&self, addr: usize) -> Result<LogicalAddress, VirtualMemError> {
        if addr < self.data_start() || addr - self.data_start() >= self.data_size() {
            return Err(VirtualMemError::OutOfRange);
        }

        Ok(LogicalAddress::new((addr - self.region.start()) as u32).page_start())
    }

    /// Entry of a page whose table exists
    #[inline]
    fn entry(&self, page: LogicalAddress) -> PageTableEntry {
        page_directory::entry(&self.frames, page).unwrap_or(PageTableEntry::EMPTY)
    }

    #[inline]
    fn set_entry(&mut self, page: LogicalAddress, new_entry: PageTableEntry) {
        if let Some(entry) = page_directory::entry_mut(&mut self.frames, page) {
            *entry = new_entry;
        }
    }

    #[inline]
    fn page_ptr(&self, page: LogicalAddress) -> *mut u8 {
        unsafe { self.region.as_ptr().add(page.raw() as usize) }
    }

    fn create_table(&mut self, directory_index: usize) -> Result<(), FaultError> {
        let frame = self.obtain_frame()?;
        page_directory::install_table(&mut self.frames, directory_index, frame);
        self.stats.page_table_allocations += 1;

        Ok(())
    }

    /// NONE -> READ
    fn load(&mut self, page: LogicalAddress) -> Result<(), FaultError> {
        let mut entry = self.entry(page);
        let frame = self.obtain_frame()?;

        let content = self.frames.frame_mut(frame);
        if entry.is_accessed() {
            // loaded before, so the content is in the swap storage
            if self.swap.read(page.raw() as usize, content).is_err() {
                self.frames.give_back(frame);
                return Err(FaultError::SwapIo);
            }
            self.stats.page_ins += 1;
        } else {
            content.fill(0);
        }

        if unsafe { map_frame(self.page_ptr(page), self.frames.fd(), self.frames.file_offset(frame), PROT_READ) }
            .is_err()
        {
            self.frames.give_back(frame);
            return Err(FaultError::MapFailed);
        }

        entry.set_frame(frame);
        entry.set_present(true);
        entry.set_writable(false);
        entry.set_accessed(true);
        entry.set_dirty(false);
        entry.set_lru(false);
        entry.set_pinned(false);
        self.set_entry(page, entry);

        self.eviction.page_loaded(page.page_number());
        Ok(())
    }

    /// READ -> WRITE
    fn upgrade(&mut self, page: LogicalAddress, mut entry: PageTableEntry) -> Result<(), FaultError> {
        set_protection(self.page_ptr(page), PROT_READ | PROT_WRITE)?;

        entry.set_writable(true);
        entry.set_dirty(true);
        self.set_entry(page, entry);

        self.eviction.page_upgraded(page.page_number());
        self.stats.write_upgrades += 1;
        Ok(())
    }

    /// Restores the access that was revoked by a reclaim sweep
    fn refresh(&mut self, page: LogicalAddress, mut entry: PageTableEntry) -> Result<(), FaultError> {
        let prot = if entry.is_writable() {
            PROT_READ | PROT_WRITE
        } else {
            PROT_READ
        };
        set_protection(self.page_ptr(page), prot)?;

        entry.set_lru(false);
        self.set_entry(page, entry);

        self.eviction.page_refreshed(page.page_number());
        self.stats.lru_refreshes += 1;
        Ok(())
    }

    /// Takes a free frame, evicting a page if there is none
    fn obtain_frame(&mut self) -> Result<u32, FaultError> {
        if let Some(frame) = self.frames.take() {
            return Ok(frame);
        }

        self.evict_one()?;
        self.frames.take().ok_or(FaultError::NoEvictablePage)
    }

    /// Removes the victim of the eviction module, writing it back if needed
    fn evict_one(&mut self) -> Result<(), FaultError> {
        let frames = &self.frames;
        let victim = self
            .eviction
            .select_victim(|page| {
                page_directory::entry(frames, LogicalAddress::from_page_number(page))
                    .map_or(false, |entry| entry.is_pinned())
            })
            .ok_or(FaultError::NoEvictablePage)?;

        let page = LogicalAddress::from_page_number(victim);
        let mut entry = self.entry(page);
        debug_assert!(entry.is_present(), "victim {} is not resident", page);

        // the page is inaccessible from here on, so its frame cannot change anymore
        if unsafe { unmap_frame(self.page_ptr(page)) }.is_err() {
            return Err(FaultError::MapFailed);
        }

        let frame = entry.frame();
        if entry.is_dirty() || self.write_back == WriteBackPolicy::Everything {
            self.swap
                .write(page.raw() as usize, self.frames.frame(frame))
                .map_err(|_| FaultError::SwapIo)?;
            self.stats.page_outs += 1;
        }

        entry.set_present(false);
        entry.set_writable(false);
        entry.set_dirty(false);
        entry.set_lru(false);
        self.set_entry(page, entry);

        self.frames.give_back(frame);
        self.stats.evictions += 1;
        Ok(())
    }
}

fn set_protection(page: *mut u8, prot: c_int) -> Result<(), FaultError> {
    unsafe { protect(page, prot) }.map_err(|_| FaultError::ProtectFailed)
}

#[cfg(test)]
pub(crate) mod test {
    use std::ptr::{read_volatile, write_volatile};

    use super::{metadata_pages_for, PageAccess, PageManager};
    use crate::{
        address_mapping::PAGE_SIZE,
        modules::{
            eviction::{EvictionModule, FifoEvictionModule, LruEvictionModule},
            swap_storage::{test::get_test_storage, FileSwapStorageModule},
        },
        vmem_config::{VirtualMemConfig, WriteBackPolicy},
        vmem_error::FaultError,
    };

    const LOGICAL_SIZE: usize = 16 * 1024 * 1024;

    fn get_test_manager<E: EvictionModule>(
        test_name: &str,
        frames: usize,
        write_back: WriteBackPolicy,
    ) -> PageManager<E, FileSwapStorageModule> {
        let config = VirtualMemConfig {
            logical_size: LOGICAL_SIZE,
            resident_frames: frames,
            write_back,
            reclaim_interval: None,
        };

        PageManager::new(&config, get_test_storage(test_name, LOGICAL_SIZE)).unwrap()
    }

    /// Address of data page `n`
    fn page<E: EvictionModule>(manager: &PageManager<E, FileSwapStorageModule>, n: usize) -> usize {
        manager.data_start() + n * PAGE_SIZE
    }

    fn resident<E: EvictionModule>(manager: &PageManager<E, FileSwapStorageModule>) -> Vec<usize> {
        let mut pages = vec![];
        manager.collect_resident(&mut pages);
        pages.iter().map(|p| (p.address - manager.data_start()) / PAGE_SIZE).collect()
    }

    #[test]
    fn test_layout() {
        assert_eq!(metadata_pages_for(LOGICAL_SIZE), 5);
        assert_eq!(metadata_pages_for(1 << 32), 1025);

        let manager = get_test_manager::<LruEvictionModule>("pm_layout", 2, WriteBackPolicy::DirtyOnly);
        assert_eq!(manager.data_size(), LOGICAL_SIZE - 5 * PAGE_SIZE);
        assert_eq!(manager.data_start() % PAGE_SIZE, 0);
        assert!(manager.reservation_contains(manager.data_start() - 1));
        assert!(resident(&manager).is_empty());
    }

    #[test]
    fn test_load_then_upgrade() {
        let mut manager =
            get_test_manager::<LruEvictionModule>("pm_load_upgrade", 2, WriteBackPolicy::DirtyOnly);
        let addr = page(&manager, 0) + 8;

        manager.handle_fault(addr).unwrap();
        let entry = manager.entry_of(addr).unwrap().unwrap();
        assert!(entry.is_present() && !entry.is_writable() && !entry.is_dirty());
        // never loaded before, so zeroed
        assert_eq!(unsafe { read_volatile(addr as *const u64) }, 0);

        manager.handle_fault(addr).unwrap();
        let entry = manager.entry_of(addr).unwrap().unwrap();
        assert!(entry.is_writable() && entry.is_dirty());
        unsafe { write_volatile(addr as *mut u64, 0xDEAD_BEEF) };

        // already writable: nothing to do
        manager.handle_fault(addr).unwrap();

        let stats = manager.statistics();
        assert_eq!(stats.faults, 3);
        assert_eq!(stats.write_upgrades, 1);
        assert_eq!(stats.page_ins, 0);
    }

    #[test]
    fn test_fifo_eviction_order() {
        let mut manager =
            get_test_manager::<FifoEvictionModule>("pm_fifo_order", 2, WriteBackPolicy::DirtyOnly);

        for n in 1..=3 {
            manager.handle_fault(page(&manager, n)).unwrap();
        }

        assert_eq!(resident(&manager), vec![2, 3]);
        let stats = manager.statistics();
        assert_eq!(stats.evictions, 1);
        // nothing was written, so nothing has to be written back
        assert_eq!(stats.page_outs, 0);
    }

    #[test]
    fn test_fifo_prefers_clean_pages() {
        let mut manager =
            get_test_manager::<FifoEvictionModule>("pm_fifo_clean", 2, WriteBackPolicy::DirtyOnly);

        // page 1 becomes writable, page 2 stays read only
        manager.handle_fault(page(&manager, 1)).unwrap();
        manager.handle_fault(page(&manager, 1)).unwrap();
        manager.handle_fault(page(&manager, 2)).unwrap();

        manager.handle_fault(page(&manager, 3)).unwrap();
        assert_eq!(resident(&manager), vec![1, 3]);
    }

    #[test]
    fn test_swap_round_trip() {
        let mut manager =
            get_test_manager::<LruEvictionModule>("pm_round_trip", 2, WriteBackPolicy::DirtyOnly);
        let addr = page(&manager, 0);

        manager.handle_fault(addr).unwrap();
        manager.handle_fault(addr).unwrap();
        for i in 0..PAGE_SIZE {
            unsafe { write_volatile((addr + i) as *mut u8, (i % 251) as u8) };
        }

        // push page 0 out
        manager.handle_fault(page(&manager, 1)).unwrap();
        manager.handle_fault(page(&manager, 2)).unwrap();
        assert_eq!(resident(&manager), vec![1, 2]);
        assert_eq!(manager.statistics().page_outs, 1);

        manager.handle_fault(addr).unwrap();
        assert_eq!(manager.statistics().page_ins, 1);
        for i in 0..PAGE_SIZE {
            assert_eq!(unsafe { read_volatile((addr + i) as *const u8) }, (i % 251) as u8);
        }

        // loaded read only again
        let entry = manager.entry_of(addr).unwrap().unwrap();
        assert!(!entry.is_writable() && !entry.is_dirty());
    }

    #[test]
    fn test_write_back_everything() {
        let mut manager =
            get_test_manager::<LruEvictionModule>("pm_write_all", 2, WriteBackPolicy::Everything);

        for n in 0..4 {
            manager.handle_fault(page(&manager, n)).unwrap();
        }

        let stats = manager.statistics();
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.page_outs, 2);
    }

    #[test]
    fn test_sweep_and_refresh() {
        let mut manager =
            get_test_manager::<LruEvictionModule>("pm_sweep", 2, WriteBackPolicy::DirtyOnly);
        let p1 = page(&manager, 1);
        let p2 = page(&manager, 2);

        manager.handle_fault(p1).unwrap();
        manager.handle_fault(p1).unwrap();
        manager.handle_fault(p2).unwrap();

        assert_eq!(manager.reclaim_sweep(), 2);
        // already marked pages are skipped
        assert_eq!(manager.reclaim_sweep(), 0);

        let mut pages = vec![];
        manager.collect_resident(&mut pages);
        assert!(pages.iter().all(|p| p.lru_marked));

        // refresh keeps the previous access
        manager.handle_fault(p1).unwrap();
        let entry = manager.entry_of(p1).unwrap().unwrap();
        assert!(!entry.is_lru() && entry.is_writable());
        unsafe { write_volatile(p1 as *mut u8, 1) };

        // p2 is the least recently used page now
        manager.handle_fault(page(&manager, 3)).unwrap();
        assert_eq!(resident(&manager), vec![1, 3]);

        let stats = manager.statistics();
        assert_eq!(stats.lru_refreshes, 1);
        assert_eq!(stats.reclaim_sweeps, 2);
        assert_eq!(stats.page_outs, 0);
    }

    #[test]
    fn test_pinned_pages_stay() {
        let mut manager =
            get_test_manager::<LruEvictionModule>("pm_pinned", 2, WriteBackPolicy::DirtyOnly);
        let p1 = page(&manager, 1);

        assert!(manager.set_pinned(p1, true).is_err());
        manager.handle_fault(p1).unwrap();
        manager.set_pinned(p1, true).unwrap();

        for n in 2..6 {
            manager.handle_fault(page(&manager, n)).unwrap();
        }
        assert_eq!(resident(&manager), vec![1, 5]);

        // pinned pages are not swept either
        assert_eq!(manager.reclaim_sweep(), 1);

        manager.set_pinned(p1, false).unwrap();
        manager.handle_fault(page(&manager, 6)).unwrap();
        assert_eq!(resident(&manager), vec![5, 6]);
    }

    #[test]
    fn test_page_table_allocation() {
        let mut manager =
            get_test_manager::<LruEvictionModule>("pm_tables", 2, WriteBackPolicy::DirtyOnly);

        // first page that is covered by the third page table
        let far = manager.data_start() - 5 * PAGE_SIZE + 2 * 1024 * PAGE_SIZE;
        manager.handle_fault(page(&manager, 0)).unwrap();
        manager.handle_fault(page(&manager, 1)).unwrap();

        // the table takes one frame, so one data page has to go
        manager.handle_fault(far).unwrap();
        let stats = manager.statistics();
        assert_eq!(stats.page_table_allocations, 1);
        assert_eq!(stats.evictions, 2);
        assert_eq!(manager.resident_count(), 1);

        let mut pages = vec![];
        manager.collect_resident(&mut pages);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].address, far);
        assert_eq!(pages[0].access, PageAccess::Read);
    }

    #[test]
    fn test_full_size_space_uses_pinned_table() {
        let config = VirtualMemConfig {
            resident_frames: 2,
            reclaim_interval: None,
            ..Default::default()
        };
        let storage = get_test_storage("pm_full_size", config.logical_size);
        let mut manager = PageManager::<LruEvictionModule, _>::new(&config, storage).unwrap();

        // the metadata pages fill the whole first table
        assert_eq!(manager.data_start() - manager.region.start(), 1025 * PAGE_SIZE);

        for n in 1..=3 {
            manager.handle_fault(page(&manager, n)).unwrap();
        }

        let stats = manager.statistics();
        assert_eq!(stats.page_table_allocations, 0);
        assert_eq!(stats.evictions, 1);
        assert_eq!(resident(&manager), vec![2, 3]);
    }

    #[test]
    fn test_rejected_faults() {
        let mut manager =
            get_test_manager::<LruEvictionModule>("pm_rejected", 2, WriteBackPolicy::DirtyOnly);
        let start = manager.data_start() - 5 * PAGE_SIZE;

        assert_eq!(
            manager.handle_fault(start + LOGICAL_SIZE),
            Err(FaultError::OutsideReservation)
        );
        assert_eq!(manager.handle_fault(start - 1), Err(FaultError::OutsideReservation));
        assert_eq!(manager.handle_fault(start), Err(FaultError::MetadataRegion));
        assert_eq!(
            manager.handle_fault(manager.data_start() - 1),
            Err(FaultError::MetadataRegion)
        );

        assert_eq!(manager.statistics(), Default::default());
        assert!(resident(&manager).is_empty());
    }

    #[test]
    fn test_no_evictable_page() {
        let mut manager =
            get_test_manager::<FifoEvictionModule>("pm_all_pinned", 2, WriteBackPolicy::DirtyOnly);

        for n in 0..2 {
            manager.handle_fault(page(&manager, n)).unwrap();
            manager.set_pinned(page(&manager, n), true).unwrap();
        }

        assert_eq!(
            manager.handle_fault(page(&manager, 2)),
            Err(FaultError::NoEvictablePage)
        );
        assert_eq!(resident(&manager), vec![0, 1]);
    }
}
