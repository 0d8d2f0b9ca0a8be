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
    ptr::{read_volatile, write_volatile},
    thread,
    time::{Duration, Instant},
};

use super::{get_test_vmem, get_test_vmem_with, page_ptr, resident_page_numbers, TEST_LOGICAL_SIZE};
use crate::{
    modules::eviction::{FifoEvictionModule, LruEvictionModule},
    VirtualMemConfig, WriteBackPolicy,
};

#[test]
fn test_refresh_changes_victim() {
    let vmem = get_test_vmem::<LruEvictionModule>("test_refresh_victim", 2, WriteBackPolicy::DirtyOnly);

    unsafe {
        read_volatile(page_ptr(&vmem, 1));
        read_volatile(page_ptr(&vmem, 2));
    }
    assert_eq!(vmem.reclaim_sweep(), 2);
    assert!(vmem.resident_pages().iter().all(|page| page.lru_marked));

    unsafe {
        // refresh page 1, so page 2 is the oldest one
        read_volatile(page_ptr(&vmem, 1));
        read_volatile(page_ptr(&vmem, 3));
    }

    assert_eq!(resident_page_numbers(&vmem), vec![1, 3]);
    let stats = vmem.statistics();
    assert_eq!(stats.lru_refreshes, 1);
    assert_eq!(stats.reclaim_sweeps, 1);
    assert_eq!(stats.evictions, 1);
}

#[test]
fn test_refresh_keeps_write_access() {
    let vmem = get_test_vmem::<LruEvictionModule>("test_refresh_write", 2, WriteBackPolicy::DirtyOnly);
    let ptr = page_ptr(&vmem, 0);

    unsafe { write_volatile(ptr, 1u8) };
    assert_eq!(vmem.reclaim_sweep(), 1);

    unsafe { write_volatile(ptr, 2u8) };

    // load + upgrade + refresh, the refresh restored write access right away
    let stats = vmem.statistics();
    assert_eq!(stats.faults, 3);
    assert_eq!(stats.write_upgrades, 1);
    assert_eq!(stats.lru_refreshes, 1);
    assert_eq!(unsafe { read_volatile(ptr) }, 2);
}

#[test]
fn test_pinned_page_survives() {
    let vmem = get_test_vmem::<LruEvictionModule>("test_pinned_survives", 2, WriteBackPolicy::DirtyOnly);
    let pinned = page_ptr(&vmem, 0);

    unsafe { write_volatile(pinned, 9u8) };
    vmem.pin(pinned).unwrap();

    for n in 1..10 {
        unsafe { read_volatile(page_ptr(&vmem, n)) };
    }
    assert_eq!(resident_page_numbers(&vmem), vec![0, 9]);
    // pinned pages are not swept
    assert_eq!(vmem.reclaim_sweep(), 1);

    let faults = vmem.statistics().faults;
    assert_eq!(unsafe { read_volatile(pinned) }, 9);
    assert_eq!(vmem.statistics().faults, faults);

    vmem.unpin(pinned).unwrap();
    unsafe { read_volatile(page_ptr(&vmem, 10)) };
    assert_eq!(resident_page_numbers(&vmem), vec![9, 10]);
}

#[test]
fn test_ticker_sweeps_in_background() {
    let vmem = get_test_vmem_with::<LruEvictionModule>(
        "test_ticker_background",
        VirtualMemConfig {
            logical_size: TEST_LOGICAL_SIZE,
            resident_frames: 4,
            write_back: WriteBackPolicy::DirtyOnly,
            reclaim_interval: Some(Duration::from_millis(1)),
        },
    );

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut round = 0u32;
    while vmem.statistics().reclaim_sweeps < 5 || vmem.statistics().lru_refreshes == 0 {
        assert!(Instant::now() < deadline, "ticker did not sweep");

        for n in 0..8 {
            unsafe { write_volatile(page_ptr(&vmem, n) as *mut u32, round + n as u32) };
        }
        for n in 0..8 {
            assert_eq!(
                unsafe { read_volatile(page_ptr(&vmem, n) as *const u32) },
                round + n as u32
            );
        }

        round += 1;
        thread::sleep(Duration::from_millis(1));
    }

    // dropping stops the ticker and removes the handler
    drop(vmem);
}

#[test]
fn test_fifo_has_no_ticker() {
    let vmem = get_test_vmem_with::<FifoEvictionModule>(
        "test_fifo_no_ticker",
        VirtualMemConfig {
            logical_size: TEST_LOGICAL_SIZE,
            resident_frames: 2,
            write_back: WriteBackPolicy::DirtyOnly,
            reclaim_interval: Some(Duration::from_millis(1)),
        },
    );

    unsafe { read_volatile(page_ptr(&vmem, 0)) };
    thread::sleep(Duration::from_millis(20));

    assert_eq!(vmem.statistics().reclaim_sweeps, 0);
    assert!(vmem.resident_pages().iter().all(|page| !page.lru_marked));
}
