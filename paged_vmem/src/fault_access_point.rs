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

//! Bridge between the `SIGSEGV` handler and the active virtual memory.
//!
//! The signal handler cannot receive any context, so the active virtual memory
//! registers itself in [`FAULT_ACCESS_POINT`] for as long as it exists.

use core::{mem, ptr::null_mut};
use std::{
    io,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use libc::{c_int, c_void, sigaction, siginfo_t, SA_SIGINFO, SIGSEGV};

use crate::{
    modules::{eviction::EvictionModule, swap_storage::SwapStorageModule},
    page_manager::PageManager,
    util::{format_hex, write_stderr},
    vmem_error::{FaultError, VirtualMemError},
};

/// `si_code` of a fault that was caused by missing access rights on a mapped page
const SEGV_ACCERR: c_int = 2;

/// For test environment we want to wait until a new virtual memory can be created
#[cfg(test)]
pub(crate) static ACTIVE_SPACE_MUTEX: Mutex<()> = Mutex::new(());

/// Something that can resolve page faults
pub(crate) trait FaultTarget: Send + Sync {
    /// Resolves the fault at the absolute address `addr`
    fn handle_fault(&self, addr: usize) -> Result<(), FaultError>;

    /// Revokes access to all resident pages, returns how many were marked
    fn reclaim_sweep(&self) -> usize;
}

impl<E: EvictionModule, S: SwapStorageModule> FaultTarget for Mutex<PageManager<E, S>> {
    fn handle_fault(&self, addr: usize) -> Result<(), FaultError> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle_fault(addr)
    }

    fn reclaim_sweep(&self) -> usize {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reclaim_sweep()
    }
}

pub(crate) static FAULT_ACCESS_POINT: FaultAccessPoint = FaultAccessPoint::empty();

pub(crate) struct FaultAccessPoint {
    /// Faults take a read lock, so several threads can fault at the same time
    /// (they are serialized by the lock of the target itself).
    /// `unset` takes the write lock and thus waits for every running handler.
    target: RwLock<Option<Arc<dyn FaultTarget>>>,

    /// handler that was installed before `set`
    previous: Mutex<Option<sigaction>>,
}

impl FaultAccessPoint {
    const fn empty() -> Self {
        Self {
            target: RwLock::new(None),
            previous: Mutex::new(None),
        }
    }

    /// Registers `target` and installs the fault handler.
    ///
    /// Fails with [`VirtualMemError::AlreadyActive`] if another target is registered.
    pub(crate) fn set(&self, target: Arc<dyn FaultTarget>) -> Result<(), VirtualMemError> {
        let mut slot = self.target.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(VirtualMemError::AlreadyActive);
        }

        let mut action: sigaction = unsafe { mem::zeroed() };
        action.sa_sigaction = fault_handler as usize;
        action.sa_flags = SA_SIGINFO;
        let mut previous: sigaction = unsafe { mem::zeroed() };

        unsafe {
            libc::sigemptyset(&mut action.sa_mask);
            if sigaction(SIGSEGV, &action, &mut previous) != 0 {
                return Err(VirtualMemError::SignalHandler(io::Error::last_os_error()));
            }
        }

        *self.previous.lock().unwrap_or_else(PoisonError::into_inner) = Some(previous);
        *slot = Some(target);

        Ok(())
    }

    /// Removes the registered target and restores the previous fault handler.
    ///
    /// Blocks until all faults that are currently handled are finished.
    pub(crate) fn unset(&self) {
        let mut slot = self.target.write().unwrap_or_else(PoisonError::into_inner);

        let previous = self
            .previous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            if unsafe { sigaction(SIGSEGV, &previous, null_mut()) } != 0 {
                log::error!(
                    "Could not restore previous fault handler: {}",
                    io::Error::last_os_error()
                );
            }
        }

        *slot = None;
    }

    fn handle_fault(&self, addr: usize) -> Result<(), FaultError> {
        let slot = self.target.read().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(target) => target.handle_fault(addr),
            None => Err(FaultError::NoActiveSpace),
        }
    }
}

extern "C" fn fault_handler(_sig: c_int, info: *mut siginfo_t, _context: *mut c_void) {
    let (addr, code) = unsafe { ((*info).si_addr() as usize, (*info).si_code) };

    if code != SEGV_ACCERR {
        fatal(FaultError::NotAccessViolation, addr);
    }

    print_fault_debug("page fault\n");
    if let Err(err) = FAULT_ACCESS_POINT.handle_fault(addr) {
        fatal(err, addr);
    }
}

/// Reports `err` on stderr and terminates the process.
///
/// Only uses async-signal-safe functions.
fn fatal(err: FaultError, addr: usize) -> ! {
    let mut buf = [0u8; 18];

    write_stderr(b"paged_vmem: unrecoverable fault at ");
    write_stderr(format_hex(addr, &mut buf));
    write_stderr(b": ");
    write_stderr(err.message().as_bytes());
    write_stderr(b"\n");

    unsafe { libc::_exit(1) }
}

#[cfg(not(feature = "fault_debug_prints"))]
pub(crate) fn print_fault_debug(_text: &str) {
    // do nothing
}

#[cfg(feature = "fault_debug_prints")]
pub(crate) fn print_fault_debug(text: &str) {
    // this is called from a signal handler, so do not use print
    unsafe { libc::write(libc::STDOUT_FILENO, text.as_ptr() as *const c_void, text.len()) };
}
