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

use std::{fmt, io};

/// Errors of [`crate::VirtualMem`] that are reported to the caller
#[derive(Debug)]
pub enum VirtualMemError {
    /// The host does not use 4 KiB pages
    UnsupportedPageSize(usize),
    InvalidConfig(&'static str),
    /// Reserving the logical space failed
    Reserve(io::Error),
    /// Creating or mapping the frame pool failed
    FramePool(io::Error),
    /// The swap storage cannot hold the whole logical space
    SwapTooSmall { required: usize, available: usize },
    /// There is already an active virtual memory in this process
    AlreadyActive,
    SignalHandler(io::Error),
    /// Spawning the reclaim ticker failed
    Ticker(io::Error),
    /// The page is not resident
    PageNotResident,
    /// The address is not inside of the usable range
    OutOfRange,
}

impl fmt::Display for VirtualMemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualMemError::UnsupportedPageSize(size) => {
                write!(f, "unsupported host page size: {} bytes", size)
            }
            VirtualMemError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            VirtualMemError::Reserve(err) => write!(f, "could not reserve logical space: {}", err),
            VirtualMemError::FramePool(err) => write!(f, "could not create frame pool: {}", err),
            VirtualMemError::SwapTooSmall {
                required,
                available,
            } => write!(
                f,
                "swap storage too small: {} bytes required, {} bytes available",
                required, available
            ),
            VirtualMemError::AlreadyActive => {
                write!(f, "another virtual memory is already active")
            }
            VirtualMemError::SignalHandler(err) => {
                write!(f, "could not install fault handler: {}", err)
            }
            VirtualMemError::Ticker(err) => write!(f, "could not start reclaim ticker: {}", err),
            VirtualMemError::PageNotResident => write!(f, "page is not resident"),
            VirtualMemError::OutOfRange => write!(f, "address is outside of the usable range"),
        }
    }
}

impl std::error::Error for VirtualMemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VirtualMemError::Reserve(err)
            | VirtualMemError::FramePool(err)
            | VirtualMemError::SignalHandler(err)
            | VirtualMemError::Ticker(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors while handling a page fault.
///
/// These are fatal for the process. The messages are static so that they can be
/// reported from within the signal handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultError {
    /// The address does not belong to the logical space
    OutsideReservation,
    /// The address belongs to the page directory/page table pages
    MetadataRegion,
    /// The fault was not caused by missing access rights
    NotAccessViolation,
    /// No virtual memory is registered
    NoActiveSpace,
    /// Every resident page is pinned, so no frame can be freed
    NoEvictablePage,
    SwapIo,
    MapFailed,
    ProtectFailed,
}

impl FaultError {
    pub const fn message(&self) -> &'static str {
        match self {
            FaultError::OutsideReservation => "address outside of the logical space",
            FaultError::MetadataRegion => "access to the page table region",
            FaultError::NotAccessViolation => "fault is not an access violation",
            FaultError::NoActiveSpace => "no active virtual memory",
            FaultError::NoEvictablePage => "no evictable page left",
            FaultError::SwapIo => "swap storage i/o failed",
            FaultError::MapFailed => "mapping a frame failed",
            FaultError::ProtectFailed => "changing page protection failed",
        }
    }
}

impl fmt::Display for FaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for FaultError {}
