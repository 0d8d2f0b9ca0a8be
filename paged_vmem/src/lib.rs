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

mod address_mapping;
mod fault_access_point;
mod page_manager;
mod reclaim_ticker;
mod util;
mod virtual_mem;
mod vmem_config;
mod vmem_error;

#[cfg(test)]
mod test;

pub mod modules;

pub use address_mapping::{
    LogicalAddress, PageTableEntry, Translation, ENTRIES_PER_TABLE, MAX_LOGICAL_SIZE, PAGE_SIZE,
};
pub use page_manager::{PageAccess, ResidentPage, Statistics};
pub use virtual_mem::VirtualMem;
pub use vmem_config::{VirtualMemConfig, WriteBackPolicy};
pub use vmem_error::{FaultError, VirtualMemError};
