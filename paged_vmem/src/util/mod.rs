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

pub(crate) mod mmap_guard;

use libc::{c_void, sysconf, _SC_PAGE_SIZE};

pub(crate) fn get_page_size() -> usize {
    unsafe { sysconf(_SC_PAGE_SIZE) as usize }
}

pub(crate) fn padding_needed_for(offset: usize, alignment: usize) -> usize {
    let misalignment = offset % alignment;
    if misalignment > 0 {
        // round up to next multiple of `alignment`
        alignment - misalignment
    } else {
        // already a multiple of `alignment`
        0
    }
}

/// efficient way to calculate: ceil(x / y)
pub(crate) fn ceil_div(x: usize, y: usize) -> usize {
    (x + y - 1) / y
}

/// Writes `bytes` to stderr without allocating or locking, so it is safe in
/// signal handlers and inside of the global allocator
pub(crate) fn write_stderr(bytes: &[u8]) {
    unsafe { libc::write(libc::STDERR_FILENO, bytes.as_ptr() as *const c_void, bytes.len()) };
}

/// Formats `value` as `0x` followed by 16 hex digits without allocating
pub(crate) fn format_hex(value: usize, buf: &mut [u8; 18]) -> &[u8] {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    buf[0] = b'0';
    buf[1] = b'x';
    for i in 0..16 {
        let shift = (15 - i) * 4;
        buf[2 + i] = DIGITS[(value >> shift) & 0xF];
    }

    &buf[..]
}

#[cfg(test)]
mod test {
    use super::{ceil_div, format_hex, padding_needed_for};

    #[test]
    fn test_ceil_div() {
        // just test a bunch of different values
        for y in 1..100 {
            for x in 0..y * 3 {
                let expected_value = if x % y == 0 { x / y } else { (x / y) + 1 };

                assert_eq!(ceil_div(x, y), expected_value);
            }
        }
    }

    #[test]
    fn test_padding_needed_for() {
        assert_eq!(padding_needed_for(0, 8), 0);
        assert_eq!(padding_needed_for(4, 8), 4);
        assert_eq!(padding_needed_for(12, 8), 4);
        assert_eq!(padding_needed_for(4097, 4096), 4095);
    }

    #[test]
    fn test_format_hex() {
        let mut buf = [0u8; 18];
        assert_eq!(format_hex(0xdead_beef, &mut buf), b"0x00000000deadbeef");
        assert_eq!(format_hex(usize::MAX, &mut buf), b"0xffffffffffffffff");
    }
}
