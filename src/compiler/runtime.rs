//! Built-in runtime helpers exposed to compiled code.
//!
//! Kal programs reach these through `extern` declarations; the JIT host maps
//! each declaration to the matching host address via [`host_symbol`]. All of
//! them use the C ABI. The `skip_*` family walks byte strings framed with
//! variable-length integers (continuation bit in the high bit of each byte).

use std::cmp::Ordering;
use std::io::Write;
use std::slice;

/// Checksum fields in framed byte strings are a fixed four bytes.
const CHECKSUM_LEN: usize = 4;

/// putchar that takes a double and returns 0.
#[no_mangle]
pub extern "C" fn putchard(x: f64) -> f64 {
    let _ = std::io::stderr().write_all(&[x as u8]);
    0.0
}

/// Three-way comparison of two length-delimited byte strings:
/// 0 for equal, 1 for greater, 0xFF for less.
#[no_mangle]
pub unsafe extern "C" fn my_strcmp(a: *const u8, la: u8, b: *const u8, lb: u8) -> u8 {
    let a = slice::from_raw_parts(a, la as usize);
    let b = slice::from_raw_parts(b, lb as usize);
    match a.cmp(b) {
        Ordering::Less => 0xff,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// 1 if the two length-delimited byte strings are equal, else 0.
#[no_mangle]
pub unsafe extern "C" fn streq(a: *const u8, la: u8, b: *const u8, lb: u8) -> u8 {
    let a = slice::from_raw_parts(a, la as usize);
    let b = slice::from_raw_parts(b, lb as usize);
    u8::from(a == b)
}

#[no_mangle]
pub unsafe extern "C" fn skip_byte(p: *mut u8) -> *mut u8 {
    p.add(1)
}

#[no_mangle]
pub unsafe extern "C" fn skip_bytes(p: *mut u8, n: u8) -> *mut u8 {
    p.add(n as usize)
}

#[no_mangle]
pub unsafe extern "C" fn skip_checksum(p: *mut u8) -> *mut u8 {
    p.add(CHECKSUM_LEN)
}

/// Consume one variable-length integer: every byte with the high bit set
/// continues, the first byte without it ends the run.
#[no_mangle]
pub unsafe extern "C" fn skip_int(mut p: *mut u8) -> *mut u8 {
    while *p & 0x80 != 0 {
        p = p.add(1);
    }
    p.add(1)
}

/// Resolve a runtime helper name to its host address.
pub fn host_symbol(name: &str) -> Option<usize> {
    Some(match name {
        "putchard" => putchard as usize,
        "my_strcmp" => my_strcmp as usize,
        "streq" => streq as usize,
        "skip_byte" => skip_byte as usize,
        "skip_bytes" => skip_bytes as usize,
        "skip_checksum" => skip_checksum as usize,
        "skip_int" => skip_int as usize,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streq_compares_contents() {
        let a = *b"AB";
        let b = *b"AB";
        let c = *b"AC";
        unsafe {
            assert_eq!(streq(a.as_ptr(), 2, b.as_ptr(), 2), 1);
            assert_eq!(streq(a.as_ptr(), 2, c.as_ptr(), 2), 0);
            assert_eq!(streq(a.as_ptr(), 1, b.as_ptr(), 2), 0);
        }
    }

    #[test]
    fn my_strcmp_orders_lexicographically() {
        let lo = *b"AA";
        let hi = *b"AB";
        unsafe {
            assert_eq!(my_strcmp(lo.as_ptr(), 2, hi.as_ptr(), 2), 0xff);
            assert_eq!(my_strcmp(hi.as_ptr(), 2, lo.as_ptr(), 2), 1);
            assert_eq!(my_strcmp(lo.as_ptr(), 2, lo.as_ptr(), 2), 0);
        }
    }

    #[test]
    fn skip_int_consumes_continuation_bytes() {
        let mut buf = [0x81, 0x82, 0x03, 0x7f];
        unsafe {
            let p = buf.as_mut_ptr();
            // Three varint bytes: two with the high bit, one terminal.
            assert_eq!(skip_int(p), p.add(3));
            // A single terminal byte.
            assert_eq!(skip_int(p.add(3)), p.add(4));
        }
    }

    #[test]
    fn skip_helpers_advance_by_the_right_amount() {
        let mut buf = [0u8; 16];
        unsafe {
            let p = buf.as_mut_ptr();
            assert_eq!(skip_byte(p), p.add(1));
            assert_eq!(skip_bytes(p, 5), p.add(5));
            assert_eq!(skip_checksum(p), p.add(4));
        }
    }

    #[test]
    fn host_symbol_knows_every_helper() {
        for name in [
            "putchard",
            "my_strcmp",
            "streq",
            "skip_byte",
            "skip_bytes",
            "skip_checksum",
            "skip_int",
        ] {
            assert!(host_symbol(name).is_some(), "missing helper {name}");
        }
        assert!(host_symbol("nope").is_none());
    }
}
