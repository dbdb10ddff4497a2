//! Variable width integers used by the canonical table: 0-254 take one byte, anything
//! larger up to 65535 is stored as 255 followed by a 16-bit little endian value.

use super::byte_at;
use crate::error::{HuffmunchError, Result};

/// Largest value the format can hold.
pub const INTX_MAX: usize = 0xFFFF;

/// Encoded size of x in bytes.
pub fn intx_size(x: usize) -> Result<usize> {
    match x {
        0..=254 => Ok(1),
        255..=INTX_MAX => Ok(3),
        _ => Err(HuffmunchError::FormatLimit(format!(
            "{} too large for a variable width integer",
            x
        ))),
    }
}

/// Append x to output. Returns the number of bytes written.
pub fn write_intx(x: usize, output: &mut Vec<u8>) -> Result<usize> {
    let size = intx_size(x)?;
    if size == 1 {
        output.push(x as u8);
    } else {
        output.push(255);
        output.push((x & 0xFF) as u8);
        output.push((x >> 8) as u8);
    }
    Ok(size)
}

/// Read a variable width integer at pos. Returns the value and the position after it.
pub fn read_intx(packed: &[u8], pos: usize) -> Result<(usize, usize)> {
    let x = byte_at(packed, pos)?;
    if x != 255 {
        return Ok((x as usize, pos + 1));
    }
    let lo = byte_at(packed, pos + 1)? as usize;
    let hi = byte_at(packed, pos + 2)? as usize;
    Ok((lo | (hi << 8), pos + 3))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn small_values_test() {
        let mut out = vec![];
        assert_eq!(write_intx(0, &mut out).unwrap(), 1);
        assert_eq!(write_intx(254, &mut out).unwrap(), 1);
        assert_eq!(out, vec![0, 254]);
        assert_eq!(read_intx(&out, 1).unwrap(), (254, 2));
    }

    #[test]
    fn escaped_values_test() {
        let mut out = vec![];
        assert_eq!(write_intx(255, &mut out).unwrap(), 3);
        assert_eq!(write_intx(0x1234, &mut out).unwrap(), 3);
        assert_eq!(out, vec![255, 255, 0, 255, 0x34, 0x12]);
        assert_eq!(read_intx(&out, 0).unwrap(), (255, 3));
        assert_eq!(read_intx(&out, 3).unwrap(), (0x1234, 6));
    }

    #[test]
    fn ceiling_test() {
        let mut out = vec![];
        assert!(write_intx(65535, &mut out).is_ok());
        assert!(write_intx(65536, &mut out).is_err());
        assert!(intx_size(70000).is_err());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn truncated_read_test() {
        assert!(read_intx(&[255, 1], 0).is_err());
        assert!(read_intx(&[], 0).is_err());
    }
}
