//! Little-endian byte-encoding primitives.
//!
//! Each writer takes a cursor and returns the cursor after the write. Bounds
//! are checked before any byte is touched, so a failed write leaves the
//! buffer unchanged.

use crate::error::{FieldRef, LayoutError, Result};
use crate::types::COMPONENT_SIZE;

const WORD: usize = COMPONENT_SIZE as usize;

#[inline]
fn ensure_fits(buf: &[u8], at: usize, len: usize) -> Result<()> {
    match at.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(()),
        _ => Err(LayoutError::Capacity {
            target: FieldRef::Block,
            offset: at,
            len,
            capacity: buf.len(),
        }),
    }
}

#[inline]
fn write_word(buf: &mut [u8], at: usize, word: [u8; WORD]) -> Result<usize> {
    ensure_fits(buf, at, WORD)?;
    buf[at..at + WORD].copy_from_slice(&word);
    Ok(at + WORD)
}

#[inline]
pub fn write_i32(buf: &mut [u8], at: usize, v: i32) -> Result<usize> {
    write_word(buf, at, v.to_le_bytes())
}

#[inline]
pub fn write_u32(buf: &mut [u8], at: usize, v: u32) -> Result<usize> {
    write_word(buf, at, v.to_le_bytes())
}

/// Writes the raw IEEE-754 bit pattern of `v`.
#[inline]
pub fn write_f32(buf: &mut [u8], at: usize, v: f32) -> Result<usize> {
    write_word(buf, at, v.to_bits().to_le_bytes())
}

/// Writes `values` tightly packed, one 4-byte component after another.
pub fn write_components(buf: &mut [u8], at: usize, values: &[f32]) -> Result<usize> {
    ensure_fits(buf, at, values.len() * WORD)?;
    values
        .iter()
        .try_fold(at, |cursor, v| write_f32(buf, cursor, *v))
}

/// Writes each element's natural bytes, then advances by `stride`.
///
/// The gap between an element's payload and the next stride boundary is left
/// untouched; it is padding the shader never reads. Used for padded arrays and
/// for matrix columns.
pub fn write_sequence_with_stride<const N: usize>(
    buf: &mut [u8],
    at: usize,
    stride: usize,
    values: &[[f32; N]],
) -> Result<usize> {
    debug_assert!(stride >= N * WORD, "stride narrower than element");

    if let Some(last) = values.len().checked_sub(1) {
        let span = stride
            .checked_mul(last)
            .and_then(|s| s.checked_add(N * WORD))
            .unwrap_or(usize::MAX);
        ensure_fits(buf, at, span)?;
    }

    values.iter().try_fold(at, |cursor, element| {
        write_components(buf, cursor, element)?;
        Ok(cursor + stride)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_are_little_endian() {
        let mut buf = [0u8; 8];
        let next = write_i32(&mut buf, 0, -2).unwrap();
        assert_eq!(next, 4);
        assert_eq!(&buf[..4], &[0xfe, 0xff, 0xff, 0xff]);

        let next = write_u32(&mut buf, next, 0x0102_0304).unwrap();
        assert_eq!(next, 8);
        assert_eq!(&buf[4..], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn floats_use_raw_bits() {
        let mut buf = [0u8; 4];
        write_f32(&mut buf, 0, 1.5).unwrap();
        assert_eq!(buf, 1.5f32.to_bits().to_le_bytes());
        assert_eq!(buf, [0x00, 0x00, 0xc0, 0x3f]);
    }

    #[test]
    fn write_past_end_is_rejected() {
        let mut buf = [0u8; 6];
        let err = write_u32(&mut buf, 4, 7).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Capacity {
                target: FieldRef::Block,
                offset: 4,
                len: 4,
                capacity: 6,
            }
        );
        assert_eq!(buf, [0u8; 6]);
    }

    #[test]
    fn components_fail_atomically() {
        let mut buf = [0u8; 8];
        assert!(write_components(&mut buf, 0, &[1.0, 2.0, 3.0]).is_err());
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn stride_leaves_gaps_untouched() {
        let mut buf = [0xaau8; 32];
        let next = write_sequence_with_stride(&mut buf, 0, 16, &[[1.0f32, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(next, 32);
        assert_eq!(&buf[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&buf[4..8], &2.0f32.to_le_bytes());
        assert!(buf[8..16].iter().all(|b| *b == 0xaa));
        assert_eq!(&buf[16..20], &3.0f32.to_le_bytes());
        assert!(buf[24..32].iter().all(|b| *b == 0xaa));
    }

    #[test]
    fn stride_only_needs_room_for_last_payload() {
        // Two Vec3 columns 16 apart: 16 + 12 bytes, trailing padding not required.
        let mut buf = [0u8; 28];
        assert!(write_sequence_with_stride(&mut buf, 0, 16, &[[0.0f32; 3]; 2]).is_ok());
        let mut short = [0u8; 27];
        assert!(write_sequence_with_stride(&mut short, 0, 16, &[[0.0f32; 3]; 2]).is_err());
    }

    #[test]
    fn empty_sequence_is_a_no_op() {
        let mut buf: [u8; 0] = [];
        let empty: [[f32; 4]; 0] = [];
        assert_eq!(write_sequence_with_stride(&mut buf, 0, 16, &empty).unwrap(), 0);
    }
}
