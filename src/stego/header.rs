// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! In-band metadata header.
//!
//! The header is a single 32-bit word stored in the first 32 slots of the
//! carrier, one bit per slot, always in bit-plane 0, most significant bit
//! first:
//!
//! ```text
//! bits 31..27  reserved (zero)
//! bits 26..24  padding   (0-7 zero bits appended to the payload)
//! bits 23..16  shift     (bit-plane holding the payload)
//! bits 15..0   length    (payload size in whole bytes)
//! ```
//!
//! The header region is never part of a position list, so payload writes
//! cannot clobber it.

use crate::carrier::Carrier;
use crate::stego::error::StegoError;

/// Slots occupied by one 32-bit record.
pub const HEADER_BITS: usize = 32;

/// Largest payload (in bytes) the 16-bit length field can describe.
pub const MAX_PAYLOAD_BYTES: usize = u16::MAX as usize;

/// Decoded header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataHeader {
    /// Payload length in whole (padded) bytes.
    pub byte_count: u16,
    /// Bit-plane the payload bits were written to.
    pub shift: u8,
    /// Zero bits appended to reach a byte boundary (0-7).
    pub padding: u8,
}

impl MetadataHeader {
    pub fn pack(&self) -> u32 {
        debug_assert!(self.padding < 8, "padding out of range");
        (self.byte_count as u32)
            | ((self.shift as u32) << 16)
            | (((self.padding & 0x7) as u32) << 24)
    }

    pub fn unpack(word: u32) -> Self {
        Self {
            byte_count: (word & 0xFFFF) as u16,
            shift: ((word >> 16) & 0xFF) as u8,
            padding: ((word >> 24) & 0x7) as u8,
        }
    }

    /// Payload length in bits after padding removal.
    pub fn payload_bits(&self) -> usize {
        (self.byte_count as usize * 8).saturating_sub(self.padding as usize)
    }

    /// Write the header into slots `0..32` of `carrier`.
    pub fn write<C: Carrier + ?Sized>(&self, carrier: &mut C) -> Result<(), StegoError> {
        write_word(carrier, 0, self.pack())
    }

    /// Read the header from slots `0..32` of `carrier`.
    pub fn read<C: Carrier + ?Sized>(carrier: &C) -> Result<Self, StegoError> {
        read_word(carrier, 0).map(Self::unpack)
    }
}

/// Store `word` MSB-first in plane 0 of slots `start..start + 32`.
pub(crate) fn write_word<C: Carrier + ?Sized>(
    carrier: &mut C,
    start: usize,
    word: u32,
) -> Result<(), StegoError> {
    check_room(carrier, start)?;
    for i in 0..HEADER_BITS {
        let bit = ((word >> (31 - i)) & 1) as u8;
        carrier.set_bit(start + i, 0, bit);
    }
    Ok(())
}

/// Inverse of [`write_word`].
pub(crate) fn read_word<C: Carrier + ?Sized>(carrier: &C, start: usize) -> Result<u32, StegoError> {
    check_room(carrier, start)?;
    let mut word = 0u32;
    for i in 0..HEADER_BITS {
        word = (word << 1) | carrier.get_bit(start + i, 0) as u32;
    }
    Ok(word)
}

fn check_room<C: Carrier + ?Sized>(carrier: &C, start: usize) -> Result<(), StegoError> {
    let available = carrier.slot_count();
    if start + HEADER_BITS > available {
        return Err(StegoError::InsufficientCapacity {
            required: start + HEADER_BITS,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::wav::Samples;
    use crate::carrier::{AudioCarrier, ImageCarrier};

    #[test]
    fn pack_layout() {
        let h = MetadataHeader { byte_count: 0x1234, shift: 0xAB, padding: 5 };
        assert_eq!(h.pack(), 0x05AB_1234);
        assert_eq!(MetadataHeader::unpack(0x05AB_1234), h);
    }

    #[test]
    fn reserved_bits_ignored_on_unpack() {
        let h = MetadataHeader::unpack(0xFFFF_FFFF);
        assert_eq!(h, MetadataHeader { byte_count: 0xFFFF, shift: 0xFF, padding: 7 });
    }

    #[test]
    fn payload_bits_subtracts_padding() {
        let h = MetadataHeader { byte_count: 3, shift: 0, padding: 7 };
        assert_eq!(h.payload_bits(), 17);
        let empty = MetadataHeader { byte_count: 0, shift: 0, padding: 0 };
        assert_eq!(empty.payload_bits(), 0);
    }

    #[test]
    fn audio_header_roundtrip_touches_only_plane0_of_first_32() {
        let samples: Vec<i16> = (0..64i32).map(|i| (i * 900 - 28_000) as i16).collect();
        let mut c = AudioCarrier::from_samples(Samples::I16(samples.clone()), 1, 8000).unwrap();
        let h = MetadataHeader { byte_count: 513, shift: 3, padding: 2 };
        h.write(&mut c).unwrap();
        assert_eq!(MetadataHeader::read(&c).unwrap(), h);

        let Samples::I16(after) = c.samples() else { unreachable!() };
        for (i, (a, b)) in samples.iter().zip(after).enumerate() {
            if i < HEADER_BITS {
                assert_eq!(a & !1, b & !1, "sample {i} changed above plane 0");
            } else {
                assert_eq!(a, b, "sample {i} outside header changed");
            }
        }
    }

    #[test]
    fn image_header_uses_first_32_channels() {
        let mut c = ImageCarrier::from_rgb(4, 4, vec![0xFF; 48]).unwrap();
        let h = MetadataHeader { byte_count: 1, shift: 0, padding: 0 };
        h.write(&mut c).unwrap();
        let rgb = c.as_rgb();
        // Word 0x0000_0001: only the very last header bit is 1.
        assert!(rgb[..31].iter().all(|&v| v == 0xFE));
        assert_eq!(rgb[31], 0xFF);
        // The 33rd reserved channel and beyond are untouched.
        assert!(rgb[32..].iter().all(|&v| v == 0xFF));
        assert_eq!(MetadataHeader::read(&c).unwrap(), h);
    }

    #[test]
    fn too_small_carrier() {
        let c = AudioCarrier::from_samples(Samples::U8(vec![0; 31]), 1, 8000).unwrap();
        assert!(matches!(
            MetadataHeader::read(&c),
            Err(StegoError::InsufficientCapacity { required: 32, available: 31 })
        ));
    }
}
