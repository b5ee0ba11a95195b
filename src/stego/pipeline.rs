// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Hide / retrieve pipeline.
//!
//! Hiding:
//! 1. Validate the bit-plane against the carrier's unit width
//! 2. Pad the payload to whole bytes, noting the padding count
//! 3. Draw one slot address per padded payload bit (see [`permute`])
//! 4. Check capacity before touching the carrier
//! 5. Write the metadata header (and the seed record in embedded-seed mode)
//! 6. Write payload bit `i` to `positions[i]` at the chosen plane
//!
//! Retrieval reverses the steps: read the header, regenerate the same
//! positions, gather the bits and drop the padding. Retrieval never mutates
//! the carrier or the position file.
//!
//! [`permute`]: crate::stego::permute

use std::path::Path;

use crate::carrier::{self, Carrier};
use crate::stego::error::StegoError;
use crate::stego::header::{self, MetadataHeader, MAX_PAYLOAD_BYTES};
use crate::stego::payload::PayloadBits;
use crate::stego::permute::{PositionList, PositionSource};

/// How payload addresses are chosen for the file-level entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    /// Caller-held seed or position file.
    Positions(PositionSource),
    /// A random seed is drawn at hide time and stored in the carrier, in a
    /// second reserved block directly after the header block.
    EmbeddedSeed,
}

/// Slots excluded from payload candidates.
fn excluded_prefix<C: Carrier + ?Sized>(carrier: &C, embedded_seed: bool) -> usize {
    let reserved = carrier.reserved_slots();
    if embedded_seed {
        reserved * 2
    } else {
        reserved
    }
}

fn check_shift<C: Carrier + ?Sized>(carrier: &C, shift: u8) -> Result<(), StegoError> {
    let unit_bits = carrier.unit_bits();
    if shift >= unit_bits {
        return Err(StegoError::InvalidShift { shift, unit_bits });
    }
    Ok(())
}

/// Hide `payload` in `carrier` at bit-plane `shift`.
///
/// The carrier is only modified once every check has passed: on error it is
/// left exactly as it was.
///
/// # Errors
/// - [`StegoError::InvalidShift`] if `shift` is not below the unit width.
/// - [`StegoError::InsufficientCapacity`] if the payload does not fit.
/// - [`StegoError::InvalidPositionFile`] for a malformed position file.
pub fn hide<C: Carrier + ?Sized>(
    carrier: &mut C,
    payload: &PayloadBits,
    source: &PositionSource,
    shift: u8,
) -> Result<MetadataHeader, StegoError> {
    hide_impl(carrier, payload, source, shift, None)
}

/// Hide `payload` with positions drawn from `seed`, storing the seed itself
/// in the carrier so that retrieval needs no key.
pub fn hide_embedded<C: Carrier + ?Sized>(
    carrier: &mut C,
    payload: &PayloadBits,
    seed: u32,
    shift: u8,
) -> Result<MetadataHeader, StegoError> {
    hide_impl(carrier, payload, &PositionSource::seeded(seed), shift, Some(seed))
}

fn hide_impl<C: Carrier + ?Sized>(
    carrier: &mut C,
    payload: &PayloadBits,
    source: &PositionSource,
    shift: u8,
    embedded_seed: Option<u32>,
) -> Result<MetadataHeader, StegoError> {
    let plan = plan_hide(carrier, payload, source, shift, embedded_seed.is_some())?;
    // The position file is the caller's key; write it before the carrier so a
    // failed write leaves both untouched.
    plan.positions.commit()?;
    apply_hide(carrier, &plan, embedded_seed)?;
    Ok(plan.header)
}

/// Everything a hide needs, computed without side effects.
struct HidePlan {
    header: MetadataHeader,
    padded: Vec<u8>,
    payload_bits: usize,
    positions: PositionList,
}

fn plan_hide<C: Carrier + ?Sized>(
    carrier: &C,
    payload: &PayloadBits,
    source: &PositionSource,
    shift: u8,
    embedded_seed: bool,
) -> Result<HidePlan, StegoError> {
    check_shift(carrier, shift)?;

    let padded = payload.padded();
    let byte_count = payload.byte_count();
    if byte_count > MAX_PAYLOAD_BYTES {
        return Err(StegoError::InsufficientCapacity {
            required: padded.len(),
            available: MAX_PAYLOAD_BYTES * 8,
        });
    }

    let prefix = excluded_prefix(carrier, embedded_seed);
    let slot_count = carrier.slot_count();
    if slot_count < prefix {
        return Err(StegoError::InsufficientCapacity {
            required: prefix + padded.len(),
            available: slot_count,
        });
    }

    let positions = source.generate(padded.len(), prefix, slot_count)?;
    if positions.len() < padded.len() {
        return Err(StegoError::InsufficientCapacity {
            required: padded.len(),
            available: positions.len(),
        });
    }

    let header = MetadataHeader {
        byte_count: byte_count as u16,
        shift,
        padding: payload.padding(),
    };
    Ok(HidePlan { header, padded, payload_bits: payload.len(), positions })
}

fn apply_hide<C: Carrier + ?Sized>(
    carrier: &mut C,
    plan: &HidePlan,
    embedded_seed: Option<u32>,
) -> Result<(), StegoError> {
    let reserved = carrier.reserved_slots();
    let shift = plan.header.shift;
    plan.header.write(carrier)?;
    if let Some(seed) = embedded_seed {
        header::write_word(carrier, reserved, seed)?;
    }
    for (&bit, &addr) in plan.padded.iter().zip(plan.positions.addrs()) {
        carrier.set_bit(addr, shift, bit);
    }

    tracing::info!(
        bits = plan.payload_bits,
        bytes = plan.header.byte_count,
        padding = plan.header.padding,
        shift,
        embedded_seed = embedded_seed.is_some(),
        "payload hidden"
    );
    Ok(())
}

/// Recover the payload hidden by [`hide`] with the same `source`.
///
/// A wrong seed or position list does not fail: it yields a payload of the
/// declared length whose bits are unrelated to the original.
///
/// # Errors
/// - [`StegoError::NotFound`] if a position file is named but absent.
/// - [`StegoError::InvalidShift`] if the header names an impossible plane
///   (the carrier holds no payload, or it is corrupted).
/// - [`StegoError::InsufficientCapacity`] if the header declares more bits
///   than the carrier can hold.
pub fn retrieve<C: Carrier + ?Sized>(
    carrier: &C,
    source: &PositionSource,
) -> Result<PayloadBits, StegoError> {
    if let PositionSource::FileBacked { path } = source {
        if !path.exists() {
            return Err(StegoError::NotFound(path.clone()));
        }
    }
    retrieve_impl(carrier, source, false)
}

/// Recover a payload hidden by [`hide_embedded`], reading the seed from the
/// carrier.
pub fn retrieve_embedded<C: Carrier + ?Sized>(carrier: &C) -> Result<PayloadBits, StegoError> {
    let seed = header::read_word(carrier, carrier.reserved_slots())?;
    retrieve_impl(carrier, &PositionSource::seeded(seed), true)
}

fn retrieve_impl<C: Carrier + ?Sized>(
    carrier: &C,
    source: &PositionSource,
    embedded_seed: bool,
) -> Result<PayloadBits, StegoError> {
    let header = MetadataHeader::read(carrier)?;
    check_shift(carrier, header.shift)?;

    let padded_len = header.byte_count as usize * 8;
    let prefix = excluded_prefix(carrier, embedded_seed);
    // Never committed: retrieval leaves a short position file as it is.
    let positions = source.generate(padded_len, prefix, carrier.slot_count())?;

    let mut bits = gather_bits(carrier, positions.addrs(), header.shift);
    bits.truncate(header.payload_bits());

    tracing::info!(
        bits = bits.len(),
        bytes = header.byte_count,
        padding = header.padding,
        shift = header.shift,
        "payload retrieved"
    );
    Ok(PayloadBits::from_bits(bits))
}

#[cfg(not(feature = "parallel"))]
fn gather_bits<C: Carrier + ?Sized>(carrier: &C, positions: &[usize], shift: u8) -> Vec<u8> {
    positions.iter().map(|&addr| carrier.get_bit(addr, shift)).collect()
}

/// Parallel gather: every read is independent, so rayon can split freely.
#[cfg(feature = "parallel")]
fn gather_bits<C: Carrier + ?Sized>(carrier: &C, positions: &[usize], shift: u8) -> Vec<u8> {
    use rayon::prelude::*;
    positions.par_iter().map(|&addr| carrier.get_bit(addr, shift)).collect()
}

/// Load `carrier_path`, hide the payload file in it, and save to `output_path`.
///
/// Returns the header written and, in embedded-seed mode, the seed drawn.
/// An extended position file is rewritten only after the output is saved.
pub fn hide_file(
    carrier_path: &Path,
    payload_path: &Path,
    output_path: &Path,
    addressing: &Addressing,
    shift: u8,
) -> Result<(MetadataHeader, Option<u32>), StegoError> {
    let payload = PayloadBits::from_file(payload_path)?;
    let mut carrier = carrier::open(carrier_path)?;

    let (source, seed) = match addressing {
        Addressing::Positions(source) => (source.clone(), None),
        Addressing::EmbeddedSeed => {
            let seed: u32 = rand::random();
            (PositionSource::seeded(seed), Some(seed))
        }
    };

    let plan = plan_hide(&carrier, &payload, &source, shift, seed.is_some())?;
    apply_hide(&mut carrier, &plan, seed)?;
    carrier.persist(output_path)?;
    // Only a saved carrier makes an extended position list worth keeping.
    plan.positions.commit()?;
    Ok((plan.header, seed))
}

/// Load `carrier_path` and recover its payload, optionally writing the
/// recovered-bits file in `line_width`-bit lines.
pub fn retrieve_file(
    carrier_path: &Path,
    addressing: &Addressing,
    recovered_path: Option<&Path>,
    line_width: usize,
) -> Result<PayloadBits, StegoError> {
    let carrier = carrier::open(carrier_path)?;
    let bits = match addressing {
        Addressing::Positions(source) => retrieve(&carrier, source)?,
        Addressing::EmbeddedSeed => retrieve_embedded(&carrier)?,
    };
    if let Some(path) = recovered_path {
        bits.write_lines(path, line_width)?;
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::wav::Samples;
    use crate::carrier::{AudioCarrier, ImageCarrier};
    use crate::stego::permute;

    fn audio(n: usize) -> AudioCarrier {
        let samples = (0..n).map(|i| (i * 37 % 256) as u8).collect();
        AudioCarrier::from_samples(Samples::U8(samples), 1, 8000).unwrap()
    }

    fn bits(s: &str) -> PayloadBits {
        s.parse().unwrap()
    }

    #[test]
    fn roundtrip_seeded_audio() {
        let mut c = audio(100);
        let payload = bits("1010101010101010");
        let h = hide(&mut c, &payload, &PositionSource::seeded(42), 0).unwrap();
        assert_eq!(h, MetadataHeader { byte_count: 2, shift: 0, padding: 0 });
        assert_eq!(retrieve(&c, &PositionSource::seeded(42)).unwrap(), payload);
    }

    #[test]
    fn roundtrip_with_padding() {
        let mut c = audio(200);
        let payload = bits("1101");
        let h = hide(&mut c, &payload, &PositionSource::seeded(3), 0).unwrap();
        assert_eq!(h.padding, 4);
        assert_eq!(retrieve(&c, &PositionSource::seeded(3)).unwrap(), payload);
    }

    #[test]
    fn roundtrip_high_plane_16bit() {
        let samples: Vec<i16> = (0..300).map(|i| (i as i16) * 97 - 14_000).collect();
        let mut c = AudioCarrier::from_samples(Samples::I16(samples), 2, 44_100).unwrap();
        let payload = bits("0110100111010");
        hide(&mut c, &payload, &PositionSource::seeded(11), 15).unwrap();
        assert_eq!(retrieve(&c, &PositionSource::seeded(11)).unwrap(), payload);
    }

    #[test]
    fn roundtrip_image() {
        let rgb: Vec<u8> = (0..20 * 20 * 3).map(|i| (i % 251) as u8).collect();
        let mut c = ImageCarrier::from_rgb(20, 20, rgb).unwrap();
        let payload = bits(&"1100".repeat(100));
        hide(&mut c, &payload, &PositionSource::seeded(0xDEAD_BEEF), 2).unwrap();
        assert_eq!(retrieve(&c, &PositionSource::seeded(0xDEAD_BEEF)).unwrap(), payload);
    }

    #[test]
    fn wrong_seed_yields_different_bits_of_same_length() {
        let mut c = AudioCarrier::from_samples(Samples::U8(vec![0; 100]), 1, 8000).unwrap();
        let payload = bits("1010101010101010");
        hide(&mut c, &payload, &PositionSource::seeded(42), 0).unwrap();
        let wrong = retrieve(&c, &PositionSource::seeded(43)).unwrap();
        assert_eq!(wrong.len(), 16);
        assert_ne!(wrong, payload);
    }

    #[test]
    fn payload_never_touches_header_slots() {
        let mut c = audio(120);
        let before = c.clone();
        hide(&mut c, &bits(&"1".repeat(80)), &PositionSource::seeded(5), 1).unwrap();
        let (Samples::U8(a), Samples::U8(b)) = (before.samples(), c.samples()) else {
            unreachable!()
        };
        for i in 0..32 {
            assert_eq!(a[i] & !1, b[i] & !1, "header sample {i} changed above plane 0");
        }
    }

    #[test]
    fn capacity_boundary_leaves_carrier_untouched() {
        // 96 samples - 32 reserved = 64 payload slots.
        let mut c = audio(96);
        let original = c.clone();
        let too_big = bits(&"1".repeat(65));
        match hide(&mut c, &too_big, &PositionSource::seeded(1), 0) {
            Err(StegoError::InsufficientCapacity { required: 72, available: 64 }) => {}
            other => panic!("expected InsufficientCapacity, got {other:?}"),
        }
        assert_eq!(c, original);

        let exact = bits(&"01".repeat(32));
        hide(&mut c, &exact, &PositionSource::seeded(1), 0).unwrap();
        assert_eq!(retrieve(&c, &PositionSource::seeded(1)).unwrap(), exact);
    }

    #[test]
    fn invalid_shift_rejected_before_mutation() {
        let mut c = audio(100);
        let original = c.clone();
        assert!(matches!(
            hide(&mut c, &bits("1"), &PositionSource::seeded(1), 8),
            Err(StegoError::InvalidShift { shift: 8, unit_bits: 8 })
        ));
        assert_eq!(c, original);
    }

    #[test]
    fn empty_payload_roundtrip() {
        let mut c = audio(40);
        let h = hide(&mut c, &PayloadBits::default(), &PositionSource::seeded(1), 0).unwrap();
        assert_eq!(h.byte_count, 0);
        assert!(retrieve(&c, &PositionSource::seeded(1)).unwrap().is_empty());
    }

    #[test]
    fn carrier_smaller_than_header() {
        let mut c = audio(20);
        assert!(matches!(
            hide(&mut c, &PayloadBits::default(), &PositionSource::seeded(1), 0),
            Err(StegoError::InsufficientCapacity { .. })
        ));
    }

    #[test]
    fn embedded_seed_roundtrip() {
        let mut c = audio(300);
        let payload = bits("111000111000101");
        hide_embedded(&mut c, &payload, 0xA5A5_0001, 0).unwrap();
        assert_eq!(retrieve_embedded(&c).unwrap(), payload);
    }

    #[test]
    fn embedded_seed_reserves_second_block() {
        // 64 reserved slots leave 36 for payload.
        let mut c = audio(100);
        assert!(matches!(
            hide_embedded(&mut c, &bits(&"1".repeat(40)), 9, 0),
            Err(StegoError::InsufficientCapacity { required: 40, available: 36 })
        ));
        hide_embedded(&mut c, &bits(&"1".repeat(32)), 9, 0).unwrap();
        assert_eq!(header::read_word(&c, 32).unwrap(), 9);
    }

    #[test]
    fn file_backed_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let pos = dir.path().join("positions.txt");
        std::fs::write(&pos, "40\n41\n42\n").unwrap();
        let source = PositionSource::file(&pos);

        let mut c = audio(400);
        let payload = bits("10011100101");
        hide(&mut c, &payload, &source, 0).unwrap();
        let stored = permute::read_position_file(&pos, 32, 400).unwrap();
        assert_eq!(stored.len(), 16);
        assert_eq!(&stored[..3], &[40, 41, 42]);
        assert_eq!(retrieve(&c, &source).unwrap(), payload);
    }

    #[test]
    fn retrieve_missing_position_file() {
        let c = audio(100);
        assert!(matches!(
            retrieve(&c, &PositionSource::file("/nonexistent/positions.txt")),
            Err(StegoError::NotFound(_))
        ));
    }

    #[test]
    fn garbage_header_declaring_too_much() {
        let mut c = audio(100);
        MetadataHeader { byte_count: 500, shift: 0, padding: 0 }.write(&mut c).unwrap();
        assert!(matches!(
            retrieve(&c, &PositionSource::seeded(1)),
            Err(StegoError::InsufficientCapacity { .. })
        ));
    }
}
