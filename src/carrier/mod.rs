// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Carrier views: images and PCM audio as flat arrays of bit-slots.
//!
//! A carrier is a fixed-length sequence of integer *units*. For audio a unit
//! is one interleaved PCM sample (8 or 16 bits) and each unit is one slot.
//! For images every pixel contributes three 8-bit channel units (R, G, B),
//! so slot `a` addresses pixel `a / 3`, channel `a % 3`.
//!
//! The [`Carrier`] trait is the only thing the embedding engine sees. It
//! reads and writes a single bit-plane of a single unit; nothing else in the
//! unit changes.
//!
//! Container I/O lives here too: RIFF/WAVE is parsed in-crate (see [`wav`]),
//! raster formats go through the `image` crate.

pub mod audio;
pub mod error;
pub mod raster;
pub mod wav;

use std::path::Path;

pub use self::audio::AudioCarrier;
pub use self::error::{CarrierError, Result};
pub use self::raster::ImageCarrier;

/// Which kind of medium backs a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Audio,
    Image,
}

/// A fully materialized carrier addressed slot by slot.
pub trait Carrier: Send + Sync {
    fn kind(&self) -> CarrierKind;

    /// Number of samples (audio) or pixels (image).
    fn unit_count(&self) -> usize;

    /// Size of the slot address space.
    fn slot_count(&self) -> usize;

    /// Width in bits of a single slot's unit; valid shifts are `0..unit_bits`.
    fn unit_bits(&self) -> u8;

    /// Length of the leading slot block set aside for the metadata header.
    fn reserved_slots(&self) -> usize;

    /// Read bit-plane `shift` of the unit at `addr`.
    fn get_bit(&self, addr: usize, shift: u8) -> u8;

    /// Overwrite bit-plane `shift` of the unit at `addr` with `bit & 1`.
    fn set_bit(&mut self, addr: usize, shift: u8, bit: u8);

    /// Write the carrier back to disk in its native container.
    fn persist(&self, path: &Path) -> Result<()>;
}

/// A carrier loaded from disk whose kind was chosen by file extension.
#[derive(Debug, Clone)]
pub enum AnyCarrier {
    Audio(AudioCarrier),
    Image(ImageCarrier),
}

/// Open a carrier file, choosing the decoder from its extension.
///
/// `.wav` / `.wave` are read as PCM audio; anything else is handed to the
/// image decoder.
///
/// # Errors
/// - [`CarrierError::NotFound`] if `path` does not exist.
/// - [`CarrierError::UnsupportedFormat`] for sample widths other than 8/16
///   bits or unrecognised containers.
pub fn open(path: &Path) -> Result<AnyCarrier> {
    if !path.exists() {
        return Err(CarrierError::NotFound(path.to_path_buf()));
    }
    if is_wav_path(path) {
        Ok(AnyCarrier::Audio(AudioCarrier::open(path)?))
    } else {
        Ok(AnyCarrier::Image(ImageCarrier::open(path)?))
    }
}

fn is_wav_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav") || e.eq_ignore_ascii_case("wave"))
        .unwrap_or(false)
}

impl Carrier for AnyCarrier {
    fn kind(&self) -> CarrierKind {
        match self {
            Self::Audio(c) => c.kind(),
            Self::Image(c) => c.kind(),
        }
    }

    fn unit_count(&self) -> usize {
        match self {
            Self::Audio(c) => c.unit_count(),
            Self::Image(c) => c.unit_count(),
        }
    }

    fn slot_count(&self) -> usize {
        match self {
            Self::Audio(c) => c.slot_count(),
            Self::Image(c) => c.slot_count(),
        }
    }

    fn unit_bits(&self) -> u8 {
        match self {
            Self::Audio(c) => c.unit_bits(),
            Self::Image(c) => c.unit_bits(),
        }
    }

    fn reserved_slots(&self) -> usize {
        match self {
            Self::Audio(c) => c.reserved_slots(),
            Self::Image(c) => c.reserved_slots(),
        }
    }

    fn get_bit(&self, addr: usize, shift: u8) -> u8 {
        match self {
            Self::Audio(c) => c.get_bit(addr, shift),
            Self::Image(c) => c.get_bit(addr, shift),
        }
    }

    fn set_bit(&mut self, addr: usize, shift: u8, bit: u8) {
        match self {
            Self::Audio(c) => c.set_bit(addr, shift, bit),
            Self::Image(c) => c.set_bit(addr, shift, bit),
        }
    }

    fn persist(&self, path: &Path) -> Result<()> {
        match self {
            Self::Audio(c) => c.persist(path),
            Self::Image(c) => c.persist(path),
        }
    }
}

/// Read bit-plane `shift` of a 16-bit unit pattern.
#[inline]
pub(crate) fn plane_get(unit: u16, shift: u8) -> u8 {
    ((unit >> shift) & 1) as u8
}

/// Clear bit-plane `shift` and OR in `bit`.
#[inline]
pub(crate) fn plane_set(unit: u16, shift: u8, bit: u8) -> u16 {
    (unit & !(1u16 << shift)) | (((bit & 1) as u16) << shift)
}
