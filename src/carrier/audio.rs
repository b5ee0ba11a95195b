// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! PCM audio carrier backed by a WAVE file.

use std::path::Path;

use super::error::{CarrierError, Result};
use super::wav::{self, Samples, WavFormat};
use super::{plane_get, plane_set, Carrier, CarrierKind};

/// Number of leading samples reserved for the metadata header.
pub const AUDIO_RESERVED_SLOTS: usize = 32;

/// Interleaved PCM samples plus the stream parameters needed to save them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCarrier {
    format: WavFormat,
    samples: Samples,
}

impl AudioCarrier {
    /// Load a WAVE file.
    ///
    /// # Errors
    /// - [`CarrierError::NotFound`] if the file does not exist.
    /// - [`CarrierError::UnsupportedFormat`] for non-PCM or widths other than 8/16 bits.
    /// - [`CarrierError::InvalidWav`] for malformed chunk structure.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CarrierError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let carrier = Self::from_wav_bytes(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            channels = carrier.format.channels,
            sample_rate = carrier.format.sample_rate,
            bits = carrier.format.bits_per_sample,
            samples = carrier.samples.len(),
            "loaded audio carrier"
        );
        Ok(carrier)
    }

    /// Decode a carrier from in-memory WAVE bytes.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let (format, samples) = wav::parse_wav(bytes)?;
        Ok(Self { format, samples })
    }

    /// Build a carrier directly from decoded samples.
    ///
    /// # Errors
    /// [`CarrierError::UnsupportedFormat`] if `channels` is zero or the
    /// parameters overflow a WAVE header field.
    pub fn from_samples(samples: Samples, channels: u16, sample_rate: u32) -> Result<Self> {
        let format = WavFormat {
            channels,
            sample_rate,
            bits_per_sample: samples.bits() as u16,
        };
        format.validate()?;
        Ok(Self { format, samples })
    }

    pub fn format(&self) -> &WavFormat {
        &self.format
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Serialize to WAVE bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        wav::write_wav(&self.format, &self.samples)
    }
}

impl Carrier for AudioCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Audio
    }

    fn unit_count(&self) -> usize {
        self.samples.len()
    }

    fn slot_count(&self) -> usize {
        self.samples.len()
    }

    fn unit_bits(&self) -> u8 {
        self.samples.bits()
    }

    fn reserved_slots(&self) -> usize {
        AUDIO_RESERVED_SLOTS
    }

    fn get_bit(&self, addr: usize, shift: u8) -> u8 {
        debug_assert!(shift < self.unit_bits());
        match &self.samples {
            Samples::U8(s) => plane_get(s[addr] as u16, shift),
            Samples::I16(s) => plane_get(s[addr] as u16, shift),
        }
    }

    fn set_bit(&mut self, addr: usize, shift: u8, bit: u8) {
        debug_assert!(shift < self.unit_bits());
        match &mut self.samples {
            Samples::U8(s) => s[addr] = plane_set(s[addr] as u16, shift, bit) as u8,
            Samples::I16(s) => s[addr] = plane_set(s[addr] as u16, shift, bit) as i16,
        }
    }

    fn persist(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_wav_bytes()?)?;
        tracing::debug!(path = %path.display(), "persisted audio carrier");
        Ok(())
    }
}
