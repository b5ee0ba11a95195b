// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! RIFF/WAVE container parsing and writing.
//!
//! Walks the RIFF chunk list, extracting the `fmt ` and `data` chunks and
//! skipping everything else. Only integer PCM is accepted: 8-bit unsigned or
//! 16-bit signed little-endian samples, any channel count. Writing emits a
//! canonical 44-byte header followed by the interleaved sample data, so the
//! channel count, sample rate and width round-trip unchanged.

use super::error::{CarrierError, Result};

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of the canonical header written by [`write_wav`].
pub const CANONICAL_HEADER_LEN: usize = 44;

/// Stream parameters from the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Bytes per interleaved frame, as stored in the 16-bit header field.
    pub fn block_align(&self) -> Result<u16> {
        let align = self.channels as u32 * (self.bits_per_sample as u32 / 8);
        u16::try_from(align).map_err(|_| {
            CarrierError::UnsupportedFormat(format!(
                "{} channels of {}-bit samples overflow the block-align field",
                self.channels, self.bits_per_sample
            ))
        })
    }

    /// Bytes per second, as stored in the 32-bit header field.
    pub fn byte_rate(&self) -> Result<u32> {
        let align = self.block_align()? as u32;
        self.sample_rate.checked_mul(align).ok_or_else(|| {
            CarrierError::UnsupportedFormat(format!(
                "{} Hz with {align}-byte frames overflows the byte-rate field",
                self.sample_rate
            ))
        })
    }

    /// Reject parameters the canonical header cannot represent.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(CarrierError::UnsupportedFormat("zero channels".into()));
        }
        self.byte_rate().map(|_| ())
    }
}

/// Interleaved PCM samples at their native width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Samples {
    /// 8-bit PCM is unsigned (silence = 128).
    U8(Vec<u8>),
    /// 16-bit PCM is signed little-endian.
    I16(Vec<i16>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(s) => s.len(),
            Self::I16(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of one sample in bits.
    pub fn bits(&self) -> u8 {
        match self {
            Self::U8(_) => 8,
            Self::I16(_) => 16,
        }
    }
}

fn read_u16(data: &[u8], pos: usize) -> Result<u16> {
    data.get(pos..pos + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or(CarrierError::InvalidWav("truncated chunk"))
}

fn read_u32(data: &[u8], pos: usize) -> Result<u32> {
    data.get(pos..pos + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(CarrierError::InvalidWav("truncated chunk"))
}

fn parse_fmt(chunk: &[u8]) -> Result<WavFormat> {
    if chunk.len() < 16 {
        return Err(CarrierError::InvalidWav("fmt chunk shorter than 16 bytes"));
    }
    let format_tag = read_u16(chunk, 0)?;
    let channels = read_u16(chunk, 2)?;
    let sample_rate = read_u32(chunk, 4)?;
    let bits_per_sample = read_u16(chunk, 14)?;

    if format_tag != WAVE_FORMAT_PCM && format_tag != WAVE_FORMAT_EXTENSIBLE {
        return Err(CarrierError::UnsupportedFormat(format!(
            "WAVE format tag 0x{format_tag:04X} is not integer PCM"
        )));
    }
    if channels == 0 {
        return Err(CarrierError::InvalidWav("zero channels"));
    }
    if bits_per_sample != 8 && bits_per_sample != 16 {
        return Err(CarrierError::UnsupportedFormat(format!(
            "{bits_per_sample}-bit samples (only 8 or 16 supported)"
        )));
    }

    let format = WavFormat { channels, sample_rate, bits_per_sample };
    format.validate()?;
    Ok(format)
}

/// Parse a RIFF/WAVE byte stream into its format and samples.
///
/// Trailing bytes that do not form a whole sample are dropped.
pub fn parse_wav(data: &[u8]) -> Result<(WavFormat, Samples)> {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(CarrierError::UnsupportedFormat("missing RIFF/WAVE signature".into()));
    }

    let mut format: Option<WavFormat> = None;
    let mut pos = 12;

    while pos + 8 <= data.len() {
        let id = &data[pos..pos + 4];
        let size = read_u32(data, pos + 4)? as usize;
        let body_start = pos + 8;
        // Some writers leave a bogus size on the final data chunk; clamp it.
        let body_end = body_start.saturating_add(size).min(data.len());
        let body = &data[body_start..body_end];

        match id {
            b"fmt " => format = Some(parse_fmt(body)?),
            b"data" => {
                let fmt = format.ok_or(CarrierError::InvalidWav("data chunk before fmt chunk"))?;
                return Ok((fmt, decode_samples(&fmt, body)));
            }
            _ => {}
        }

        // Chunks are word-aligned.
        pos = body_start.saturating_add(size).saturating_add(size & 1);
    }

    Err(CarrierError::InvalidWav("no data chunk"))
}

fn decode_samples(fmt: &WavFormat, body: &[u8]) -> Samples {
    match fmt.bits_per_sample {
        8 => Samples::U8(body.to_vec()),
        _ => Samples::I16(
            body.chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]))
                .collect(),
        ),
    }
}

/// Serialize samples into a canonical PCM WAVE file.
///
/// # Errors
/// [`CarrierError::UnsupportedFormat`] if a header field would overflow or
/// the sample width does not match `fmt`.
pub fn write_wav(fmt: &WavFormat, samples: &Samples) -> Result<Vec<u8>> {
    if fmt.bits_per_sample != samples.bits() as u16 {
        return Err(CarrierError::UnsupportedFormat(format!(
            "{}-bit samples in a {}-bit stream",
            samples.bits(),
            fmt.bits_per_sample
        )));
    }
    let block_align = fmt.block_align()?;
    let byte_rate = fmt.byte_rate()?;

    let data_len = samples.len() * (fmt.bits_per_sample as usize / 8);
    let riff_len = 36 + data_len + (data_len & 1);
    let (Ok(data_field), Ok(riff_field)) = (u32::try_from(data_len), u32::try_from(riff_len))
    else {
        return Err(CarrierError::UnsupportedFormat(format!(
            "{data_len} bytes of sample data exceed the RIFF size limit"
        )));
    };

    let mut out = Vec::with_capacity(CANONICAL_HEADER_LEN + data_len + 1);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_field.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&fmt.channels.to_le_bytes());
    out.extend_from_slice(&fmt.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&fmt.bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_field.to_le_bytes());
    match samples {
        Samples::U8(s) => out.extend_from_slice(s),
        Samples::I16(s) => {
            for v in s {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
    if data_len & 1 == 1 {
        out.push(0); // pad byte
    }
    Ok(out)
}
