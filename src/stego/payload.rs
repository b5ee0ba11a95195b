// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Payload bit strings and their text-file forms.
//!
//! A payload is an arbitrary-length sequence of bits. Before embedding it is
//! zero-padded to a whole number of bytes; the padding count (0–7) travels in
//! the metadata header so the original length is recovered exactly.
//!
//! On disk a payload is plain text: one or more lines of `0`/`1`, with
//! surrounding whitespace and blank lines ignored. Recovered payloads are
//! written back as fixed-width lines (4 bits by default).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::stego::error::StegoError;

/// Width of each line in a recovered-bits file.
pub const DEFAULT_LINE_WIDTH: usize = 4;

/// An ordered sequence of bits, each stored as `0` or `1` in a `u8`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadBits {
    bits: Vec<u8>,
}

impl PayloadBits {
    /// Parse payload text: every non-blank line, stripped, must be `0`/`1`.
    ///
    /// # Errors
    /// [`StegoError::InvalidPayload`] naming the first offending line.
    pub fn parse(text: &str) -> Result<Self, StegoError> {
        let mut bits = Vec::with_capacity(text.len());
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            for c in line.chars() {
                match c {
                    '0' => bits.push(0),
                    '1' => bits.push(1),
                    _ => return Err(StegoError::InvalidPayload(line.to_string())),
                }
            }
        }
        Ok(Self { bits })
    }

    /// Read and parse a payload text file.
    ///
    /// # Errors
    /// - [`StegoError::NotFound`] if the file does not exist.
    /// - [`StegoError::InvalidPayload`] on any non-binary character.
    pub fn from_file(path: &Path) -> Result<Self, StegoError> {
        if !path.exists() {
            return Err(StegoError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Wrap raw bit values. Anything non-zero counts as `1`.
    pub fn from_bits(bits: Vec<u8>) -> Self {
        Self { bits: bits.into_iter().map(|b| (b != 0) as u8).collect() }
    }

    /// Logical length in bits (before padding).
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_bits(&self) -> &[u8] {
        &self.bits
    }

    /// Zero bits needed to reach a byte boundary.
    pub fn padding(&self) -> u8 {
        ((8 - self.bits.len() % 8) % 8) as u8
    }

    /// Whole bytes occupied once padded.
    pub fn byte_count(&self) -> usize {
        (self.bits.len() + 7) / 8
    }

    /// The bits followed by [`padding`](Self::padding) zeros.
    pub fn padded(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_count() * 8);
        out.extend_from_slice(&self.bits);
        out.resize(self.byte_count() * 8, 0);
        out
    }

    /// Serialize as `width`-character lines, each newline-terminated.
    pub fn to_lines(&self, width: usize) -> String {
        let width = width.max(1);
        let mut out = String::with_capacity(self.bits.len() + self.bits.len() / width + 1);
        for chunk in self.bits.chunks(width) {
            for &b in chunk {
                out.push(if b == 1 { '1' } else { '0' });
            }
            out.push('\n');
        }
        out
    }

    /// Write the recovered-bits file form (see [`to_lines`](Self::to_lines)).
    pub fn write_lines(&self, path: &Path, width: usize) -> Result<(), StegoError> {
        std::fs::write(path, self.to_lines(width))?;
        Ok(())
    }
}

impl FromStr for PayloadBits {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PayloadBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            f.write_str(if b == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}
