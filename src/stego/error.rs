// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the embedding engine and the Huffman coder.
//!
//! [`StegoError`] covers all failure modes from carrier loading through
//! position generation, embedding, extraction and prefix-code decoding.

use core::fmt;
use std::path::PathBuf;

use crate::carrier::CarrierError;

/// Errors that can occur while hiding, retrieving or decoding a payload.
#[derive(Debug)]
pub enum StegoError {
    /// The carrier container could not be read or written.
    Carrier(CarrierError),
    /// A carrier, payload, position or dictionary file does not exist.
    NotFound(PathBuf),
    /// The carrier's sample width or container is not supported.
    UnsupportedFormat(String),
    /// The payload contains a character other than `0` or `1`.
    InvalidPayload(String),
    /// The requested bit-plane does not exist in the carrier's units.
    InvalidShift { shift: u8, unit_bits: u8 },
    /// More bit-slots are needed than the carrier can supply.
    InsufficientCapacity { required: usize, available: usize },
    /// A position file line is malformed, duplicated or out of range.
    InvalidPositionFile { line: usize, reason: &'static str },
    /// Trailing bits do not resolve to any codebook entry.
    UndecodableResidue(String),
    /// A symbol has no code in the codebook.
    UnknownSymbol(char),
    /// A codebook is empty-coded or not prefix-free.
    InvalidCodebook(String),
    /// Decoding was attempted before any codebook was built or loaded.
    UninitializedCodebook,
    /// The configuration file could not be parsed.
    Config(String),
    /// Filesystem error on a payload, position or dictionary file.
    Io(std::io::Error),
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Carrier(e) => write!(f, "carrier error: {e}"),
            Self::NotFound(p) => write!(f, "file not found: {}", p.display()),
            Self::UnsupportedFormat(msg) => write!(f, "unsupported format: {msg}"),
            Self::InvalidPayload(line) => {
                write!(f, "invalid payload line {line:?}: only 0 and 1 are allowed")
            }
            Self::InvalidShift { shift, unit_bits } => {
                write!(f, "bit-plane {shift} out of range for {unit_bits}-bit units")
            }
            Self::InsufficientCapacity { required, available } => write!(
                f,
                "insufficient capacity: need {required} bit-slots, carrier has {available}"
            ),
            Self::InvalidPositionFile { line, reason } => {
                write!(f, "position file line {line}: {reason}")
            }
            Self::UndecodableResidue(rest) => {
                write!(f, "trailing bits {rest:?} do not match any code")
            }
            Self::UnknownSymbol(c) => write!(f, "symbol {c:?} has no code in the codebook"),
            Self::InvalidCodebook(msg) => write!(f, "invalid codebook: {msg}"),
            Self::UninitializedCodebook => write!(f, "no codebook loaded"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Carrier(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CarrierError> for StegoError {
    fn from(e: CarrierError) -> Self {
        // Lift the shared taxonomy so callers match a single variant.
        match e {
            CarrierError::NotFound(p) => Self::NotFound(p),
            CarrierError::UnsupportedFormat(msg) => Self::UnsupportedFormat(msg),
            other => Self::Carrier(other),
        }
    }
}

impl From<std::io::Error> for StegoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
