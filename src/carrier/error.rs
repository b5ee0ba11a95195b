// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for carrier loading and persistence.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while decoding or re-encoding a carrier file.
#[derive(Debug)]
pub enum CarrierError {
    /// The carrier file does not exist.
    NotFound(PathBuf),
    /// Sample width outside {8, 16} bits, or a container we cannot handle
    /// losslessly.
    UnsupportedFormat(String),
    /// A RIFF/WAVE chunk is truncated or inconsistent.
    InvalidWav(&'static str),
    /// The image codec rejected the file.
    Image(image::ImageError),
    /// Underlying filesystem error.
    Io(std::io::Error),
}

impl fmt::Display for CarrierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(p) => write!(f, "carrier file not found: {}", p.display()),
            Self::UnsupportedFormat(msg) => write!(f, "unsupported carrier format: {msg}"),
            Self::InvalidWav(msg) => write!(f, "invalid WAVE data: {msg}"),
            Self::Image(e) => write!(f, "image codec error: {e}"),
            Self::Io(e) => write!(f, "carrier I/O error: {e}"),
        }
    }
}

impl std::error::Error for CarrierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CarrierError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<image::ImageError> for CarrierError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(u) => Self::UnsupportedFormat(u.to_string()),
            image::ImageError::IoError(io) => Self::Io(io),
            other => Self::Image(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CarrierError>;
