// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # lsbkit
//!
//! Low-order-bit steganography for lossless carriers. A payload bit string
//! is written one bit per carrier slot (one bit-plane of one audio sample or
//! one RGB channel), at addresses chosen by a seeded ChaCha20 shuffle or an
//! explicit position file. A 32-bit header stored in the carrier itself
//! records the payload length, padding and bit-plane, so retrieval needs only
//! the carrier and the same position source.
//!
//! The `huffman` module turns text into a compact bit string for use as a
//! payload, and back.
//!
//! Carriers are 8/16-bit PCM WAV files and lossless RGB images (PNG, BMP,
//! TIFF). Nothing is encrypted: anyone holding the seed or position list can
//! read the payload.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use lsbkit::{hide, retrieve, AudioCarrier, PayloadBits, PositionSource};
//! use lsbkit::carrier::wav::Samples;
//!
//! let mut carrier = AudioCarrier::from_samples(Samples::U8(vec![128; 100]), 1, 8000)?;
//! let payload: PayloadBits = "1010101010101010".parse()?;
//! let source = PositionSource::seeded(42);
//! hide(&mut carrier, &payload, &source, 0)?;
//! assert_eq!(retrieve(&carrier, &source)?, payload);
//! ```

pub mod carrier;
pub mod config;
pub mod huffman;
pub mod stego;

pub use carrier::{AnyCarrier, AudioCarrier, Carrier, CarrierError, CarrierKind, ImageCarrier};
pub use config::EngineConfig;
pub use huffman::{Codebook, HuffmanCoder, HuffmanTree};
pub use stego::{
    hide, hide_embedded, hide_file, payload_capacity, retrieve, retrieve_embedded, retrieve_file,
    Addressing, MetadataHeader, PayloadBits, PositionSource, StegoError,
};
