// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Bit-embedding engine.
//!
//! A payload is hidden by writing one bit into a chosen bit-plane of one
//! carrier slot per payload bit. Which slots are used is decided by a
//! [`PositionSource`]:
//!
//! - **Seeded**: a ChaCha20 stream keyed by a 32-bit seed draws distinct
//!   slots. Hider and retriever only need to share the seed.
//! - **File-backed**: an explicit list of slot indices, one per line. If the
//!   list is shorter than the payload it is extended and rewritten.
//!
//! A 32-bit [`MetadataHeader`] (length, bit-plane, padding) occupies the
//! first 32 slots so that retrieval needs nothing but the carrier and the
//! position source. [`hide_embedded`] additionally stores the seed itself.

pub mod capacity;
pub mod error;
pub mod header;
pub mod payload;
pub mod permute;
mod pipeline;

pub use capacity::payload_capacity;
pub use error::StegoError;
pub use header::{MetadataHeader, HEADER_BITS, MAX_PAYLOAD_BYTES};
pub use payload::{PayloadBits, DEFAULT_LINE_WIDTH};
pub use permute::{PositionList, PositionSource};
pub use pipeline::{
    hide, hide_embedded, hide_file, retrieve, retrieve_embedded, retrieve_file, Addressing,
};
