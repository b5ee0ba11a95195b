// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Payload capacity of a carrier.
//!
//! Every slot outside the reserved prefix can carry one payload bit. Payloads
//! are padded to whole bytes before embedding, so the usable figure is
//! rounded down to a multiple of 8 and capped by the header's 16-bit length
//! field.

use crate::carrier::Carrier;
use crate::stego::header::MAX_PAYLOAD_BYTES;

/// Maximum payload length in bits that [`hide`](crate::stego::hide) accepts.
///
/// `embedded_seed` accounts for the second reserved block used by
/// [`hide_embedded`](crate::stego::hide_embedded).
pub fn payload_capacity<C: Carrier + ?Sized>(carrier: &C, embedded_seed: bool) -> usize {
    let blocks = if embedded_seed { 2 } else { 1 };
    let free = carrier.slot_count().saturating_sub(carrier.reserved_slots() * blocks);
    (free / 8 * 8).min(MAX_PAYLOAD_BYTES * 8)
}
