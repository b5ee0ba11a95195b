// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Bit-slot position selection.
//!
//! Produces the ordered list of slot addresses that payload bits are written
//! to. Two strategies exist:
//!
//! - **Seeded**: a ChaCha20 PRNG seeded from a 32-bit value drives a
//!   Fisher-Yates shuffle of the candidate range `[excluded, slot_count)`,
//!   and the first `required` entries are taken. The shuffle is *sparse*:
//!   only displaced entries are tracked, so memory is proportional to the
//!   payload rather than the carrier. A shuffle never repeats an address and
//!   the prefix for `k` bits is the prefix of the list for any `m > k`.
//! - **File-backed**: addresses are read one per line from a text file. If
//!   the file holds fewer than `required`, it is extended in memory by
//!   reject-and-resample draws from a PRNG with the fixed [`AUX_SEED`].
//!   Generation never writes; the extended list reaches disk only through
//!   [`PositionList::commit`], which hiding calls and retrieval does not.
//!
//! Every call builds its own PRNG; there is no shared generator state.
//!
//! # Cross-platform portability
//!
//! Draws use `u32` ranges (not `usize`) so that 32-bit and 64-bit targets
//! consume identical PRNG output per step and produce the same lists.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::stego::error::StegoError;

/// Seed used to extend short position files. Independent of any payload
/// seed so that extension is reproducible without sharing one.
pub const AUX_SEED: u64 = 42;

/// Addresses drawn for one operation, plus any position-file rewrite they
/// imply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionList {
    addrs: Vec<usize>,
    pending: Option<PathBuf>,
}

impl PositionList {
    fn in_memory(addrs: Vec<usize>) -> Self {
        Self { addrs, pending: None }
    }

    pub fn addrs(&self) -> &[usize] {
        &self.addrs
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// True if the list was extended past what the position file holds.
    pub fn is_extended(&self) -> bool {
        self.pending.is_some()
    }

    /// Write the extended list back to its position file. No-op otherwise.
    pub fn commit(&self) -> Result<(), StegoError> {
        let Some(path) = &self.pending else {
            return Ok(());
        };
        write_position_file(path, &self.addrs)?;
        tracing::info!(path = %path.display(), count = self.addrs.len(), "rewrote position file");
        Ok(())
    }
}

/// Where the payload's slot addresses come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSource {
    /// Shuffle the candidate range with a PRNG seeded from `seed`.
    Seeded { seed: u32 },
    /// Read (and if necessary extend and rewrite) an explicit list.
    FileBacked { path: PathBuf },
}

impl PositionSource {
    pub fn seeded(seed: u32) -> Self {
        Self::Seeded { seed }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::FileBacked { path: path.into() }
    }

    /// Produce `required` distinct addresses from `[excluded_prefix, slot_count)`.
    ///
    /// A missing position file is treated as empty. Nothing is written to
    /// disk here; see [`PositionList::commit`].
    ///
    /// # Errors
    /// - [`StegoError::InsufficientCapacity`] if the range is too small.
    /// - [`StegoError::InvalidPositionFile`] for malformed file contents.
    pub fn generate(
        &self,
        required: usize,
        excluded_prefix: usize,
        slot_count: usize,
    ) -> Result<PositionList, StegoError> {
        match self {
            Self::Seeded { seed } => {
                seeded_positions(required, excluded_prefix, slot_count, *seed)
                    .map(PositionList::in_memory)
            }
            Self::FileBacked { path } => {
                file_positions(required, excluded_prefix, slot_count, path)
            }
        }
    }
}

fn check_capacity(
    required: usize,
    excluded_prefix: usize,
    slot_count: usize,
) -> Result<(), StegoError> {
    let available = slot_count.saturating_sub(excluded_prefix);
    if required > available {
        return Err(StegoError::InsufficientCapacity { required, available });
    }
    if slot_count > u32::MAX as usize {
        return Err(StegoError::UnsupportedFormat(format!(
            "address space of {slot_count} slots exceeds 32-bit range"
        )));
    }
    Ok(())
}

/// First `required` entries of a seeded Fisher-Yates shuffle of
/// `[excluded_prefix, slot_count)`.
pub fn seeded_positions(
    required: usize,
    excluded_prefix: usize,
    slot_count: usize,
    seed: u32,
) -> Result<Vec<usize>, StegoError> {
    check_capacity(required, excluded_prefix, slot_count)?;

    let n = (slot_count - excluded_prefix) as u32;
    let mut rng = ChaCha20Rng::seed_from_u64(seed as u64);
    // Sparse view of the candidate array: index -> value for displaced entries.
    let mut displaced: HashMap<u32, u32> = HashMap::with_capacity(required);
    let mut out = Vec::with_capacity(required);

    for i in 0..required as u32 {
        let j = rng.gen_range(i..n);
        let vi = displaced.get(&i).copied().unwrap_or(i);
        let vj = displaced.get(&j).copied().unwrap_or(j);
        displaced.insert(j, vi);
        displaced.remove(&i);
        out.push(excluded_prefix + vj as usize);
    }

    tracing::debug!(seed, required, excluded_prefix, slot_count, "generated seeded positions");
    Ok(out)
}

/// Read addresses from `path` and extend them with [`AUX_SEED`] draws if
/// short. An extended list carries `path` as its pending rewrite.
pub fn file_positions(
    required: usize,
    excluded_prefix: usize,
    slot_count: usize,
    path: &Path,
) -> Result<PositionList, StegoError> {
    let mut positions = if path.exists() {
        read_position_file(path, excluded_prefix, slot_count)?
    } else {
        Vec::new()
    };

    if positions.len() >= required {
        positions.truncate(required);
        tracing::debug!(path = %path.display(), required, "using stored positions");
        return Ok(PositionList::in_memory(positions));
    }

    check_capacity(required, excluded_prefix, slot_count)?;

    let stored = positions.len();
    let mut seen: HashSet<usize> = positions.iter().copied().collect();
    let mut rng = ChaCha20Rng::seed_from_u64(AUX_SEED);
    let (lo, hi) = (excluded_prefix as u32, slot_count as u32);
    while positions.len() < required {
        let addr = rng.gen_range(lo..hi) as usize;
        if seen.insert(addr) {
            positions.push(addr);
        }
    }

    tracing::debug!(
        path = %path.display(),
        stored,
        added = required - stored,
        "extended positions in memory"
    );
    Ok(PositionList { addrs: positions, pending: Some(path.to_path_buf()) })
}

/// Parse a position file, validating every address.
pub fn read_position_file(
    path: &Path,
    excluded_prefix: usize,
    slot_count: usize,
) -> Result<Vec<usize>, StegoError> {
    let text = std::fs::read_to_string(path)?;
    parse_positions(&text, excluded_prefix, slot_count)
}

fn parse_positions(
    text: &str,
    excluded_prefix: usize,
    slot_count: usize,
) -> Result<Vec<usize>, StegoError> {
    let mut positions = Vec::new();
    let mut seen = HashSet::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let invalid = |reason| StegoError::InvalidPositionFile { line: line_no, reason };
        let addr: usize = line.parse().map_err(|_| invalid("not a decimal address"))?;
        if addr < excluded_prefix {
            return Err(invalid("address inside the reserved header region"));
        }
        if addr >= slot_count {
            return Err(invalid("address beyond the end of the carrier"));
        }
        if !seen.insert(addr) {
            return Err(invalid("duplicate address"));
        }
        positions.push(addr);
    }
    Ok(positions)
}

/// Write one decimal address per line.
pub fn write_position_file(path: &Path, positions: &[usize]) -> Result<(), StegoError> {
    let mut text = String::with_capacity(positions.len() * 8);
    for p in positions {
        text.push_str(&p.to_string());
        text.push('\n');
    }
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = seeded_positions(64, 32, 1000, 42).unwrap();
        let b = seeded_positions(64, 32, 1000, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = seeded_positions(64, 32, 1000, 1).unwrap();
        let b = seeded_positions(64, 32, 1000, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_and_outside_prefix() {
        let positions = seeded_positions(500, 33, 600, 7).unwrap();
        assert_eq!(positions.len(), 500);
        let unique: HashSet<_> = positions.iter().collect();
        assert_eq!(unique.len(), 500);
        assert!(positions.iter().all(|&p| (33..600).contains(&p)));
    }

    #[test]
    fn full_range_is_a_permutation() {
        let mut positions = seeded_positions(68, 32, 100, 9).unwrap();
        positions.sort_unstable();
        assert_eq!(positions, (32..100).collect::<Vec<_>>());
    }

    #[test]
    fn shorter_request_is_prefix_of_longer() {
        let long = seeded_positions(50, 32, 400, 123).unwrap();
        let short = seeded_positions(20, 32, 400, 123).unwrap();
        assert_eq!(short[..], long[..20]);
    }

    #[test]
    fn capacity_exceeded() {
        match seeded_positions(69, 32, 100, 0) {
            Err(StegoError::InsufficientCapacity { required: 69, available: 68 }) => {}
            other => panic!("expected InsufficientCapacity, got {other:?}"),
        }
        // Carrier smaller than the reserved prefix.
        assert!(matches!(
            seeded_positions(1, 32, 10, 0),
            Err(StegoError::InsufficientCapacity { available: 0, .. })
        ));
    }

    #[test]
    fn zero_required() {
        assert!(seeded_positions(0, 32, 32, 5).unwrap().is_empty());
    }

    #[test]
    fn parse_skips_blank_lines() {
        let p = parse_positions("40\n\n  41 \n50\n", 32, 100).unwrap();
        assert_eq!(p, vec![40, 41, 50]);
    }

    #[test]
    fn parse_rejects_bad_lines() {
        let cases = [
            ("40\nabc\n", 2),
            ("40\n10\n", 2),
            ("40\n\n100\n", 3),
            ("40\n41\n40\n", 3),
        ];
        for (text, bad_line) in cases {
            match parse_positions(text, 32, 100) {
                Err(StegoError::InvalidPositionFile { line, .. }) => {
                    assert_eq!(line, bad_line, "{text:?}")
                }
                other => panic!("expected InvalidPositionFile for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn file_extension_grows_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.txt");
        std::fs::write(&path, "90\n35\n\n60\n").unwrap();

        let list = file_positions(20, 32, 200, &path).unwrap();
        assert!(list.is_extended());
        let positions = list.addrs();
        assert_eq!(positions.len(), 20);
        assert_eq!(&positions[..3], &[90, 35, 60]);
        let unique: HashSet<_> = positions.iter().collect();
        assert_eq!(unique.len(), 20);
        assert!(positions.iter().all(|&p| (32..200).contains(&p)));

        // Generating alone leaves the file as it was.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "90\n35\n\n60\n");

        list.commit().unwrap();
        assert_eq!(read_position_file(&path, 32, 200).unwrap(), positions);

        // Once committed, a second call reproduces the list with nothing to write.
        let again = file_positions(20, 32, 200, &path).unwrap();
        assert!(!again.is_extended());
        assert_eq!(again.addrs(), positions);
    }

    #[test]
    fn missing_file_is_created_on_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let list = file_positions(10, 32, 100, &path).unwrap();
        assert!(!path.exists());
        list.commit().unwrap();
        assert_eq!(read_position_file(&path, 32, 100).unwrap(), list.addrs());
    }

    #[test]
    fn uncommitted_extension_matches_committed_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.txt");
        std::fs::write(&path, "40\n").unwrap();
        let first = file_positions(12, 32, 300, &path).unwrap();
        let second = file_positions(12, 32, 300, &path).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "40\n");
    }

    #[test]
    fn seeded_list_has_nothing_to_commit() {
        let list = PositionSource::seeded(3).generate(8, 32, 100).unwrap();
        assert!(!list.is_extended());
        list.commit().unwrap();
    }

    #[test]
    fn long_file_is_truncated_in_memory_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.txt");
        std::fs::write(&path, "50\n51\n52\n53\n").unwrap();
        assert_eq!(file_positions(2, 32, 100, &path).unwrap().addrs(), &[50, 51]);
        assert_eq!(read_position_file(&path, 32, 100).unwrap().len(), 4);
    }

    #[test]
    fn file_extension_capacity_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.txt");
        assert!(matches!(
            file_positions(100, 32, 100, &path),
            Err(StegoError::InsufficientCapacity { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn extension_is_independent_of_payload_seed() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let pa = PositionSource::file(&a).generate(16, 32, 500).unwrap();
        let pb = PositionSource::file(&b).generate(16, 32, 500).unwrap();
        assert_eq!(pa.addrs(), pb.addrs());
    }
}
