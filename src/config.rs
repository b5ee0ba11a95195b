// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Engine settings loaded from an optional TOML file.
//!
//! ```toml
//! shift = 0
//! seed = 42
//! # positions = "positions.txt"
//! # embed_seed = true
//! recovered_line_width = 4
//! ```
//!
//! Command-line flags override whatever the file sets.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::stego::error::StegoError;
use crate::stego::payload::DEFAULT_LINE_WIDTH;
use crate::stego::{Addressing, PositionSource};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Bit-plane for payload bits. Checked against the carrier at use time.
    pub shift: u8,
    pub seed: Option<u32>,
    pub positions: Option<PathBuf>,
    pub embed_seed: bool,
    pub recovered_line_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shift: 0,
            seed: None,
            positions: None,
            embed_seed: false,
            recovered_line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, StegoError> {
        let config: Self =
            toml::from_str(text).map_err(|e| StegoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// [`StegoError::NotFound`] if `path` is absent, [`StegoError::Config`]
    /// if it does not parse or validate.
    pub fn from_file(path: &Path) -> Result<Self, StegoError> {
        if !path.exists() {
            return Err(StegoError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StegoError> {
        let sources = self.seed.is_some() as u8
            + self.positions.is_some() as u8
            + self.embed_seed as u8;
        if sources > 1 {
            return Err(StegoError::Config(
                "choose only one of seed, positions, embed_seed".into(),
            ));
        }
        if self.recovered_line_width == 0 {
            return Err(StegoError::Config("recovered_line_width must be positive".into()));
        }
        Ok(())
    }

    /// Position strategy named by this config.
    pub fn addressing(&self) -> Result<Addressing, StegoError> {
        self.validate()?;
        if self.embed_seed {
            return Ok(Addressing::EmbeddedSeed);
        }
        match (self.seed, &self.positions) {
            (Some(seed), None) => Ok(Addressing::Positions(PositionSource::seeded(seed))),
            (None, Some(path)) => Ok(Addressing::Positions(PositionSource::file(path.clone()))),
            _ => Err(StegoError::Config(
                "no position source: set seed, positions or embed_seed".into(),
            )),
        }
    }
}
