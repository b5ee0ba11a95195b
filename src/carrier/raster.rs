// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! RGB image carrier.
//!
//! Pixels are held as a packed `R G B R G B ...` buffer, so a slot address
//! is simply an index into that buffer: `addr / 3` is the pixel and
//! `addr % 3` the channel.

use std::path::Path;

use image::{ImageFormat, RgbImage};

use super::error::{CarrierError, Result};
use super::{plane_get, plane_set, Carrier, CarrierKind};

/// Pixels reserved at the start of the image for the metadata header.
pub const IMAGE_RESERVED_PIXELS: usize = 11;

/// Channels per pixel.
pub const CHANNELS: usize = 3;

/// An 8-bit RGB raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCarrier {
    img: RgbImage,
}

impl ImageCarrier {
    /// Decode an image file and convert it to 8-bit RGB.
    ///
    /// # Errors
    /// - [`CarrierError::NotFound`] if the file does not exist.
    /// - [`CarrierError::UnsupportedFormat`] if no decoder recognises it.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CarrierError::NotFound(path.to_path_buf()));
        }
        let img = image::open(path)?.to_rgb8();
        tracing::debug!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            "loaded image carrier"
        );
        Ok(Self { img })
    }

    /// Wrap a packed RGB buffer of `width * height * 3` bytes.
    ///
    /// # Errors
    /// [`CarrierError::UnsupportedFormat`] if the buffer length does not match.
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self> {
        let img = RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
            CarrierError::UnsupportedFormat(format!(
                "RGB buffer does not match {width}x{height} dimensions"
            ))
        })?;
        Ok(Self { img })
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Packed RGB bytes.
    pub fn as_rgb(&self) -> &[u8] {
        self.img.as_raw()
    }
}

impl Carrier for ImageCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Image
    }

    fn unit_count(&self) -> usize {
        self.img.width() as usize * self.img.height() as usize
    }

    fn slot_count(&self) -> usize {
        self.unit_count() * CHANNELS
    }

    fn unit_bits(&self) -> u8 {
        8
    }

    fn reserved_slots(&self) -> usize {
        IMAGE_RESERVED_PIXELS * CHANNELS
    }

    fn get_bit(&self, addr: usize, shift: u8) -> u8 {
        debug_assert!(shift < 8);
        plane_get(self.img.as_raw()[addr] as u16, shift)
    }

    fn set_bit(&mut self, addr: usize, shift: u8, bit: u8) {
        debug_assert!(shift < 8);
        let raw: &mut [u8] = &mut self.img;
        let channel = &mut raw[addr];
        *channel = plane_set(*channel as u16, shift, bit) as u8;
    }

    /// Save in the format implied by the extension.
    ///
    /// Lossy targets (JPEG) would scramble the low-order bits, so they are
    /// refused with [`CarrierError::UnsupportedFormat`].
    fn persist(&self, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path)?;
        if format == ImageFormat::Jpeg {
            return Err(CarrierError::UnsupportedFormat(
                "JPEG output is lossy and would destroy embedded bits".into(),
            ));
        }
        self.img.save_with_format(path, format)?;
        tracing::debug!(path = %path.display(), ?format, "persisted image carrier");
        Ok(())
    }
}
