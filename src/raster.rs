// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pixel storage.  A [`PixelBuffer`] is the live raster that render
//! workers write into while a caller may be reading it for display;
//! every cell is an atomic, so reads that race with writes see either
//! the old colour or the new one and never a torn value.  Workers
//! never write the same cell twice in one render, so relaxed
//! ordering is all they need; joining the workers publishes the lot.
//!
//! A [`Raster`] is an immutable, plain copy of a buffer.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::palette::{rgb_bytes, Rgb, BLACK};

/// A row-major `width * height` raster of packed RGB colours, shared
/// between render workers and readers.
#[derive(Debug)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<AtomicU32>,
}

impl PixelBuffer {
    /// A black raster.
    pub fn new(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            pixels: (0..width * height).map(|_| AtomicU32::new(BLACK)).collect(),
        }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True for a raster with no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Writes one pixel by row-major offset.
    #[inline]
    pub fn store(&self, offset: usize, color: Rgb) {
        self.pixels[offset].store(color, Ordering::Relaxed);
    }

    /// Reads one pixel by row-major offset.
    #[inline]
    pub fn load(&self, offset: usize) -> Rgb {
        self.pixels[offset].load(Ordering::Relaxed)
    }

    /// Reads the pixel at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.load(y * self.width + x))
    }

    /// Paints everything black.  Only call this when no worker is
    /// writing.
    pub fn clear(&self) {
        for pixel in &self.pixels {
            pixel.store(BLACK, Ordering::Relaxed);
        }
    }

    /// Copies the current contents.  Safe at any time; mid-render the
    /// copy is a valid partial image.
    pub fn snapshot(&self) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|p| p.load(Ordering::Relaxed)).collect(),
        }
    }
}

/// An immutable raster of packed RGB colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Raster {
    /// Wraps a row-major pixel vector.  Returns `None` if the length
    /// does not match the dimensions.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> Option<Raster> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Raster {
            width,
            height,
            pixels,
        })
    }

    /// A black raster.
    pub fn blank(width: usize, height: usize) -> Raster {
        Raster {
            width,
            height,
            pixels: vec![BLACK; width * height],
        }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The packed colours, row-major.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Reads the pixel at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Three bytes per pixel, ready for an image encoder.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| rgb_bytes(p).to_vec()).collect()
    }
}
