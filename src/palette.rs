// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps escape times onto colours.  The hue walks the colour wheel
//! once every 256 iterations, while the brightness ramps up as
//! `i / (i + 8)` so that slow-escaping points near the set stay
//! visible instead of fading to black.  Points that never escaped
//! are black.

/// Packed `0x00RRGGBB` colour.
pub type Rgb = u32;

/// The colour of a point that never escaped.
pub const BLACK: Rgb = 0;

/// Converts a hue/saturation/brightness triple, each in `[0, 1]`
/// (hue wraps), into a packed RGB value.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
    let channel = |v: f32| (v * 255.0 + 0.5) as u32;
    let (r, g, b) = if saturation == 0.0 {
        let v = channel(brightness);
        (v, v, v)
    } else {
        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));
        let (r, g, b) = match h as u32 {
            0 => (brightness, t, p),
            1 => (q, brightness, p),
            2 => (p, brightness, t),
            3 => (p, q, brightness),
            4 => (t, p, brightness),
            _ => (brightness, p, q),
        };
        (channel(r), channel(g), channel(b))
    };
    (r.min(255) << 16) | (g.min(255) << 8) | b.min(255)
}

/// Splits a packed colour into its red, green and blue bytes.
#[inline]
pub fn rgb_bytes(color: Rgb) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

/// The gradient colour for an escape time, computed directly.
pub fn color_for(iteration: usize, limit: usize) -> Rgb {
    if iteration >= limit {
        return BLACK;
    }
    let i = iteration as f32;
    hsb_to_rgb(i / 256.0, 1.0, i / (i + 8.0))
}

/// Longest table a [`Palette`] will build.  Escape times past it are
/// coloured on the fly.
pub const MAX_TABLE_LEN: usize = 1 << 16;

/// A lookup table of [`color_for`] over `0..limit`.  Escape times
/// repeat a great deal across a raster, so one of these is built per
/// render and shared by all of its workers.
#[derive(Debug, Clone)]
pub struct Palette {
    limit: usize,
    colors: Vec<Rgb>,
}

impl Palette {
    /// Builds the table for an iteration bound of `limit`.
    pub fn new(limit: usize) -> Palette {
        Palette {
            limit,
            colors: (0..limit.min(MAX_TABLE_LEN))
                .map(|i| color_for(i, limit))
                .collect(),
        }
    }

    /// The iteration bound this table was built for.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Colour for an escape time; anything at or past the bound is
    /// black.
    #[inline]
    pub fn get(&self, iteration: usize) -> Rgb {
        match self.colors.get(iteration) {
            Some(&color) => color,
            None => color_for(iteration, self.limit),
        }
    }
}
