// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Quadratic Julia sets: for a fixed `c`, every pixel is a starting
//! point `z0` for the same `z * z + c` iteration the Mandelbrot
//! renderer uses.  The raster is small, so it is computed in a single
//! pass on the calling thread.

use itertools::iproduct;
use num::Complex;

use crate::errors::{Error, Result};
use crate::escape::julia_escape_count;
use crate::palette::Palette;
use crate::planes::{Pixel, PlaneMapper, Viewport};
use crate::raster::Raster;

/// The constant and the iteration bound of one Julia render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JuliaParams {
    /// The fixed constant added at every step.
    pub c: Complex<f64>,
    /// Iteration bound.
    pub limit: usize,
}

impl JuliaParams {
    /// Refuses a zero iteration bound.
    pub fn new(c: Complex<f64>, limit: usize) -> Result<JuliaParams> {
        if limit == 0 {
            return Err(Error::InvalidIterations(limit));
        }
        Ok(JuliaParams { c, limit })
    }
}

/// Renders the Julia set for `params` onto a `width` by `height`
/// raster spanning the default viewport.
pub fn render_julia(width: usize, height: usize, params: &JuliaParams) -> Result<Raster> {
    if params.limit == 0 {
        return Err(Error::InvalidIterations(params.limit));
    }
    let plane = PlaneMapper::new(width, height, Viewport::default())?;
    let palette = Palette::new(params.limit);
    let pixels = iproduct!(0..height, 0..width)
        .map(|(row, column)| {
            let z0 = plane.pixel_to_point(&Pixel(column, row));
            palette.get(julia_escape_count(z0, params.c, params.limit))
        })
        .collect();
    Raster::from_pixels(width, height, pixels).ok_or(Error::InvalidDimensions(width, height, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{color_for, BLACK};

    #[test]
    fn rejects_zero_iterations() {
        assert!(JuliaParams::new(Complex::new(0.0, 0.0), 0).is_err());
        let params = JuliaParams {
            c: Complex::new(0.0, 0.0),
            limit: 0,
        };
        assert!(render_julia(10, 10, &params).is_err());
    }

    #[test]
    fn raster_has_requested_size() {
        let params = JuliaParams::new(Complex::new(-0.8, 0.156), 50).unwrap();
        let raster = render_julia(40, 32, &params).unwrap();
        assert_eq!(raster.width(), 40);
        assert_eq!(raster.height(), 32);
        assert_eq!(raster.pixels().len(), 40 * 32);
    }

    #[test]
    fn c_zero_fills_the_unit_disk() {
        let params = JuliaParams::new(Complex::new(0.0, 0.0), 64).unwrap();
        let raster = render_julia(40, 32, &params).unwrap();
        // Pixel (20, 16) is the origin; (4, 16) is -1.6.
        assert_eq!(raster.get(20, 16), Some(BLACK));
        assert_eq!(raster.get(4, 16), Some(color_for(1, 64)));
        assert_ne!(color_for(1, 64), BLACK);
    }

    #[test]
    fn matches_pointwise_iteration() {
        let c = Complex::new(-0.4, 0.6);
        let params = JuliaParams::new(c, 120).unwrap();
        let raster = render_julia(20, 16, &params).unwrap();
        let plane = PlaneMapper::new(20, 16, Viewport::default()).unwrap();
        for y in 0..16 {
            for x in 0..20 {
                let z0 = plane.pixel_to_point(&Pixel(x, y));
                assert_eq!(
                    raster.get(x, y),
                    Some(color_for(julia_escape_count(z0, c, 120), 120))
                );
            }
        }
    }
}
