//! Contains the PlaneMapper struct, which describes a relationship
//! between a raster of pixels with an origin at its top-left corner,
//! and a rectangle on the complex plane (the viewport).  Screen rows
//! grow downward while the imaginary axis grows upward, so row 0 maps
//! to the top edge of the viewport.
//!
//! Also home to the pixel-space zoom selection, which is turned into
//! a new viewport once it has been stretched to the raster's shape.
use num::Complex;

use crate::errors::{Error, Result};

/// The rectangle of the complex plane mapped onto the raster,
/// treating the real part as the x-component and the imaginary part
/// as the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Viewport {
    /// Refuses empty, inverted, or non-finite regions.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Viewport> {
        let finite = x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite();
        if !finite || x_min >= x_max || y_min >= y_max {
            return Err(Error::InvalidViewport {
                x_min,
                x_max,
                y_min,
                y_max,
            });
        }
        Ok(Viewport {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Builds the viewport from its left-lower and right-upper
    /// corners.
    pub fn from_corners(leftlower: Complex<f64>, rightupper: Complex<f64>) -> Result<Viewport> {
        Viewport::new(leftlower.re, rightupper.re, leftlower.im, rightupper.im)
    }

    /// Left edge.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Right edge.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Bottom edge.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Top edge.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Extent along the real axis.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Extent along the imaginary axis.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

impl Default for Viewport {
    /// Real axis -2 to 2, imaginary -1.6 to 1.6.
    fn default() -> Viewport {
        Viewport {
            x_min: -2.0,
            x_max: 2.0,
            y_min: -1.6,
            y_max: 1.6,
        }
    }
}

/// Describes the x, y of a pixel in the raster.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// A rectangle in pixel space, as dragged out by a user.  The anchor
/// is where the drag started; the other corner may be on any side of
/// it.  Coordinates are fractional so that a selection stretched to
/// the raster's shape keeps that shape exactly.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Selection {
    anchor: (f64, f64),
    corner: (f64, f64),
}

impl Selection {
    /// A selection spanning the two corners, in any order.
    pub fn new(anchor: (f64, f64), corner: (f64, f64)) -> Selection {
        Selection { anchor, corner }
    }

    /// A selection from a top-left corner and a size.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Selection {
        Selection::new((x, y), (x + width, y + height))
    }

    /// The normalised `(left, top, width, height)`.
    pub fn rect(&self) -> (f64, f64, f64, f64) {
        (
            self.anchor.0.min(self.corner.0),
            self.anchor.1.min(self.corner.1),
            (self.anchor.0 - self.corner.0).abs(),
            (self.anchor.1 - self.corner.1).abs(),
        )
    }

    /// True if the selection covers no area.
    pub fn is_empty(&self) -> bool {
        let (_, _, w, h) = self.rect();
        !(w > 0.0 && h > 0.0)
    }

    /// Grows the shorter side of the selection until its shape
    /// matches a `width` by `height` raster.  Never shrinks; the
    /// growth extends away from the anchor, in the direction of the
    /// drag.
    pub fn fit_aspect(&self, width: usize, height: usize) -> Selection {
        if width == 0 || height == 0 {
            return *self;
        }
        self.fit_ratio(width as f64 / height as f64)
    }

    /// Grows the shorter side until `width / height == ratio`.
    pub fn fit_ratio(&self, ratio: f64) -> Selection {
        if self.is_empty() || !(ratio > 0.0) || !ratio.is_finite() {
            return *self;
        }
        let (_, _, w, h) = self.rect();
        let (w, h) = if w / h > ratio {
            (w, w / ratio)
        } else {
            (h * ratio, h)
        };
        let dx = if self.corner.0 < self.anchor.0 { -w } else { w };
        let dy = if self.corner.1 < self.anchor.1 { -h } else { h };
        Selection::new(self.anchor, (self.anchor.0 + dx, self.anchor.1 + dy))
    }
}

/// Contains the definitions of two planes: an integral cartesian plane,
/// and the complex plane viewport.  Maps points from one to the other.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// Width of the raster.
    pub width: usize,
    /// Height of the raster.
    pub height: usize,
    /// The region of the complex plane in view.
    pub viewport: Viewport,
    // Size of one pixel on the complex plane, horizontally and
    // vertically.
    grid_factors: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the raster size and the viewport.
    pub fn new(width: usize, height: usize, viewport: Viewport) -> Result<PlaneMapper> {
        if width == 0 || height == 0 || width.checked_mul(height).is_none() {
            return Err(Error::InvalidDimensions(width, height, 1));
        }
        Ok(PlaneMapper {
            width,
            height,
            viewport,
            grid_factors: (
                viewport.width() / (width as f64),
                viewport.height() / (height as f64),
            ),
        })
    }

    /// The total number of pixels in the raster.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The pixel stored at `offset` in a row-major buffer.
    #[inline]
    pub fn offset_to_pixel(&self, offset: usize) -> Pixel {
        Pixel(offset % self.width, offset / self.width)
    }

    /// Given a pixel, return the point on the complex plane at its
    /// top-left corner.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        self.coordinates_to_point(pixel.0 as f64, pixel.1 as f64)
    }

    /// Same as [`pixel_to_point`](#method.pixel_to_point), for
    /// coordinates that may lie outside the raster.
    #[inline]
    pub fn coordinates_to_point(&self, x: f64, y: f64) -> Complex<f64> {
        Complex::new(
            self.viewport.x_min + x * self.grid_factors.0,
            self.viewport.y_max - y * self.grid_factors.1,
        )
    }

    /// Given a point on the complex plane, the pixel that contains
    /// it, if any.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = (point.re - self.viewport.x_min) / self.grid_factors.0;
        let top = (self.viewport.y_max - point.im) / self.grid_factors.1;
        if !(left >= 0.0 && top >= 0.0) || left >= self.width as f64 || top >= self.height as f64 {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }

    /// Maps a pixel-space selection onto the complex plane.  The
    /// selection is used as given; call
    /// [`Selection::fit_aspect`](struct.Selection.html#method.fit_aspect)
    /// first to keep the image from being stretched.
    pub fn rect_to_viewport(&self, selection: &Selection) -> Result<Viewport> {
        if selection.is_empty() {
            return Err(Error::EmptySelection);
        }
        let (left, top, w, h) = selection.rect();
        let upper_left = self.coordinates_to_point(left, top);
        let lower_right = self.coordinates_to_point(left + w, top + h);
        Viewport::new(upper_left.re, lower_right.re, lower_right.im, upper_left.im)
    }

    /// The viewport to zoom to for a dragged selection.  The selection
    /// is grown so that the new viewport has the raster's shape, even
    /// when the current viewport does not.
    pub fn zoom_viewport(&self, selection: &Selection) -> Result<Viewport> {
        let ratio = (self.width as f64 / self.height as f64) * (self.grid_factors.1 / self.grid_factors.0);
        self.rect_to_viewport(&selection.fit_ratio(ratio))
    }
}
