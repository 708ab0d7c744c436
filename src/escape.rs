// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iteration at the heart of both the Mandelbrot and
//! the Julia renderers.  Given a starting value `z` and a constant
//! `c`, we repeatedly compute `z = z * z + c` and count how many
//! steps it takes before `|z|` reaches 2.  We compare the squared
//! norm against 4 so that we never take a square root.
//!
//! For the Mandelbrot set `z` starts at the origin and `c` is the
//! point being rendered; for a Julia set `c` is fixed and `z` starts
//! at the point being rendered.  Everything here is pure, so any
//! number of threads may call it at once.

use num::Complex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Squared magnitude at which an orbit counts as escaped.
pub const ESCAPE_NORM_SQR: f64 = 4.0;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

const ORIGIN: Complex<f64> = Complex { re: 0.0, im: 0.0 };

/// Number of iterations, in `[0, limit]`, before the orbit of `z0`
/// under `z * z + c` escapes.  `limit` means it never did.
#[inline]
pub fn escape_time(z0: Complex<f64>, c: Complex<f64>, limit: usize) -> usize {
    let mut z = z0;
    let mut count = 0;
    while count < limit && z.norm_sqr() < ESCAPE_NORM_SQR {
        z = z * z + c;
        count += 1;
    }
    count
}

/// Mandelbrot escape time for the point `c`.
///
/// ```
/// use mandelbrot::escape::escape_count;
/// use num::Complex;
///
/// assert_eq!(escape_count(Complex::new(0.0, 0.0), 100), 100);
/// assert_eq!(escape_count(Complex::new(2.0, 0.0), 100), 1);
/// ```
#[inline]
pub fn escape_count(c: Complex<f64>, limit: usize) -> usize {
    escape_time(ORIGIN, c, limit)
}

/// Julia escape time for the starting point `z0` and fixed `c`.
#[inline]
pub fn julia_escape_count(z0: Complex<f64>, c: Complex<f64>, limit: usize) -> usize {
    escape_time(z0, c, limit)
}

/// The same iteration as [`escape_time`], but it looks at `stop`
/// before every step so that a long-running orbit can be abandoned
/// part way through.  Returns `None` if it was told to stop.
#[inline]
pub fn escape_time_interruptible(
    z0: Complex<f64>,
    c: Complex<f64>,
    limit: usize,
    stop: &AtomicBool,
) -> Option<usize> {
    let mut z = z0;
    let mut count = 0;
    while count < limit && z.norm_sqr() < ESCAPE_NORM_SQR {
        if stop.load(Ordering::Relaxed) {
            return None;
        }
        z = z * z + c;
        count += 1;
    }
    Some(count)
}

/// The per-pixel computation run by render workers: the point in,
/// the escape time out, or `None` if the render was stopped.
pub type Kernel = fn(Complex<f64>, usize, &AtomicBool) -> Option<usize>;

/// Interruptible Mandelbrot escape time for the point `c`.
pub fn mandelbrot_kernel(c: Complex<f64>, limit: usize, stop: &AtomicBool) -> Option<usize> {
    escape_time_interruptible(ORIGIN, c, limit, stop)
}

/// Like [`mandelbrot_kernel`], but answers `limit` straight away for
/// points in the main cardioid or the period-2 bulb.
pub fn mandelbrot_kernel_skipping_interior(
    c: Complex<f64>,
    limit: usize,
    stop: &AtomicBool,
) -> Option<usize> {
    if !maybe_outside(c) {
        return Some(limit);
    }
    mandelbrot_kernel(c, limit, stop)
}

/// The two halves of the `&&` are false when the point is certainly
/// inside the main cardioid or the period-2 bulb, respectively.  A
/// `true` result does not mean the point escapes; it only means we
/// have to iterate to find out.
#[inline]
pub fn maybe_outside(point: Complex<f64>) -> bool {
    let y = point.im * point.im;
    let q = y + (point.re - D4) * (point.re - D4);
    q * (q + point.re - D4) > (y * D4) && (point.re + 1.0_f64) * (point.re + 1.0_f64) + y > D16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_count(Complex::new(0.0, 0.0), 1), 1);
        assert_eq!(escape_count(Complex::new(0.0, 0.0), 500), 500);
    }

    #[test]
    fn two_escapes_after_one_step() {
        // z1 = 2, |z1|^2 = 4
        assert_eq!(escape_count(Complex::new(2.0, 0.0), 100), 1);
    }

    #[test]
    fn zero_limit_returns_zero() {
        assert_eq!(escape_count(Complex::new(0.0, 0.0), 0), 0);
        assert_eq!(escape_count(Complex::new(5.0, 5.0), 0), 0);
    }

    #[test]
    fn far_points_escape_immediately() {
        for &(re, im) in &[(3.0, 0.0), (0.0, -2.5), (-2.1, 0.1), (1.5, 1.5)] {
            let c = Complex::new(re, im);
            assert_eq!(escape_count(c, 1000), 1, "{:?}", c);
        }
    }

    #[test]
    fn count_matches_first_escaping_step() {
        // Just past the cusp: escapes, but slowly.
        let c = Complex::new(0.26, 0.0);
        let mut z = Complex::new(0.0, 0.0);
        let mut expected = 0;
        while expected < 1000 && z.norm_sqr() < 4.0 {
            z = z * z + c;
            expected += 1;
        }
        assert!(expected > 10 && expected < 1000, "{}", expected);
        assert_eq!(escape_count(c, 1000), expected);
        assert_eq!(escape_count(c, 5000), expected);
    }

    #[test]
    fn count_is_monotonic_in_limit() {
        let points = [
            Complex::new(-0.75, 0.1),
            Complex::new(-1.25, 0.02),
            Complex::new(0.26, 0.0),
            Complex::new(-0.1, 0.65),
        ];
        for &c in &points {
            let mut last = 0;
            for limit in (0..600).step_by(7) {
                let count = escape_count(c, limit);
                assert!(count <= limit);
                assert!(count >= last);
                last = count;
            }
        }
    }

    #[test]
    fn julia_starts_from_the_pixel() {
        let c = Complex::new(0.0, 0.0);
        // Unit circle is the Julia set of c = 0.
        assert_eq!(julia_escape_count(Complex::new(0.5, 0.0), c, 64), 64);
        assert_eq!(julia_escape_count(Complex::new(2.0, 0.0), c, 64), 0);
        assert_eq!(julia_escape_count(Complex::new(1.5, 0.0), c, 64), 1);
    }

    #[test]
    fn interruptible_agrees_when_left_alone() {
        let stop = AtomicBool::new(false);
        let c = Complex::new(-0.7436, 0.1318);
        assert_eq!(
            escape_time_interruptible(ORIGIN, c, 2000, &stop),
            Some(escape_count(c, 2000))
        );
    }

    #[test]
    fn interruptible_stops_when_asked() {
        let stop = AtomicBool::new(true);
        assert_eq!(
            escape_time_interruptible(ORIGIN, Complex::new(0.0, 0.0), 2000, &stop),
            None
        );
    }

    #[test]
    fn skipping_interior_changes_nothing_visible() {
        let stop = AtomicBool::new(false);
        for i in 0..40 {
            for j in 0..30 {
                let c = Complex::new(-2.0 + 0.1 * i as f64, -1.5 + 0.1 * j as f64);
                assert_eq!(
                    mandelbrot_kernel(c, 300, &stop),
                    mandelbrot_kernel_skipping_interior(c, 300, &stop),
                    "{:?}",
                    c
                );
            }
        }
    }

    #[test]
    fn cardioid_and_bulb_are_inside() {
        assert!(!maybe_outside(Complex::new(0.0, 0.0)));
        assert!(!maybe_outside(Complex::new(-0.1, 0.1)));
        assert!(!maybe_outside(Complex::new(-1.0, 0.0)));
        assert!(maybe_outside(Complex::new(1.0, 1.0)));
        assert!(maybe_outside(Complex::new(-0.75, 0.5)));
    }
}
