// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors reported at the boundary of the engine.  A render that gets
//! superseded or cancelled is not an error; see
//! [`RenderState`](../scheduler/enum.RenderState.html).

use failure::Fail;

/// Everything the engine can refuse to do.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum Error {
    /// The region of the complex plane is empty, inverted, or not finite.
    #[fail(
        display = "Invalid viewport: x {}..{}, y {}..{}",
        x_min, x_max, y_min, y_max
    )]
    InvalidViewport {
        /// Left edge.
        x_min: f64,
        /// Right edge.
        x_max: f64,
        /// Bottom edge.
        y_min: f64,
        /// Top edge.
        y_max: f64,
    },

    /// The iteration bound must be at least one.
    #[fail(display = "Iteration count must be positive, got {}", _0)]
    InvalidIterations(usize),

    /// Rasters and thread pools need at least one of everything.
    #[fail(display = "Invalid dimensions: {}x{} with {} threads", _0, _1, _2)]
    InvalidDimensions(usize, usize, usize),

    /// A zoom rectangle with no area cannot be mapped onto the plane.
    #[fail(display = "The zoom selection is empty")]
    EmptySelection,

    /// Asked to recall a saved view that isn't there.
    #[fail(display = "No saved view at index {}", _0)]
    NoSuchView(usize),

    /// The operating system would not give us a worker thread.
    #[fail(display = "Could not start render worker: {}", _0)]
    WorkerSpawn(String),

    /// Something still holds the work queue of a generation that
    /// should have been joined.
    #[fail(display = "Workers of generation {} are still running", _0)]
    StaleWorkers(u64),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
