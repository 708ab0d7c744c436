#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot and Julia renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring a number and adding `c`, starting
//! from zero, never runs off to infinity.  We can't iterate forever,
//! so we iterate up to some limit and record how many steps each
//! point took to get further than 2 from the origin.  That count
//! picks the colour of the pixel; points that never got away are
//! painted black.  A Julia set is the same iteration with `c` held
//! fixed and the starting point varying instead.
//!
//! Rendering is spread over one worker thread per CPU.  The workers
//! take pixels from a shuffled queue, so a half-finished render looks
//! like a noisy version of the whole picture rather than the top half
//! of it.  Changing the parameters while a render is running stops
//! the old workers and waits for them before the new ones start.
//!
//! ```no_run
//! use mandelbrot::{FractalEngine, RenderState, Viewport};
//!
//! let mut engine = FractalEngine::with_size(800, 600).unwrap();
//! engine.render_mandelbrot(Viewport::default(), 256).unwrap();
//! while engine.state() == RenderState::Running {
//!     println!("{:.0}%", engine.current_progress() * 100.0);
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//! let image = engine.pixel_buffer();
//! assert_eq!(image.pixels().len(), 800 * 600);
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod escape;
pub mod julia;
pub mod palette;
pub mod planes;
pub mod queue;
pub mod raster;
pub mod scheduler;

pub use crate::config::EngineConfig;
pub use crate::engine::{FractalEngine, SavedView};
pub use crate::errors::{Error, Result};
pub use crate::julia::JuliaParams;
pub use crate::planes::{PlaneMapper, Selection, Viewport};
pub use crate::raster::{PixelBuffer, Raster};
pub use crate::scheduler::{Redraw, RenderScheduler, RenderState};
