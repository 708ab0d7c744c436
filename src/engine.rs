// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The face the renderer shows to a user interface.  The engine owns
//! the current viewport and iteration bound, the Mandelbrot raster
//! (rendered in the background), the Julia raster (rendered on the
//! spot), and a list of saved views.  A UI calls in when the user
//! does something and reads the rasters back whenever it repaints.

use crossbeam::channel::Receiver;
use log::debug;
use num::Complex;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::errors::{Error, Result};
use crate::escape::{mandelbrot_kernel, mandelbrot_kernel_skipping_interior, Kernel};
use crate::julia::{render_julia, JuliaParams};
use crate::planes::{Pixel, PlaneMapper, Selection, Viewport};
use crate::raster::{PixelBuffer, Raster};
use crate::scheduler::{Redraw, RenderScheduler, RenderState};

/// A remembered Julia constant and the iteration bound it was viewed
/// with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SavedView {
    /// Iteration bound.
    pub max_iter: usize,
    /// Real part of the Julia constant.
    pub complex_x: f64,
    /// Imaginary part of the Julia constant.
    pub complex_y: f64,
}

impl SavedView {
    /// The Julia constant as a complex number.
    pub fn point(&self) -> Complex<f64> {
        Complex::new(self.complex_x, self.complex_y)
    }
}

/// Mandelbrot and Julia renderer.
pub struct FractalEngine {
    config: EngineConfig,
    scheduler: RenderScheduler,
    viewport: Viewport,
    max_iterations: usize,
    kernel: Kernel,
    julia: Arc<Raster>,
    saved: Vec<SavedView>,
}

impl FractalEngine {
    /// Builds an engine.  Nothing is rendered until asked.
    pub fn new(config: EngineConfig) -> Result<FractalEngine> {
        config.validate()?;
        let scheduler = RenderScheduler::new(config.width, config.height, config.threads)?;
        let (jw, jh) = config.julia_size();
        let kernel: Kernel = if config.skip_interior {
            mandelbrot_kernel_skipping_interior
        } else {
            mandelbrot_kernel
        };
        Ok(FractalEngine {
            viewport: config.viewport,
            max_iterations: config.max_iterations,
            kernel,
            scheduler,
            julia: Arc::new(Raster::blank(jw, jh)),
            saved: vec![],
            config,
        })
    }

    /// An engine with default settings for a `width` by `height`
    /// raster.
    pub fn with_size(width: usize, height: usize) -> Result<FractalEngine> {
        FractalEngine::new(EngineConfig::with_size(width, height))
    }

    /// Starts a background render of the Mandelbrot set, cancelling
    /// any render in progress.  The new viewport and bound are kept
    /// only if they are valid.
    pub fn render_mandelbrot(&mut self, viewport: Viewport, max_iter: usize) -> Result<u64> {
        let generation = self
            .scheduler
            .start_with_kernel(viewport, max_iter, self.kernel)?;
        self.viewport = viewport;
        self.max_iterations = max_iter;
        Ok(generation)
    }

    /// Re-renders the current viewport.
    pub fn rerender(&mut self) -> Result<u64> {
        self.render_mandelbrot(self.viewport, self.max_iterations)
    }

    /// Changes the iteration bound and re-renders the current
    /// viewport.
    pub fn set_max_iterations(&mut self, max_iter: usize) -> Result<u64> {
        self.render_mandelbrot(self.viewport, max_iter)
    }

    /// Zooms into a pixel-space selection of the Mandelbrot raster.
    /// The selection is grown so the new viewport has the raster's
    /// shape.  On error the current viewport stays.
    pub fn zoom_to(&mut self, selection: Selection) -> Result<u64> {
        let viewport = self.plane()?.zoom_viewport(&selection)?;
        debug!("zoom {:?} -> {:?}", selection.rect(), viewport);
        self.render_mandelbrot(viewport, self.max_iterations)
    }

    /// Renders the Julia set for `c`.  The new raster replaces the old
    /// one only once it is finished.
    pub fn render_julia(&mut self, c: Complex<f64>, max_iter: usize) -> Result<()> {
        let params = JuliaParams::new(c, max_iter)?;
        let (width, height) = self.config.julia_size();
        self.julia = Arc::new(render_julia(width, height, &params)?);
        Ok(())
    }

    /// The point on the complex plane under a pixel of the
    /// Mandelbrot raster.
    pub fn point_at(&self, x: usize, y: usize) -> Result<Complex<f64>> {
        Ok(self.plane()?.pixel_to_point(&Pixel(x, y)))
    }

    /// Renders the Julia set for the point under a pixel of the
    /// Mandelbrot raster, with the current iteration bound.  Returns
    /// the point.
    pub fn julia_at_pixel(&mut self, x: usize, y: usize) -> Result<Complex<f64>> {
        let c = self.point_at(x, y)?;
        self.render_julia(c, self.max_iterations)?;
        Ok(c)
    }

    /// Remembers a Julia constant and bound.
    pub fn save_view(&mut self, c: Complex<f64>, max_iter: usize) -> SavedView {
        let view = SavedView {
            max_iter,
            complex_x: c.re,
            complex_y: c.im,
        };
        self.saved.push(view);
        view
    }

    /// Everything saved so far, oldest first.
    pub fn saved_views(&self) -> &[SavedView] {
        &self.saved
    }

    /// Renders the Julia set of a saved view.
    pub fn recall_view(&mut self, index: usize) -> Result<SavedView> {
        let view = *self.saved.get(index).ok_or(Error::NoSuchView(index))?;
        self.render_julia(view.point(), view.max_iter)?;
        Ok(view)
    }

    /// Asks the background render to stop.  Does not wait.
    pub fn cancel(&self) {
        self.scheduler.cancel();
    }

    /// Waits for the background render to finish or stop.
    pub fn wait(&mut self) -> RenderState {
        self.scheduler.join()
    }

    /// How the background render is doing.
    pub fn state(&self) -> RenderState {
        self.scheduler.state()
    }

    /// Fraction of the Mandelbrot raster rendered so far.
    pub fn current_progress(&self) -> f64 {
        self.scheduler.progress()
    }

    /// A copy of the Mandelbrot raster as it is right now.
    pub fn pixel_buffer(&self) -> Raster {
        self.scheduler.buffer().snapshot()
    }

    /// The live Mandelbrot raster, for callers that want to read
    /// individual pixels without copying.
    pub fn live_buffer(&self) -> Arc<PixelBuffer> {
        self.scheduler.buffer()
    }

    /// The most recent Julia raster.
    pub fn julia_buffer(&self) -> Arc<Raster> {
        self.julia.clone()
    }

    /// Repaint hints from the background render.
    pub fn redraw_requests(&self) -> Receiver<Redraw> {
        self.scheduler.redraw_requests()
    }

    /// The viewport of the most recent render.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The iteration bound of the most recent render.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The settings the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn plane(&self) -> Result<PlaneMapper> {
        PlaneMapper::new(self.config.width, self.config.height, self.viewport)
    }
}
