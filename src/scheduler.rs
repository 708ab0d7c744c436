// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Runs renders on a pool of worker threads.
//!
//! Every call to [`RenderScheduler::start`] begins a new *generation*:
//! a fresh set of workers, a fresh shuffle of the pixels, and a
//! cancellation flag of its own.  Before a generation is set up, the
//! previous one is told to stop and every one of its workers is
//! joined, so no stale worker can ever write into the raster after it
//! has been cleared for the next render.
//!
//! Workers pull pixels from a shared [`WorkQueue`] until it runs dry,
//! look at the flag before every pixel and before every iteration
//! step, and write each finished colour straight into the shared
//! [`PixelBuffer`].  Callers may read the raster, the progress and the
//! state at any time.

use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::utils::CachePadded;
use log::{debug, error, info};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::errors::{Error, Result};
use crate::escape::{mandelbrot_kernel, Kernel};
use crate::palette::Palette;
use crate::planes::{PlaneMapper, Viewport};
use crate::queue::WorkQueue;
use crate::raster::PixelBuffer;

/// Where a generation is in its life.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing has been rendered yet.
    Idle,
    /// Workers are still running.
    Running,
    /// Every pixel was written.
    Completed,
    /// Stopped before every pixel was written, either because it was
    /// cancelled or superseded, or because a worker failed.
    Cancelled,
}

/// A hint that enough of the raster has changed to be worth
/// repainting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Redraw {
    /// The generation that made the change.
    pub generation: u64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum WorkerExit {
    Exhausted,
    Interrupted,
    Faulted,
}

/// Everything a worker needs to know about one render.  Immutable
/// apart from the flag and the counter.
struct Job {
    generation: u64,
    plane: PlaneMapper,
    limit: usize,
    palette: Palette,
    kernel: Kernel,
    stop: AtomicBool,
    done: CachePadded<AtomicUsize>,
}

impl Job {
    fn progress(&self) -> f64 {
        let total = self.plane.len();
        if total == 0 {
            return 1.0;
        }
        self.done.load(Ordering::Relaxed).min(total) as f64 / total as f64
    }

    fn settled_state(&self) -> RenderState {
        if self.done.load(Ordering::Acquire) == self.plane.len() {
            RenderState::Completed
        } else {
            RenderState::Cancelled
        }
    }
}

struct Generation {
    job: Arc<Job>,
    workers: Vec<JoinHandle<WorkerExit>>,
    started: Instant,
    finished: Option<(RenderState, Duration)>,
}

/// Owns the raster, the work queue and the current generation.
pub struct RenderScheduler {
    width: usize,
    height: usize,
    threads: usize,
    buffer: Arc<PixelBuffer>,
    queue: Arc<WorkQueue>,
    current: Option<Generation>,
    next_generation: u64,
    redraw_tx: Sender<Redraw>,
    redraw_rx: Receiver<Redraw>,
}

impl RenderScheduler {
    /// A scheduler for a `width` by `height` raster, running `threads`
    /// workers per render.
    pub fn new(width: usize, height: usize, threads: usize) -> Result<RenderScheduler> {
        if width == 0 || height == 0 || threads == 0 || width.checked_mul(height).is_none() {
            return Err(Error::InvalidDimensions(width, height, threads));
        }
        // One slot: a pending redraw already covers any later one.
        let (redraw_tx, redraw_rx) = bounded(1);
        Ok(RenderScheduler {
            width,
            height,
            threads,
            buffer: Arc::new(PixelBuffer::new(width, height)),
            queue: Arc::new(WorkQueue::new(0)),
            current: None,
            next_generation: 1,
            redraw_tx,
            redraw_rx,
        })
    }

    /// Starts rendering the Mandelbrot set over `viewport`.  Any
    /// render in progress is cancelled and joined first.  Returns
    /// without waiting for the new render.
    pub fn start(&mut self, viewport: Viewport, limit: usize) -> Result<u64> {
        self.start_with_kernel(viewport, limit, mandelbrot_kernel)
    }

    /// [`start`](#method.start) with a different per-pixel
    /// computation.
    pub fn start_with_kernel(
        &mut self,
        viewport: Viewport,
        limit: usize,
        kernel: Kernel,
    ) -> Result<u64> {
        if limit == 0 {
            return Err(Error::InvalidIterations(limit));
        }
        let plane = PlaneMapper::new(self.width, self.height, viewport)?;
        let len = plane.len();
        let generation = self.next_generation;
        let job = Arc::new(Job {
            generation,
            plane,
            limit,
            palette: Palette::new(limit),
            kernel,
            stop: AtomicBool::new(false),
            done: CachePadded::new(AtomicUsize::new(0)),
        });

        self.cancel();
        self.join();

        let previous = self.generation();
        match Arc::get_mut(&mut self.queue) {
            Some(queue) => queue.reset(len),
            None => {
                error!("work queue of generation {} is still shared after join", previous);
                return Err(Error::StaleWorkers(previous));
            }
        }
        self.buffer.clear();
        self.next_generation += 1;

        debug!(
            "generation {}: {}x{} over {:?}, {} iterations, {} workers",
            generation, self.width, self.height, viewport, limit, self.threads
        );

        let started = Instant::now();
        let mut workers = Vec::with_capacity(self.threads);
        for n in 0..self.threads {
            let spawned = thread::Builder::new()
                .name(format!("render-{}-{}", generation, n))
                .spawn({
                    let job = job.clone();
                    let queue = self.queue.clone();
                    let buffer = self.buffer.clone();
                    let redraw = self.redraw_tx.clone();
                    move || run_worker(n, &job, &queue, &buffer, &redraw)
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    error!("generation {}: could not spawn worker {}: {}", generation, n, e);
                    job.stop.store(true, Ordering::Relaxed);
                    for worker in workers {
                        let _ = worker.join();
                    }
                    let state = job.settled_state();
                    self.current = Some(Generation {
                        job,
                        workers: vec![],
                        started,
                        finished: Some((state, started.elapsed())),
                    });
                    return Err(Error::WorkerSpawn(e.to_string()));
                }
            }
        }

        self.current = Some(Generation {
            job,
            workers,
            started,
            finished: None,
        });
        Ok(generation)
    }

    /// Asks the current generation to stop.  Does not wait.
    pub fn cancel(&self) {
        if let Some(ref current) = self.current {
            current.job.stop.store(true, Ordering::Relaxed);
        }
    }

    /// Waits for every worker of the current generation to exit, and
    /// reports how the generation ended.
    pub fn join(&mut self) -> RenderState {
        let current = match self.current {
            Some(ref mut current) => current,
            None => return RenderState::Idle,
        };
        if let Some((state, _)) = current.finished {
            return state;
        }

        let mut exits = vec![];
        for worker in current.workers.drain(..) {
            exits.push(worker.join().unwrap_or(WorkerExit::Faulted));
        }
        let state = current.job.settled_state();
        let elapsed = current.started.elapsed();
        current.finished = Some((state, elapsed));

        let faults = exits.iter().filter(|&&e| e == WorkerExit::Faulted).count();
        match state {
            RenderState::Completed => info!(
                "generation {} rendered in {:.3} s",
                current.job.generation,
                elapsed.as_secs_f64()
            ),
            _ => debug!(
                "generation {} stopped at {:.1}% ({} of {} workers faulted)",
                current.job.generation,
                current.job.progress() * 100.0,
                faults,
                exits.len()
            ),
        }
        state
    }

    /// How the current generation is doing, without blocking.
    pub fn state(&self) -> RenderState {
        match self.current {
            None => RenderState::Idle,
            Some(ref current) => match current.finished {
                Some((state, _)) => state,
                None if current.workers.iter().all(|w| w.is_finished()) => {
                    current.job.settled_state()
                }
                None => RenderState::Running,
            },
        }
    }

    /// True while workers of the current generation are running.
    pub fn is_running(&self) -> bool {
        self.state() == RenderState::Running
    }

    /// Fraction of the current generation's pixels written so far.
    /// Reaches 1.0 only when the render is complete.
    pub fn progress(&self) -> f64 {
        match self.current {
            Some(ref current) => current.job.progress(),
            None => 0.0,
        }
    }

    /// Token of the current generation; 0 before the first render.
    pub fn generation(&self) -> u64 {
        self.current.as_ref().map_or(0, |c| c.job.generation)
    }

    /// Time spent on the current generation, or the time it took once
    /// it has been joined.
    pub fn elapsed(&self) -> Option<Duration> {
        self.current.as_ref().map(|c| match c.finished {
            Some((_, elapsed)) => elapsed,
            None => c.started.elapsed(),
        })
    }

    /// The live raster.  Safe to read at any time.
    pub fn buffer(&self) -> Arc<PixelBuffer> {
        self.buffer.clone()
    }

    /// Repaint hints.  Several workers' hints may arrive as one.
    pub fn redraw_requests(&self) -> Receiver<Redraw> {
        self.redraw_rx.clone()
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Workers per generation.
    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.cancel();
        self.join();
    }
}

/// A worker never unwinds past this point: a panic is logged and
/// stops the rest of its generation, and the engine carries on.
fn run_worker(
    n: usize,
    job: &Job,
    queue: &WorkQueue,
    buffer: &PixelBuffer,
    redraw: &Sender<Redraw>,
) -> WorkerExit {
    let exit = panic::catch_unwind(AssertUnwindSafe(|| render_pixels(job, queue, buffer, redraw)))
        .unwrap_or_else(|_| {
            error!("worker {} of generation {} panicked", n, job.generation);
            job.stop.store(true, Ordering::Relaxed);
            WorkerExit::Faulted
        });
    if exit == WorkerExit::Exhausted {
        let _ = redraw.try_send(Redraw {
            generation: job.generation,
        });
    }
    exit
}

fn render_pixels(
    job: &Job,
    queue: &WorkQueue,
    buffer: &PixelBuffer,
    redraw: &Sender<Redraw>,
) -> WorkerExit {
    loop {
        if job.stop.load(Ordering::Relaxed) {
            return WorkerExit::Interrupted;
        }
        let offset = match queue.next() {
            Some(offset) => offset,
            None => return WorkerExit::Exhausted,
        };
        let pixel = job.plane.offset_to_pixel(offset);
        let point = job.plane.pixel_to_point(&pixel);
        let count = match (job.kernel)(point, job.limit, &job.stop) {
            Some(count) => count,
            None => return WorkerExit::Interrupted,
        };
        buffer.store(offset, job.palette.get(count));
        job.done.fetch_add(1, Ordering::Release);
        if pixel.0 == 0 {
            let _ = redraw.try_send(Redraw {
                generation: job.generation,
            });
        }
    }
}
