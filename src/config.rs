// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Engine settings that are fixed for the engine's lifetime, plus the
//! starting values for the ones that are not.

use crate::errors::{Error, Result};
use crate::planes::Viewport;

/// Iteration bound used when nobody asks for anything else.
pub const DEFAULT_ITERATIONS: usize = 100;

/// The Julia raster is this percentage of the main raster on each side.
pub const DEFAULT_JULIA_PERCENT: usize = 25;

/// How the engine is put together.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Main raster width in pixels.
    pub width: usize,
    /// Main raster height in pixels.
    pub height: usize,
    /// Render workers per generation.
    pub threads: usize,
    /// Starting iteration bound.
    pub max_iterations: usize,
    /// Starting region of the complex plane.
    pub viewport: Viewport,
    /// Size of the Julia raster relative to the main one, in percent.
    pub julia_percent: usize,
    /// Skip iterating points that are certainly inside the main
    /// cardioid or the period-2 bulb.
    pub skip_interior: bool,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            width: 800,
            height: 600,
            threads: num_cpus::get(),
            max_iterations: DEFAULT_ITERATIONS,
            viewport: Viewport::default(),
            julia_percent: DEFAULT_JULIA_PERCENT,
            skip_interior: false,
        }
    }
}

impl EngineConfig {
    /// Default settings for a `width` by `height` raster.
    pub fn with_size(width: usize, height: usize) -> EngineConfig {
        EngineConfig {
            width,
            height,
            ..EngineConfig::default()
        }
    }

    /// Size of the Julia raster.
    pub fn julia_size(&self) -> (usize, usize) {
        (
            (self.width * self.julia_percent) / 100,
            (self.height * self.julia_percent) / 100,
        )
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.threads == 0 {
            return Err(Error::InvalidDimensions(self.width, self.height, self.threads));
        }
        let overflows = self.width.checked_mul(self.height).is_none()
            || self.width.checked_mul(self.julia_percent).is_none()
            || self.height.checked_mul(self.julia_percent).is_none();
        if overflows {
            return Err(Error::InvalidDimensions(self.width, self.height, self.threads));
        }
        let (jw, jh) = self.julia_size();
        if jw == 0 || jh == 0 {
            return Err(Error::InvalidDimensions(jw, jh, self.threads));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidIterations(self.max_iterations));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.threads >= 1);
        assert_eq!(config.julia_size(), (200, 150));
    }

    #[test]
    fn rejects_empty_raster() {
        assert_eq!(
            EngineConfig::with_size(0, 10).validate(),
            Err(Error::InvalidDimensions(0, 10, num_cpus::get()))
        );
    }

    #[test]
    fn rejects_sizes_that_overflow() {
        let mut config = EngineConfig::with_size(usize::MAX / 2, 3);
        config.threads = 2;
        assert_eq!(
            config.validate(),
            Err(Error::InvalidDimensions(usize::MAX / 2, 3, 2))
        );
        let mut config = EngineConfig::with_size(1 << 40, 1 << 10);
        config.julia_percent = 1 << 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_raster_too_small_for_julia() {
        assert!(EngineConfig::with_size(3, 3).validate().is_err());
        assert!(EngineConfig::with_size(4, 4).validate().is_ok());
    }

    #[test]
    fn rejects_zero_threads_and_iterations() {
        let mut config = EngineConfig::default();
        config.threads = 0;
        assert!(config.validate().is_err());
        let mut config = EngineConfig::default();
        config.max_iterations = 0;
        assert_eq!(config.validate(), Err(Error::InvalidIterations(0)));
    }
}
