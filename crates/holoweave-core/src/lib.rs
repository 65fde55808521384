//! Core engine for the holoweave pixel animation.

pub mod buffer;
pub mod config;
pub mod engine;
pub mod glitch;
pub mod heads;
pub mod marks;
pub mod modes;
pub mod palette;
pub mod rng;
pub mod scheduler;

use serde::{Deserialize, Serialize};

pub use buffer::{BufferError, PixelBuffer};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineError, Geometry, RenderTarget, TickEvents};
pub use marks::{MarkStamper, StampEvent, StampKind};
pub use modes::{MarksMode, MovementMode, TextSource, Theme};
pub use palette::{Hsl, PALETTES, Palette, PaletteManager, Rgb};
pub use rng::{EngineRng, ExternalSource, RandomSource, Sfc32};
pub use scheduler::{FrameScheduler, PreviewHook, ScheduledFrame};

/// Simulation frame counter.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Resets the tick counter back to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// `true` when the tick is a multiple of `period`.
    #[must_use]
    pub const fn every(self, period: u64) -> bool {
        period != 0 && self.0.is_multiple_of(period)
    }
}
