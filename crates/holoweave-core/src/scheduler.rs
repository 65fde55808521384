//! Frame pacing: play/pause state and the once-per-seed mint preview.

use tracing::{debug, info};

use crate::engine::{Engine, TickEvents};

/// Upper bound on the reported frame delta, in seconds.
pub const MAX_FRAME_DT: f64 = 0.05;

/// Output of one scheduled frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledFrame {
    /// Seconds since the previous frame, capped at [`MAX_FRAME_DT`].
    pub dt: f64,
    /// Wall-clock seconds, for time-driven overlays.
    pub seconds: f64,
    pub events: TickEvents,
}

/// Drives one tick per host animation callback unless paused.
///
/// Resuming resets only the delta reference; there is no tick catch-up.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    paused: bool,
    last_ms: Option<f64>,
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop ticking. No-op when already paused.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            info!("paused");
        }
    }

    /// Resume ticking from `now_ms`. No-op when already running.
    pub fn resume(&mut self, now_ms: f64) {
        if self.paused {
            self.paused = false;
            self.last_ms = Some(now_ms);
            info!("resumed");
        }
    }

    /// Flip between paused and running; returns `true` when now paused.
    pub fn toggle(&mut self, now_ms: f64) -> bool {
        if self.paused {
            self.resume(now_ms);
        } else {
            self.pause();
        }
        self.paused
    }

    /// Run one tick for the callback at `now_ms`, or nothing while paused.
    pub fn frame(&mut self, engine: &mut Engine, now_ms: f64) -> Option<ScheduledFrame> {
        if self.paused {
            return None;
        }
        let last = self.last_ms.unwrap_or(now_ms);
        let dt = ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT);
        self.last_ms = Some(now_ms);
        let events = engine.tick();
        Some(ScheduledFrame {
            dt,
            seconds: now_ms / 1000.0,
            events,
        })
    }
}

/// Host callback that captures the current frame as the mint preview.
///
/// Fires at most once per seed; a new seed re-arms it.
pub struct PreviewHook {
    callback: Box<dyn FnMut()>,
    sent_for: Option<String>,
}

impl std::fmt::Debug for PreviewHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHook")
            .field("sent_for", &self.sent_for)
            .finish_non_exhaustive()
    }
}

impl PreviewHook {
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            sent_for: None,
        }
    }

    /// Invoke the callback unless it already fired for `seed`.
    pub fn mint(&mut self, seed: &str) -> bool {
        if self.sent_for.as_deref() == Some(seed) {
            debug!(seed, "preview already sent");
            return false;
        }
        (self.callback)();
        self.sent_for = Some(seed.to_owned());
        info!(seed, "mint preview captured");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::cell::Cell;
    use std::rc::Rc;

    fn engine() -> Engine {
        Engine::new(EngineConfig::seeded("sched"), 200, 200).expect("engine")
    }

    #[test]
    fn dt_is_capped_and_first_frame_is_zero() {
        let mut engine = engine();
        let mut scheduler = FrameScheduler::new();
        let first = scheduler.frame(&mut engine, 1_000.0).expect("running");
        assert_eq!(first.dt, 0.0);
        let second = scheduler.frame(&mut engine, 1_016.0).expect("running");
        assert!((second.dt - 0.016).abs() < 1e-9);
        let stalled = scheduler.frame(&mut engine, 9_000.0).expect("running");
        assert_eq!(stalled.dt, MAX_FRAME_DT);
        assert_eq!(stalled.events.tick.0, 3);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut engine = engine();
        let mut scheduler = FrameScheduler::new();
        scheduler.frame(&mut engine, 0.0);
        scheduler.pause();
        scheduler.pause();
        assert!(scheduler.frame(&mut engine, 16.0).is_none());
        assert_eq!(engine.frame().0, 1);

        scheduler.resume(5_000.0);
        scheduler.resume(7_000.0);
        let next = scheduler.frame(&mut engine, 5_010.0).expect("running");
        assert!((next.dt - 0.010).abs() < 1e-9);
        assert_eq!(engine.frame().0, 2);

        scheduler.resume(6_000.0);
        assert_eq!(engine.frame().0, 2);
        assert!(!scheduler.is_paused());
    }

    #[test]
    fn toggle_reports_state() {
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.toggle(0.0));
        assert!(!scheduler.toggle(10.0));
    }

    #[test]
    fn preview_fires_once_per_seed() {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let mut hook = PreviewHook::new(move || seen.set(seen.get() + 1));
        assert!(hook.mint("aaa"));
        assert!(!hook.mint("aaa"));
        assert!(hook.mint("bbb"));
        assert_eq!(count.get(), 2);
    }
}
