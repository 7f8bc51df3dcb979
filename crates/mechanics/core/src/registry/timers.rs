//! Throttles for the periodic parts of a tick.

use crate::config::MechanicsConfig;

/// Fires on the first poll and then once every `interval` seconds of
/// advanced time. The accumulator resets to zero when it overflows.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Throttle {
    interval: f32,
    elapsed: f32,
}

impl Throttle {
    pub const fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    /// Whether the throttled work runs this tick.
    pub fn poll(&mut self) -> bool {
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
        }
        self.elapsed == 0.0
    }

    pub fn advance(&mut self, duration: f32) {
        self.elapsed += duration;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Which throttled passes run this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DueTimers {
    pub ai_targets: bool,
    pub head_track: bool,
    pub light: bool,
    pub sneak: bool,
}

/// Per-registry timer state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateTimers {
    ai_targets: Throttle,
    head_track: Throttle,
    light: Throttle,
    sneak: Throttle,
}

impl UpdateTimers {
    pub fn new(config: &MechanicsConfig) -> Self {
        Self {
            ai_targets: Throttle::new(config.ai_target_interval),
            head_track: Throttle::new(config.head_track_interval),
            light: Throttle::new(config.light_interval),
            sneak: Throttle::new(config.sneak_interval),
        }
    }

    pub fn poll(&mut self) -> DueTimers {
        DueTimers {
            ai_targets: self.ai_targets.poll(),
            head_track: self.head_track.poll(),
            light: self.light.poll(),
            sneak: self.sneak.poll(),
        }
    }

    pub fn advance(&mut self, duration: f32) {
        self.ai_targets.advance(duration);
        self.head_track.advance(duration);
        self.light.advance(duration);
        self.sneak.advance(duration);
    }

    pub fn reset(&mut self) {
        self.ai_targets.reset();
        self.head_track.reset();
        self.light.reset();
        self.sneak.reset();
    }
}
