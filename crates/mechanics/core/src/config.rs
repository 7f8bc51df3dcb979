/// Runtime tuning of the actor simulation.
///
/// Game settings (`fCombatDistance` and friends) are content data and live in
/// [`GameSettings`](crate::env::GameSettings); this struct holds the engine's
/// own knobs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MechanicsConfig {
    /// Radius within which targeting, engagement and head tracking run.
    pub ai_processing_distance: f32,
    /// Distance from the player beyond which animation updates stop.
    pub actors_processing_range: f32,
    /// Seconds between AI target recomputations.
    pub ai_target_interval: f32,
    /// Seconds between head-tracking recomputations.
    pub head_track_interval: f32,
    /// Seconds between equipped-light checks.
    pub light_interval: f32,
    /// Seconds between sneak detection checks for the player.
    pub sneak_interval: f32,
    /// Seconds a death animation plays before the death is finished.
    pub death_anim_length: f32,
    /// Player followers attack actors that fight the player or them.
    pub follower_attack_on_sight: bool,
}

impl MechanicsConfig {
    // ===== compile-time constants used as type parameters =====
    /// Number of bound-item effects.
    pub const MAX_BOUND_ITEMS: usize = 11;
    /// Number of summoning effects.
    pub const MAX_SUMMON_EFFECTS: usize = 22;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_AI_PROCESSING_DISTANCE: f32 = 7168.0;
    pub const DEFAULT_ACTORS_PROCESSING_RANGE: f32 = 7168.0;
    pub const DEFAULT_AI_TARGET_INTERVAL: f32 = 1.0;
    pub const DEFAULT_HEAD_TRACK_INTERVAL: f32 = 0.3;
    pub const DEFAULT_LIGHT_INTERVAL: f32 = 1.0;
    pub const DEFAULT_SNEAK_INTERVAL: f32 = 0.2;
    pub const DEFAULT_DEATH_ANIM_LENGTH: f32 = 2.0;

    pub fn new() -> Self {
        Self {
            ai_processing_distance: Self::DEFAULT_AI_PROCESSING_DISTANCE,
            actors_processing_range: Self::DEFAULT_ACTORS_PROCESSING_RANGE,
            ai_target_interval: Self::DEFAULT_AI_TARGET_INTERVAL,
            head_track_interval: Self::DEFAULT_HEAD_TRACK_INTERVAL,
            light_interval: Self::DEFAULT_LIGHT_INTERVAL,
            sneak_interval: Self::DEFAULT_SNEAK_INTERVAL,
            death_anim_length: Self::DEFAULT_DEATH_ANIM_LENGTH,
            follower_attack_on_sight: false,
        }
    }

    pub fn with_follower_attack_on_sight(mut self, enabled: bool) -> Self {
        self.follower_attack_on_sight = enabled;
        self
    }

    /// Squared AI processing distance, for comparisons against squared distances.
    pub fn ai_processing_distance_squared(&self) -> f32 {
        self.ai_processing_distance * self.ai_processing_distance
    }
}

impl Default for MechanicsConfig {
    fn default() -> Self {
        Self::new()
    }
}
