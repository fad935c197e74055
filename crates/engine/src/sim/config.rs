use super::geometry::Vec2;
use super::wander::WanderTuning;

pub const DEFAULT_HERO_SPEED: f32 = 200.0;
pub const DEFAULT_NPC_SPEED: f32 = 60.0;
pub const DEFAULT_FEET_HEIGHT: f32 = 8.0;
pub const DEFAULT_EXIT_CLEARANCE_MAX_STEPS: u32 = 32;
pub const DEFAULT_WANDER_IDLE_PROBABILITY: f64 = 0.65;
pub const DEFAULT_WANDER_COMMIT_PROBABILITY: f64 = 1.0 / 150.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub hero_name: String,
    pub hero_speed: f32,
    pub hero_size: Vec2,
    pub npc_speed: f32,
    pub npc_size: Vec2,
    pub feet_height: f32,
    pub item_size: f32,
    pub exit_clearance_max_steps: u32,
    pub wander_idle_probability: f64,
    pub wander_commit_probability: f64,
    /// `None` seeds the wander/clearance RNG from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            hero_name: "hero".to_string(),
            hero_speed: DEFAULT_HERO_SPEED,
            hero_size: Vec2::new(32.0, 32.0),
            npc_speed: DEFAULT_NPC_SPEED,
            npc_size: Vec2::new(32.0, 32.0),
            feet_height: DEFAULT_FEET_HEIGHT,
            item_size: 16.0,
            exit_clearance_max_steps: DEFAULT_EXIT_CLEARANCE_MAX_STEPS,
            wander_idle_probability: DEFAULT_WANDER_IDLE_PROBABILITY,
            wander_commit_probability: DEFAULT_WANDER_COMMIT_PROBABILITY,
            rng_seed: None,
        }
    }
}

impl SimConfig {
    pub(crate) fn wander_tuning(&self) -> WanderTuning {
        WanderTuning {
            idle_probability: normalize_probability(
                self.wander_idle_probability,
                DEFAULT_WANDER_IDLE_PROBABILITY,
            ),
            commit_probability: normalize_probability(
                self.wander_commit_probability,
                DEFAULT_WANDER_COMMIT_PROBABILITY,
            ),
            speed: self.npc_speed,
        }
    }

    pub(crate) fn exit_clearance_max_steps(&self) -> u32 {
        self.exit_clearance_max_steps.max(1)
    }
}

fn normalize_probability(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}
