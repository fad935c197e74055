//! Deterministic game simulation: maps, characters, dialog, and quests.
//! Nothing here touches the window, the clock, or the filesystem.

mod config;
mod definition;
mod dialog;
mod engine;
mod entity;
mod geometry;
mod map;
mod quest;
mod wander;

pub use config::{
    SimConfig, DEFAULT_EXIT_CLEARANCE_MAX_STEPS, DEFAULT_FEET_HEIGHT, DEFAULT_HERO_SPEED,
    DEFAULT_NPC_SPEED, DEFAULT_WANDER_COMMIT_PROBABILITY, DEFAULT_WANDER_IDLE_PROBABILITY,
};
pub use definition::{MapDefinition, NpcDefinition, QuestDefinition, WorldDefinition};
pub use dialog::{DialogKey, DialogPartner, DialogSession, DialogTable};
pub use engine::{
    ConfigError, DialogView, Engine, HeroPlacement, MapSwitch, QuestCommit, RenderState,
    TickInput, TickReport,
};
pub use entity::{Entity, EntityRole};
pub use geometry::{CollisionIndex, Exit, GeometryHit, MapId, Rect, Vec2};
pub use map::{ExitTransition, GameMap, MapUpdate, Npc, PlacedItem, UpdateContext};
pub use quest::{Quest, QuestId, QuestRegistry, QuestStatus, RewardItem};
pub use wander::{Direction, Wander, WanderTuning};
