use super::dialog::DialogTable;
use super::geometry::{Exit, MapId, Rect, Vec2};
use super::quest::{QuestId, RewardItem};

/// Parsed world data, independent of the files it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldDefinition {
    pub start_map: MapId,
    pub maps: Vec<MapDefinition>,
    pub quests: Vec<QuestDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapDefinition {
    pub id: MapId,
    pub bounds: Rect,
    pub walls: Vec<Rect>,
    pub exits: Vec<Exit>,
    pub zones: Vec<Rect>,
    pub hero_spawn: Option<Vec2>,
    pub npcs: Vec<NpcDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcDefinition {
    pub name: String,
    pub position: Vec2,
    /// Falls back to the configured NPC size when absent.
    pub size: Option<Vec2>,
    pub dialog: DialogTable,
    pub quest: Option<QuestId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestDefinition {
    pub id: QuestId,
    pub name: String,
    pub target_map: MapId,
    pub reward: RewardItem,
}
