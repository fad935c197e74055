use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::sim::{
    DialogKey, DialogTable, MapDefinition, MapId, NpcDefinition, QuestDefinition, QuestId,
    RewardItem, Vec2, WorldDefinition,
};

use super::error::{ContentError, ContentErrorCode, SourceLocation};
use super::tmx::parse_tmx;

pub const WORLD_MANIFEST_FILE: &str = "world.json";
pub const MAPS_DIR: &str = "maps";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorldManifest {
    start_map: String,
    maps: Vec<MapEntry>,
    #[serde(default)]
    quests: Vec<QuestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapEntry {
    file: String,
    #[serde(default)]
    npcs: Vec<NpcEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct NpcEntry {
    name: String,
    x: f32,
    y: f32,
    #[serde(default)]
    width: Option<f32>,
    #[serde(default)]
    height: Option<f32>,
    #[serde(default)]
    quest: Option<String>,
    /// Kept as a map so a missing line can be reported by key.
    dialog: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestEntry {
    id: String,
    name: String,
    target_map: String,
    reward: RewardEntry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RewardEntry {
    name: String,
    sprite: String,
    x: f32,
    y: f32,
}

/// Reads `world.json` and every map it lists from `assets_dir`.
pub fn load_world(assets_dir: &Path) -> Result<WorldDefinition, ContentError> {
    let manifest_path = assets_dir.join(WORLD_MANIFEST_FILE);
    let raw = fs::read_to_string(&manifest_path)
        .map_err(|source| ContentError::read_file(&manifest_path, &source))?;
    let manifest = parse_manifest(&manifest_path, &raw)?;

    let mut seen_maps = BTreeSet::new();
    let mut maps = Vec::with_capacity(manifest.maps.len());
    for (index, entry) in manifest.maps.into_iter().enumerate() {
        if !seen_maps.insert(entry.file.clone()) {
            return Err(ContentError::new(
                ContentErrorCode::Duplicate,
                format!("maps[{index}]: map file {} is listed more than once", entry.file),
                &manifest_path,
            ));
        }
        maps.push(load_map(assets_dir, &manifest_path, index, entry)?);
    }

    let mut seen_quests = BTreeSet::new();
    let mut quests = Vec::with_capacity(manifest.quests.len());
    for (index, entry) in manifest.quests.into_iter().enumerate() {
        if !seen_quests.insert(entry.id.clone()) {
            return Err(ContentError::new(
                ContentErrorCode::Duplicate,
                format!("quests[{index}]: quest id {} is defined more than once", entry.id),
                &manifest_path,
            ));
        }
        quests.push(QuestDefinition {
            id: QuestId::new(entry.id),
            name: entry.name,
            target_map: MapId::new(entry.target_map),
            reward: RewardItem {
                name: entry.reward.name,
                sprite: entry.reward.sprite,
                position: Vec2::new(entry.reward.x, entry.reward.y),
            },
        });
    }

    info!(
        manifest = %manifest_path.display(),
        map_count = maps.len(),
        quest_count = quests.len(),
        "world_content_loaded"
    );

    Ok(WorldDefinition {
        start_map: MapId::new(manifest.start_map),
        maps,
        quests,
    })
}

fn parse_manifest(manifest_path: &Path, raw: &str) -> Result<WorldManifest, ContentError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, WorldManifest>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let source = error.into_inner();
        let message = if path.is_empty() || path == "." {
            format!("invalid world manifest: {source}")
        } else {
            format!("invalid world manifest at {path}: {source}")
        };
        ContentError {
            location: Some(SourceLocation {
                line: source.line(),
                column: source.column(),
            }),
            ..ContentError::new(ContentErrorCode::ManifestMalformed, message, manifest_path)
        }
    })
}

fn load_map(
    assets_dir: &Path,
    manifest_path: &Path,
    index: usize,
    entry: MapEntry,
) -> Result<MapDefinition, ContentError> {
    let map_path: PathBuf = assets_dir.join(MAPS_DIR).join(&entry.file);
    let raw =
        fs::read_to_string(&map_path).map_err(|source| ContentError::read_file(&map_path, &source))?;
    let layout = parse_tmx(&map_path, &raw)?;

    let mut seen_npcs = BTreeSet::new();
    let mut npcs = Vec::with_capacity(entry.npcs.len());
    for (npc_index, npc) in entry.npcs.into_iter().enumerate() {
        let field = format!("maps[{index}].npcs[{npc_index}]");
        if !seen_npcs.insert(npc.name.clone()) {
            return Err(ContentError::new(
                ContentErrorCode::Duplicate,
                format!("{field}: npc name {} is used twice on {}", npc.name, entry.file),
                manifest_path,
            ));
        }
        npcs.push(npc_definition(manifest_path, &field, npc)?);
    }

    debug!(
        map = entry.file.as_str(),
        walls = layout.walls.len(),
        exits = layout.exits.len(),
        zones = layout.zones.len(),
        npcs = npcs.len(),
        has_spawn = layout.hero_spawn.is_some(),
        "map_parsed"
    );

    Ok(MapDefinition {
        id: MapId::new(entry.file),
        bounds: layout.bounds,
        walls: layout.walls,
        exits: layout.exits,
        zones: layout.zones,
        hero_spawn: layout.hero_spawn,
        npcs,
    })
}

fn npc_definition(
    manifest_path: &Path,
    field: &str,
    mut npc: NpcEntry,
) -> Result<NpcDefinition, ContentError> {
    let size = match (npc.width, npc.height) {
        (None, None) => None,
        (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
            Some(Vec2::new(width, height))
        }
        (width, height) => {
            return Err(ContentError::new(
                ContentErrorCode::InvalidValue,
                format!(
                    "{field}: width and height must both be given and positive, got {width:?}x{height:?}"
                ),
                manifest_path,
            ));
        }
    };

    let mut take_line = |key: DialogKey| {
        npc.dialog.remove(key.as_token()).ok_or_else(|| {
            ContentError::new(
                ContentErrorCode::MissingDialogLine,
                format!("{field}.dialog: missing \"{}\" line", key.as_token()),
                manifest_path,
            )
        })
    };
    let dialog = DialogTable::new(
        take_line(DialogKey::Hello)?,
        take_line(DialogKey::What)?,
        take_line(DialogKey::Salutation)?,
        take_line(DialogKey::GoAway)?,
        take_line(DialogKey::Bye)?,
    );
    if let Some(unknown) = npc.dialog.keys().next() {
        return Err(ContentError::new(
            ContentErrorCode::InvalidValue,
            format!("{field}.dialog: unknown line key \"{unknown}\""),
            manifest_path,
        ));
    }

    Ok(NpcDefinition {
        name: npc.name,
        position: Vec2::new(npc.x, npc.y),
        size,
        dialog,
        quest: npc.quest.map(QuestId::new),
    })
}
