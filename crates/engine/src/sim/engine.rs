use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, warn};

use super::config::SimConfig;
use super::definition::{MapDefinition, WorldDefinition};
use super::dialog::DialogSession;
use super::entity::{Entity, EntityRole};
use super::geometry::{CollisionIndex, MapId, Rect, Vec2};
use super::map::{GameMap, MapUpdate, Npc, PlacedItem, UpdateContext};
use super::quest::{Quest, QuestId, QuestRegistry, QuestStatus};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("world defines no maps")]
    NoMaps,
    #[error("map {map} is defined more than once")]
    DuplicateMap { map: MapId },
    #[error("start map {map} is not defined")]
    UnknownStartMap { map: MapId },
    #[error("exit {exit} on map {map} leads to undefined map {destination}")]
    UnknownExitDestination {
        map: MapId,
        exit: String,
        destination: MapId,
    },
    #[error("quest {quest} is defined more than once")]
    DuplicateQuest { quest: QuestId },
    #[error("quest {quest} targets undefined map {map}")]
    UnknownQuestTarget { quest: QuestId, map: MapId },
    #[error("npc {npc} on map {map} references undefined quest {quest}")]
    UnknownNpcQuest {
        map: MapId,
        npc: String,
        quest: QuestId,
    },
}

/// Held directions for one tick. Opposing keys on an axis cancel out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub toggle_talk: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroPlacement {
    Spawn,
    KeptClearedPosition,
    BoundsCenter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSwitch {
    pub from: MapId,
    pub to: MapId,
    pub exit_name: String,
    pub placement: HeroPlacement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestCommit {
    pub quest: QuestId,
    pub from: QuestStatus,
    pub to: QuestStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub map_switch: Option<MapSwitch>,
    pub quest_commit: Option<QuestCommit>,
    pub collected_item: Option<PlacedItem>,
    pub wander_commits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogView<'a> {
    pub speaker: &'a str,
    pub text: &'a str,
}

/// Borrowed view of everything a frame needs to draw.
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub map: &'a GameMap,
    pub hero: &'a Entity,
    pub dialog: Option<DialogView<'a>>,
    pub talking: bool,
}

impl<'a> RenderState<'a> {
    /// NPCs first, hero last, so the hero draws on top.
    pub fn entities(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        let (map, hero) = (self.map, self.hero);
        map.npcs()
            .iter()
            .map(|npc| &npc.entity)
            .chain(std::iter::once(hero))
    }
}

pub struct Engine {
    config: SimConfig,
    maps: BTreeMap<MapId, GameMap>,
    current: MapId,
    hero: Entity,
    session: DialogSession,
    quests: QuestRegistry,
    rng: SmallRng,
    ticks: u64,
}

impl Engine {
    pub fn new(world: WorldDefinition, config: SimConfig) -> Result<Self, ConfigError> {
        validate_world(&world)?;

        let mut quests = QuestRegistry::default();
        for quest in world.quests {
            quests.insert(Quest::new(
                quest.id,
                quest.name,
                quest.reward,
                quest.target_map,
            ));
        }

        let maps: BTreeMap<MapId, GameMap> = world
            .maps
            .into_iter()
            .map(|definition| {
                let map = build_map(definition, &config);
                (map.id().clone(), map)
            })
            .collect();

        let start = maps
            .get(&world.start_map)
            .ok_or_else(|| ConfigError::UnknownStartMap {
                map: world.start_map.clone(),
            })?;
        let mut hero = Entity::new(
            config.hero_name.clone(),
            EntityRole::Hero,
            Vec2::ZERO,
            config.hero_size,
            config.feet_height,
        );
        match start.hero_spawn() {
            Some(spawn) => hero.place_at(spawn),
            None => hero.place_feet_center(start.bounds().center()),
        }

        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        info!(
            start_map = %world.start_map,
            map_count = maps.len(),
            quest_count = quests.len(),
            seed = ?config.rng_seed,
            "world_loaded"
        );

        Ok(Self {
            config,
            maps,
            current: world.start_map,
            hero,
            session: DialogSession::default(),
            quests,
            rng,
            ticks: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn current_map_id(&self) -> &MapId {
        &self.current
    }

    pub fn current_map(&self) -> Option<&GameMap> {
        self.maps.get(&self.current)
    }

    pub fn map(&self, id: &MapId) -> Option<&GameMap> {
        self.maps.get(id)
    }

    pub fn map_ids(&self) -> impl Iterator<Item = &MapId> {
        self.maps.keys()
    }

    pub fn hero(&self) -> &Entity {
        &self.hero
    }

    pub fn session(&self) -> &DialogSession {
        &self.session
    }

    pub fn quests(&self) -> &QuestRegistry {
        &self.quests
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Teleports the hero on the current map.
    pub fn place_hero(&mut self, position: Vec2) {
        self.hero.place_at(position);
    }

    pub fn tick(&mut self, input: &TickInput, dt_seconds: f32) -> TickReport {
        let dt_seconds = if dt_seconds.is_finite() {
            dt_seconds.max(0.0)
        } else {
            0.0
        };
        let mut report = TickReport::default();
        self.ticks = self.ticks.saturating_add(1);

        if input.toggle_talk {
            report.quest_commit = self.handle_dialog_toggle();
        }

        self.hero.velocity = hero_velocity(input, self.config.hero_speed);

        let tuning = self.config.wander_tuning();
        let max_steps = self.config.exit_clearance_max_steps();
        let Some(map) = self.maps.get_mut(&self.current) else {
            warn!(map = %self.current, "current_map_missing");
            return report;
        };

        report.wander_commits = map.wander_npcs(&self.hero.rect(), &mut self.rng, &tuning);
        let update = map.update(
            dt_seconds,
            &self.current,
            UpdateContext {
                hero: &mut self.hero,
                session: &mut self.session,
                quests: &mut self.quests,
                rng: &mut self.rng,
                exit_clearance_max_steps: max_steps,
            },
        );

        if update.next_map != self.current {
            report.map_switch = self.switch_map(update);
        } else if let Some(item) = map.take_item_touching(&self.hero.feet()) {
            if self.quests.stage(&item.quest, QuestStatus::Complete) {
                info!(
                    quest = %item.quest,
                    item = item.name.as_str(),
                    map = %self.current,
                    "reward_collected"
                );
            }
            report.collected_item = Some(item);
        }

        report
    }

    /// Flips talking mode. Turning it off commits the active quest's staged
    /// status and closes the conversation.
    pub fn handle_dialog_toggle(&mut self) -> Option<QuestCommit> {
        self.session.talking = !self.session.talking;
        if self.session.talking {
            return None;
        }

        self.session.clear_partner();
        let quest_id = self.session.active_quest.clone()?;
        let (from, to) = self.quests.get_mut(&quest_id)?.commit()?;
        info!(
            quest = %quest_id,
            from = from.as_token(),
            to = to.as_token(),
            "quest_committed"
        );

        match to {
            QuestStatus::Accepted => self.place_reward(&quest_id),
            QuestStatus::Complete => self.session.active_quest = None,
            QuestStatus::None | QuestStatus::Offered => {}
        }

        Some(QuestCommit {
            quest: quest_id,
            from,
            to,
        })
    }

    pub fn render_state(&self) -> Option<RenderState<'_>> {
        let map = self.maps.get(&self.current)?;
        let dialog = match (self.session.partner.as_ref(), self.session.text.as_deref()) {
            (Some(partner), Some(text)) => Some(DialogView {
                speaker: partner.name.as_str(),
                text,
            }),
            _ => None,
        };
        Some(RenderState {
            map,
            hero: &self.hero,
            dialog,
            talking: self.session.talking,
        })
    }

    fn place_reward(&mut self, quest_id: &QuestId) {
        let Some(quest) = self.quests.get(quest_id) else {
            return;
        };
        let reward = quest.reward();
        let Some(map) = self.maps.get_mut(quest.target_map()) else {
            warn!(quest = %quest_id, map = %quest.target_map(), "reward_map_missing");
            return;
        };
        let size = self.config.item_size;
        map.place_item(PlacedItem {
            quest: quest_id.clone(),
            name: reward.name.clone(),
            sprite: reward.sprite.clone(),
            rect: Rect::new(reward.position.x, reward.position.y, size, size),
        });
        info!(
            quest = %quest_id,
            item = reward.name.as_str(),
            map = %quest.target_map(),
            "reward_placed"
        );
    }

    fn switch_map(&mut self, update: MapUpdate) -> Option<MapSwitch> {
        let exit = update.exit?;
        let Some(destination) = self.maps.get(&update.next_map) else {
            warn!(destination = %update.next_map, exit = exit.exit_name.as_str(), "exit_destination_missing");
            return None;
        };

        let placement = if let Some(spawn) = destination.hero_spawn() {
            if !exit.cleared {
                warn!(
                    exit = exit.exit_name.as_str(),
                    correction_steps = exit.correction_steps,
                    "exit_clearance_exhausted"
                );
            }
            self.hero.place_at(spawn);
            HeroPlacement::Spawn
        } else if exit.cleared && position_is_viable(destination, &self.hero) {
            let position = self.hero.position();
            self.hero.place_at(position);
            HeroPlacement::KeptClearedPosition
        } else {
            warn!(
                destination = %update.next_map,
                cleared = exit.cleared,
                "hero_placed_at_bounds_center"
            );
            self.hero.place_feet_center(destination.bounds().center());
            HeroPlacement::BoundsCenter
        };

        self.session.clear_partner();
        let from = std::mem::replace(&mut self.current, update.next_map);
        info!(
            from = %from,
            to = %self.current,
            exit = exit.exit_name.as_str(),
            placement = ?placement,
            correction_steps = exit.correction_steps,
            "map_switched"
        );
        Some(MapSwitch {
            from,
            to: self.current.clone(),
            exit_name: exit.exit_name,
            placement,
        })
    }
}

fn hero_velocity(input: &TickInput, speed: f32) -> Vec2 {
    let axis = |negative: bool, positive: bool| match (negative, positive) {
        (true, false) => -speed,
        (false, true) => speed,
        _ => 0.0,
    };
    Vec2 {
        x: axis(input.left, input.right),
        y: axis(input.up, input.down),
    }
}

fn position_is_viable(map: &GameMap, hero: &Entity) -> bool {
    let feet = hero.feet();
    map.bounds().contains_point(feet.center())
        && map.geometry().first_blocking_hit(&feet).is_none()
}

fn build_map(definition: MapDefinition, config: &SimConfig) -> GameMap {
    let npcs = definition
        .npcs
        .into_iter()
        .map(|npc| {
            let entity = Entity::new(
                npc.name,
                EntityRole::Npc,
                npc.position,
                npc.size.unwrap_or(config.npc_size),
                config.feet_height,
            );
            Npc::new(entity, npc.dialog, npc.quest)
        })
        .collect();
    GameMap::new(
        definition.id,
        CollisionIndex::new(definition.walls, definition.exits, definition.zones),
        definition.bounds,
        definition.hero_spawn,
        npcs,
    )
}

fn validate_world(world: &WorldDefinition) -> Result<(), ConfigError> {
    if world.maps.is_empty() {
        return Err(ConfigError::NoMaps);
    }

    let mut map_ids = BTreeSet::new();
    for map in &world.maps {
        if !map_ids.insert(&map.id) {
            return Err(ConfigError::DuplicateMap {
                map: map.id.clone(),
            });
        }
    }
    if !map_ids.contains(&world.start_map) {
        return Err(ConfigError::UnknownStartMap {
            map: world.start_map.clone(),
        });
    }

    let mut quest_ids = BTreeSet::new();
    for quest in &world.quests {
        if !quest_ids.insert(&quest.id) {
            return Err(ConfigError::DuplicateQuest {
                quest: quest.id.clone(),
            });
        }
        if !map_ids.contains(&quest.target_map) {
            return Err(ConfigError::UnknownQuestTarget {
                quest: quest.id.clone(),
                map: quest.target_map.clone(),
            });
        }
    }

    for map in &world.maps {
        for exit in &map.exits {
            if !map_ids.contains(&exit.destination) {
                return Err(ConfigError::UnknownExitDestination {
                    map: map.id.clone(),
                    exit: exit.name.clone(),
                    destination: exit.destination.clone(),
                });
            }
        }
        for npc in &map.npcs {
            if let Some(quest) = npc.quest.as_ref() {
                if !quest_ids.contains(quest) {
                    return Err(ConfigError::UnknownNpcQuest {
                        map: map.id.clone(),
                        npc: npc.name.clone(),
                        quest: quest.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
