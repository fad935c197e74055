//! Plays the shipped `assets/` world headlessly through the content loader
//! and the simulation.

use std::path::PathBuf;

use crate::content::load_world;
use crate::sim::{
    Engine, HeroPlacement, MapId, QuestId, QuestStatus, Rect, SimConfig, TickInput, Vec2,
};

const DT: f32 = 0.1;

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

fn shipped_engine() -> Engine {
    let world = load_world(&assets_dir()).expect("shipped world loads");
    Engine::new(
        world,
        SimConfig {
            rng_seed: Some(2024),
            ..SimConfig::default()
        },
    )
    .expect("shipped world validates")
}

fn toggle() -> TickInput {
    TickInput {
        toggle_talk: true,
        ..TickInput::default()
    }
}

fn walk(right: bool) -> TickInput {
    TickInput {
        right,
        left: !right,
        ..TickInput::default()
    }
}

fn stand_on_npc(engine: &mut Engine, name: &str) {
    let position = engine
        .current_map()
        .and_then(|map| map.npcs().iter().find(|npc| npc.entity.name() == name))
        .map(|npc| npc.entity.position())
        .expect("npc on current map");
    engine.place_hero(position);
}

#[test]
fn shipped_world_loads_both_maps() {
    let world = load_world(&assets_dir()).expect("shipped world loads");
    assert_eq!(world.start_map, MapId::from("main_map.tmx"));
    assert_eq!(world.maps.len(), 2);
    assert_eq!(world.quests.len(), 1);

    let main = &world.maps[0];
    assert_eq!(main.bounds, Rect::new(0.0, 0.0, 640.0, 480.0));
    assert_eq!(main.hero_spawn, Some(Vec2::new(100.0, 120.0)));
    assert_eq!(main.exits[0].name, "to_plains");
    assert_eq!(main.exits[0].destination, MapId::from("plains_portal.tmx"));
    assert_eq!(main.zones.len(), 1);
}

#[test]
fn lost_stick_quest_plays_through_both_maps() {
    let mut engine = shipped_engine();
    let lost_stick = QuestId::new("lost_stick");
    let main_map = MapId::from("main_map.tmx");
    let plains = MapId::from("plains_portal.tmx");
    assert_eq!(engine.hero().position(), Vec2::new(100.0, 120.0));

    stand_on_npc(&mut engine, "chewie_04");
    engine.tick(&toggle(), DT);
    assert_eq!(
        engine.session().text.as_deref(),
        Some("Hello there! I lost my favourite stick out on the plains. Could you find it?")
    );
    engine.tick(&toggle(), DT);
    engine.tick(&toggle(), DT);
    engine.tick(&toggle(), DT);
    assert_eq!(engine.quests().status(&lost_stick), Some(QuestStatus::Accepted));

    let reward = engine.map(&plains).expect("plains map").items();
    assert_eq!(reward.len(), 1);
    assert_eq!(reward[0].rect, Rect::new(380.0, 230.0, 16.0, 16.0));

    engine.place_hero(Vec2::new(580.0, 210.0));
    let switch = engine.tick(&walk(true), DT).map_switch.expect("switch to plains");
    assert_eq!(switch.to, plains);
    assert_eq!(switch.placement, HeroPlacement::Spawn);
    assert_eq!(engine.hero().position(), Vec2::new(48.0, 140.0));

    engine.place_hero(Vec2::new(372.0, 210.0));
    let collected = engine.tick(&TickInput::default(), DT).collected_item;
    assert_eq!(collected.map(|item| item.name), Some("stick".to_string()));
    assert_eq!(engine.quests().status(&lost_stick), Some(QuestStatus::Accepted));

    engine.place_hero(Vec2::new(30.0, 150.0));
    let switch = engine.tick(&walk(false), DT).map_switch.expect("switch to main");
    assert_eq!(switch.to, main_map);
    assert_eq!(engine.hero().position(), Vec2::new(100.0, 120.0));

    stand_on_npc(&mut engine, "chewie_04");
    engine.tick(&toggle(), DT);
    let commit = engine.tick(&toggle(), DT).quest_commit;
    assert_eq!(commit.map(|commit| commit.to), Some(QuestStatus::Complete));
    assert_eq!(engine.session().active_quest, None);

    engine.tick(&toggle(), DT);
    assert_eq!(engine.session().text.as_deref(), Some("My stick! Thanks, bye!"));
}
