use rand::Rng;
use tracing::{debug, info};

use super::dialog::{select_line, DialogPartner, DialogSession, DialogTable};
use super::entity::Entity;
use super::geometry::{CollisionIndex, MapId, Rect, Vec2};
use super::quest::{QuestId, QuestRegistry};
use super::wander::{Wander, WanderTuning};

#[derive(Debug, Clone)]
pub struct Npc {
    pub entity: Entity,
    pub dialog: DialogTable,
    pub quest: Option<QuestId>,
    wander: Wander,
    met_hero: bool,
}

impl Npc {
    pub fn new(entity: Entity, dialog: DialogTable, quest: Option<QuestId>) -> Self {
        Self {
            entity,
            dialog,
            quest,
            wander: Wander::default(),
            met_hero: false,
        }
    }

    pub fn has_met_hero(&self) -> bool {
        self.met_hero
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub quest: QuestId,
    pub name: String,
    pub sprite: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitTransition {
    pub exit_name: String,
    pub destination: MapId,
    /// False when the clearance loop ran out of attempts and the hero is
    /// still inside wall/exit geometry of the source map.
    pub cleared: bool,
    pub correction_steps: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapUpdate {
    pub next_map: MapId,
    pub exit: Option<ExitTransition>,
}

/// Everything a map borrows from the engine for one update.
pub struct UpdateContext<'a, R: ?Sized> {
    pub hero: &'a mut Entity,
    pub session: &'a mut DialogSession,
    pub quests: &'a mut QuestRegistry,
    pub rng: &'a mut R,
    pub exit_clearance_max_steps: u32,
}

#[derive(Debug, Clone)]
pub struct GameMap {
    id: MapId,
    geometry: CollisionIndex,
    bounds: Rect,
    hero_spawn: Option<Vec2>,
    npcs: Vec<Npc>,
    items: Vec<PlacedItem>,
}

impl GameMap {
    pub fn new(
        id: MapId,
        geometry: CollisionIndex,
        bounds: Rect,
        hero_spawn: Option<Vec2>,
        npcs: Vec<Npc>,
    ) -> Self {
        Self {
            id,
            geometry,
            bounds,
            hero_spawn,
            npcs,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> &MapId {
        &self.id
    }

    pub fn geometry(&self) -> &CollisionIndex {
        &self.geometry
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn hero_spawn(&self) -> Option<Vec2> {
        self.hero_spawn
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn npcs_mut(&mut self) -> &mut [Npc] {
        &mut self.npcs
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn place_item(&mut self, item: PlacedItem) {
        self.items.push(item);
    }

    pub fn take_item_touching(&mut self, feet: &Rect) -> Option<PlacedItem> {
        let index = self.items.iter().position(|item| item.rect.overlaps(feet))?;
        Some(self.items.remove(index))
    }

    /// Rolls wander for every NPC not touching the hero. Returns how many
    /// NPCs committed a new velocity this tick.
    pub fn wander_npcs<R: Rng + ?Sized>(
        &mut self,
        hero_rect: &Rect,
        rng: &mut R,
        tuning: &WanderTuning,
    ) -> usize {
        let mut committed = 0;
        for npc in &mut self.npcs {
            let touching_hero = npc.entity.rect().overlaps(hero_rect);
            if npc
                .wander
                .step(rng, tuning, touching_hero, &mut npc.entity.velocity)
            {
                committed += 1;
            }
        }
        committed
    }

    /// Advances one tick: motion, wall rollback, exit resolution, dialog.
    /// Returns the map that should be current afterwards.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt_seconds: f32,
        current: &MapId,
        ctx: UpdateContext<'_, R>,
    ) -> MapUpdate {
        let UpdateContext {
            hero,
            session,
            quests,
            rng,
            exit_clearance_max_steps,
        } = ctx;

        hero.integrate(dt_seconds);
        for npc in &mut self.npcs {
            npc.entity.integrate(dt_seconds);
        }

        if self.geometry.first_wall_hit(&hero.feet()).is_some() {
            hero.rollback();
        }
        for npc in &mut self.npcs {
            if self.geometry.first_wall_hit(&npc.entity.feet()).is_some() {
                npc.entity.rollback();
            }
        }

        if let Some(exit_index) = self.geometry.first_exit_hit(&hero.feet()) {
            if let Some(exit) = self.geometry.exit(exit_index).cloned() {
                let (cleared, correction_steps) =
                    self.clear_hero_from_geometry(hero, rng, exit_clearance_max_steps);
                debug!(
                    map = %self.id,
                    exit = exit.name.as_str(),
                    destination = %exit.destination,
                    cleared,
                    correction_steps,
                    "exit_triggered"
                );
                return MapUpdate {
                    next_map: exit.destination.clone(),
                    exit: Some(ExitTransition {
                        exit_name: exit.name,
                        destination: exit.destination,
                        cleared,
                        correction_steps,
                    }),
                };
            }
        }

        self.resolve_dialog(hero, session, quests);

        MapUpdate {
            next_map: current.clone(),
            exit: None,
        }
    }

    /// Pushes the hero's feet out of every wall and exit, one random-signed
    /// jump of 1.5 half-extents from the blocking rectangle's center at a
    /// time. Gives up after `max_steps` jumps.
    fn clear_hero_from_geometry<R: Rng + ?Sized>(
        &self,
        hero: &mut Entity,
        rng: &mut R,
        max_steps: u32,
    ) -> (bool, u32) {
        let mut steps = 0u32;
        while let Some(hit) = self.geometry.first_blocking_hit(&hero.feet()) {
            if steps >= max_steps {
                return (false, steps);
            }
            let Some(rect) = self.geometry.blocking_rect(hit) else {
                return (false, steps);
            };
            let center = rect.center();
            let half = rect.half_extent();
            let sign_x = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let sign_y = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            hero.place_feet_center(Vec2 {
                x: center.x + sign_x * 1.5 * half.x,
                y: center.y + sign_y * 1.5 * half.y,
            });
            steps += 1;
        }
        (true, steps)
    }

    fn resolve_dialog(
        &mut self,
        hero: &Entity,
        session: &mut DialogSession,
        quests: &mut QuestRegistry,
    ) {
        if !session.talking {
            session.clear_partner();
            return;
        }

        let hero_rect = hero.rect();
        if let Some(partner) = session.partner.as_ref() {
            let still_touching = partner.map == self.id
                && self
                    .npcs
                    .get(partner.npc_index)
                    .is_some_and(|npc| npc.entity.rect().overlaps(&hero_rect));
            if still_touching {
                return;
            }
            session.clear_partner();
        }

        for (npc_index, npc) in self.npcs.iter_mut().enumerate() {
            if !npc.entity.rect().overlaps(&hero_rect) {
                continue;
            }
            let first_contact = !npc.met_hero;
            let key = select_line(first_contact, npc.quest.as_ref(), session, quests);
            npc.met_hero = true;
            session.partner = Some(DialogPartner {
                map: self.id.clone(),
                npc_index,
                name: npc.entity.name().to_string(),
            });
            session.text = Some(npc.dialog.line(key).to_string());
            info!(
                map = %self.id,
                npc = npc.entity.name(),
                line = key.as_token(),
                first_contact,
                "dialog_resolved"
            );
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sim::dialog::DialogKey;
    use crate::sim::entity::EntityRole;
    use crate::sim::geometry::Exit;
    use crate::sim::quest::{Quest, QuestStatus, RewardItem};

    const DT: f32 = 0.1;

    fn hero_at(x: f32, y: f32) -> Entity {
        Entity::new(
            "hero",
            EntityRole::Hero,
            Vec2::new(x, y),
            Vec2::new(32.0, 32.0),
            8.0,
        )
    }

    fn dialog() -> DialogTable {
        DialogTable::new(
            "hello there".to_string(),
            "what now?".to_string(),
            "good day".to_string(),
            "go away".to_string(),
            "bye".to_string(),
        )
    }

    fn npc_at(name: &str, x: f32, y: f32, quest: Option<&str>) -> Npc {
        Npc::new(
            Entity::new(name, EntityRole::Npc, Vec2::new(x, y), Vec2::new(32.0, 32.0), 8.0),
            dialog(),
            quest.map(QuestId::new),
        )
    }

    fn quests_with(id: &str) -> QuestRegistry {
        let mut quests = QuestRegistry::default();
        quests.insert(Quest::new(
            QuestId::new(id),
            id,
            RewardItem {
                name: "gem".to_string(),
                sprite: "items/gem.png".to_string(),
                position: Vec2::new(5.0, 5.0),
            },
            MapId::from("main_map.tmx"),
        ));
        quests
    }

    fn walled_map(npcs: Vec<Npc>) -> GameMap {
        GameMap::new(
            MapId::from("main_map.tmx"),
            CollisionIndex::new(
                vec![Rect::new(0.0, 100.0, 400.0, 20.0)],
                vec![Exit {
                    name: "to_plains".to_string(),
                    destination: MapId::from("plains_portal.tmx"),
                    rect: Rect::new(300.0, 0.0, 64.0, 64.0),
                }],
                Vec::new(),
            ),
            Rect::new(0.0, 0.0, 640.0, 480.0),
            Some(Vec2::new(10.0, 10.0)),
            npcs,
        )
    }

    struct Fixture {
        hero: Entity,
        session: DialogSession,
        quests: QuestRegistry,
        rng: SmallRng,
    }

    impl Fixture {
        fn new(hero: Entity) -> Self {
            Self {
                hero,
                session: DialogSession::default(),
                quests: quests_with("q1"),
                rng: SmallRng::seed_from_u64(42),
            }
        }

        fn update(&mut self, map: &mut GameMap) -> MapUpdate {
            let current = map.id().clone();
            map.update(
                DT,
                &current,
                UpdateContext {
                    hero: &mut self.hero,
                    session: &mut self.session,
                    quests: &mut self.quests,
                    rng: &mut self.rng,
                    exit_clearance_max_steps: 32,
                },
            )
        }
    }

    #[test]
    fn free_motion_integrates_every_entity() {
        let mut map = walled_map(vec![npc_at("npc", 100.0, 20.0, None)]);
        map.npcs_mut()[0].entity.velocity = Vec2::new(0.0, 10.0);
        let mut fx = Fixture::new(hero_at(10.0, 10.0));
        fx.hero.velocity = Vec2::new(100.0, 0.0);

        let result = fx.update(&mut map);

        assert_eq!(result.next_map, MapId::from("main_map.tmx"));
        assert_eq!(result.exit, None);
        assert!((fx.hero.position().x - 20.0).abs() < 1e-4);
        assert!((map.npcs()[0].entity.position().y - 21.0).abs() < 1e-4);
    }

    #[test]
    fn wall_collision_reverts_to_exact_previous_position() {
        let mut map = walled_map(Vec::new());
        // Feet bottom at 98; one step of 40px/s*0.1s lands the feet in the wall.
        let mut fx = Fixture::new(hero_at(50.25, 66.0));
        fx.hero.velocity = Vec2::new(0.0, 40.0);
        let before = fx.hero.position();

        fx.update(&mut map);

        assert_eq!(fx.hero.position(), before);
        assert_eq!(fx.hero.velocity, Vec2::new(0.0, 40.0));
        assert_eq!(fx.hero.feet().mid_bottom(), fx.hero.rect().mid_bottom());
        assert!(map.geometry().first_wall_hit(&fx.hero.feet()).is_none());
    }

    #[test]
    fn wall_rollback_applies_to_npcs_independently() {
        let mut map = walled_map(vec![npc_at("npc", 200.0, 66.0, None)]);
        map.npcs_mut()[0].entity.velocity = Vec2::new(0.0, 40.0);
        let mut fx = Fixture::new(hero_at(10.0, 10.0));
        fx.hero.velocity = Vec2::new(0.0, 40.0);

        fx.update(&mut map);

        assert_eq!(map.npcs()[0].entity.position(), Vec2::new(200.0, 66.0));
        assert!((fx.hero.position().y - 14.0).abs() < 1e-4);
    }

    #[test]
    fn exit_returns_destination_and_clears_source_geometry() {
        let mut map = walled_map(Vec::new());
        // Feet will land inside the exit rectangle.
        let mut fx = Fixture::new(hero_at(310.0, 10.0));
        fx.hero.velocity = Vec2::new(10.0, 0.0);

        let result = fx.update(&mut map);

        assert_eq!(result.next_map, MapId::from("plains_portal.tmx"));
        let exit = result.exit.expect("exit transition");
        assert_eq!(exit.exit_name, "to_plains");
        assert!(exit.cleared);
        assert!(exit.correction_steps >= 1);
        assert!(map.geometry().first_blocking_hit(&fx.hero.feet()).is_none());
        assert_eq!(fx.hero.feet().mid_bottom(), fx.hero.rect().mid_bottom());
    }

    #[test]
    fn clearance_gives_up_after_cap() {
        // Jumps of 1.5 half-extents never clear feet wider than the exit.
        let mut map = GameMap::new(
            MapId::from("trap.tmx"),
            CollisionIndex::new(
                Vec::new(),
                vec![Exit {
                    name: "stuck".to_string(),
                    destination: MapId::from("main_map.tmx"),
                    rect: Rect::new(0.0, 0.0, 4.0, 4.0),
                }],
                Vec::new(),
            ),
            Rect::new(0.0, 0.0, 64.0, 64.0),
            None,
            Vec::new(),
        );
        let mut fx = Fixture::new(hero_at(-14.0, -28.0));
        let current = map.id().clone();

        let result = map.update(
            DT,
            &current,
            UpdateContext {
                hero: &mut fx.hero,
                session: &mut fx.session,
                quests: &mut fx.quests,
                rng: &mut fx.rng,
                exit_clearance_max_steps: 5,
            },
        );

        let exit = result.exit.expect("exit transition");
        assert!(!exit.cleared);
        assert_eq!(exit.correction_steps, 5);
        assert_eq!(result.next_map, MapId::from("main_map.tmx"));
    }

    #[test]
    fn talking_to_npc_resolves_hello_and_stages_offer() {
        let mut map = walled_map(vec![npc_at("chewie_04", 20.0, 10.0, Some("q1"))]);
        let mut fx = Fixture::new(hero_at(10.0, 10.0));
        fx.session.talking = true;

        fx.update(&mut map);

        assert_eq!(fx.session.text.as_deref(), Some("hello there"));
        let partner = fx.session.partner.as_ref().expect("partner");
        assert_eq!(partner.name, "chewie_04");
        assert_eq!(fx.session.active_quest, Some(QuestId::new("q1")));
        assert_eq!(fx.quests.status(&QuestId::new("q1")), Some(QuestStatus::None));
        assert!(map.npcs()[0].has_met_hero());
    }

    #[test]
    fn open_session_keeps_line_stable() {
        let mut map = walled_map(vec![npc_at("chewie_04", 20.0, 10.0, Some("q1"))]);
        let mut fx = Fixture::new(hero_at(10.0, 10.0));
        fx.session.talking = true;

        fx.update(&mut map);
        fx.update(&mut map);
        fx.update(&mut map);

        assert_eq!(fx.session.text.as_deref(), Some("hello there"));
    }

    #[test]
    fn walking_away_clears_partner() {
        let mut map = walled_map(vec![npc_at("chewie_04", 20.0, 10.0, Some("q1"))]);
        let mut fx = Fixture::new(hero_at(10.0, 10.0));
        fx.session.talking = true;
        fx.update(&mut map);

        fx.hero.place_at(Vec2::new(150.0, 10.0));
        fx.update(&mut map);

        assert_eq!(fx.session.partner, None);
        assert_eq!(fx.session.text, None);
    }

    #[test]
    fn not_talking_resolves_no_dialog() {
        let mut map = walled_map(vec![npc_at("chewie_04", 20.0, 10.0, Some("q1"))]);
        let mut fx = Fixture::new(hero_at(10.0, 10.0));

        fx.update(&mut map);

        assert_eq!(fx.session.text, None);
        assert!(!map.npcs()[0].has_met_hero());
    }

    #[test]
    fn first_overlapping_npc_wins() {
        let mut map = walled_map(vec![
            npc_at("first", 20.0, 10.0, None),
            npc_at("second", 12.0, 14.0, None),
        ]);
        let mut fx = Fixture::new(hero_at(10.0, 10.0));
        fx.session.talking = true;

        fx.update(&mut map);

        assert_eq!(fx.session.partner.as_ref().map(|p| p.name.as_str()), Some("first"));
        assert!(map.npcs()[0].has_met_hero());
        assert!(!map.npcs()[1].has_met_hero());
    }

    #[test]
    fn exit_takes_precedence_over_dialog() {
        let mut map = walled_map(vec![npc_at("porter", 310.0, 10.0, None)]);
        let mut fx = Fixture::new(hero_at(310.0, 10.0));
        fx.session.talking = true;

        let result = fx.update(&mut map);

        assert!(result.exit.is_some());
        assert_eq!(fx.session.text, None);
    }

    #[test]
    fn items_are_collected_by_feet() {
        let mut map = walled_map(Vec::new());
        map.place_item(PlacedItem {
            quest: QuestId::new("q1"),
            name: "gem".to_string(),
            sprite: "items/gem.png".to_string(),
            rect: Rect::new(20.0, 40.0, 16.0, 16.0),
        });
        let hero = hero_at(10.0, 10.0);

        let taken = map.take_item_touching(&hero.feet()).expect("item");

        assert_eq!(taken.name, "gem");
        assert!(map.items().is_empty());
    }

    #[test]
    fn wander_skips_npcs_touching_the_hero() {
        let mut map = walled_map(vec![npc_at("near", 20.0, 10.0, None)]);
        let hero = hero_at(10.0, 10.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let always = WanderTuning {
            idle_probability: 0.0,
            commit_probability: 1.0,
            speed: 60.0,
        };

        let committed = map.wander_npcs(&hero.rect(), &mut rng, &always);

        assert_eq!(committed, 0);
        assert_eq!(map.npcs()[0].entity.velocity, Vec2::ZERO);
    }

    #[test]
    fn repeat_contact_after_commit_says_what() {
        let mut map = walled_map(vec![npc_at("chewie_04", 20.0, 10.0, Some("q1"))]);
        let mut fx = Fixture::new(hero_at(10.0, 10.0));
        fx.session.talking = true;
        fx.update(&mut map);

        fx.session.talking = false;
        fx.session.clear_partner();
        if let Some(quest) = fx.quests.get_mut(&QuestId::new("q1")) {
            quest.commit();
        }
        fx.session.talking = true;
        fx.update(&mut map);

        assert_eq!(
            fx.session.text.as_deref(),
            Some(dialog().line(DialogKey::What))
        );
    }
}
